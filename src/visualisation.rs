use crate::artifacts::{self, write_atomic};
use crate::error::SynthResult;
use crate::gather::ShotGather;
use crate::raster::encode_gray8;
use crate::scaling::{to_uint8, DEFAULT_HIGH_PERCENTILE, DEFAULT_LOW_PERCENTILE};
use crate::velocity::VelocityField;
use ndarray::ArrayView2;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_PNG: &str = "velocity_model.png";
pub const GATHER_PNG: &str = "shot_0001_gather.png";

// Gathers carry spiky noise, so clip a little tighter than the model
const GATHER_LOW_PERCENTILE: f64 = 0.5;
const GATHER_HIGH_PERCENTILE: f64 = 99.5;

pub struct PreviewWriter {
    output_dir: PathBuf,
}

impl PreviewWriter {
    pub fn new(output_dir: &Path) -> SynthResult<Self> {
        fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn write_model(&self, field: &VelocityField) -> SynthResult<PathBuf> {
        let path = self.output_dir.join(MODEL_PNG);
        write_scaled_png(
            &path,
            field.values.view(),
            DEFAULT_LOW_PERCENTILE,
            DEFAULT_HIGH_PERCENTILE,
        )?;
        Ok(path)
    }

    pub fn write_gather(&self, gather: &ShotGather) -> SynthResult<PathBuf> {
        let path = self.output_dir.join(GATHER_PNG);
        // Time runs down the image, one column per receiver
        write_scaled_png(
            &path,
            gather.traces.t(),
            GATHER_LOW_PERCENTILE,
            GATHER_HIGH_PERCENTILE,
        )?;
        Ok(path)
    }
}

/// Percentile-stretches `data` and writes it as a grayscale PNG.
pub fn write_scaled_png(path: &Path, data: ArrayView2<f32>, p_lo: f64, p_hi: f64) -> SynthResult<()> {
    let pixels = to_uint8(data, p_lo, p_hi);
    let png = encode_gray8(pixels.view())?;
    write_atomic(path, &png)?;
    info!(path = %path.display(), width = pixels.ncols(), height = pixels.nrows(), "wrote preview");
    Ok(())
}

/// Re-reads the model and gather blobs in `data_dir` and renders both
/// previews into `out_dir`.
pub fn preview_directory(data_dir: &Path, out_dir: &Path) -> SynthResult<Vec<PathBuf>> {
    let field = artifacts::load_velocity(data_dir)?;
    let gather = artifacts::load_gather(data_dir)?;
    let writer = PreviewWriter::new(out_dir)?;
    Ok(vec![writer.write_model(&field)?, writer.write_gather(&gather)?])
}

/// Converts a model blob to a PNG using `nx`/`nz` from its sidecar.
pub fn float32_to_png(input: &Path, meta: &Path, output: &Path) -> SynthResult<PathBuf> {
    let field = artifacts::load_velocity_blob(input, meta)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_scaled_png(
        output,
        field.values.view(),
        DEFAULT_LOW_PERCENTILE,
        DEFAULT_HIGH_PERCENTILE,
    )?;
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{sidecar_path, write_gather, write_velocity, MODEL_BIN};
    use crate::error::SynthError;
    use crate::gather::{synthesize_gather, GatherParams};
    use crate::grid::Grid;
    use crate::velocity::build_velocity;
    use tempfile::TempDir;

    fn write_inputs(dir: &Path) -> (VelocityField, ShotGather) {
        let field = build_velocity(&Grid::new(40, 30, 10.0, 10.0).unwrap(), 5);
        let gather = synthesize_gather(&field, &GatherParams { nt: 120, dt: 0.002, f0: 15.0 }).unwrap();
        write_velocity(dir, &field).unwrap();
        write_gather(dir, &gather).unwrap();
        (field, gather)
    }

    #[test]
    fn test_preview_directory_orientation() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_inputs(data.path());

        let paths = preview_directory(data.path(), &out.path().join("previews")).unwrap();
        assert_eq!(paths.len(), 2);

        let model = image::open(&paths[0]).unwrap().into_luma8();
        assert_eq!(model.dimensions(), (40, 30));
        let gather = image::open(&paths[1]).unwrap().into_luma8();
        // 24 receivers wide, 120 samples tall
        assert_eq!(gather.dimensions(), (24, 120));
    }

    #[test]
    fn test_model_preview_matches_scaler() {
        let data = TempDir::new().unwrap();
        let (field, _) = write_inputs(data.path());
        let path = PreviewWriter::new(data.path()).unwrap().write_model(&field).unwrap();

        let expected = to_uint8(field.values.view(), 1.0, 99.0);
        let decoded = image::open(path).unwrap().into_luma8();
        assert_eq!(decoded.as_raw().as_slice(), expected.as_slice().unwrap());
    }

    #[test]
    fn test_float32_to_png_checks_shape() {
        let data = TempDir::new().unwrap();
        write_inputs(data.path());
        let blob = data.path().join(MODEL_BIN);
        let meta = sidecar_path(&blob);

        let out = data.path().join("nested/model.png");
        float32_to_png(&blob, &meta, &out).unwrap();
        assert_eq!(image::open(&out).unwrap().into_luma8().dimensions(), (40, 30));

        // Sidecar claims one column more than the blob holds
        let wrong_meta = data.path().join("bad.json");
        std::fs::write(&wrong_meta, r#"{"nx": 41, "nz": 30, "dx": 10.0, "dz": 10.0}"#).unwrap();
        assert!(matches!(
            float32_to_png(&blob, &wrong_meta, &out),
            Err(SynthError::ShapeMismatch { expected: 1230, actual: 1200, .. })
        ));
    }

    #[test]
    fn test_float32_to_png_small_blob() {
        let data = TempDir::new().unwrap();
        let blob = data.path().join("tiny.bin");
        let values: Vec<f32> = (0..16).map(|i| 1500.0 + 100.0 * i as f32).collect();
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(&blob, bytes).unwrap();
        let meta = sidecar_path(&blob);
        std::fs::write(&meta, r#"{"nx": 4, "nz": 4, "dx": 10.0, "dz": 10.0}"#).unwrap();

        let out = data.path().join("tiny.png");
        float32_to_png(&blob, &meta, &out).unwrap();
        let decoded = image::open(&out).unwrap().into_luma8();
        assert_eq!(decoded.dimensions(), (4, 4));
        // Values increase row-major, so the first pixel is darkest and the last brightest
        assert_eq!(decoded.as_raw()[0], 0);
        assert_eq!(decoded.as_raw()[15], 255);
    }
}
