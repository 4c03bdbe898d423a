//! Raw float32 blobs with JSON sidecars, plus the JSON axis exports.
//!
//! Every write goes through a temporary file in the destination directory
//! that is renamed into place once complete.

use crate::error::{SynthError, SynthResult};
use crate::gather::{GatherGeometry, ShotGather};
use crate::grid::Grid;
use crate::velocity::VelocityField;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const MODEL_BIN: &str = "velocity_model.bin";
pub const GATHER_BIN: &str = "shot_0001_gather.bin";
pub const SEGY_FILE: &str = "shot_0001.segy_like";
pub const X_AXIS_JSON: &str = "x.json";
pub const Z_AXIS_JSON: &str = "z.json";
pub const VELOCITY_JSON: &str = "vel.json";

fn default_dtype() -> String {
    "float32".to_string()
}

/// Sidecar for `velocity_model.bin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub nx: usize,
    pub nz: usize,
    pub dx: f64,
    pub dz: f64,
    #[serde(default = "default_dtype")]
    pub dtype: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub units: String,
}

impl ModelMeta {
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            nx: grid.nx,
            nz: grid.nz,
            dx: grid.dx,
            dz: grid.dz,
            dtype: default_dtype(),
            order: "row-major [nz][nx]".to_string(),
            units: "m/s".to_string(),
        }
    }
}

/// Sidecar for `shot_0001_gather.bin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherMeta {
    pub n_receivers: usize,
    pub nt: usize,
    pub dt: f64,
    pub shot_x: f64,
    pub shot_z: f64,
    pub receiver_x0: f64,
    pub receiver_dx: f64,
    #[serde(default = "default_dtype")]
    pub dtype: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub units: String,
}

impl GatherMeta {
    pub fn for_gather(gather: &ShotGather) -> Self {
        let g = &gather.geometry;
        Self {
            n_receivers: gather.n_receivers(),
            nt: gather.nt(),
            dt: gather.dt,
            shot_x: g.shot_x,
            shot_z: g.shot_z,
            receiver_x0: g.receiver_x0,
            receiver_dx: g.receiver_dx,
            dtype: default_dtype(),
            order: "row-major [n_receivers][nt]".to_string(),
            units: "arbitrary amplitude".to_string(),
        }
    }
}

/// Path of the JSON sidecar paired with a blob (`<blob>.json`).
pub fn sidecar_path(blob: &Path) -> PathBuf {
    let mut name = blob.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Writes `bytes` to `path` all at once: readers see the old file or the
/// complete new one, never a prefix.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> SynthResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SynthError::Io(e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> SynthResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    write_atomic(path, text.as_bytes())
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> SynthResult<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Little-endian float32 bytes of `data` in logical (row-major) order.
pub fn f32_le_bytes(data: ArrayView2<f32>) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 * data.len());
    for v in data.iter() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Reads a little-endian float32 blob that must hold exactly `expected` values.
pub fn read_f32_le(path: &Path, expected: usize) -> SynthResult<Vec<f32>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(SynthError::TruncatedBlob {
            path: path.to_path_buf(),
            len: bytes.len() as u64,
        });
    }
    let actual = bytes.len() / 4;
    if actual != expected {
        return Err(SynthError::ShapeMismatch {
            path: path.to_path_buf(),
            actual,
            expected,
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn into_grid(path: &Path, values: Vec<f32>, rows: usize, cols: usize) -> SynthResult<Array2<f32>> {
    let actual = values.len();
    Array2::from_shape_vec((rows, cols), values).map_err(|_| SynthError::ShapeMismatch {
        path: path.to_path_buf(),
        actual,
        expected: rows * cols,
    })
}

/// Writes the model blob and its sidecar; returns the blob path.
pub fn write_velocity(dir: &Path, field: &VelocityField) -> SynthResult<PathBuf> {
    let blob = dir.join(MODEL_BIN);
    write_atomic(&blob, &f32_le_bytes(field.values.view()))?;
    write_json(&sidecar_path(&blob), &ModelMeta::for_grid(&field.grid))?;
    Ok(blob)
}

/// Writes the gather blob and its sidecar; returns the blob path.
pub fn write_gather(dir: &Path, gather: &ShotGather) -> SynthResult<PathBuf> {
    let blob = dir.join(GATHER_BIN);
    write_atomic(&blob, &f32_le_bytes(gather.traces.view()))?;
    write_json(&sidecar_path(&blob), &GatherMeta::for_gather(gather))?;
    Ok(blob)
}

/// Axis coordinates and the nested `[nz][nx]` velocity array as JSON.
pub fn write_axis_json(dir: &Path, field: &VelocityField) -> SynthResult<Vec<PathBuf>> {
    let x = dir.join(X_AXIS_JSON);
    let z = dir.join(Z_AXIS_JSON);
    let vel = dir.join(VELOCITY_JSON);

    write_atomic(&x, serde_json::to_string(&field.grid.x_axis())?.as_bytes())?;
    write_atomic(&z, serde_json::to_string(&field.grid.z_axis())?.as_bytes())?;
    let rows: Vec<Vec<f32>> = field.values.outer_iter().map(|r| r.to_vec()).collect();
    write_atomic(&vel, serde_json::to_string(&rows)?.as_bytes())?;
    Ok(vec![x, z, vel])
}

/// Loads a model blob using the dimensions from its sidecar.
pub fn load_velocity_blob(blob: &Path, meta_path: &Path) -> SynthResult<VelocityField> {
    let meta: ModelMeta = read_json(meta_path)?;
    let grid = Grid::new(meta.nx, meta.nz, meta.dx, meta.dz)?;
    let values = read_f32_le(blob, grid.len())?;
    let values = into_grid(blob, values, grid.nz, grid.nx)?;
    Ok(VelocityField { grid, values })
}

pub fn load_velocity(dir: &Path) -> SynthResult<VelocityField> {
    let blob = dir.join(MODEL_BIN);
    load_velocity_blob(&blob, &sidecar_path(&blob))
}

pub fn load_gather(dir: &Path) -> SynthResult<ShotGather> {
    let blob = dir.join(GATHER_BIN);
    let meta: GatherMeta = read_json(&sidecar_path(&blob))?;
    let values = read_f32_le(&blob, meta.n_receivers * meta.nt)?;
    let traces = into_grid(&blob, values, meta.n_receivers, meta.nt)?;
    let geometry = GatherGeometry {
        shot_x: meta.shot_x,
        shot_z: meta.shot_z,
        receiver_x0: meta.receiver_x0,
        receiver_dx: meta.receiver_dx,
    };
    Ok(ShotGather::from_traces(traces, meta.dt, geometry))
}
