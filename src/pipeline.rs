use crate::artifacts::{self, write_atomic, SEGY_FILE};
use crate::error::SynthResult;
use crate::gather::{synthesize_gather, GatherParams, ShotGather};
use crate::grid::Grid;
use crate::segy::encode_segy_like;
use crate::velocity::{build_velocity, VelocityField};
use crate::visualisation::PreviewWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// In-memory products of one run.
pub struct Benchmark {
    pub velocity: VelocityField,
    pub gather: ShotGather,
}

impl Benchmark {
    /// Velocity model from `seed`, then the shot gather recorded over it.
    pub fn synthesize(grid: &Grid, params: &GatherParams, seed: u64) -> SynthResult<Self> {
        let velocity = build_velocity(grid, seed);
        let (lo, hi) = velocity.min_max();
        info!(nx = grid.nx, nz = grid.nz, seed, vmin = lo, vmax = hi, "built velocity model");
        let gather = synthesize_gather(&velocity, params)?;
        Ok(Self { velocity, gather })
    }

    /// Writes every artifact under `dir` and returns their paths in write order.
    pub fn write_all(&self, dir: &Path, previews: bool) -> SynthResult<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = artifacts::write_axis_json(dir, &self.velocity)?;

        let model = artifacts::write_velocity(dir, &self.velocity)?;
        let model_meta = artifacts::sidecar_path(&model);
        written.extend([model, model_meta]);

        let gather = artifacts::write_gather(dir, &self.gather)?;
        let gather_meta = artifacts::sidecar_path(&gather);
        written.extend([gather, gather_meta]);

        let segy = dir.join(SEGY_FILE);
        write_atomic(&segy, &encode_segy_like(&self.gather)?)?;
        written.push(segy);

        if previews {
            let writer = PreviewWriter::new(dir)?;
            written.push(writer.write_model(&self.velocity)?);
            written.push(writer.write_gather(&self.gather)?);
        }

        info!(dir = %dir.display(), files = written.len(), "synthetic benchmark written");
        Ok(written)
    }
}
