use crate::gather::{GatherParams, MIN_GATHER_WIDTH};
use crate::grid::Grid;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Model grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_nx")]
    pub nx: usize,
    #[serde(default = "default_nz")]
    pub nz: usize,
    #[serde(default = "default_spacing")]
    pub dx: f64,
    #[serde(default = "default_spacing")]
    pub dz: f64,
}

fn default_nx() -> usize {
    192
}

fn default_nz() -> usize {
    112
}

fn default_spacing() -> f64 {
    10.0
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: default_nx(),
            nz: default_nz(),
            dx: default_spacing(),
            dz: default_spacing(),
        }
    }
}

impl GridConfig {
    fn validate(&self) -> Result<()> {
        // The shot gather needs a shot column and a receiver column at nx - 3
        if self.nx < MIN_GATHER_WIDTH || self.nz == 0 {
            return Err(anyhow!(
                "Grid must be at least {} x 1 cells (nx={}, nz={})",
                MIN_GATHER_WIDTH,
                self.nx,
                self.nz
            ));
        }
        if self.dx <= 0.0 || self.dz <= 0.0 {
            return Err(anyhow!(
                "Grid spacing must be positive (dx={}, dz={})",
                self.dx,
                self.dz
            ));
        }
        Ok(())
    }
}

/// Recording parameters for the synthetic shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    #[serde(default = "default_nt")]
    pub nt: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_f0")]
    pub f0: f64,
}

fn default_nt() -> usize {
    420
}

fn default_dt() -> f64 {
    0.001
}

fn default_f0() -> f64 {
    18.0
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            nt: default_nt(),
            dt: default_dt(),
            f0: default_f0(),
        }
    }
}

impl AcquisitionConfig {
    fn validate(&self) -> Result<()> {
        if self.nt == 0 {
            return Err(anyhow!("nt must be positive"));
        }
        if self.dt <= 0.0 {
            return Err(anyhow!("dt must be positive, got {}", self.dt));
        }
        if self.f0 <= 0.0 {
            return Err(anyhow!("f0 must be positive, got {}", self.f0));
        }
        // The trace container stores these as signed 16-bit fields
        if self.nt > i16::MAX as usize {
            return Err(anyhow!("nt must be at most {}, got {}", i16::MAX, self.nt));
        }
        let dt_us = (self.dt * 1e6).round();
        if dt_us > i16::MAX as f64 {
            return Err(anyhow!("dt must be at most {} us, got {} us", i16::MAX, dt_us));
        }
        Ok(())
    }

    /// Nyquist check: a Ricker pulse carries energy up to roughly 2.5 f0.
    fn warn_if_aliased(&self) {
        let nyquist = 0.5 / self.dt;
        if 2.5 * self.f0 > nyquist {
            warn!(
                f0 = self.f0,
                nyquist, "Wavelet bandwidth exceeds the Nyquist frequency, gather will alias"
            );
        }
    }
}

/// Where and what to write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_previews")]
    pub previews: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("data/synthetic")
}

fn default_previews() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            previews: default_previews(),
        }
    }
}

/// Complete benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_seed() -> u64 {
    7
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            grid: GridConfig::default(),
            acquisition: AcquisitionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SynthConfig =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.acquisition.validate()?;
        self.acquisition.warn_if_aliased();
        Ok(())
    }

    pub fn grid(&self) -> Result<Grid> {
        Ok(Grid::new(self.grid.nx, self.grid.nz, self.grid.dx, self.grid.dz)?)
    }

    pub fn gather_params(&self) -> GatherParams {
        GatherParams {
            nt: self.acquisition.nt,
            dt: self.acquisition.dt,
            f0: self.acquisition.f0,
        }
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        let g = &self.grid;
        info!(
            "Grid: {}x{} ({} x {} m), seed {}",
            g.nx,
            g.nz,
            g.nx as f64 * g.dx,
            g.nz as f64 * g.dz,
            self.seed
        );
        let a = &self.acquisition;
        info!(
            "Recording: nt={}, dt={} s ({:.3} s), f0={} Hz",
            a.nt,
            a.dt,
            a.nt as f64 * a.dt,
            a.f0
        );
        info!("Output: {} (previews: {})", self.output.dir.display(), self.output.previews);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = SynthConfig::from_toml("").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!((config.grid.nx, config.grid.nz), (192, 112));
        assert_eq!((config.grid.dx, config.grid.dz), (10.0, 10.0));
        assert_eq!(config.acquisition.nt, 420);
        assert_eq!(config.acquisition.dt, 0.001);
        assert_eq!(config.acquisition.f0, 18.0);
        assert_eq!(config.output.dir, PathBuf::from("data/synthetic"));
        assert!(config.output.previews);
    }

    #[test]
    fn test_partial_sections() {
        let config = SynthConfig::from_toml(
            r#"
            seed = 42

            [grid]
            nx = 64
            dz = 5.0

            [acquisition]
            f0 = 12.5

            [output]
            dir = "out/run"
            previews = false
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.grid.nx, 64);
        assert_eq!(config.grid.nz, 112);
        assert_eq!(config.grid.dz, 5.0);
        assert_eq!(config.acquisition.f0, 12.5);
        assert_eq!(config.acquisition.nt, 420);
        assert!(!config.output.previews);
        assert_eq!(config.grid().unwrap().extent_z(), 560.0);
    }

    #[test]
    fn test_bundled_config_loads() {
        let config = SynthConfig::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/synthetic.toml")).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.gather_params().nt, 420);
        assert!(SynthConfig::from_file("does/not/exist.toml").is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(SynthConfig::from_toml("[grid]\nnx = 2").is_err());
        assert!(SynthConfig::from_toml("[grid]\nnx = 3").is_ok());
        assert!(SynthConfig::from_toml("[grid]\ndx = -1.0").is_err());
        assert!(SynthConfig::from_toml("[acquisition]\nnt = 0").is_err());
        assert!(SynthConfig::from_toml("[acquisition]\ndt = 0.0").is_err());
        assert!(SynthConfig::from_toml("[acquisition]\nnt = 40000").is_err());
        assert!(SynthConfig::from_toml("[acquisition]\ndt = 0.05").is_err());
        assert!(SynthConfig::from_toml("seed = \"seven\"").is_err());
    }
}
