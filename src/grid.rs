use crate::error::{SynthError, SynthResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub nx: usize, // Number of columns (horizontal samples)
    pub nz: usize, // Number of rows (depth samples)
    pub dx: f64,   // Horizontal cell spacing (meters)
    pub dz: f64,   // Vertical cell spacing (meters)
}

impl Grid {
    pub fn new(nx: usize, nz: usize, dx: f64, dz: f64) -> SynthResult<Self> {
        if nx == 0 || nz == 0 {
            return Err(SynthError::InvalidParameter(format!(
                "grid must have at least one cell (nx={}, nz={})",
                nx, nz
            )));
        }
        if !(dx > 0.0 && dz > 0.0) {
            return Err(SynthError::InvalidParameter(format!(
                "grid spacing must be positive (dx={}, dz={})",
                dx, dz
            )));
        }
        Ok(Grid { nx, nz, dx, dz })
    }

    pub fn x_coord(&self, i: usize) -> f64 {
        // Physical x of column i
        self.dx * (i as f64)
    }

    pub fn z_coord(&self, k: usize) -> f64 {
        // Physical z of row k
        self.dz * (k as f64)
    }

    /// Horizontal extent `nx * dx`, the reference length for lateral features.
    pub fn extent_x(&self) -> f64 {
        self.nx as f64 * self.dx
    }

    /// Vertical extent `nz * dz`.
    pub fn extent_z(&self) -> f64 {
        self.nz as f64 * self.dz
    }

    pub fn shape(&self) -> (usize, usize) {
        // ndarray shape, rows first
        (self.nz, self.nx)
    }

    pub fn len(&self) -> usize {
        self.nx * self.nz
    }

    pub fn x_axis(&self) -> Vec<f32> {
        (0..self.nx).map(|i| self.x_coord(i) as f32).collect()
    }

    pub fn z_axis(&self) -> Vec<f32> {
        (0..self.nz).map(|k| self.z_coord(k) as f32).collect()
    }
}
