use crate::grid::Grid;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;
use tracing::debug;

/// Single random stream shared by every synthesis step of one run.
pub type SynthRng = ChaCha8Rng;

pub const V_MIN: f32 = 1450.0;
pub const V_MAX: f32 = 5200.0;

const LENS_COUNT: usize = 5;
const CHANNEL_AMPLITUDE: f64 = 220.0;
const NOISE_AMPLITUDE: f64 = 35.0;
const FAULT_GRADIENT: f64 = 0.22;

pub fn seeded_rng(seed: u64) -> SynthRng {
    SynthRng::seed_from_u64(seed)
}

/// Velocity model in m/s, stored `[nz][nx]`.
#[derive(Debug, Clone)]
pub struct VelocityField {
    pub grid: Grid,
    pub values: Array2<f32>,
}

impl VelocityField {
    pub fn nx(&self) -> usize {
        self.grid.nx
    }

    pub fn nz(&self) -> usize {
        self.grid.nz
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// Gaussian lens drawn from the run's random stream.
#[derive(Debug, Clone, Copy)]
pub struct Lens {
    pub x0: f64,
    pub z0: f64,
    pub sx: f64,
    pub sz: f64,
    pub amplitude: f64,
}

impl Lens {
    /// Draws one lens. Order of draws is x0, z0, sx, sz, amplitude.
    pub fn draw(rng: &mut SynthRng, grid: &Grid) -> Self {
        let (lx, lz) = (grid.extent_x(), grid.extent_z());
        let x0 = rng.gen_range(0.15..0.85) * lx;
        let z0 = rng.gen_range(0.2..0.8) * lz;
        let sx = rng.gen_range(0.05..0.14) * lx;
        let sz = rng.gen_range(0.05..0.14) * lz;
        let amplitude = rng.gen_range(-220.0..260.0);
        Self { x0, z0, sx, sz, amplitude }
    }

    pub fn at(&self, x: f64, z: f64) -> f64 {
        let u = (x - self.x0) / self.sx;
        let w = (z - self.z0) / self.sz;
        self.amplitude * (-(u * u + w * w)).exp()
    }
}

fn depth_trend(z: f64) -> f64 {
    1500.0 + 0.85 * z
}

fn channel_anomaly(grid: &Grid, x: f64, z: f64) -> f64 {
    let (lx, lz) = (grid.extent_x(), grid.extent_z());
    let center = 0.55 * lx + 0.12 * lx * (2.0 * PI * z / (0.8 * lz)).sin();
    let across = (x - center) / (0.10 * lx);
    let down = (z - 0.35 * lz) / (0.22 * lz);
    CHANNEL_AMPLITUDE * (-(across * across)).exp() * (-(down * down)).exp()
}

fn fault_offset(grid: &Grid, x: f64, z: f64) -> f64 {
    let throw = 0.035 * grid.extent_z();
    let shifted = if x > 0.62 * grid.extent_x() { z + throw } else { z };
    FAULT_GRADIENT * shifted - FAULT_GRADIENT * z
}

/// Standard-normal field drawn row-major from the stream, then averaged with
/// its four neighbours (periodic edges).
pub fn correlated_noise(rng: &mut SynthRng, nz: usize, nx: usize) -> Array2<f64> {
    let raw = Array2::from_shape_simple_fn((nz, nx), || rng.sample::<f64, _>(StandardNormal));
    Array2::from_shape_fn((nz, nx), |(i, j)| {
        let up = raw[[(i + nz - 1) % nz, j]];
        let down = raw[[(i + 1) % nz, j]];
        let left = raw[[i, (j + nx - 1) % nx]];
        let right = raw[[i, (j + 1) % nx]];
        (raw[[i, j]] + up + down + left + right) / 5.0
    })
}

/// Builds the layered velocity model for `grid` from `seed`.
pub fn build_velocity(grid: &Grid, seed: u64) -> VelocityField {
    let mut rng = seeded_rng(seed);
    build_velocity_with(grid, &mut rng)
}

/// Same as [`build_velocity`], drawing from a caller-owned stream.
///
/// Consumes five lens draws and then one `nz * nx` normal draw; any other
/// order changes the output for a given seed.
pub fn build_velocity_with(grid: &Grid, rng: &mut SynthRng) -> VelocityField {
    let lenses: Vec<Lens> = (0..LENS_COUNT).map(|_| Lens::draw(rng, grid)).collect();
    for (n, lens) in lenses.iter().enumerate() {
        debug!(
            lens = n,
            x0 = lens.x0,
            z0 = lens.z0,
            amplitude = lens.amplitude,
            "drew velocity lens"
        );
    }
    let noise = correlated_noise(rng, grid.nz, grid.nx);

    let values = Array2::from_shape_fn(grid.shape(), |(k, i)| {
        let x = grid.x_coord(i);
        let z = grid.z_coord(k);
        let mut v = depth_trend(z) - channel_anomaly(grid, x, z);
        v += lenses.iter().map(|lens| lens.at(x, z)).sum::<f64>();
        v += fault_offset(grid, x, z);
        v += NOISE_AMPLITUDE * noise[[k, i]];
        (v as f32).clamp(V_MIN, V_MAX)
    });

    VelocityField { grid: *grid, values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_grid() -> Grid {
        Grid::new(192, 112, 10.0, 10.0).unwrap()
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let grid = reference_grid();
        let a = build_velocity(&grid, 7);
        let b = build_velocity(&grid, 7);
        let bits_a: Vec<u32> = a.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = b.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let grid = reference_grid();
        let a = build_velocity(&grid, 7);
        let b = build_velocity(&grid, 8);
        assert_ne!(a.values, b.values);
    }

    #[test]
    fn test_values_stay_in_physical_range() {
        for seed in [0, 7, 42, 12345] {
            let field = build_velocity(&reference_grid(), seed);
            let (lo, hi) = field.min_max();
            assert!(lo >= V_MIN, "seed {}: min {}", seed, lo);
            assert!(hi <= V_MAX, "seed {}: max {}", seed, hi);
        }
    }

    #[test]
    fn test_clip_engages_on_deep_models() {
        // 0.85 m/s per meter reaches the ceiling well before 5 km depth
        let grid = Grid::new(16, 600, 10.0, 10.0).unwrap();
        let field = build_velocity(&grid, 1);
        assert_eq!(field.values[[599, 0]], V_MAX);
    }

    #[test]
    fn test_velocity_increases_with_depth() {
        let field = build_velocity(&reference_grid(), 7);
        let top = field.values.row(1).mean().unwrap();
        let bottom = field.values.row(110).mean().unwrap();
        assert!(bottom > top + 500.0, "top {} bottom {}", top, bottom);
    }

    #[test]
    fn test_draw_order_is_lenses_then_noise() {
        let grid = reference_grid();
        let mut rng = seeded_rng(7);
        let lenses: Vec<Lens> = (0..LENS_COUNT).map(|_| Lens::draw(&mut rng, &grid)).collect();
        let noise = correlated_noise(&mut rng, grid.nz, grid.nx);

        let field = build_velocity(&grid, 7);
        let (k, i) = (40, 100);
        let (x, z) = (grid.x_coord(i), grid.z_coord(k));
        let expected = depth_trend(z) - channel_anomaly(&grid, x, z)
            + lenses.iter().map(|l| l.at(x, z)).sum::<f64>()
            + fault_offset(&grid, x, z)
            + NOISE_AMPLITUDE * noise[[k, i]];
        assert_eq!(field.values[[k, i]], (expected as f32).clamp(V_MIN, V_MAX));
    }

    #[test]
    fn test_lens_draws_within_bounds() {
        let grid = reference_grid();
        let mut rng = seeded_rng(99);
        for _ in 0..100 {
            let lens = Lens::draw(&mut rng, &grid);
            assert!(lens.x0 >= 0.15 * 1920.0 && lens.x0 < 0.85 * 1920.0);
            assert!(lens.z0 >= 0.2 * 1120.0 && lens.z0 < 0.8 * 1120.0);
            assert!(lens.sx >= 0.05 * 1920.0 && lens.sx < 0.14 * 1920.0);
            assert!(lens.sz >= 0.05 * 1120.0 && lens.sz < 0.14 * 1120.0);
            assert!((-220.0..260.0).contains(&lens.amplitude));
        }
    }

    #[test]
    fn test_fault_only_right_of_trace() {
        let grid = reference_grid();
        let throw = 0.035 * 1120.0;
        assert_eq!(fault_offset(&grid, 100.0, 500.0), 0.0);
        let right = fault_offset(&grid, 1500.0, 500.0);
        assert!((right - 0.22 * throw).abs() < 1e-9);
    }

    #[test]
    fn test_noise_smoothing_wraps() {
        let mut rng = seeded_rng(3);
        let smoothed = correlated_noise(&mut rng, 4, 5);
        let mut rng = seeded_rng(3);
        let raw = Array2::from_shape_simple_fn((4, 5), || rng.sample::<f64, _>(StandardNormal));
        let corner = (raw[[0, 0]] + raw[[3, 0]] + raw[[1, 0]] + raw[[0, 4]] + raw[[0, 1]]) / 5.0;
        assert!((smoothed[[0, 0]] - corner).abs() < 1e-12);
    }
}
