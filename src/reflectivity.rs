use crate::velocity::VelocityField;
use ndarray::{Array2, Zip};

const NORM_EPS: f32 = 1e-8;

/// Impedance-contrast proxy: vertical velocity difference normalised to
/// roughly [-1, 1].
pub fn reflectivity_proxy(field: &VelocityField) -> Array2<f32> {
    let vel = &field.values;
    let (nz, nx) = vel.dim();
    let mut diff = Array2::<f32>::zeros((nz, nx));

    // Row 0 is differenced against itself
    for k in 1..nz {
        Zip::from(diff.row_mut(k))
            .and(vel.row(k))
            .and(vel.row(k - 1))
            .for_each(|d, &below, &above| *d = below - above);
    }

    let peak = diff.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()));
    let scale = peak + NORM_EPS;
    diff.mapv_inplace(|v| v / scale);
    diff
}
