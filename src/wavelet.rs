use std::f64::consts::PI;

#[derive(Clone, Copy, Debug)]
pub struct Ricker {
    pub f0: f64, // Dominant frequency (Hz)
    pub t0: f64, // Peak delay (s)
}

impl Ricker {
    pub fn new(f0: f64) -> Self {
        // One period of delay keeps the pulse causal at t = 0
        Self { f0, t0: 1.0 / f0 }
    }

    pub fn at(&self, t: f64) -> f64 {
        let a = PI * self.f0 * (t - self.t0);
        let a2 = a * a;
        (1.0 - 2.0 * a2) * (-a2).exp()
    }

    /// Samples the pulse at `k * dt` for `k` in `0..nt`.
    pub fn sample(&self, nt: usize, dt: f64) -> Vec<f32> {
        (0..nt).map(|k| self.at(k as f64 * dt) as f32).collect()
    }
}

/// Zero-phase Ricker pulse of `nt` samples, peaking at `t = 1 / f0`.
pub fn ricker(nt: usize, dt: f64, f0: f64) -> Vec<f32> {
    Ricker::new(f0).sample(nt, dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_peak_sits_at_one_period() {
        let (f0, dt) = (18.0, 0.001);
        let w = ricker(200, dt, f0);

        let argmax = w
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(argmax, (1.0 / (f0 * dt)).round() as usize);
        assert_abs_diff_eq!(w[argmax], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_symmetric_about_peak() {
        // t0 = 0.05 s lands exactly on sample 50
        let w = ricker(101, 0.001, 20.0);
        assert_abs_diff_eq!(w[50], 1.0, epsilon = 1e-6);
        for k in 1..50 {
            assert_abs_diff_eq!(w[50 - k], w[50 + k], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_side_lobes_are_negative() {
        let r = Ricker::new(25.0);
        // Zero crossings at a^2 = 1/2, i.e. |t - t0| = 1 / (pi f0 sqrt 2)
        let lobe = r.t0 + 1.0 / (PI * r.f0);
        assert!(r.at(lobe) < 0.0);
        assert!(r.at(r.t0) > 0.99);
    }
}
