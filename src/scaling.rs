use ndarray::{Array2, ArrayView2};

pub const DEFAULT_LOW_PERCENTILE: f64 = 1.0;
pub const DEFAULT_HIGH_PERCENTILE: f64 = 99.0;

// Width given to a collapsed range so the mapping below never divides by zero
const FALLBACK_SPAN: f64 = 1e-6;

/// Percentile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty; `p` is in percent.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let last = sorted.len() - 1;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let below = rank.floor() as usize;
    let above = (below + 1).min(last);
    let frac = rank - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

/// Clip bounds used to stretch `data`. Collapses to `(min, max + 1e-6)` when
/// the percentile range is empty.
pub fn clip_range(data: ArrayView2<f32>, p_lo: f64, p_hi: f64) -> Option<(f64, f64)> {
    let mut sorted: Vec<f64> = data.iter().map(|&v| v as f64).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let lo = percentile(&sorted, p_lo);
    let hi = percentile(&sorted, p_hi);
    if hi > lo {
        return Some((lo, hi));
    }
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    Some((min, max + FALLBACK_SPAN))
}

/// Robust 8-bit stretch of a float grid.
pub fn to_uint8(data: ArrayView2<f32>, p_lo: f64, p_hi: f64) -> Array2<u8> {
    let Some((lo, hi)) = clip_range(data, p_lo, p_hi) else {
        return Array2::zeros(data.dim());
    };
    let span = hi - lo;
    data.mapv(|v| {
        let norm = ((v as f64 - lo) / span).clamp(0.0, 1.0);
        (norm * 255.0).round() as u8
    })
}

/// [`to_uint8`] with the default 1/99 percentiles.
pub fn to_uint8_default(data: ArrayView2<f32>) -> Array2<u8> {
    to_uint8(data, DEFAULT_LOW_PERCENTILE, DEFAULT_HIGH_PERCENTILE)
}
