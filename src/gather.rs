use crate::error::{SynthError, SynthResult};
use crate::reflectivity::reflectivity_proxy;
use crate::velocity::{seeded_rng, VelocityField};
use crate::wavelet::ricker;
use ndarray::{s, Array2, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use tracing::info;

pub const MIN_RECEIVERS: usize = 24;
/// Narrowest model that still has a receiver column at `nx - 3`.
pub const MIN_GATHER_WIDTH: usize = 3;

// The noise stream is fixed, so every model seed shares the same noise realisation
pub const GATHER_NOISE_SEED: u64 = 123;
const NOISE_AMPLITUDE: f32 = 0.02;
const MIN_REFLECTION: f32 = 0.04;
const VELOCITY_FLOOR: f64 = 1200.0;
const FIRST_REFLECTOR_ROW: usize = 6;

#[derive(Clone, Copy, Debug)]
pub struct GatherParams {
    pub nt: usize, // Samples per trace
    pub dt: f64,   // Sample interval (s)
    pub f0: f64,   // Dominant source frequency (Hz)
}

impl GatherParams {
    pub fn validate(&self) -> SynthResult<()> {
        if self.nt == 0 {
            return Err(SynthError::InvalidParameter("nt must be positive".into()));
        }
        if !(self.dt > 0.0) || !(self.f0 > 0.0) {
            return Err(SynthError::InvalidParameter(format!(
                "dt and f0 must be positive (dt={}, f0={})",
                self.dt, self.f0
            )));
        }
        Ok(())
    }
}

/// Surface spread over a model: one shot near the top centre, receivers
/// from column 2 at a fixed column step.
#[derive(Clone, Debug)]
pub struct Acquisition {
    pub shot_ix: usize,
    pub shot_iz: usize,
    pub receiver_step: usize,
    pub receiver_ix: Vec<usize>,
}

impl Acquisition {
    pub fn for_width(nx: usize) -> Self {
        let n_receivers = receiver_count(nx);
        let receiver_step = (nx.saturating_sub(4) / n_receivers).max(1);
        let last = nx.saturating_sub(3);
        let receiver_ix = (0..n_receivers)
            .map(|i| (2 + i * receiver_step).min(last))
            .collect();
        Self {
            shot_ix: nx / 2,
            shot_iz: 2,
            receiver_step,
            receiver_ix,
        }
    }
}

pub fn receiver_count(nx: usize) -> usize {
    MIN_RECEIVERS.max(nx / 2)
}

/// Physical layout recorded alongside the traces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GatherGeometry {
    pub shot_x: f64,
    pub shot_z: f64,
    pub receiver_x0: f64,
    pub receiver_dx: f64,
}

impl GatherGeometry {
    pub fn receiver_x(&self, trace: usize) -> f64 {
        self.receiver_x0 + trace as f64 * self.receiver_dx
    }
}

/// Receiver recordings of one shot, `[n_receivers][nt]`.
#[derive(Clone, Debug)]
pub struct ShotGather {
    pub traces: Array2<f32>,
    pub dt: f64,
    pub geometry: GatherGeometry,
}

impl ShotGather {
    pub fn from_traces(traces: Array2<f32>, dt: f64, geometry: GatherGeometry) -> Self {
        Self { traces, dt, geometry }
    }

    pub fn n_receivers(&self) -> usize {
        self.traces.nrows()
    }

    pub fn nt(&self) -> usize {
        self.traces.ncols()
    }
}

/// Single-scattering proxy gather: every sufficiently strong reflector row
/// contributes a wavelet at its hyperbolic two-way time.
pub fn synthesize_gather(field: &VelocityField, params: &GatherParams) -> SynthResult<ShotGather> {
    params.validate()?;
    let grid = field.grid;
    let (nx, nz) = (grid.nx, grid.nz);
    if nx < MIN_GATHER_WIDTH {
        return Err(SynthError::InvalidParameter(format!(
            "gather needs a model at least {} cells wide (nx={})",
            MIN_GATHER_WIDTH, nx
        )));
    }
    let acq = Acquisition::for_width(nx);

    let wavelet = ricker(params.nt, params.dt, params.f0);
    let proxy = reflectivity_proxy(field);
    let depth_step = (nz / 40).max(2);
    let reflector_rows: Vec<usize> = (FIRST_REFLECTOR_ROW..nz.saturating_sub(4))
        .step_by(depth_step)
        .collect();

    let ctx = TraceContext {
        vel: field.values.view(),
        proxy: proxy.view(),
        wavelet: &wavelet,
        reflector_rows: &reflector_rows,
        shot_ix: acq.shot_ix,
        dx: grid.dx,
        dz: grid.dz,
        nt: params.nt,
        dt: params.dt,
    };

    // No random draws per trace, so the parallel result equals a serial run
    let rows: Vec<Vec<f32>> = acq
        .receiver_ix
        .par_iter()
        .map(|&rx| ctx.trace_for(rx))
        .collect();

    let mut traces = Array2::<f32>::zeros((rows.len(), params.nt));
    for (mut dst, src) in traces.outer_iter_mut().zip(&rows) {
        dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s);
    }

    apply_time_gain(&mut traces);
    add_noise(&mut traces);

    let geometry = GatherGeometry {
        shot_x: acq.shot_ix as f64 * grid.dx,
        shot_z: acq.shot_iz as f64 * grid.dz,
        receiver_x0: acq.receiver_ix[0] as f64 * grid.dx,
        receiver_dx: acq.receiver_step as f64 * grid.dx,
    };
    info!(
        receivers = traces.nrows(),
        nt = params.nt,
        reflector_rows = reflector_rows.len(),
        "synthesized shot gather"
    );
    Ok(ShotGather::from_traces(traces, params.dt, geometry))
}

struct TraceContext<'a> {
    vel: ArrayView2<'a, f32>,
    proxy: ArrayView2<'a, f32>,
    wavelet: &'a [f32],
    reflector_rows: &'a [usize],
    shot_ix: usize,
    dx: f64,
    dz: f64,
    nt: usize,
    dt: f64,
}

impl TraceContext<'_> {
    fn trace_for(&self, rx: usize) -> Vec<f32> {
        let nx = self.vel.ncols();
        let offset = rx.abs_diff(self.shot_ix) as f64 * self.dx;
        let mid = ((rx + self.shot_ix) / 2).min(nx - 1);
        let mut trace = vec![0.0_f32; self.nt];

        for &iz in self.reflector_rows {
            let refl = self.proxy[[iz, mid]];
            if refl.abs() < MIN_REFLECTION {
                continue;
            }
            let vm = self.local_velocity(iz, rx).max(VELOCITY_FLOOR);
            let depth = iz as f64 * self.dz;
            let half_offset = 0.5 * offset;
            let twt = 2.0 * (depth * depth + half_offset * half_offset).sqrt() / vm;
            let it0 = (twt / self.dt).round_ties_even() as usize;
            if it0 >= self.nt {
                continue;
            }
            let len = (self.nt - it0).min(self.wavelet.len());
            trace[it0..it0 + len]
                .iter_mut()
                .zip(&self.wavelet[..len])
                .for_each(|(t, &w)| *t += refl * w);
        }
        trace
    }

    // Mean over rows iz-2..iz+2 and the columns between receiver and shot, padded by 2
    fn local_velocity(&self, iz: usize, rx: usize) -> f64 {
        let (nz, nx) = self.vel.dim();
        let (lo, hi) = (rx.min(self.shot_ix), rx.max(self.shot_ix));
        let r0 = iz.saturating_sub(2).max(1);
        let r1 = (iz + 2).min(nz);
        let c0 = lo.saturating_sub(2).max(1);
        let c1 = (hi + 2).min(nx - 1);
        let window = self.vel.slice(s![r0..r1, c0..c1]);
        if window.is_empty() {
            return self.vel[[iz, rx]] as f64;
        }
        window.iter().map(|&v| v as f64).sum::<f64>() / window.len() as f64
    }
}

/// Linear ramp from 1.0 at the first sample to 1.5 at the last.
pub fn apply_time_gain(traces: &mut Array2<f32>) {
    let nt = traces.ncols();
    let denom = nt.saturating_sub(1).max(1) as f32;
    for mut row in traces.outer_iter_mut() {
        for (it, v) in row.iter_mut().enumerate() {
            *v *= 1.0 + 0.5 * (it as f32 / denom);
        }
    }
}

fn add_noise(traces: &mut Array2<f32>) {
    let mut rng = seeded_rng(GATHER_NOISE_SEED);
    for v in traces.iter_mut() {
        let n: f64 = rng.sample(StandardNormal);
        *v += NOISE_AMPLITUDE * n as f32;
    }
}
