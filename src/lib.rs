pub mod artifacts;
pub mod config;
pub mod convert;
pub mod error;
pub mod gather;
pub mod grid;
pub mod pipeline;
pub mod raster;
pub mod reflectivity;
pub mod scaling;
pub mod segy;
pub mod velocity;
pub mod visualisation;
pub mod wavelet;

pub use error::{SynthError, SynthResult};
pub use gather::{synthesize_gather, GatherParams, ShotGather};
pub use grid::Grid;
pub use pipeline::Benchmark;
pub use velocity::{build_velocity, VelocityField};
