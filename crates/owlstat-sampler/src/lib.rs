//! Synthetic data with a known underlying regularity.
//!
//! Generates `(x, y)` pairs where `y = f(x) + e`, `x` runs over an evenly spaced grid and
//! `e` is independent Gaussian noise. Useful for studying regression and visualization
//! against a known ground truth.
//!
//! # Modules
//!
//! - [`grid`]: Half-open, evenly spaced sample grid
//! - [`noise`]: Gaussian noise parameters and seeds
//! - [`sampler`]: Series generation and the built-in target functions
//!
//! # Example
//!
//! ```
//! use owlstat_sampler::{
//!     grid::SampleGrid,
//!     noise::{NoiseSeed, NoiseSpec},
//!     sampler::{self, TargetFunction},
//! };
//!
//! let grid = SampleGrid::default(); // [-10, 10) step 0.5
//! let noise = NoiseSpec::default(); // N(0, 3)
//! let f = TargetFunction::Sine;
//!
//! let series = sampler::generate(&grid, noise, |x| f.eval(x), Some(NoiseSeed::from(2_u64)));
//! assert_eq!(series.len(), 40);
//! assert_eq!(series.x()[0], -10.0);
//! ```

pub mod grid;
pub mod noise;
pub mod sampler;

/// The grid parameters do not describe a finite, non-empty set of points.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidGridError {
    #[display("grid bounds and step must be finite")]
    NonFinite,
    #[display("grid step must be positive, got {step}")]
    NonPositiveStep { step: f64 },
    #[display("grid interval [{start}, {stop}) is empty")]
    EmptyInterval { start: f64, stop: f64 },
    #[display("grid would contain too many points ({count})")]
    TooManyPoints { count: f64 },
}

/// The noise parameters do not describe a normal distribution.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidNoiseError {
    #[display("noise mean and standard deviation must be finite")]
    NonFinite,
    #[display("noise standard deviation must not be negative, got {std_dev}")]
    NegativeStdDev { std_dev: f64 },
}
