//! Generation of noisy samples of a known function.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    grid::SampleGrid,
    noise::{NoiseSeed, NoiseSpec},
};

/// Built-in target functions.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr, derive_more::Display)]
pub enum TargetFunction {
    /// `f(x) = x`
    #[default]
    Linear,
    /// `f(x) = 2π sin(x)`
    Sine,
}

impl TargetFunction {
    #[must_use]
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Sine => TAU * x.sin(),
        }
    }

    /// Human-readable formula of the noisy model, e.g. `y = x + e`.
    #[must_use]
    pub fn formula(self) -> &'static str {
        match self {
            Self::Linear => "y = x + e",
            Self::Sine => "y = 2*pi*sin(x) + e",
        }
    }
}

/// Paired samples `y[i] = f(x[i]) + e[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSeries {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl GeneratedSeries {
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterates over `(x, y)` pairs in grid order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Values of the noiseless function at every `x`, for drawing the true curve.
    pub fn truth<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64,
    {
        self.x.iter().map(|&x| f(x)).collect()
    }

    /// The noise that was added at each point, `y - f(x)`.
    pub fn residuals<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64,
    {
        self.iter().map(|(x, y)| y - f(x)).collect()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }
}

/// Samples `f` on `grid` with additive noise drawn from `noise`.
///
/// With a seed, the series is fully reproducible. Without one, a seed is drawn from the
/// thread-local generator.
pub fn generate<F>(
    grid: &SampleGrid,
    noise: NoiseSpec,
    f: F,
    seed: Option<NoiseSeed>,
) -> GeneratedSeries
where
    F: Fn(f64) -> f64,
{
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::from_seed(seed.to_bytes());
    generate_with_rng(grid, noise, f, &mut rng)
}

/// Like [`generate`], but draws the noise from a caller-supplied generator.
///
/// Exactly one noise value is drawn per grid point, in grid order.
pub fn generate_with_rng<F, R>(
    grid: &SampleGrid,
    noise: NoiseSpec,
    f: F,
    rng: &mut R,
) -> GeneratedSeries
where
    F: Fn(f64) -> f64,
    R: Rng + ?Sized,
{
    let x = grid.to_vec();
    let y = x.iter().map(|&x| f(x) + rng.sample(noise)).collect();
    tracing::debug!(
        points = grid.len(),
        mean = noise.mean(),
        std_dev = noise.std_dev(),
        "generated noisy series"
    );
    GeneratedSeries { x, y }
}
