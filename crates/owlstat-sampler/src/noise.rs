//! Gaussian noise parameters and seeds.

use std::fmt::Write as _;

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use rand_distr::StandardNormal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::InvalidNoiseError;

pub const DEFAULT_MEAN: f64 = 0.0;
pub const DEFAULT_STD_DEV: f64 = 3.0;

/// Normal distribution the additive noise is drawn from.
///
/// A standard deviation of zero is allowed and yields noise equal to the mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NoiseParams", into = "NoiseParams")]
pub struct NoiseSpec {
    mean: f64,
    std_dev: f64,
}

/// Unvalidated noise parameters, as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            mean: DEFAULT_MEAN,
            std_dev: DEFAULT_STD_DEV,
        }
    }
}

impl TryFrom<NoiseParams> for NoiseSpec {
    type Error = InvalidNoiseError;

    fn try_from(params: NoiseParams) -> Result<Self, Self::Error> {
        Self::new(params.mean, params.std_dev)
    }
}

impl From<NoiseSpec> for NoiseParams {
    fn from(spec: NoiseSpec) -> Self {
        Self {
            mean: spec.mean,
            std_dev: spec.std_dev,
        }
    }
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            mean: DEFAULT_MEAN,
            std_dev: DEFAULT_STD_DEV,
        }
    }
}

impl NoiseSpec {
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, InvalidNoiseError> {
        if !(mean.is_finite() && std_dev.is_finite()) {
            return Err(InvalidNoiseError::NonFinite);
        }
        if std_dev < 0.0 {
            return Err(InvalidNoiseError::NegativeStdDev { std_dev });
        }
        Ok(Self { mean, std_dev })
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

/// Draws one noise value: `mean + std_dev * z` with `z` standard normal.
impl Distribution<f64> for NoiseSpec {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.mean + self.std_dev * z
    }
}

/// Seed for deterministic noise generation.
///
/// A 128-bit seed for the noise generator. The same seed, grid, noise and function always
/// produce the same series. Serialized as a 32-character lowercase hex string.
///
/// # Example
///
/// ```
/// use owlstat_sampler::noise::NoiseSeed;
/// use rand::Rng as _;
///
/// let random: NoiseSeed = rand::rng().random();
/// let fixed = NoiseSeed::from(2_u64);
/// assert_eq!(fixed.to_string(), "00000000000000000000000000000002");
/// # let _ = random;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoiseSeed(pub(crate) [u8; 16]);

impl NoiseSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl From<u64> for NoiseSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl std::fmt::Display for NoiseSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl std::str::FromStr for NoiseSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for NoiseSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for NoiseSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `NoiseSeed` values with `rng.random()`.
impl Distribution<NoiseSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NoiseSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        NoiseSeed(seed)
    }
}
