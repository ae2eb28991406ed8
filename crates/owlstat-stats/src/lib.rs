//! One-way analysis of variance with Tukey's HSD post-hoc comparison.
//!
//! This crate provides:
//!
//! - **Grouped data**: [`dataset::GroupedDataset`] built from raw `(label, value)` pairs,
//!   with groups kept in first-appearance order
//! - **Descriptive statistics**: per-group mean, variance, standard deviation, etc.
//! - **One-way ANOVA**: sum-of-squares decomposition, F statistic and p-value
//! - **Studentized range distribution**: CDF and quantiles used for Tukey's procedure
//! - **Tukey HSD**: all-pairs mean comparison controlling the family-wise error rate
//!
//! # Modules
//!
//! - [`dataset`]: Labelled samples and the grouped dataset
//! - [`descriptive`]: Descriptive statistics for summarizing a group
//! - [`anova`]: One-way ANOVA table and F test
//! - [`studentized_range`]: Distribution of the studentized range statistic
//! - [`tukey`]: Tukey-Kramer honestly significant difference test
//!
//! # Example
//!
//! ```
//! use owlstat_stats::{anova, dataset::GroupedDataset, tukey};
//!
//! let dataset = GroupedDataset::from_pairs([
//!     ("Pat", 5.0), ("Pat", 4.0), ("Pat", 4.0), ("Pat", 3.0), ("Pat", 9.0), ("Pat", 4.0),
//!     ("Jack", 4.0), ("Jack", 8.0), ("Jack", 7.0), ("Jack", 5.0), ("Jack", 1.0), ("Jack", 5.0),
//!     ("Alex", 9.0), ("Alex", 8.0), ("Alex", 8.0), ("Alex", 10.0), ("Alex", 5.0), ("Alex", 10.0),
//! ])?;
//!
//! let result = anova::one_way_anova(&dataset)?;
//! assert!((result.f_statistic - 5.0).abs() < 1e-9);
//! assert!(result.p_value < 0.05);
//!
//! let comparisons = tukey::pairwise_tukey_hsd(&dataset, 0.05)?;
//! assert_eq!(comparisons.len(), 3);
//! assert!(comparisons.find("Jack", "Alex").unwrap().reject);
//! # Ok::<(), owlstat_stats::AnovaError>(())
//! ```

pub mod anova;
pub mod dataset;
pub mod descriptive;
pub mod studentized_range;
pub mod tukey;

/// The dataset does not have enough groups or observations for variance analysis.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InsufficientDataError {
    #[display("at least 2 groups are required, found {found}")]
    TooFewGroups { found: usize },
    #[display("group '{label}' has {size} observation(s), at least 2 are required")]
    GroupTooSmall { label: String, size: usize },
}

/// Errors raised by the ANOVA and Tukey HSD computations.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnovaError {
    #[display("insufficient data: {_0}")]
    InsufficientData(InsufficientDataError),
    #[display("group '{label}' contains a non-finite observation")]
    NonFiniteObservation { label: String },
    #[display("within-group variance is zero, F statistic is undefined")]
    DegenerateVariance,
    #[display("invalid degrees of freedom ({df_between}, {df_within})")]
    InvalidDegreesOfFreedom {
        df_between: usize,
        df_within: usize,
    },
    #[display("family error rate must be in (0, 1), got {rate}")]
    InvalidFamilyErrorRate { rate: f64 },
}

impl From<InsufficientDataError> for AnovaError {
    fn from(err: InsufficientDataError) -> Self {
        Self::InsufficientData(err)
    }
}
