//! Tukey's honestly significant difference test.
//!
//! Every pair of group means is compared at once. The confidence intervals and the
//! adjusted p-values come from the studentized range distribution for `K` groups and
//! `N - K` degrees of freedom, so the probability of at least one false rejection across
//! all `K (K - 1) / 2` comparisons stays at the requested family error rate. Unequal group
//! sizes use the Tukey-Kramer standard error.
//!
//! # Ordering
//!
//! Pairs are enumerated in group discovery order: `(0, 1), (0, 2), …, (1, 2), …`. Within
//! a pair, `group_a` is the earlier-discovered group and the reported difference is
//! `mean(group_b) - mean(group_a)`.

use serde::{Deserialize, Serialize};

use crate::{
    AnovaError,
    anova::AnovaTable,
    dataset::GroupedDataset,
    studentized_range::StudentizedRange,
};

/// Default family-wise error rate.
pub const DEFAULT_FAMILY_ERROR_RATE: f64 = 0.05;

/// Parameters of the pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TukeyConfig {
    /// Probability of at least one false rejection across all comparisons.
    pub family_error_rate: f64,
}

impl Default for TukeyConfig {
    fn default() -> Self {
        Self {
            family_error_rate: DEFAULT_FAMILY_ERROR_RATE,
        }
    }
}

impl TukeyConfig {
    pub fn compare(&self, dataset: &GroupedDataset) -> Result<PairwiseComparisonSet, AnovaError> {
        pairwise_tukey_hsd(dataset, self.family_error_rate)
    }
}

/// Comparison of one pair of group means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    /// Earlier-discovered group.
    pub group_a: String,
    /// Later-discovered group.
    pub group_b: String,
    /// `mean(group_b) - mean(group_a)`.
    pub mean_diff: f64,
    /// Lower bound of the simultaneous confidence interval for the difference.
    pub lower: f64,
    /// Upper bound of the simultaneous confidence interval for the difference.
    pub upper: f64,
    /// Whether the difference is significant at the family error rate.
    pub reject: bool,
    /// Family-wise adjusted p-value.
    pub p_adjusted: f64,
}

/// All pairwise comparisons of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparisonSet {
    /// Unique group labels in discovery order.
    pub groups: Vec<String>,
    pub comparisons: Vec<PairwiseComparison>,
    pub family_error_rate: f64,
    /// Critical value of the studentized range at `1 - family_error_rate`.
    pub q_crit: f64,
    /// Pooled within-group variance the standard errors are based on.
    pub ms_within: f64,
    pub df_within: usize,
}

impl PairwiseComparisonSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairwiseComparison> + '_ {
        self.comparisons.iter()
    }

    /// Finds the comparison of two groups, in either order.
    #[must_use]
    pub fn find(&self, a: &str, b: &str) -> Option<&PairwiseComparison> {
        self.comparisons.iter().find(|c| {
            (c.group_a == a && c.group_b == b) || (c.group_a == b && c.group_b == a)
        })
    }

    /// Comparisons whose null hypothesis of equal means is rejected.
    pub fn significant(&self) -> impl Iterator<Item = &PairwiseComparison> + '_ {
        self.comparisons.iter().filter(|c| c.reject)
    }
}

impl<'a> IntoIterator for &'a PairwiseComparisonSet {
    type Item = &'a PairwiseComparison;
    type IntoIter = std::slice::Iter<'a, PairwiseComparison>;

    fn into_iter(self) -> Self::IntoIter {
        self.comparisons.iter()
    }
}

/// Compares every pair of group means with Tukey's HSD procedure.
///
/// # Errors
///
/// - [`AnovaError::InvalidFamilyErrorRate`] unless `0 < family_error_rate < 1`
/// - [`AnovaError::DegenerateVariance`] if the within-group variance is zero
///
/// # Example
///
/// ```
/// use owlstat_stats::{dataset::GroupedDataset, tukey::pairwise_tukey_hsd};
///
/// let dataset = GroupedDataset::from_pairs([
///     ("a", 1.0), ("a", 2.0), ("a", 3.0),
///     ("b", 1.5), ("b", 2.5), ("b", 3.5),
///     ("c", 9.0), ("c", 10.0), ("c", 11.0),
/// ])?;
/// let set = pairwise_tukey_hsd(&dataset, 0.05)?;
/// let significant: Vec<_> = set
///     .significant()
///     .map(|c| (c.group_a.as_str(), c.group_b.as_str()))
///     .collect();
/// assert_eq!(significant, [("a", "c"), ("b", "c")]);
/// # Ok::<(), owlstat_stats::AnovaError>(())
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn pairwise_tukey_hsd(
    dataset: &GroupedDataset,
    family_error_rate: f64,
) -> Result<PairwiseComparisonSet, AnovaError> {
    if !(family_error_rate > 0.0 && family_error_rate < 1.0) {
        return Err(AnovaError::InvalidFamilyErrorRate {
            rate: family_error_rate,
        });
    }

    let table = AnovaTable::from_dataset(dataset);
    if table.is_degenerate() {
        return Err(AnovaError::DegenerateVariance);
    }
    let ms_within = table.ms_within();
    let dist = StudentizedRange::new(dataset.group_count(), table.df_within as f64).map_err(
        |_| AnovaError::InvalidDegreesOfFreedom {
            df_between: table.df_between,
            df_within: table.df_within,
        },
    )?;
    let q_crit = dist.inverse_cdf(1.0 - family_error_rate);

    let groups = dataset.groups();
    let means = groups.iter().map(|g| g.mean()).collect::<Vec<_>>();
    let mut comparisons = Vec::with_capacity(groups.len() * (groups.len() - 1) / 2);
    for (i, a) in groups.iter().enumerate() {
        for (j, b) in groups.iter().enumerate().skip(i + 1) {
            let mean_diff = means[j] - means[i];
            let std_err =
                (ms_within / 2.0 * (1.0 / a.len() as f64 + 1.0 / b.len() as f64)).sqrt();
            let margin = q_crit * std_err;
            comparisons.push(PairwiseComparison {
                group_a: a.label().to_owned(),
                group_b: b.label().to_owned(),
                mean_diff,
                lower: mean_diff - margin,
                upper: mean_diff + margin,
                reject: mean_diff.abs() > margin,
                p_adjusted: dist.sf(mean_diff.abs() / std_err),
            });
        }
    }

    tracing::debug!(
        groups = groups.len(),
        comparisons = comparisons.len(),
        q_crit,
        family_error_rate,
        "Tukey HSD"
    );

    Ok(PairwiseComparisonSet {
        groups: dataset.labels().map(str::to_owned).collect(),
        comparisons,
        family_error_rate,
        q_crit,
        ms_within,
        df_within: table.df_within,
    })
}
