//! One-way analysis of variance.
//!
//! The total variability of the observations around the grand mean is split into a
//! between-group part (group means around the grand mean, weighted by group size) and a
//! within-group part (observations around their own group mean):
//!
//! ```text
//! SS_total = SS_between + SS_within
//! F        = (SS_between / (K - 1)) / (SS_within / (N - K))
//! ```
//!
//! The p-value is the upper tail of the F distribution with `(K - 1, N - K)` degrees of
//! freedom evaluated at `F`.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF as _, FisherSnedecor};

use crate::{
    AnovaError,
    dataset::GroupedDataset,
    descriptive::{self, sum_of_squared_deviations},
};

/// Outcome of the F test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaResult {
    /// Ratio of the between-group to the within-group mean square. Never negative.
    pub f_statistic: f64,
    /// Probability of an F at least this large under equal means. In `[0, 1]`.
    pub p_value: f64,
}

/// Sum-of-squares decomposition of a grouped dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaTable {
    pub grand_mean: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    /// `K - 1`
    pub df_between: usize,
    /// `N - K`
    pub df_within: usize,
}

impl AnovaTable {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_dataset(dataset: &GroupedDataset) -> Self {
        let all = dataset.observations().collect::<Vec<_>>();
        let grand_mean = descriptive::mean(&all);

        let mut ss_between = 0.0;
        let mut ss_within = 0.0;
        for group in dataset.groups() {
            let group_mean = group.mean();
            ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
            // The mean of a constant group may be off by a rounding error.
            if !group.is_constant() {
                ss_within += sum_of_squared_deviations(group.values(), group_mean);
            }
        }

        let k = dataset.group_count();
        let n = dataset.total_count();
        Self {
            grand_mean,
            ss_between,
            ss_within,
            df_between: k - 1,
            df_within: n - k,
        }
    }

    #[must_use]
    pub fn ss_total(&self) -> f64 {
        self.ss_between + self.ss_within
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ms_between(&self) -> f64 {
        self.ss_between / self.df_between as f64
    }

    /// Pooled within-group variance estimate (mean squared error).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ms_within(&self) -> f64 {
        self.ss_within / self.df_within as f64
    }

    /// Returns `true` if every group is constant, leaving no within-group variability.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.ss_within == 0.0
    }

    /// Runs the F test on this decomposition.
    #[expect(clippy::cast_precision_loss)]
    pub fn test(&self) -> Result<AnovaResult, AnovaError> {
        if self.is_degenerate() {
            return Err(AnovaError::DegenerateVariance);
        }
        let f_statistic = self.ms_between() / self.ms_within();
        let dist = FisherSnedecor::new(self.df_between as f64, self.df_within as f64).map_err(
            |_| AnovaError::InvalidDegreesOfFreedom {
                df_between: self.df_between,
                df_within: self.df_within,
            },
        )?;
        let p_value = dist.sf(f_statistic).clamp(0.0, 1.0);
        Ok(AnovaResult {
            f_statistic,
            p_value,
        })
    }
}

/// Tests whether the group means of `dataset` differ.
///
/// # Errors
///
/// [`AnovaError::DegenerateVariance`] if every group is constant, so that the within-group
/// sum of squares is zero.
pub fn one_way_anova(dataset: &GroupedDataset) -> Result<AnovaResult, AnovaError> {
    let table = AnovaTable::from_dataset(dataset);
    let result = table.test()?;
    tracing::debug!(
        groups = dataset.group_count(),
        observations = dataset.total_count(),
        ss_between = table.ss_between,
        ss_within = table.ss_within,
        f = result.f_statistic,
        p = result.p_value,
        "one-way ANOVA"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archers() -> GroupedDataset {
        GroupedDataset::from_pairs([
            ("Pat", 5.0),
            ("Pat", 4.0),
            ("Pat", 4.0),
            ("Pat", 3.0),
            ("Pat", 9.0),
            ("Pat", 4.0),
            ("Jack", 4.0),
            ("Jack", 8.0),
            ("Jack", 7.0),
            ("Jack", 5.0),
            ("Jack", 1.0),
            ("Jack", 5.0),
            ("Alex", 9.0),
            ("Alex", 8.0),
            ("Alex", 8.0),
            ("Alex", 10.0),
            ("Alex", 5.0),
            ("Alex", 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_archers_table() {
        let table = AnovaTable::from_dataset(&archers());
        assert!((table.grand_mean - 109.0 / 18.0).abs() < 1e-12);
        assert!((table.ss_between - 46.777_777_777_777_8).abs() < 1e-9);
        assert!((table.ss_within - 70.166_666_666_666_7).abs() < 1e-9);
        assert_eq!(table.df_between, 2);
        assert_eq!(table.df_within, 15);
    }

    #[test]
    fn test_archers_f_test() {
        let result = one_way_anova(&archers()).unwrap();
        assert!((result.f_statistic - 5.0).abs() < 1e-9);
        // F(2, n) has a closed-form tail: (n / (n + 2F))^(n / 2).
        let expected_p = 0.6_f64.powf(7.5);
        assert!((result.p_value - expected_p).abs() < 1e-8);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_sum_of_squares_decomposition() {
        let dataset = GroupedDataset::from_pairs([
            ("a", 1.5),
            ("a", -2.25),
            ("a", 7.0),
            ("b", 3.0),
            ("b", 3.5),
            ("c", 10.0),
            ("c", 11.0),
            ("c", 9.5),
            ("c", 12.25),
        ])
        .unwrap();
        let table = AnovaTable::from_dataset(&dataset);
        let all = dataset.observations().collect::<Vec<_>>();
        let ss_total = sum_of_squared_deviations(&all, table.grand_mean);
        assert!((table.ss_total() - ss_total).abs() < 1e-9 * ss_total.max(1.0));
    }

    #[test]
    fn test_identical_groups_are_degenerate() {
        let dataset = GroupedDataset::from_pairs(
            ["a", "b", "c"]
                .into_iter()
                .flat_map(|label| std::iter::repeat_n((label, 5.0), 4)),
        )
        .unwrap();
        assert_eq!(one_way_anova(&dataset), Err(AnovaError::DegenerateVariance));
    }

    #[test]
    fn test_constant_groups_with_different_means_are_degenerate() {
        let dataset =
            GroupedDataset::from_pairs([("a", 1.0), ("a", 1.0), ("b", 2.0), ("b", 2.0)]).unwrap();
        assert_eq!(one_way_anova(&dataset), Err(AnovaError::DegenerateVariance));
    }

    #[test]
    fn test_inexact_constant_groups_are_degenerate() {
        // 0.1 has no exact binary form, so the group means carry a rounding error.
        let dataset = GroupedDataset::from_pairs(
            std::iter::repeat_n(("a", 0.1), 3).chain(std::iter::repeat_n(("b", 0.2), 3)),
        )
        .unwrap();
        let table = AnovaTable::from_dataset(&dataset);
        assert_eq!(table.ss_within, 0.0);
        assert!(table.ss_between > 0.0);
        assert_eq!(one_way_anova(&dataset), Err(AnovaError::DegenerateVariance));

        let dataset = GroupedDataset::from_pairs(
            std::iter::repeat_n(("a", 0.1), 3).chain(std::iter::repeat_n(("b", 0.7), 3)),
        )
        .unwrap();
        assert_eq!(one_way_anova(&dataset), Err(AnovaError::DegenerateVariance));
    }

    #[test]
    fn test_one_constant_group_still_counts_the_others() {
        let dataset = GroupedDataset::from_pairs([
            ("a", 0.1),
            ("a", 0.1),
            ("a", 0.1),
            ("b", 1.0),
            ("b", 3.0),
        ])
        .unwrap();
        let table = AnovaTable::from_dataset(&dataset);
        assert!((table.ss_within - 2.0).abs() < 1e-12);
        assert!(one_way_anova(&dataset).is_ok());
    }

    #[test]
    fn test_zero_residual_df_is_reported() {
        let table = AnovaTable {
            grand_mean: 0.0,
            ss_between: 1.0,
            ss_within: 1.0,
            df_between: 1,
            df_within: 0,
        };
        assert_eq!(
            table.test(),
            Err(AnovaError::InvalidDegreesOfFreedom {
                df_between: 1,
                df_within: 0,
            })
        );
    }

    #[test]
    fn test_equal_means_give_zero_f() {
        let dataset =
            GroupedDataset::from_pairs([("a", 1.0), ("a", 3.0), ("b", 0.0), ("b", 4.0)]).unwrap();
        let result = one_way_anova(&dataset).unwrap();
        assert_eq!(result.f_statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_p_value_decreases_as_f_increases() {
        // Same group sizes (same degrees of freedom), increasing separation of the means.
        let mut prev_f = -1.0;
        let mut prev_p = 2.0;
        for shift in [0.0, 0.5, 1.0, 2.0, 4.0, 8.0] {
            let dataset = GroupedDataset::from_pairs([
                ("a", 1.0),
                ("a", 2.0),
                ("a", 3.0),
                ("b", 1.0 + shift),
                ("b", 2.0 + shift),
                ("b", 3.0 + shift),
            ])
            .unwrap();
            let result = one_way_anova(&dataset).unwrap();
            assert!(result.f_statistic >= 0.0);
            assert!((0.0..=1.0).contains(&result.p_value));
            assert!(result.f_statistic > prev_f);
            assert!(result.p_value < prev_p);
            prev_f = result.f_statistic;
            prev_p = result.p_value;
        }
    }
}
