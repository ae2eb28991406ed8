//! Labelled samples and their grouping.
//!
//! A [`GroupedDataset`] is built once from raw `(label, value)` records. Groups are kept in
//! the order their label first appears in the input. That discovery order is the only
//! ordering used downstream: pairwise comparisons are enumerated in it and the sign of
//! each mean difference follows it.

use serde::Serialize;

use crate::{AnovaError, InsufficientDataError, descriptive::DescriptiveStats};

/// Observations belonging to one group, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    label: String,
    values: Vec<f64>,
}

impl Sample {
    #[must_use]
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        crate::descriptive::mean(&self.values)
    }

    /// Returns `true` if every observation equals the first one.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.values.split_first().is_none_or(|(first, rest)| rest.iter().all(|v| v == first))
    }

    /// Returns descriptive statistics for this group, or `None` if it is empty.
    #[must_use]
    pub fn summary(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.values.iter().copied())
    }
}

/// Groups of observations keyed by label, in first-appearance order.
///
/// # Invariants
///
/// - at least 2 groups
/// - every group holds at least 2 observations
/// - every observation is finite
///
/// # Example
///
/// ```
/// use owlstat_stats::dataset::GroupedDataset;
///
/// let dataset = GroupedDataset::from_pairs([
///     ("b", 1.0), ("a", 2.0), ("b", 3.0), ("a", 4.0),
/// ])?;
/// let labels: Vec<_> = dataset.labels().collect();
/// assert_eq!(labels, ["b", "a"]);
/// assert_eq!(dataset.total_count(), 4);
/// # Ok::<(), owlstat_stats::AnovaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedDataset {
    groups: Vec<Sample>,
}

impl GroupedDataset {
    /// Groups raw `(label, value)` records by label.
    ///
    /// Observations keep their input order within each group.
    pub fn from_pairs<I, L>(pairs: I) -> Result<Self, AnovaError>
    where
        I: IntoIterator<Item = (L, f64)>,
        L: AsRef<str>,
    {
        let mut groups: Vec<Sample> = vec![];
        for (label, value) in pairs {
            let label = label.as_ref();
            match groups.iter_mut().find(|g| g.label == label) {
                Some(group) => group.values.push(value),
                None => groups.push(Sample::new(label, vec![value])),
            }
        }
        Self::from_samples(groups)
    }

    /// Builds a dataset from already grouped samples.
    ///
    /// Samples sharing a label are merged into the first one.
    pub fn from_samples<I>(samples: I) -> Result<Self, AnovaError>
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut groups: Vec<Sample> = vec![];
        for sample in samples {
            match groups.iter_mut().find(|g| g.label == sample.label) {
                Some(group) => group.values.extend(sample.values),
                None => groups.push(sample),
            }
        }

        if let Some(group) = groups
            .iter()
            .find(|g| g.values.iter().any(|v| !v.is_finite()))
        {
            return Err(AnovaError::NonFiniteObservation {
                label: group.label.clone(),
            });
        }
        if groups.len() < 2 {
            return Err(InsufficientDataError::TooFewGroups {
                found: groups.len(),
            }
            .into());
        }
        if let Some(group) = groups.iter().find(|g| g.len() < 2) {
            return Err(InsufficientDataError::GroupTooSmall {
                label: group.label.clone(),
                size: group.len(),
            }
            .into());
        }

        Ok(Self { groups })
    }

    /// Returns the groups in discovery order.
    #[must_use]
    pub fn groups(&self) -> &[Sample] {
        &self.groups
    }

    /// Returns the group labels in discovery order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(Sample::label)
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Sample> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Number of groups (`K`).
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of observations across all groups (`N`).
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.groups.iter().map(Sample::len).sum()
    }

    /// Iterates over every observation, group by group.
    pub fn observations(&self) -> impl Iterator<Item = f64> + '_ {
        self.groups.iter().flat_map(|g| g.values.iter().copied())
    }
}
