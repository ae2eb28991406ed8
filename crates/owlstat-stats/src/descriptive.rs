use serde::Serialize;

/// Descriptive statistics summarizing one group of observations.
///
/// Dispersion is reported as the unbiased sample estimate (divisor `n - 1`),
/// which is the estimate the variance analysis builds on.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    /// Number of observations.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
    /// The median value of the dataset (upper middle element for even counts).
    pub median: f64,
    /// Sample variance with divisor `n - 1`. Zero for a single observation.
    pub variance: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use owlstat_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 4.0, 4.0, 3.0, 9.0, 4.0]).unwrap();
    /// assert_eq!(stats.count, 6);
    /// assert_eq!(stats.min, 3.0);
    /// assert_eq!(stats.max, 9.0);
    /// assert!((stats.mean - 29.0 / 6.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let mean = sorted_values.iter().sum::<f64>() / count as f64;
        let median = sorted_values[count / 2];
        let variance = if count > 1 {
            sum_of_squared_deviations(sorted_values, mean) / (count - 1) as f64
        } else {
            0.0
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Arithmetic mean. Returns `NaN` for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations of `values` around `center`.
#[must_use]
pub fn sum_of_squared_deviations(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).powi(2)).sum()
}
