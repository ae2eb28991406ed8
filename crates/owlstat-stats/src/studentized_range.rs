//! Distribution of the studentized range statistic.
//!
//! For `k` independent standard normal variables and an independent estimate `s` of their
//! standard deviation with `ν` degrees of freedom, the studentized range is
//! `q = (max - min) / s`. Its quantiles are the critical values of Tukey's HSD procedure.
//!
//! The CDF is computed by numerical integration (Copenhaver & Holland, 1988):
//!
//! - the inner integral gives the CDF of the range of `k` normals for known variance,
//!   integrated with a 12-point Gauss-Legendre rule over a few sub-intervals
//! - the outer integral averages it over the chi distribution of `s`, integrated with a
//!   16-point Gauss-Legendre rule over consecutive intervals until the contribution vanishes
//!
//! Quantiles are found by secant iteration started from a closed-form approximation.

use statrs::function::{erf::erfc, gamma::ln_gamma};

/// Invalid parameters for [`StudentizedRange`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidParameterError {
    #[display("number of groups must be at least 2, got {groups}")]
    TooFewGroups { groups: usize },
    #[display("degrees of freedom must be a finite number >= 1, got {df}")]
    InvalidDegreesOfFreedom { df: f64 },
}

/// Studentized range distribution for `groups` means and `df` degrees of freedom.
///
/// # Example
///
/// ```
/// use owlstat_stats::studentized_range::StudentizedRange;
///
/// let dist = StudentizedRange::new(3, 15.0)?;
/// let q_crit = dist.inverse_cdf(0.95);
/// assert!((q_crit - 3.673).abs() < 1e-3);
/// assert!((dist.cdf(q_crit) - 0.95).abs() < 1e-4);
/// # Ok::<(), owlstat_stats::studentized_range::InvalidParameterError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentizedRange {
    groups: usize,
    df: f64,
}

// Inner (range) integral.
const RANGE_LEGENDRE_NODES: [f64; 6] = [
    0.981_560_634_246_719_3,
    0.904_117_256_370_474_9,
    0.769_902_674_194_304_7,
    0.587_317_954_286_617_4,
    0.367_831_498_998_180_2,
    0.125_233_408_511_468_9,
];
const RANGE_LEGENDRE_WEIGHTS: [f64; 6] = [
    0.047_175_336_386_511_83,
    0.106_939_325_995_318_43,
    0.160_078_328_543_346_23,
    0.203_167_426_723_065_92,
    0.233_492_536_538_354_8,
    0.249_147_045_813_402_8,
];
const RANGE_UPPER_BOUND: f64 = 8.0;
const RANGE_EXPONENT_CUTOFF: f64 = 60.0;
const RANGE_LOG_UNDERFLOW: f64 = -30.0;
const RANGE_WIDE_THRESHOLD: f64 = 3.0;

// Outer (chi) integral.
const CHI_LEGENDRE_NODES: [f64; 8] = [
    0.989_400_934_991_649_9,
    0.944_575_023_073_232_6,
    0.865_631_202_387_831_7,
    0.755_404_408_355_003,
    0.617_876_244_402_643_7,
    0.458_016_777_657_227_4,
    0.281_603_550_779_258_9,
    0.095_012_509_837_637_44,
];
const CHI_LEGENDRE_WEIGHTS: [f64; 8] = [
    0.027_152_459_411_754_095,
    0.062_253_523_938_647_89,
    0.095_158_511_682_492_78,
    0.124_628_971_255_533_87,
    0.149_595_988_816_576_73,
    0.169_156_519_395_002_54,
    0.182_603_415_044_923_6,
    0.189_450_610_455_068_5,
];
const CHI_MAX_INTERVALS: u32 = 50;
const CHI_LOG_UNDERFLOW: f64 = -30.0;
const CHI_CONVERGED: f64 = 1e-14;
/// Above this many degrees of freedom the variance is treated as known.
const LARGE_DF: f64 = 25_000.0;

const QUANTILE_TOLERANCE: f64 = 1e-4;
const QUANTILE_MAX_ITER: u32 = 50;

impl StudentizedRange {
    pub fn new(groups: usize, df: f64) -> Result<Self, InvalidParameterError> {
        if groups < 2 {
            return Err(InvalidParameterError::TooFewGroups { groups });
        }
        if !df.is_finite() || df < 1.0 {
            return Err(InvalidParameterError::InvalidDegreesOfFreedom { df });
        }
        Ok(Self { groups, df })
    }

    #[must_use]
    pub fn groups(&self) -> usize {
        self.groups
    }

    #[must_use]
    pub fn df(&self) -> f64 {
        self.df
    }

    /// `P(Q <= q)`.
    #[must_use]
    pub fn cdf(&self, q: f64) -> f64 {
        if q.is_nan() {
            return f64::NAN;
        }
        if q <= 0.0 {
            return 0.0;
        }
        if q.is_infinite() {
            return 1.0;
        }
        if self.df > LARGE_DF {
            return self.range_cdf(q);
        }
        self.chi_integral(q)
    }

    /// `P(Q > q)`.
    #[must_use]
    pub fn sf(&self, q: f64) -> f64 {
        (1.0 - self.cdf(q)).clamp(0.0, 1.0)
    }

    /// Returns `q` such that `cdf(q) == p`, to within an absolute tolerance of `1e-4` in `q`.
    ///
    /// Returns `0.0` for `p <= 0`, infinity for `p >= 1` and `NaN` for a `NaN` input.
    #[must_use]
    pub fn inverse_cdf(&self, p: f64) -> f64 {
        if p.is_nan() {
            return f64::NAN;
        }
        if p <= 0.0 {
            return 0.0;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }

        let mut x0 = self.initial_quantile(p);
        let mut val0 = self.cdf(x0) - p;
        let mut x1 = if val0 > 0.0 {
            f64::max(0.0, x0 - 1.0)
        } else {
            x0 + 1.0
        };
        let mut val1 = self.cdf(x1) - p;

        for _ in 1..QUANTILE_MAX_ITER {
            let mut next = x1 - (val1 * (x1 - x0)) / (val1 - val0);
            val0 = val1;
            x0 = x1;
            if next < 0.0 {
                next = 0.0;
            }
            val1 = self.cdf(next) - p;
            x1 = next;
            if (x1 - x0).abs() < QUANTILE_TOLERANCE {
                return x1;
            }
        }
        tracing::warn!(
            groups = self.groups,
            df = self.df,
            p,
            "studentized range quantile iteration did not converge"
        );
        x1
    }

    /// Outer integral over the distribution of the pooled standard deviation.
    fn chi_integral(&self, q: f64) -> f64 {
        let df = self.df;
        let half_df = df * 0.5;
        let interval_len = if df <= 100.0 {
            1.0
        } else if df <= 800.0 {
            0.5
        } else if df <= 5000.0 {
            0.25
        } else {
            0.125
        };
        let log_norm = half_df * df.ln() - df * std::f64::consts::LN_2 - ln_gamma(half_df)
            + f64::ln(interval_len);
        let exponent = half_df - 1.0;
        let quarter_df = df * 0.25;

        let mut total = 0.0;
        let mut interval_sum = 0.0;
        for i in 1..=CHI_MAX_INTERVALS {
            interval_sum = 0.0;
            let center = f64::from(2 * i - 1) * interval_len;
            for (&node, &weight) in CHI_LEGENDRE_NODES.iter().zip(&CHI_LEGENDRE_WEIGHTS) {
                let offset = node * interval_len;
                for u in [center - offset, center + offset] {
                    let log_term = log_norm + exponent * u.ln() - u * quarter_df;
                    if log_term >= CHI_LOG_UNDERFLOW {
                        let w = q * (u * 0.5).sqrt();
                        interval_sum += self.range_cdf(w) * weight * log_term.exp();
                    }
                }
            }
            if f64::from(i) * interval_len >= 1.0 && interval_sum <= CHI_CONVERGED {
                break;
            }
            total += interval_sum;
        }
        if interval_sum > CHI_CONVERGED {
            tracing::warn!(
                groups = self.groups,
                df = self.df,
                q,
                "studentized range integral may not have converged"
            );
        }
        total.min(1.0)
    }

    /// CDF of the range of `groups` standard normal variables, evaluated at `w`.
    #[expect(clippy::cast_precision_loss)]
    fn range_cdf(&self, w: f64) -> f64 {
        let cc = self.groups as f64;
        let half_w = w * 0.5;
        if half_w >= RANGE_UPPER_BOUND {
            return 1.0;
        }

        let mut prob = 2.0 * standard_normal_cdf(half_w) - 1.0;
        prob = if prob >= 1.0 { 1.0 } else { prob.powf(cc) };

        let intervals: u32 = if w > RANGE_WIDE_THRESHOLD { 2 } else { 3 };
        let step = (RANGE_UPPER_BOUND - half_w) / f64::from(intervals);
        let cc1 = cc - 1.0;
        let min_inner = (RANGE_LOG_UNDERFLOW / cc1).exp();

        let mut lower = half_w;
        let mut integral = 0.0;
        for _ in 0..intervals {
            let upper = lower + step;
            let mid = 0.5 * (upper + lower);
            let half_len = 0.5 * (upper - lower);
            let mut sum = 0.0;
            // Nodes in ascending order: negative half first, then positive half.
            let nodes = RANGE_LEGENDRE_NODES
                .iter()
                .zip(&RANGE_LEGENDRE_WEIGHTS)
                .map(|(&x, &a)| (-x, a))
                .chain(
                    RANGE_LEGENDRE_NODES
                        .iter()
                        .zip(&RANGE_LEGENDRE_WEIGHTS)
                        .rev()
                        .map(|(&x, &a)| (x, a)),
                );
            for (node, weight) in nodes {
                let t = mid + half_len * node;
                let t_sq = t * t;
                if t_sq > RANGE_EXPONENT_CUTOFF {
                    break;
                }
                let inner = standard_normal_cdf(t) - standard_normal_cdf(t - w);
                if inner >= min_inner {
                    sum += weight * (-0.5 * t_sq).exp() * inner.powf(cc1);
                }
            }
            integral += sum * (2.0 * half_len * cc) / (2.0 * std::f64::consts::PI).sqrt();
            lower = upper;
        }

        prob += integral;
        if prob <= RANGE_LOG_UNDERFLOW.exp() {
            return 0.0;
        }
        prob.min(1.0)
    }

    /// Closed-form approximation of the quantile, used to start the secant iteration.
    #[expect(clippy::cast_precision_loss)]
    fn initial_quantile(&self, p: f64) -> f64 {
        const P0: f64 = 0.322_232_421_088;
        const Q0: f64 = 0.099_348_462_606;
        const P1: f64 = -1.0;
        const Q1: f64 = 0.588_581_570_495;
        const P2: f64 = -0.342_242_088_547;
        const Q2: f64 = 0.531_103_462_366;
        const P3: f64 = -0.204_231_210_125;
        const Q3: f64 = 0.103_537_752_85;
        const P4: f64 = -0.453_642_210_148e-4;
        const Q4: f64 = 0.385_607_006_34e-2;
        const C1: f64 = 0.8832;
        const C2: f64 = 0.2368;
        const C3: f64 = 1.214;
        const C4: f64 = 1.208;
        const C5: f64 = 1.4142;
        const DF_MAX: f64 = 120.0;

        let v = self.df;
        let ps = 0.5 - 0.5 * p;
        let yi = (1.0 / (ps * ps)).ln().sqrt();
        let mut t = yi
            + ((((yi * P4 + P3) * yi + P2) * yi + P1) * yi + P0)
                / ((((yi * Q4 + Q3) * yi + Q2) * yi + Q1) * yi + Q0);
        if v < DF_MAX {
            t += (t * t * t + t) / v / 4.0;
        }
        let mut q = C1 - C2 * t;
        if v < DF_MAX {
            q += -C3 / v + C4 * t / v;
        }
        t * (q * (self.groups as f64 - 1.0).ln() + C5)
    }
}

fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use statrs::distribution::{ContinuousCDF as _, StudentsT};

    use super::*;

    fn dist(groups: usize, df: f64) -> StudentizedRange {
        StudentizedRange::new(groups, df).unwrap()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(
            StudentizedRange::new(1, 10.0),
            Err(InvalidParameterError::TooFewGroups { groups: 1 })
        );
        assert!(matches!(
            StudentizedRange::new(3, 0.5),
            Err(InvalidParameterError::InvalidDegreesOfFreedom { .. })
        ));
        assert!(matches!(
            StudentizedRange::new(3, f64::INFINITY),
            Err(InvalidParameterError::InvalidDegreesOfFreedom { .. })
        ));
    }

    #[test]
    fn test_critical_values_match_published_tables() {
        let cases = [
            (0.95, 3, 15.0, 3.673),
            (0.95, 2, 10.0, 3.151),
            (0.95, 5, 20.0, 4.232),
            (0.99, 4, 30.0, 4.799),
        ];
        for (p, groups, df, expected) in cases {
            let q = dist(groups, df).inverse_cdf(p);
            assert!(
                (q - expected).abs() < 2e-3,
                "q({p}; {groups}, {df}) = {q}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_two_groups_reduce_to_students_t() {
        // With two means, Q = sqrt(2) |T|.
        let q = 3.0;
        let t = StudentsT::new(0.0, 1.0, 10.0).unwrap();
        let expected = 2.0 * t.cdf(q / std::f64::consts::SQRT_2) - 1.0;
        assert!((dist(2, 10.0).cdf(q) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_large_df_uses_known_variance_form() {
        let q = dist(3, 30_000.0).inverse_cdf(0.95);
        assert!((q - 3.314).abs() < 2e-3);
    }

    #[test]
    fn test_cdf_bounds_and_monotonicity() {
        let d = dist(4, 12.0);
        assert_eq!(d.cdf(0.0), 0.0);
        assert_eq!(d.cdf(-1.0), 0.0);
        assert_eq!(d.cdf(f64::INFINITY), 1.0);
        assert!(d.cdf(f64::NAN).is_nan());

        let mut prev = 0.0;
        for i in 1..=40 {
            let c = d.cdf(f64::from(i) * 0.25);
            assert!((0.0..=1.0).contains(&c));
            assert!(c >= prev, "cdf must be non-decreasing");
            prev = c;
        }
        assert!(prev > 0.999);
    }

    #[test]
    fn test_sf_complements_cdf() {
        let d = dist(3, 12.0);
        let c = d.cdf(3.5);
        assert!((c - 0.930_004_5).abs() < 1e-5);
        assert!((d.sf(3.5) - (1.0 - c)).abs() < 1e-15);
    }

    #[test]
    fn test_inverse_cdf_edge_cases() {
        let d = dist(3, 15.0);
        assert_eq!(d.inverse_cdf(0.0), 0.0);
        assert_eq!(d.inverse_cdf(1.0), f64::INFINITY);
        assert!(d.inverse_cdf(f64::NAN).is_nan());
    }
}
