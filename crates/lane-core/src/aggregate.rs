//! Combining per-frame candidate fits into one line per side

use serde::{Deserialize, Serialize};

use crate::geometry::LineFit;
use crate::LaneError;

/// Strategy for reducing candidate slopes and intercepts to a single value.
///
/// Slopes and intercepts are reduced independently. All strategies are
/// deterministic for a given multiset of inputs, so candidate order does
/// not matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Unweighted arithmetic mean
    #[default]
    Mean,
    /// Middle value (mean of the two middle values for even counts)
    Median,
    /// Mean after dropping the given fraction from each end, in [0, 0.5)
    TrimmedMean(f64),
}

impl Aggregation {
    pub fn validate(&self) -> Result<(), LaneError> {
        match self {
            Aggregation::TrimmedMean(fraction) if !(0.0..0.5).contains(fraction) => {
                Err(LaneError::InvalidConfig(format!(
                    "trimmed mean fraction {fraction} must lie in [0, 0.5)"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Combine candidate fits; `None` when there are no candidates
    pub fn combine(&self, fits: &[LineFit]) -> Option<LineFit> {
        if fits.is_empty() {
            return None;
        }
        let slopes: Vec<f64> = fits.iter().map(|f| f.slope).collect();
        let intercepts: Vec<f64> = fits.iter().map(|f| f.intercept).collect();
        Some(LineFit {
            slope: self.reduce(slopes),
            intercept: self.reduce(intercepts),
        })
    }

    fn reduce(&self, mut values: Vec<f64>) -> f64 {
        match *self {
            Aggregation::Mean => mean(&values),
            Aggregation::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
            Aggregation::TrimmedMean(fraction) => {
                values.sort_by(f64::total_cmp);
                // Always keep at least one value
                let trim = ((values.len() as f64 * fraction).floor() as usize)
                    .min((values.len() - 1) / 2);
                mean(&values[trim..values.len() - trim])
            }
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fits(slopes: &[f64]) -> Vec<LineFit> {
        slopes
            .iter()
            .enumerate()
            .map(|(i, &m)| LineFit::new(m, 600.0 + i as f64 * 10.0))
            .collect()
    }

    #[test]
    fn test_empty_candidates() {
        assert!(Aggregation::Mean.combine(&[]).is_none());
        assert!(Aggregation::Median.combine(&[]).is_none());
    }

    #[test]
    fn test_mean() {
        let fit = Aggregation::Mean.combine(&fits(&[-0.6, -0.7, -0.8])).unwrap();
        assert!((fit.slope + 0.7).abs() < 1e-12);
        assert!((fit.intercept - 610.0).abs() < 1e-12);
    }

    #[test]
    fn test_median_ignores_outlier() {
        let fit = Aggregation::Median
            .combine(&fits(&[-0.6, -0.61, -0.9, -0.62, -0.5]))
            .unwrap();
        assert!((fit.slope + 0.61).abs() < 1e-12);
        assert!((fit.intercept - 620.0).abs() < 1e-12);
    }

    #[test]
    fn test_median_even_count() {
        let fit = Aggregation::Median.combine(&fits(&[-0.6, -0.8])).unwrap();
        assert!((fit.slope + 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_trimmed_mean() {
        // 10 values, 10% trimmed from each end
        let slopes = [-0.5, -0.6, -0.6, -0.6, -0.6, -0.6, -0.6, -0.6, -0.6, -0.9];
        let fit = Aggregation::TrimmedMean(0.1).combine(&fits(&slopes)).unwrap();
        assert!((fit.slope + 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_trimmed_mean_single_value() {
        let fit = Aggregation::TrimmedMean(0.45).combine(&fits(&[-0.7])).unwrap();
        assert!((fit.slope + 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_trimmed_mean_oversized_fraction_keeps_middle() {
        // Unvalidated fraction: trimming is capped so one value survives
        let fit = Aggregation::TrimmedMean(0.7)
            .combine(&fits(&[-0.6, -0.7, -0.8]))
            .unwrap();
        assert!((fit.slope + 0.7).abs() < 1e-12);
        assert!((fit.intercept - 610.0).abs() < 1e-12);

        let fit = Aggregation::TrimmedMean(0.9).combine(&fits(&[-0.6, -0.8])).unwrap();
        assert!((fit.slope + 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_order_independent() {
        let a = fits(&[-0.55, -0.7, -0.85, -0.6]);
        let mut b = a.clone();
        b.reverse();
        for agg in [Aggregation::Mean, Aggregation::Median, Aggregation::TrimmedMean(0.25)] {
            let fa = agg.combine(&a).unwrap();
            let fb = agg.combine(&b).unwrap();
            assert!((fa.slope - fb.slope).abs() < 1e-12);
            assert!((fa.intercept - fb.intercept).abs() < 1e-12);
        }
    }

    #[test]
    fn test_trim_fraction_validation() {
        assert!(Aggregation::TrimmedMean(0.2).validate().is_ok());
        assert!(Aggregation::TrimmedMean(0.5).validate().is_err());
        assert!(Aggregation::TrimmedMean(-0.1).validate().is_err());
    }
}
