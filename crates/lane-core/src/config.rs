//! Lane finding configuration

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregation;
use crate::LaneError;

/// Lane finding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Accepted slope range for left boundary segments (inclusive)
    pub left_slope: (f64, f64),

    /// Accepted slope range for right boundary segments (inclusive)
    pub right_slope: (f64, f64),

    /// Top of the drawn window as a fraction of frame height
    pub roi_top_fraction: f64,

    /// Weight of the previous frame's fit, in [0, 1). 0 disables smoothing
    pub smoothing_weight: f64,

    /// Minimum |x2 - x1| below which a segment counts as vertical
    pub vertical_epsilon: f64,

    /// How per-frame candidate fits are combined
    pub aggregation: Aggregation,

    /// Drop a side's stored fit after this many consecutive empty frames.
    /// `None` keeps it forever.
    pub max_stale_frames: Option<u32>,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            left_slope: (-0.9, -0.5),
            right_slope: (0.5, 0.9),
            roi_top_fraction: 3.0 / 5.0,
            smoothing_weight: 0.0,
            vertical_epsilon: 1e-3,
            aggregation: Aggregation::Mean,
            max_stale_frames: None,
        }
    }
}

impl LaneConfig {
    /// Temporal smoothing enabled, half weight on the previous frame
    pub fn smoothed() -> Self {
        Self {
            smoothing_weight: 0.5,
            ..Default::default()
        }
    }

    /// Check every option against its valid domain
    pub fn validate(&self) -> Result<(), LaneError> {
        check_slope_range("left_slope", self.left_slope)?;
        check_slope_range("right_slope", self.right_slope)?;
        validate_smoothing_weight(self.smoothing_weight)?;

        if !(self.roi_top_fraction > 0.0 && self.roi_top_fraction < 1.0) {
            return Err(LaneError::InvalidConfig(format!(
                "roi_top_fraction {} must lie in (0, 1)",
                self.roi_top_fraction
            )));
        }
        if !(self.vertical_epsilon > 0.0 && self.vertical_epsilon.is_finite()) {
            return Err(LaneError::InvalidConfig(format!(
                "vertical_epsilon {} must be positive",
                self.vertical_epsilon
            )));
        }
        self.aggregation.validate()
    }
}

/// Smoothing weight must lie in [0, 1); a weight of 1 would freeze the fit
pub(crate) fn validate_smoothing_weight(weight: f64) -> Result<(), LaneError> {
    if (0.0..1.0).contains(&weight) {
        Ok(())
    } else {
        Err(LaneError::InvalidConfig(format!(
            "smoothing_weight {weight} must lie in [0, 1)"
        )))
    }
}

// A range spanning zero would admit horizontal segments and, after
// averaging, a zero-slope fit that cannot be extrapolated.
fn check_slope_range(field: &str, (min, max): (f64, f64)) -> Result<(), LaneError> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(LaneError::InvalidConfig(format!(
            "{field} [{min}, {max}] is not a valid range"
        )));
    }
    if min <= 0.0 && max >= 0.0 {
        return Err(LaneError::InvalidConfig(format!(
            "{field} [{min}, {max}] must not contain 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LaneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.left_slope, (-0.9, -0.5));
        assert_eq!(config.right_slope, (0.5, 0.9));
        assert!((config.roi_top_fraction - 0.6).abs() < 1e-12);
        assert_eq!(config.smoothing_weight, 0.0);
        assert_eq!(config.max_stale_frames, None);
    }

    #[test]
    fn test_smoothed_preset() {
        let config = LaneConfig::smoothed();
        assert_eq!(config.smoothing_weight, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_smoothing_weight() {
        for weight in [-0.1, 1.0, 1.5, f64::NAN] {
            let config = LaneConfig {
                smoothing_weight: weight,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "weight {weight} accepted");
        }
    }

    #[test]
    fn test_rejects_slope_range_through_zero() {
        let config = LaneConfig {
            left_slope: (-0.9, 0.1),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LaneError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_slope_range() {
        let config = LaneConfig {
            right_slope: (0.9, 0.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_roi_and_epsilon() {
        let roi = LaneConfig {
            roi_top_fraction: 1.0,
            ..Default::default()
        };
        assert!(roi.validate().is_err());

        let eps = LaneConfig {
            vertical_epsilon: 0.0,
            ..Default::default()
        };
        assert!(eps.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LaneConfig = serde_json::from_str(r#"{"smoothing_weight": 0.25}"#).unwrap();
        assert_eq!(config.smoothing_weight, 0.25);
        assert_eq!(config.left_slope, (-0.9, -0.5));
    }
}
