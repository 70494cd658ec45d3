//! Segment classification into left/right lane candidates

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LaneConfig;
use crate::geometry::{FrameGeometry, LineFit, Segment, Side};
use crate::LaneError;

/// Candidate fits for one frame, split by side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub left: Vec<LineFit>,
    pub right: Vec<LineFit>,
    /// Segments that qualified for neither side
    pub rejected: usize,
}

impl Classification {
    pub fn fits(&self, side: Side) -> &[LineFit] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Stateless classifier assigning each segment to at most one side.
///
/// A segment is a left candidate when its slope lies in the left range, its
/// line reaches the bottom edge at or beyond x = 0 (intercept >= height),
/// and both endpoints sit in the left half of the frame. The right case
/// mirrors this with the line evaluated at x = width.
#[derive(Debug, Clone)]
pub struct SegmentClassifier {
    left_slope: (f64, f64),
    right_slope: (f64, f64),
    vertical_epsilon: f64,
}

impl SegmentClassifier {
    pub fn new(config: &LaneConfig) -> Result<Self, LaneError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    // Caller guarantees `config` is valid
    fn from_config(config: &LaneConfig) -> Self {
        Self {
            left_slope: config.left_slope,
            right_slope: config.right_slope,
            vertical_epsilon: config.vertical_epsilon,
        }
    }

    /// Partition segments into per-side candidate fits
    pub fn classify(
        &self,
        segments: &[Segment],
        geometry: FrameGeometry,
    ) -> Result<Classification, LaneError> {
        geometry.validate()?;

        let mut result = Classification::default();
        for segment in segments {
            match self.side_of(segment, geometry) {
                Some((Side::Left, fit)) => result.left.push(fit),
                Some((Side::Right, fit)) => result.right.push(fit),
                None => result.rejected += 1,
            }
        }

        debug!(
            total = segments.len(),
            left = result.left.len(),
            right = result.right.len(),
            rejected = result.rejected,
            "Classified segments"
        );
        Ok(result)
    }

    /// Side and line of a single segment, or `None` if it is rejected.
    /// Assumes `geometry` has already been validated.
    pub fn side_of(&self, segment: &Segment, geometry: FrameGeometry) -> Option<(Side, LineFit)> {
        let fit = segment.line_fit(self.vertical_epsilon)?;
        let width = geometry.width_f64();
        let height = geometry.height_f64();
        let center = geometry.center_x();
        let (x1, x2) = (segment.start.x, segment.end.x);

        if in_range(fit.slope, self.left_slope)
            && fit.intercept >= height
            && x1 <= center
            && x2 <= center
        {
            Some((Side::Left, fit))
        } else if in_range(fit.slope, self.right_slope)
            && fit.y_at(width) >= height
            && x1 >= center
            && x2 >= center
        {
            Some((Side::Right, fit))
        } else {
            None
        }
    }
}

impl Default for SegmentClassifier {
    fn default() -> Self {
        Self::from_config(&LaneConfig::default())
    }
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value >= min && value <= max
}
