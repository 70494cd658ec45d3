//! Lane Line Finding Core
//!
//! Turns the straight segments a line detector finds in each video frame
//! into one stable boundary line per side of the lane:
//! - Segment classification into left/right candidates
//! - Robust per-frame averaging of candidate lines
//! - Temporal smoothing across frames of one stream
//! - Extrapolation over the vertical window of interest

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod extrapolate;
pub mod geometry;
pub mod tracker;

pub use aggregate::Aggregation;
pub use classifier::{Classification, SegmentClassifier};
pub use config::LaneConfig;
pub use extrapolate::LaneLineResult;
pub use geometry::{FrameGeometry, LineFit, Point, Segment, Side};
pub use tracker::LaneTracker;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Lane finding error types
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneError {
    #[error("Invalid frame geometry {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("Degenerate {side} lane fit: slope {slope} cannot be extrapolated")]
    DegenerateFit { side: Side, slope: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A side whose line could not be produced this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideFault {
    pub side: Side,
    pub error: LaneError,
}

/// Both lane lines for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameLanes {
    pub left: LaneLineResult,
    pub right: LaneLineResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<SideFault>,
}

impl FrameLanes {
    pub fn line(&self, side: Side) -> &LaneLineResult {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn line_mut(&mut self, side: Side) -> &mut LaneLineResult {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Per-stream lane finder: classifier plus tracker under one configuration
pub struct LaneFinder {
    config: LaneConfig,
    classifier: SegmentClassifier,
    tracker: LaneTracker,
}

impl LaneFinder {
    /// Create a lane finder for a new stream
    pub fn new(config: LaneConfig) -> Result<Self, LaneError> {
        Ok(Self {
            classifier: SegmentClassifier::new(&config)?,
            tracker: LaneTracker::new(&config)?,
            config,
        })
    }

    /// Classify one frame's segments and update both sides.
    ///
    /// Only invalid geometry fails the whole frame. A degenerate fit on one
    /// side is recorded in `faults` and that side is reported absent; the
    /// other side is unaffected.
    pub fn process_frame(
        &mut self,
        segments: &[Segment],
        geometry: FrameGeometry,
    ) -> Result<FrameLanes, LaneError> {
        let classification = self.classifier.classify(segments, geometry)?;

        let mut lanes = FrameLanes::default();
        for side in Side::ALL {
            let fits = classification.fits(side);
            match self
                .tracker
                .update(side, fits, geometry, self.config.smoothing_weight)
            {
                Ok(line) => *lanes.line_mut(side) = line,
                Err(e @ LaneError::DegenerateFit { .. }) => {
                    warn!(%side, "Lane line dropped: {}", e);
                    lanes.faults.push(SideFault { side, error: e });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(lanes)
    }

    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    pub fn tracker(&self) -> &LaneTracker {
        &self.tracker
    }

    /// Reset tracking state (on switching to an unrelated stream)
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}
