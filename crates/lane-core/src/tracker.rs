//! Per-stream lane tracking with temporal smoothing

use tracing::{debug, info, warn};

use crate::aggregate::Aggregation;
use crate::config::{validate_smoothing_weight, LaneConfig};
use crate::extrapolate::{extrapolate, LaneLineResult};
use crate::geometry::{FrameGeometry, LineFit, Side};
use crate::LaneError;

/// Tracking state for one side
#[derive(Debug, Clone, Copy, Default)]
struct SideState {
    /// Last smoothed fit, unset until the first non-empty frame
    fit: Option<LineFit>,

    /// Consecutive frames without candidates
    empty_frames: u32,
}

/// Lane tracker for a single video stream.
///
/// Holds the last smoothed fit per side. Updates for one stream must be
/// applied in frame order; independent streams need their own tracker.
#[derive(Debug, Clone)]
pub struct LaneTracker {
    left: SideState,
    right: SideState,
    aggregation: Aggregation,
    roi_top_fraction: f64,
    max_stale_frames: Option<u32>,
}

impl LaneTracker {
    pub fn new(config: &LaneConfig) -> Result<Self, LaneError> {
        config.validate()?;
        info!(
            aggregation = ?config.aggregation,
            max_stale_frames = ?config.max_stale_frames,
            "Creating lane tracker"
        );
        Ok(Self::from_config(config))
    }

    // Caller guarantees `config` is valid
    fn from_config(config: &LaneConfig) -> Self {
        Self {
            left: SideState::default(),
            right: SideState::default(),
            aggregation: config.aggregation,
            roi_top_fraction: config.roi_top_fraction,
            max_stale_frames: config.max_stale_frames,
        }
    }

    /// Fold one frame's candidates for `side` into the tracked fit and
    /// extrapolate it across the window of interest.
    ///
    /// An empty candidate list yields an absent line and keeps the stored
    /// fit (unless the staleness limit is exceeded). On `DegenerateFit` the
    /// stored fit is left as it was.
    pub fn update(
        &mut self,
        side: Side,
        fits: &[LineFit],
        geometry: FrameGeometry,
        smoothing_weight: f64,
    ) -> Result<LaneLineResult, LaneError> {
        geometry.validate()?;
        validate_smoothing_weight(smoothing_weight)?;

        let aggregation = self.aggregation;
        let roi_top_fraction = self.roi_top_fraction;
        let max_stale_frames = self.max_stale_frames;
        let state = self.state_mut(side);

        let Some(raw) = aggregation.combine(fits) else {
            state.empty_frames = state.empty_frames.saturating_add(1);
            if let Some(limit) = max_stale_frames {
                if state.empty_frames > limit && state.fit.take().is_some() {
                    warn!(%side, empty_frames = state.empty_frames, "Dropping stale lane fit");
                }
            }
            debug!(%side, "No lane candidates this frame");
            return Ok(LaneLineResult::absent());
        };

        let smoothed = match state.fit {
            Some(previous) => LineFit::blend(previous, raw, smoothing_weight),
            None => raw,
        };

        let result = match extrapolate(side, smoothed, geometry, roi_top_fraction) {
            Ok(result) => result,
            Err(e) => {
                warn!(%side, slope = smoothed.slope, "Degenerate lane fit");
                return Err(e);
            }
        };

        state.fit = Some(smoothed);
        state.empty_frames = 0;

        debug!(
            %side,
            candidates = fits.len(),
            slope = smoothed.slope,
            intercept = smoothed.intercept,
            "Updated lane fit"
        );
        Ok(result)
    }

    /// Last smoothed fit for a side
    pub fn previous_fit(&self, side: Side) -> Option<LineFit> {
        self.state(side).fit
    }

    /// Consecutive frames without candidates for a side
    pub fn empty_frames(&self, side: Side) -> u32 {
        self.state(side).empty_frames
    }

    /// Forget all tracked state (start of a new stream)
    pub fn reset(&mut self) {
        info!("Resetting lane tracker");
        self.left = SideState::default();
        self.right = SideState::default();
    }

    /// Forget tracked state for one side only
    pub fn reset_side(&mut self, side: Side) {
        *self.state_mut(side) = SideState::default();
    }

    fn state(&self, side: Side) -> &SideState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn state_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl Default for LaneTracker {
    fn default() -> Self {
        Self::from_config(&LaneConfig::default())
    }
}
