//! Extending a fitted line across the vertical window of interest

use serde::{Deserialize, Serialize};

use crate::geometry::{FrameGeometry, LineFit, Point, Side};
use crate::LaneError;

/// Slopes with a smaller magnitude cannot be solved for x
pub const MIN_ABS_SLOPE: f64 = 1e-6;

/// Lane boundary output for one side of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneLineResult {
    /// Whether a line was found this frame
    pub present: bool,

    /// Endpoint at the top of the window (smaller y)
    pub top: Point,

    /// Endpoint on the bottom edge of the frame
    pub bottom: Point,
}

impl LaneLineResult {
    /// No line this frame
    pub fn absent() -> Self {
        Self::default()
    }

    /// Endpoints when present
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        self.present.then_some((self.top, self.bottom))
    }

    /// Endpoints truncated to integer pixels, ready for a line rasterizer
    pub fn pixel_endpoints(&self) -> Option<((i32, i32), (i32, i32))> {
        self.endpoints().map(|(top, bottom)| {
            (
                (top.x as i32, top.y as i32),
                (bottom.x as i32, bottom.y as i32),
            )
        })
    }
}

/// Vertical window `(top_y, bottom_y)`: from `fraction` of the height down
/// to the bottom edge
pub fn window(geometry: FrameGeometry, top_fraction: f64) -> (f64, f64) {
    let height = geometry.height_f64();
    (height * top_fraction, height)
}

/// Solve the fit for x at the top and bottom of the window
pub fn extrapolate(
    side: Side,
    fit: LineFit,
    geometry: FrameGeometry,
    top_fraction: f64,
) -> Result<LaneLineResult, LaneError> {
    if !fit.slope.is_finite() || fit.slope.abs() < MIN_ABS_SLOPE {
        return Err(LaneError::DegenerateFit {
            side,
            slope: fit.slope,
        });
    }

    let (top_y, bottom_y) = window(geometry, top_fraction);
    let top = Point::new((top_y - fit.intercept) / fit.slope, top_y);
    let bottom = Point::new((bottom_y - fit.intercept) / fit.slope, bottom_y);

    if !(top.x.is_finite() && bottom.x.is_finite()) {
        return Err(LaneError::DegenerateFit {
            side,
            slope: fit.slope,
        });
    }

    Ok(LaneLineResult {
        present: true,
        top,
        bottom,
    })
}
