//! Image-space geometry types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LaneError;

/// Lane boundary side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Reject empty frames before any arithmetic depends on them
    pub fn validate(&self) -> Result<(), LaneError> {
        if self.width == 0 || self.height == 0 {
            return Err(LaneError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn width_f64(&self) -> f64 {
        self.width as f64
    }

    pub fn height_f64(&self) -> f64 {
        self.height as f64
    }

    /// Vertical center line separating the left and right halves
    pub fn center_x(&self) -> f64 {
        self.width_f64() / 2.0
    }
}

/// Pixel-space point (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Detected line segment, as emitted by a probabilistic Hough detector.
///
/// Serialized compactly as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
        }
    }

    /// Build from integer pixel endpoints
    pub fn from_i32(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1 as f64, y1 as f64, x2 as f64, y2 as f64)
    }

    /// Horizontal extent `x2 - x1`
    pub fn dx(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// Line through both endpoints, or `None` when the segment is
    /// (near-)vertical and has no defined slope.
    pub fn line_fit(&self, vertical_epsilon: f64) -> Option<LineFit> {
        let dx = self.dx();
        if !self.is_finite() || dx.abs() < vertical_epsilon {
            return None;
        }
        let slope = (self.end.y - self.start.y) / dx;
        let intercept = self.end.y - slope * self.end.x;
        Some(LineFit { slope, intercept })
    }
}

impl From<[f64; 4]> for Segment {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<Segment> for [f64; 4] {
    fn from(s: Segment) -> Self {
        [s.start.x, s.start.y, s.end.x, s.end.y]
    }
}

/// Line `y = slope * x + intercept` in image space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Exponential blend: `weight * previous + (1 - weight) * current`,
    /// applied to slope and intercept independently.
    pub fn blend(previous: LineFit, current: LineFit, weight: f64) -> LineFit {
        LineFit {
            slope: weight * previous.slope + (1.0 - weight) * current.slope,
            intercept: weight * previous.intercept + (1.0 - weight) * current.intercept,
        }
    }

    /// y at the given x
    pub fn y_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
