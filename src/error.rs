//! Error type for configuration and pattern rebuild failures.
//!
//! Compositing itself has no recoverable error path: out-of-bounds tile
//! rectangles are contract violations and panic.

use thiserror::Error;

use crate::basics::RectI;

/// Errors raised while building a [`Configuration`](crate::Configuration)
/// or rebuilding the pattern for a work area.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Scale must be finite and strictly positive.
    #[error("invalid scale {0}: must be finite and greater than zero")]
    InvalidScale(f64),

    /// Line width must be at least one pixel.
    #[error("invalid line width {0}: must be at least 1")]
    InvalidLineWidth(u32),

    /// Each offset component must lie in [-1, 1].
    #[error("invalid offset ({x}, {y}): components must lie in [-1, 1]")]
    InvalidOffset { x: f64, y: f64 },

    /// A pattern name that matches none of the known patterns.
    #[error("unknown pattern {0:?}")]
    UnknownPattern(String),

    /// The work area covers no pixels.
    #[error("work area is empty")]
    EmptyWorkArea,

    /// The cell size is so small that the grid would hold more tabs than
    /// can be built.
    #[error("grid of {rows} x {cols} cells is too dense to build")]
    GridTooDense { rows: f64, cols: f64 },

    /// The work area extends past the image bounds.
    #[error("work area {work_area:?} is not inside image bounds {bounds:?}")]
    WorkAreaOutOfBounds { work_area: RectI, bounds: RectI },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
