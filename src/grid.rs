//! Grid layout: whole-cell puzzle rectangle inside the work area.
//!
//! The work area is trimmed to a whole number of cells per axis. The
//! trimmed remainder is distributed by the configured offset: -1 keeps the
//! grid at the top/left edge, 0 centers it, 1 pushes it to the
//! bottom/right edge.

use crate::basics::{iround, PointD, RectI};
use crate::error::{Error, Result};

/// Pixels per grid cell at scale 1.
pub const CELL_SIZE_UNIT: f64 = 100.0;

/// Largest number of tabs a layout may produce.
pub const MAX_TABS: u64 = 1 << 24;

/// Derived grid geometry for one work area and configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    work_area: RectI,
    scale: f64,
    cell_size: f64,
    puzzle_rect: RectI,
    origin_offset: (i32, i32),
    remainder: (f64, f64),
    rows: u32,
    cols: u32,
}

struct Axis {
    shift: i32,
    len: i32,
    remainder: f64,
}

/// Origin shift, trimmed length and fractional remainder along one axis.
fn axis_layout(len: i32, cell_size: f64, offset: f64) -> Axis {
    let remainder = len as f64 % cell_size;
    let trimmed = remainder as i32;
    let half = remainder / 2.0;
    // Rounding can land one pixel past the truncated remainder.
    let shift = iround(half + offset * half).clamp(0, trimmed);
    Axis {
        shift,
        len: len - trimmed,
        remainder,
    }
}

/// Tabs on a `rows` x `cols` grid, in floating point so huge grids can be
/// rejected before anything is counted in integers.
fn tab_estimate(rows: f64, cols: f64) -> f64 {
    (rows - 1.0).max(0.0) * cols + (cols - 1.0).max(0.0) * rows
}

impl GridLayout {
    /// Lay out the grid over `work_area`.
    ///
    /// Fails when `scale` is not finite and positive, when an offset
    /// component is outside [-1, 1], or when the work area is empty. A work
    /// area smaller than one cell is valid and yields no tabs. Cells so small
    /// that the grid would exceed [`MAX_TABS`] fail with
    /// [`Error::GridTooDense`].
    pub fn new(work_area: RectI, scale: f64, offset: (f64, f64)) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidScale(scale));
        }
        let (ox, oy) = offset;
        if !(-1.0..=1.0).contains(&ox) || !(-1.0..=1.0).contains(&oy) {
            return Err(Error::InvalidOffset { x: ox, y: oy });
        }
        if work_area.is_empty() {
            return Err(Error::EmptyWorkArea);
        }

        let cell_size = CELL_SIZE_UNIT * scale;
        let ax = axis_layout(work_area.width(), cell_size, ox);
        let ay = axis_layout(work_area.height(), cell_size, oy);

        let rows = (ay.len as f64 / cell_size).floor();
        let cols = (ax.len as f64 / cell_size).floor();
        if rows > u32::MAX as f64
            || cols > u32::MAX as f64
            || tab_estimate(rows, cols) > MAX_TABS as f64
        {
            return Err(Error::GridTooDense { rows, cols });
        }

        let puzzle_rect = RectI::from_xywh(
            work_area.x1 + ax.shift,
            work_area.y1 + ay.shift,
            ax.len,
            ay.len,
        );

        Ok(Self {
            work_area,
            scale,
            cell_size,
            puzzle_rect,
            origin_offset: (ax.shift, ay.shift),
            remainder: (ax.remainder, ay.remainder),
            rows: rows as u32,
            cols: cols as u32,
        })
    }

    pub fn work_area(&self) -> RectI {
        self.work_area
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Cell edge length in pixels, `100 * scale`.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Whole-cell sub-rectangle of the work area.
    pub fn puzzle_rect(&self) -> RectI {
        self.puzzle_rect
    }

    /// Shift of the puzzle origin relative to the work-area origin.
    pub fn origin_offset(&self) -> (i32, i32) {
        self.origin_offset
    }

    /// Puzzle origin in image coordinates.
    pub fn origin(&self) -> PointD {
        PointD::new(self.puzzle_rect.x1 as f64, self.puzzle_rect.y1 as f64)
    }

    /// Number of cells stacked vertically.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of cells side by side.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// `false` when the grid has no full cell along some axis.
    pub fn has_tabs(&self) -> bool {
        self.rows >= 1 && self.cols >= 1
    }

    /// Whether pixels outside the puzzle rectangle are cut away.
    pub fn clips_border(&self) -> bool {
        self.rows > 1 || self.cols > 1
    }

    /// Work-area length left over after the whole cells, per axis. Not
    /// truncated, so it may be fractional.
    pub fn remainder(&self) -> (f64, f64) {
        self.remainder
    }

    /// Border predicate for compositing.
    ///
    /// The far edge sits at `end + shift - 1 - remainder` of the work area,
    /// measured with the fractional remainder, so with a fractional cell size
    /// it can fall one pixel inside the puzzle rectangle. When the origin is
    /// shifted on an axis, the first column (or row) of the puzzle rectangle
    /// is cut as well, leaving an open edge where the remainder was trimmed.
    #[inline]
    pub fn is_outside(&self, x: i32, y: i32) -> bool {
        let r = &self.puzzle_rect;
        let wa = &self.work_area;
        let (sx, sy) = self.origin_offset;
        let (rw, rh) = self.remainder;
        (sx != 0 && x <= r.x1)
            || x < r.x1
            || x as f64 > (wa.x2 + sx - 1) as f64 - rw
            || (sy != 0 && y <= r.y1)
            || y < r.y1
            || y as f64 > (wa.y2 + sy - 1) as f64 - rh
    }
}
