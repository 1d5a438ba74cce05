//! Anti-aliased polygon scanline rasterizer.
//!
//! Accepts closed contours in floating-point coordinates, accumulates them
//! as cells, and sweeps the result one pixel row at a time into a
//! [`Scanline`] container with 8-bit coverage. Filling uses the non-zero
//! winding rule, so overlapping contours (a stroke outline that folds over
//! itself at a tight bend) stay solid. After
//! `agg::rasterizer_scanline_aa_nogamma` and `agg::scanline_u8`.

use crate::basics::{
    iround, is_close, is_move_to, is_stop, is_vertex, VertexSource, POLY_SUBPIXEL_SCALE,
    POLY_SUBPIXEL_SHIFT,
};
use crate::rasterizer_cells_aa::RasterizerCellsAa;

// ============================================================================
// AA scale constants
// ============================================================================

const AA_SHIFT: u32 = 8;
const AA_SCALE: u32 = 1 << AA_SHIFT;
const AA_MASK: u32 = AA_SCALE - 1;

/// Convert an image coordinate to 24.8 fixed point.
#[inline]
pub fn poly_coord(v: f64) -> i32 {
    iround(v * POLY_SUBPIXEL_SCALE as f64)
}

// ============================================================================
// Scanline trait
// ============================================================================

/// Receiver of one row of coverage from [`RasterizerScanlineAa::sweep_scanline`].
///
/// Cells and spans arrive in increasing `x` order.
pub trait Scanline {
    /// Forget all spans of the previous row.
    fn reset_spans(&mut self);

    /// One pixel at `x` with coverage `cover`.
    fn add_cell(&mut self, x: i32, cover: u32);

    /// `len` pixels starting at `x`, all with coverage `cover`.
    fn add_span(&mut self, x: i32, len: u32, cover: u32);

    /// Mark the row complete at `y`.
    fn finalize(&mut self, y: i32);

    fn num_spans(&self) -> u32;

    fn y(&self) -> i32;
}

// ============================================================================
// ScanlineU8
// ============================================================================

/// A run of pixels in a [`ScanlineU8`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanlineSpan {
    pub x: i32,
    pub len: i32,
    /// Index of the span's first coverage value in [`ScanlineU8::covers`].
    pub cover_offset: usize,
}

/// Unpacked scanline: one coverage byte per pixel, spans index into a flat
/// cover array addressed by `x - min_x`.
pub struct ScanlineU8 {
    min_x: i32,
    last_x: Option<i32>,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<ScanlineSpan>,
}

impl ScanlineU8 {
    pub fn new() -> Self {
        Self {
            min_x: 0,
            last_x: None,
            y: 0,
            covers: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Size the cover array for cells in `min_x..=max_x`.
    pub fn reset(&mut self, min_x: i32, max_x: i32) {
        let len = (max_x - min_x + 2).max(0) as usize;
        if len > self.covers.len() {
            self.covers.resize(len, 0);
        }
        self.min_x = min_x;
        self.reset_spans();
    }

    pub fn spans(&self) -> &[ScanlineSpan] {
        &self.spans
    }

    pub fn covers(&self) -> &[u8] {
        &self.covers
    }

    /// Coverage values of `span`.
    pub fn span_covers(&self, span: &ScanlineSpan) -> &[u8] {
        &self.covers[span.cover_offset..span.cover_offset + span.len as usize]
    }

    fn push(&mut self, x: i32, len: i32) {
        let xi = x - self.min_x;
        match self.spans.last_mut() {
            Some(span) if self.last_x == Some(xi - 1) => span.len += len,
            _ => self.spans.push(ScanlineSpan {
                x,
                len,
                cover_offset: xi as usize,
            }),
        }
        self.last_x = Some(xi + len - 1);
    }
}

impl Scanline for ScanlineU8 {
    fn reset_spans(&mut self) {
        self.last_x = None;
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        self.covers[(x - self.min_x) as usize] = cover as u8;
        self.push(x, 1);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let start = (x - self.min_x) as usize;
        self.covers[start..start + len as usize].fill(cover as u8);
        self.push(x, len as i32);
    }

    fn finalize(&mut self, y: i32) {
        self.y = y;
    }

    fn num_spans(&self) -> u32 {
        self.spans.len() as u32
    }

    fn y(&self) -> i32 {
        self.y
    }
}

impl Default for ScanlineU8 {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RasterizerScanlineAa
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Polygon rasterizer with anti-aliased, non-zero winding output.
///
/// 1. Add contours with [`move_to_d`](Self::move_to_d) /
///    [`line_to_d`](Self::line_to_d) or [`add_path`](Self::add_path).
/// 2. Call [`rewind_scanlines`](Self::rewind_scanlines), then
///    [`sweep_scanline`](Self::sweep_scanline) until it returns `false`.
///
/// Contours are closed automatically. Adding a contour after a sweep starts
/// a new shape.
pub struct RasterizerScanlineAa {
    outline: RasterizerCellsAa,
    start_x: i32,
    start_y: i32,
    last_x: i32,
    last_y: i32,
    status: Status,
    scan_y: i32,
}

impl RasterizerScanlineAa {
    pub fn new() -> Self {
        Self {
            outline: RasterizerCellsAa::new(),
            start_x: 0,
            start_y: 0,
            last_x: 0,
            last_y: 0,
            status: Status::Initial,
            scan_y: 0,
        }
    }

    /// Discard all contours.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.status = Status::Initial;
    }

    /// Close the current contour back to its start point.
    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.outline
                .line(self.last_x, self.last_y, self.start_x, self.start_y);
            self.last_x = self.start_x;
            self.last_y = self.start_y;
            self.status = Status::Closed;
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.outline.sorted() {
            self.reset();
        }
        self.close_polygon();
        self.start_x = poly_coord(x);
        self.start_y = poly_coord(y);
        self.last_x = self.start_x;
        self.last_y = self.start_y;
        self.status = Status::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        let (x, y) = (poly_coord(x), poly_coord(y));
        self.outline.line(self.last_x, self.last_y, x, y);
        self.last_x = x;
        self.last_y = y;
        self.status = Status::LineTo;
    }

    /// Dispatch one path command.
    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        if is_move_to(cmd) {
            self.move_to_d(x, y);
        } else if is_vertex(cmd) {
            self.line_to_d(x, y);
        } else if is_close(cmd) {
            self.close_polygon();
        }
    }

    /// Add every contour of path `path_id` of `vs`.
    pub fn add_path<VS: VertexSource>(&mut self, vs: &mut VS, path_id: u32) {
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind(path_id);
        if self.outline.sorted() {
            self.reset();
        }
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            self.add_vertex(x, y, cmd);
        }
    }

    pub fn min_x(&self) -> i32 {
        self.outline.min_x()
    }
    pub fn min_y(&self) -> i32 {
        self.outline.min_y()
    }
    pub fn max_x(&self) -> i32 {
        self.outline.max_x()
    }
    pub fn max_y(&self) -> i32 {
        self.outline.max_y()
    }

    /// Close and sort. Returns `false` if there is nothing to render.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.close_polygon();
        self.outline.sort_cells();
        if self.outline.total_cells() == 0 {
            return false;
        }
        self.scan_y = self.outline.min_y();
        true
    }

    /// Coverage for a doubled area value, non-zero winding.
    #[inline]
    pub fn calculate_alpha(&self, area: i32) -> u32 {
        let cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).unsigned_abs();
        cover.min(AA_MASK)
    }

    /// Emit the next non-empty row into `sl`. Returns `false` once every
    /// row has been swept.
    pub fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        loop {
            if self.scan_y > self.outline.max_y() {
                return false;
            }
            sl.reset_spans();

            let cells = self.outline.scanline_cells(self.scan_y);
            let mut cover: i32 = 0;
            let mut i = 0;

            while i < cells.len() {
                let x = cells[i].x;
                let mut area = 0;

                // Merge every cell at this x.
                while i < cells.len() && cells[i].x == x {
                    area += cells[i].area;
                    cover += cells[i].cover;
                    i += 1;
                }

                // A partial cell covers only part of pixel x; the run of
                // full pixels starts after it.
                let mut span_x = x;
                if area != 0 {
                    let alpha = self.calculate_alpha((cover << (POLY_SUBPIXEL_SHIFT + 1)) - area);
                    if alpha != 0 {
                        sl.add_cell(x, alpha);
                    }
                    span_x = x + 1;
                }

                if let Some(next) = cells.get(i) {
                    if next.x > span_x {
                        let alpha = self.calculate_alpha(cover << (POLY_SUBPIXEL_SHIFT + 1));
                        if alpha != 0 {
                            sl.add_span(span_x, (next.x - span_x) as u32, alpha);
                        }
                    }
                }
            }

            if sl.num_spans() > 0 {
                break;
            }
            self.scan_y += 1;
        }

        sl.finalize(self.scan_y);
        self.scan_y += 1;
        true
    }
}

impl Default for RasterizerScanlineAa {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
