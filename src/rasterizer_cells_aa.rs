//! Anti-aliased cell accumulator.
//!
//! Converts edges in 24.8 fixed-point coordinates into per-pixel cells that
//! carry a winding `cover` and a signed `area`. The scanline rasterizer
//! turns those into coverage values. Algorithm after
//! `agg::rasterizer_cells_aa`.

use crate::basics::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

const SUBPIXEL_SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const SUBPIXEL_MASK: i32 = POLY_SUBPIXEL_MASK as i32;

/// Edges longer than this in x are split before walking.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

// ============================================================================
// Cell
// ============================================================================

/// One pixel cell.
///
/// `cover` is the net signed height of the edges crossing the cell and
/// `area` is twice the signed area they cut off to the cell's left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl Cell {
    const EMPTY: Cell = Cell {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };

    #[inline]
    fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ============================================================================
// RasterizerCellsAa
// ============================================================================

/// Edge to cell accumulator.
///
/// Cells are collected unordered in a flat `Vec` and grouped into rows by a
/// counting sort on `y` in [`sort_cells`](Self::sort_cells).
pub struct RasterizerCellsAa {
    cells: Vec<Cell>,
    sorted_cells: Vec<Cell>,
    row_starts: Vec<usize>,
    curr_cell: Cell,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl RasterizerCellsAa {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            sorted_cells: Vec::new(),
            row_starts: Vec::new(),
            curr_cell: Cell::EMPTY,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    /// Discard all cells, keeping allocations.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.sorted_cells.clear();
        self.row_starts.clear();
        self.curr_cell = Cell::EMPTY;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    #[inline]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    #[inline]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Cells of pixel row `y`, ordered by `x`. Several cells may share an
    /// `x`; their contributions add up. Empty outside `min_y..=max_y` or
    /// before sorting.
    pub fn scanline_cells(&self, y: i32) -> &[Cell] {
        if !self.sorted || y < self.min_y || y > self.max_y {
            return &[];
        }
        let row = (y - self.min_y) as usize;
        &self.sorted_cells[self.row_starts[row]..self.row_starts[row + 1]]
    }

    #[inline]
    fn add_curr_cell(&mut self) {
        if self.curr_cell.area | self.curr_cell.cover != 0 {
            self.cells.push(self.curr_cell);
        }
    }

    #[inline]
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if !self.curr_cell.is_at(x, y) {
            self.add_curr_cell();
            self.curr_cell = Cell {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    #[inline]
    fn accumulate(&mut self, cover: i32, area: i32) {
        self.curr_cell.cover += cover;
        self.curr_cell.area += area;
    }

    #[inline]
    fn extend_bounds(&mut self, ex: i32, ey: i32) {
        self.min_x = self.min_x.min(ex);
        self.max_x = self.max_x.max(ex);
        self.min_y = self.min_y.min(ey);
        self.max_y = self.max_y.max(ey);
    }

    /// Walk the part of an edge inside pixel row `ey`.
    ///
    /// `x1`/`x2` are 24.8 fixed point; `fy1`/`fy2` are subpixel offsets
    /// within the row, `0..=POLY_SUBPIXEL_SCALE`.
    fn render_hline(&mut self, ey: i32, x1: i32, fy1: i32, x2: i32, fy2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & SUBPIXEL_MASK;
        let fx2 = x2 & SUBPIXEL_MASK;

        // No height: only the cell position moves.
        if fy1 == fy2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        // Everything in a single cell
        if ex1 == ex2 {
            let dy = fy2 - fy1;
            self.accumulate(dy, (fx1 + fx2) * dy);
            return;
        }

        // Run of adjacent cells: split dy over the crossed columns.
        let height = (fy2 - fy1) as i64;
        let mut dx = x2 as i64 - x1 as i64;
        let (mut p, first, incr) = if dx < 0 {
            dx = -dx;
            (fx1 as i64 * height, 0, -1)
        } else {
            ((SUBPIXEL_SCALE - fx1) as i64 * height, SUBPIXEL_SCALE, 1)
        };

        let mut delta = p.div_euclid(dx) as i32;
        let mut modulo = p.rem_euclid(dx);

        self.accumulate(delta, (fx1 + first) * delta);

        let mut ex = ex1 + incr;
        self.set_curr_cell(ex, ey);
        let mut fy = fy1 + delta;

        if ex != ex2 {
            p = SUBPIXEL_SCALE as i64 * (fy2 - fy + delta) as i64;
            let lift = p.div_euclid(dx) as i32;
            let rem = p.rem_euclid(dx);
            modulo -= dx;

            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.accumulate(delta, SUBPIXEL_SCALE * delta);
                fy += delta;
                ex += incr;
                self.set_curr_cell(ex, ey);
            }
        }
        delta = fy2 - fy;
        self.accumulate(delta, (fx2 + SUBPIXEL_SCALE - first) * delta);
    }

    /// Add an edge in 24.8 fixed point.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & SUBPIXEL_MASK;
        let fy2 = y2 & SUBPIXEL_MASK;

        self.extend_bounds(ex1, ey1);
        self.extend_bounds(ex2, ey2);

        self.set_curr_cell(ex1, ey1);

        // Everything on a single row
        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let (first, incr) = if dy < 0 { (0, -1) } else { (SUBPIXEL_SCALE, 1) };

        // Vertical edge: one cell per row, constant area factor.
        if dx == 0 {
            let ex = ex1;
            let two_fx = (x1 - (ex << POLY_SUBPIXEL_SHIFT)) << 1;

            let mut delta = first - fy1;
            self.accumulate(delta, two_fx * delta);

            ey1 += incr;
            self.set_curr_cell(ex, ey1);

            delta = first + first - SUBPIXEL_SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.curr_cell.cover = delta;
                self.curr_cell.area = area;
                ey1 += incr;
                self.set_curr_cell(ex, ey1);
            }
            delta = fy2 - SUBPIXEL_SCALE + first;
            self.accumulate(delta, two_fx * delta);
            return;
        }

        // General case: split the edge at every row boundary.
        let dy_abs = dy.abs();
        let p = if dy < 0 {
            fy1 as i64 * dx
        } else {
            (SUBPIXEL_SCALE - fy1) as i64 * dx
        };

        let mut delta = p.div_euclid(dy_abs) as i32;
        let mut modulo = p.rem_euclid(dy_abs);

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);

        ey1 += incr;
        self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            let p = SUBPIXEL_SCALE as i64 * dx;
            let lift = p.div_euclid(dy_abs) as i32;
            let rem = p.rem_euclid(dy_abs);
            modulo -= dy_abs;

            while ey1 != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }

                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;

                ey1 += incr;
                self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x2, fy2);
    }

    /// Group cells by row and order each row by `x`. Idempotent until the
    /// next `reset`.
    pub fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }
        self.add_curr_cell();
        self.curr_cell = Cell::EMPTY;
        if self.cells.is_empty() {
            return;
        }

        // Counting sort on y.
        let rows = (self.max_y - self.min_y + 1) as usize;
        self.row_starts.clear();
        self.row_starts.resize(rows + 1, 0);
        for cell in &self.cells {
            self.row_starts[(cell.y - self.min_y) as usize + 1] += 1;
        }
        for i in 1..=rows {
            self.row_starts[i] += self.row_starts[i - 1];
        }

        let mut next = self.row_starts.clone();
        self.sorted_cells.clear();
        self.sorted_cells.resize(self.cells.len(), Cell::EMPTY);
        for cell in &self.cells {
            let row = (cell.y - self.min_y) as usize;
            self.sorted_cells[next[row]] = *cell;
            next[row] += 1;
        }

        for row in 0..rows {
            let (start, end) = (self.row_starts[row], self.row_starts[row + 1]);
            self.sorted_cells[start..end].sort_by_key(|c| c.x);
        }

        self.sorted = true;
    }
}

impl Default for RasterizerCellsAa {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
