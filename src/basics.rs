//! Foundation types, constants, and path command utilities.
//!
//! Rounding helpers, coverage and subpixel constants, rectangles, points,
//! and the vertex source interface shared by the curve, stroke, and
//! rasterizer stages.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

// ============================================================================
// Cover (anti-aliasing) constants
// ============================================================================

/// The type used for anti-aliasing coverage values.
pub type CoverType = u8;

pub const COVER_FULL: CoverType = 255;

// ============================================================================
// Subpixel constants
// ============================================================================

/// Subpixel accuracy of the rasterizer (number of fractional bits).
/// With 8 fractional bits and 32-bit integers, coordinate capacity is 24 bits.
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned integer rectangle.
///
/// `x1`/`y1` are inclusive, `x2`/`y2` are exclusive, so a rectangle covers
/// `width() * height()` pixels and two rectangles sharing an edge value do
/// not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct RectI {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RectI {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from origin and size (the host's `Rectangle(x, y, w, h)`).
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Returns `true` if the pixel (x, y) is inside the rectangle.
    #[inline]
    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Returns `true` if `r` lies entirely within this rectangle.
    /// An empty `r` is contained when its corners are within bounds.
    pub fn contains_rect(&self, r: &RectI) -> bool {
        r.x1 >= self.x1 && r.y1 >= self.y1 && r.x2 <= self.x2 && r.y2 <= self.y2
    }

    /// Intersection of two rectangles; may be empty.
    pub fn intersect(&self, r: &RectI) -> RectI {
        RectI::new(
            self.x1.max(r.x1),
            self.y1.max(r.y1),
            self.x2.min(r.x2),
            self.y2.min(r.y2),
        )
    }
}

// ============================================================================
// Path commands
// ============================================================================

pub const PATH_CMD_STOP: u32 = 0;
pub const PATH_CMD_MOVE_TO: u32 = 1;
pub const PATH_CMD_LINE_TO: u32 = 2;
pub const PATH_CMD_END_POLY: u32 = 0x0F;
pub const PATH_CMD_MASK: u32 = 0x0F;

pub const PATH_FLAGS_CLOSE: u32 = 0x40;

/// Returns `true` if `c` is a vertex command (move_to or line_to).
#[inline]
pub fn is_vertex(c: u32) -> bool {
    (PATH_CMD_MOVE_TO..PATH_CMD_END_POLY).contains(&c)
}

#[inline]
pub fn is_stop(c: u32) -> bool {
    c == PATH_CMD_STOP
}

#[inline]
pub fn is_move_to(c: u32) -> bool {
    c == PATH_CMD_MOVE_TO
}

/// Returns `true` if `c` is an end_poly command carrying the close flag.
#[inline]
pub fn is_close(c: u32) -> bool {
    (c & PATH_CMD_MASK) == PATH_CMD_END_POLY && (c & PATH_FLAGS_CLOSE) != 0
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// VertexSource trait
// ============================================================================

/// A stream of path vertices. Curves, strokes, and polygons all implement
/// this so the rasterizer can consume any of them.
pub trait VertexSource {
    /// Reset to the beginning of the given path (0 for the first/only path).
    fn rewind(&mut self, path_id: u32);

    /// Return the next vertex. Writes coordinates to `x` and `y`, returns a
    /// path command. Returns `PATH_CMD_STOP` when iteration is complete.
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32;
}

impl<T: VertexSource> VertexSource for &mut T {
    fn rewind(&mut self, path_id: u32) {
        (*self).rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        (*self).vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(0.49), 0);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(-0.49), 0);
        assert_eq!(iround(25.0), 25);
        assert_eq!(iround(12.5), 13);
    }

    #[test]
    fn test_rect_from_xywh() {
        let r = RectI::from_xywh(10, 20, 30, 40);
        assert_eq!(r, RectI::new(10, 20, 40, 60));
        assert_eq!(r.width(), 30);
        assert_eq!(r.height(), 40);
        assert!(!r.is_empty());
        assert!(RectI::new(5, 5, 5, 9).is_empty());
    }

    #[test]
    fn test_rect_hit_test_is_half_open() {
        let r = RectI::new(10, 20, 30, 40);
        assert!(r.hit_test(10, 20));
        assert!(r.hit_test(29, 39));
        assert!(!r.hit_test(30, 25));
        assert!(!r.hit_test(15, 40));
        assert!(!r.hit_test(9, 25));
    }

    #[test]
    fn test_rect_contains() {
        let bounds = RectI::new(0, 0, 100, 100);
        assert!(bounds.contains_rect(&RectI::new(0, 0, 100, 100)));
        assert!(bounds.contains_rect(&RectI::new(10, 10, 20, 20)));
        assert!(!bounds.contains_rect(&RectI::new(90, 90, 101, 100)));
        assert!(!bounds.contains_rect(&RectI::new(-1, 0, 10, 10)));
        assert!(bounds.contains_rect(&RectI::new(100, 100, 100, 100)));
    }

    #[test]
    fn test_rect_intersect() {
        let r = RectI::new(10, 20, 100, 200).intersect(&RectI::new(50, 50, 80, 300));
        assert_eq!(r, RectI::new(50, 50, 80, 200));
        assert!(RectI::new(0, 0, 10, 10)
            .intersect(&RectI::new(20, 20, 30, 30))
            .is_empty());
    }

    #[test]
    fn test_path_command_classification() {
        assert!(is_stop(PATH_CMD_STOP));
        assert!(is_move_to(PATH_CMD_MOVE_TO));
        assert!(is_vertex(PATH_CMD_MOVE_TO));
        assert!(is_vertex(PATH_CMD_LINE_TO));
        assert!(!is_vertex(PATH_CMD_STOP));
        assert!(!is_vertex(PATH_CMD_END_POLY));
        assert!(is_close(PATH_CMD_END_POLY | PATH_FLAGS_CLOSE));
        assert!(!is_close(PATH_CMD_END_POLY));
    }

    #[test]
    fn test_cover_constants() {
        assert_eq!(COVER_FULL, 255);
        assert_eq!(POLY_SUBPIXEL_SCALE, 256);
        assert_eq!(POLY_SUBPIXEL_MASK, 255);
    }
}
