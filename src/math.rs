//! Geometric math utilities used by curve flattening and stroking.

use crate::basics::PointD;

/// Epsilon for intersection calculations.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

/// Coinciding points maximal distance.
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

/// Cross product of vectors (b - a) and (p - b).
/// The sign tells which side of the directed line a→b the point p is on.
#[inline]
pub fn cross_product(a: PointD, b: PointD, p: PointD) -> f64 {
    (p.x - b.x) * (b.y - a.y) - (p.y - b.y) * (b.x - a.x)
}

#[inline]
pub fn calc_distance(a: PointD, b: PointD) -> f64 {
    calc_sq_distance(a, b).sqrt()
}

#[inline]
pub fn calc_sq_distance(a: PointD, b: PointD) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Intersection point of the infinite lines a→b and c→d.
/// Returns `None` if they are parallel.
#[inline]
pub fn calc_intersection(a: PointD, b: PointD, c: PointD, d: PointD) -> Option<PointD> {
    let num = (a.y - c.y) * (d.x - c.x) - (a.x - c.x) * (d.y - c.y);
    let den = (b.x - a.x) * (d.y - c.y) - (b.y - a.y) * (d.x - c.x);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some(PointD::new(a.x + r * (b.x - a.x), a.y + r * (b.y - a.y)))
}
