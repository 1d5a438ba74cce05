//! Cardinal spline and cubic Bezier flattening.
//!
//! A cardinal spline through N points is converted segment by segment to
//! cubic Beziers, and each Bezier is flattened by adaptive recursive
//! subdivision (`Curve4Div`, after `agg::curve4_div`).

use crate::basics::{PointD, VertexSource, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP};
use crate::math::calc_sq_distance;

// ============================================================================
// Constants
// ============================================================================

const CURVE_COLLINEARITY_EPSILON: f64 = 1e-30;
const CURVE_RECURSION_LIMIT: u32 = 32;

/// Default tension of the host's curve primitive.
pub const DEFAULT_TENSION: f64 = 0.5;

// ============================================================================
// Spline to Bezier conversion
// ============================================================================

/// Bezier control points for the cardinal spline segment `p1 → p2`.
///
/// `p0` and `p3` are the neighbors used for the tangents. The control
/// offset at each end is `tension / 3` times the chord between the
/// neighbors; tension 0.5 is the uniform Catmull-Rom spline.
pub fn cardinal_to_bezier(
    p0: PointD,
    p1: PointD,
    p2: PointD,
    p3: PointD,
    tension: f64,
) -> [PointD; 4] {
    let k = tension / 3.0;
    [
        p1,
        PointD::new(p1.x + k * (p2.x - p0.x), p1.y + k * (p2.y - p0.y)),
        PointD::new(p2.x - k * (p3.x - p1.x), p2.y - k * (p3.y - p1.y)),
        p2,
    ]
}

// ============================================================================
// Curve4Div: recursive subdivision of a cubic Bezier
// ============================================================================

/// Recursive subdivision cubic Bezier flattener.
///
/// Produces the start point, the subdivision points, and the end point.
pub struct Curve4Div {
    approximation_scale: f64,
    distance_tolerance_square: f64,
    count: usize,
    points: Vec<PointD>,
}

impl Curve4Div {
    pub fn new() -> Self {
        Self {
            approximation_scale: 1.0,
            distance_tolerance_square: 0.0,
            count: 0,
            points: Vec::new(),
        }
    }

    pub fn new_with_points(c: &[PointD; 4]) -> Self {
        let mut curve = Self::new();
        curve.init(c);
        curve
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.count = 0;
    }

    pub fn init(&mut self, c: &[PointD; 4]) {
        self.points.clear();
        self.distance_tolerance_square = 0.5 / self.approximation_scale;
        self.distance_tolerance_square *= self.distance_tolerance_square;
        self.points.push(c[0]);
        self.recursive_bezier(c[0], c[1], c[2], c[3], 0);
        self.points.push(c[3]);
        self.count = 0;
    }

    /// Higher values produce more points. Takes effect on the next `init`.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = s;
    }

    /// The flattened points.
    pub fn points(&self) -> &[PointD] {
        &self.points
    }

    fn recursive_bezier(&mut self, p1: PointD, p2: PointD, p3: PointD, p4: PointD, level: u32) {
        if level > CURVE_RECURSION_LIMIT {
            return;
        }

        // Mid-points of the control polygon
        let p12 = mid(p1, p2);
        let p23 = mid(p2, p3);
        let p34 = mid(p3, p4);
        let p123 = mid(p12, p23);
        let p234 = mid(p23, p34);
        let p1234 = mid(p123, p234);

        // Try to approximate the full cubic curve by a single straight line
        let dx = p4.x - p1.x;
        let dy = p4.y - p1.y;

        let mut d2 = ((p2.x - p4.x) * dy - (p2.y - p4.y) * dx).abs();
        let mut d3 = ((p3.x - p4.x) * dy - (p3.y - p4.y) * dx).abs();

        let case = ((d2 > CURVE_COLLINEARITY_EPSILON) as u32) << 1
            | (d3 > CURVE_COLLINEARITY_EPSILON) as u32;

        match case {
            0 => {
                // All collinear OR p1==p4
                let k = dx * dx + dy * dy;
                if k == 0.0 {
                    d2 = calc_sq_distance(p1, p2);
                    d3 = calc_sq_distance(p4, p3);
                } else {
                    let k = 1.0 / k;
                    d2 = k * ((p2.x - p1.x) * dx + (p2.y - p1.y) * dy);
                    d3 = k * ((p3.x - p1.x) * dx + (p3.y - p1.y) * dy);
                    if d2 > 0.0 && d2 < 1.0 && d3 > 0.0 && d3 < 1.0 {
                        // Simple collinear case, 1---2---3---4
                        return;
                    }
                    d2 = if d2 <= 0.0 {
                        calc_sq_distance(p2, p1)
                    } else if d2 >= 1.0 {
                        calc_sq_distance(p2, p4)
                    } else {
                        calc_sq_distance(p2, PointD::new(p1.x + d2 * dx, p1.y + d2 * dy))
                    };
                    d3 = if d3 <= 0.0 {
                        calc_sq_distance(p3, p1)
                    } else if d3 >= 1.0 {
                        calc_sq_distance(p3, p4)
                    } else {
                        calc_sq_distance(p3, PointD::new(p1.x + d3 * dx, p1.y + d3 * dy))
                    };
                }
                if d2 > d3 {
                    if d2 < self.distance_tolerance_square {
                        self.points.push(p2);
                        return;
                    }
                } else if d3 < self.distance_tolerance_square {
                    self.points.push(p3);
                    return;
                }
            }

            1 => {
                // p1,p2,p4 are collinear, p3 is significant
                if d3 * d3 <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                    self.points.push(p23);
                    return;
                }
            }

            2 => {
                // p1,p3,p4 are collinear, p2 is significant
                if d2 * d2 <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                    self.points.push(p23);
                    return;
                }
            }

            _ => {
                // Regular case
                if (d2 + d3) * (d2 + d3) <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                    self.points.push(p23);
                    return;
                }
            }
        }

        // Continue subdivision
        self.recursive_bezier(p1, p12, p123, p1234, level + 1);
        self.recursive_bezier(p1234, p234, p34, p4, level + 1);
    }
}

#[inline]
fn mid(a: PointD, b: PointD) -> PointD {
    PointD::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

impl Default for Curve4Div {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve4Div {
    fn rewind(&mut self, _path_id: u32) {
        self.count = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.count >= self.points.len() {
            return PATH_CMD_STOP;
        }
        let p = self.points[self.count];
        *x = p.x;
        *y = p.y;
        self.count += 1;
        if self.count == 1 {
            PATH_CMD_MOVE_TO
        } else {
            PATH_CMD_LINE_TO
        }
    }
}

// ============================================================================
// CardinalSpline
// ============================================================================

/// Open cardinal spline through every given point, flattened to a polyline.
///
/// End tangents reuse the end point as its own missing neighbor.
/// Emits one `move_to` followed by `line_to` vertices.
pub struct CardinalSpline {
    tension: f64,
    vertices: Vec<PointD>,
    count: usize,
}

impl CardinalSpline {
    pub fn new() -> Self {
        Self {
            tension: DEFAULT_TENSION,
            vertices: Vec::new(),
            count: 0,
        }
    }

    /// Flatten the spline through `points`, replacing any previous curve.
    pub fn init(&mut self, points: &[PointD]) {
        self.vertices.clear();
        self.count = 0;
        match points.len() {
            0 => return,
            1 => {
                self.vertices.push(points[0]);
                return;
            }
            _ => {}
        }

        let last = points.len() - 1;
        let mut curve = Curve4Div::new();
        for i in 0..last {
            let p0 = points[i.saturating_sub(1)];
            let p3 = points[(i + 2).min(last)];
            curve.init(&cardinal_to_bezier(p0, points[i], points[i + 1], p3, self.tension));
            // Each segment starts where the previous one ended.
            let skip = if i == 0 { 0 } else { 1 };
            self.vertices.extend_from_slice(&curve.points()[skip..]);
        }
    }

    /// The flattened polyline.
    pub fn vertices(&self) -> &[PointD] {
        &self.vertices
    }
}

impl Default for CardinalSpline {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for CardinalSpline {
    fn rewind(&mut self, _path_id: u32) {
        self.count = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.count >= self.vertices.len() {
            return PATH_CMD_STOP;
        }
        let p = self.vertices[self.count];
        *x = p.x;
        *y = p.y;
        self.count += 1;
        if self.count == 1 {
            PATH_CMD_MOVE_TO
        } else {
            PATH_CMD_LINE_TO
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::calc_distance;

    fn pts(v: &[(f64, f64)]) -> Vec<PointD> {
        v.iter().map(|&(x, y)| PointD::new(x, y)).collect()
    }

    fn collect(vs: &mut dyn VertexSource) -> Vec<(u32, PointD)> {
        vs.rewind(0);
        let mut out = Vec::new();
        let (mut x, mut y) = (0.0, 0.0);
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                break;
            }
            out.push((cmd, PointD::new(x, y)));
        }
        out
    }

    #[test]
    fn test_cardinal_to_bezier_catmull_rom() {
        let c = cardinal_to_bezier(
            PointD::new(0.0, 0.0),
            PointD::new(6.0, 0.0),
            PointD::new(12.0, 6.0),
            PointD::new(18.0, 6.0),
            0.5,
        );
        let close = |p: PointD, x: f64, y: f64| (p.x - x).abs() < 1e-12 && (p.y - y).abs() < 1e-12;
        assert_eq!(c[0], PointD::new(6.0, 0.0));
        assert!(close(c[1], 8.0, 1.0), "{:?}", c[1]);
        assert!(close(c[2], 10.0, 5.0), "{:?}", c[2]);
        assert_eq!(c[3], PointD::new(12.0, 6.0));
    }

    #[test]
    fn test_cardinal_to_bezier_zero_tension_is_straight() {
        let a = PointD::new(1.0, 2.0);
        let b = PointD::new(5.0, 9.0);
        let c = cardinal_to_bezier(PointD::new(-4.0, 0.0), a, b, PointD::new(20.0, 3.0), 0.0);
        assert_eq!(c, [a, a, b, b]);
    }

    #[test]
    fn test_curve4_div_endpoints() {
        let mut c = Curve4Div::new_with_points(&[
            PointD::new(10.0, 10.0),
            PointD::new(50.0, 100.0),
            PointD::new(150.0, 100.0),
            PointD::new(190.0, 10.0),
        ]);
        let v = collect(&mut c);
        assert!(v.len() > 4, "a bent curve must subdivide");
        assert_eq!(v[0], (PATH_CMD_MOVE_TO, PointD::new(10.0, 10.0)));
        assert_eq!(v.last().unwrap().1, PointD::new(190.0, 10.0));
        assert!(v[1..].iter().all(|(cmd, _)| *cmd == PATH_CMD_LINE_TO));
    }

    #[test]
    fn test_curve4_div_straight_line_has_no_interior_points() {
        let c = Curve4Div::new_with_points(&[
            PointD::new(0.0, 0.0),
            PointD::new(10.0, 0.0),
            PointD::new(20.0, 0.0),
            PointD::new(30.0, 0.0),
        ]);
        assert_eq!(c.points().len(), 2);
    }

    #[test]
    fn test_approximation_scale_adds_points() {
        let ctrl = [
            PointD::new(0.0, 0.0),
            PointD::new(0.0, 100.0),
            PointD::new(100.0, 100.0),
            PointD::new(100.0, 0.0),
        ];
        let coarse = Curve4Div::new_with_points(&ctrl);
        let mut fine = Curve4Div::new();
        fine.set_approximation_scale(4.0);
        fine.init(&ctrl);
        assert!(fine.points().len() > coarse.points().len());
    }

    #[test]
    fn test_spline_passes_through_all_points() {
        let p = pts(&[
            (0.0, 100.0),
            (40.0, 101.0),
            (36.0, 79.0),
            (50.0, 67.0),
            (64.0, 79.0),
            (60.0, 101.0),
            (100.0, 100.0),
        ]);
        let mut s = CardinalSpline::new();
        s.init(&p);
        let v = s.vertices();
        for q in &p {
            assert!(
                v.iter().any(|w| w.x == q.x && w.y == q.y),
                "control point {q:?} missing from polyline"
            );
        }
        assert_eq!(v[0], p[0]);
        assert_eq!(*v.last().unwrap(), p[6]);
    }

    #[test]
    fn test_spline_has_no_duplicate_joints() {
        let p = pts(&[(0.0, 0.0), (30.0, 40.0), (60.0, 0.0), (90.0, 40.0)]);
        let mut s = CardinalSpline::new();
        s.init(&p);
        for w in s.vertices().windows(2) {
            assert!(calc_distance(w[0], w[1]) > 0.0);
        }
    }

    #[test]
    fn test_spline_vertex_commands() {
        let p = pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]);
        let mut s = CardinalSpline::new();
        s.init(&p);
        let v = collect(&mut s);
        assert_eq!(v[0].0, PATH_CMD_MOVE_TO);
        assert!(v[1..].iter().all(|(cmd, _)| *cmd == PATH_CMD_LINE_TO));
        assert_eq!(v.len(), s.vertices().len());
    }

    #[test]
    fn test_spline_degenerate_inputs() {
        let mut s = CardinalSpline::new();
        s.init(&[]);
        assert!(s.vertices().is_empty());
        s.init(&[PointD::new(3.0, 4.0)]);
        assert_eq!(s.vertices(), &[PointD::new(3.0, 4.0)]);
        s.init(&pts(&[(0.0, 0.0), (10.0, 0.0)]));
        assert_eq!(s.vertices().first(), Some(&PointD::new(0.0, 0.0)));
        assert_eq!(s.vertices().last(), Some(&PointD::new(10.0, 0.0)));
    }
}
