//! Polyline stroker.
//!
//! Turns an open center line into one closed outline polygon: the left
//! side forward, a butt cap, the right side backward and a butt cap back
//! to the start. Outer joins are mitered up to the miter limit and revert
//! to a bevel beyond it. Inner joins are mitered with a bevel fallback.
//! The outline may self-overlap at tight bends; it is meant to be filled
//! with the non-zero rule.
//!
//! Join and cap geometry follows `agg::math_stroke` and the outline walk
//! follows `agg::vcgen_stroke`.

use crate::basics::{
    is_move_to, is_vertex, PointD, VertexSource, PATH_CMD_END_POLY, PATH_CMD_LINE_TO,
    PATH_CMD_MOVE_TO, PATH_CMD_STOP, PATH_FLAGS_CLOSE,
};
use crate::math::{calc_distance, calc_intersection, cross_product, VERTEX_DIST_EPSILON};

/// Miter limit of the host's default pen.
pub const DEFAULT_MITER_LIMIT: f64 = 10.0;

const DEFAULT_INNER_MITER_LIMIT: f64 = 1.01;

/// Center-line vertex with the distance to the next vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
struct VertexDist {
    p: PointD,
    dist: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    MoveTo,
    LineTo,
    EndPoly,
    Stop,
}

/// Stroke generator for open polylines with butt caps.
pub struct Stroker {
    width: f64,
    miter_limit: f64,
    inner_miter_limit: f64,
    src_vertices: Vec<VertexDist>,
    out_vertices: Vec<PointD>,
    built: bool,
    out_vertex: usize,
    status: Status,
}

impl Stroker {
    pub fn new() -> Self {
        Self {
            width: 0.5,
            miter_limit: DEFAULT_MITER_LIMIT,
            inner_miter_limit: DEFAULT_INNER_MITER_LIMIT,
            src_vertices: Vec::new(),
            out_vertices: Vec::new(),
            built: false,
            out_vertex: 0,
            status: Status::Stop,
        }
    }

    /// Full stroke width in pixels.
    pub fn set_width(&mut self, w: f64) {
        self.width = w.abs() * 0.5;
        self.built = false;
    }

    pub fn width(&self) -> f64 {
        self.width * 2.0
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    pub fn remove_all(&mut self) {
        self.src_vertices.clear();
        self.out_vertices.clear();
        self.built = false;
    }

    /// Append a center-line vertex. A `move_to` restarts at its point;
    /// vertices closer than the coincidence epsilon to the previous one are
    /// dropped.
    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        self.built = false;
        let p = PointD::new(x, y);
        if is_move_to(cmd) {
            self.src_vertices.clear();
            self.src_vertices.push(VertexDist { p, dist: 0.0 });
        } else if is_vertex(cmd) {
            if let Some(last) = self.src_vertices.last() {
                if calc_distance(last.p, p) <= VERTEX_DIST_EPSILON {
                    return;
                }
            }
            self.src_vertices.push(VertexDist { p, dist: 0.0 });
        }
    }

    /// Replace the center line with the first path of `vs`.
    pub fn add_path<VS: VertexSource>(&mut self, vs: &mut VS) {
        self.remove_all();
        vs.rewind(0);
        let (mut x, mut y) = (0.0, 0.0);
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                break;
            }
            self.add_vertex(x, y, cmd);
        }
    }

    /// The outline polygon, building it if needed. Empty when the center
    /// line has fewer than two distinct vertices.
    pub fn outline(&mut self) -> &[PointD] {
        self.build();
        &self.out_vertices
    }

    fn build(&mut self) {
        if self.built {
            return;
        }
        self.built = true;
        self.out_vertices.clear();

        let n = self.src_vertices.len();
        if n < 2 {
            return;
        }
        for i in 0..n - 1 {
            let next = self.src_vertices[i + 1].p;
            let v = &mut self.src_vertices[i];
            v.dist = calc_distance(v.p, next);
        }

        let mut out = std::mem::take(&mut self.out_vertices);
        let src = &self.src_vertices;

        // Start cap, then the left side forward.
        calc_cap(&mut out, self.width, src[0].p, src[1].p, src[0].dist);
        for i in 1..n - 1 {
            let (v0, v1, v2) = (src[i - 1], src[i], src[i + 1]);
            self.calc_join(&mut out, v0.p, v1.p, v2.p, v0.dist, v1.dist);
        }

        // End cap, then the right side backward.
        calc_cap(&mut out, self.width, src[n - 1].p, src[n - 2].p, src[n - 2].dist);
        for i in (1..n - 1).rev() {
            let (v0, v1, v2) = (src[i - 1], src[i], src[i + 1]);
            self.calc_join(&mut out, v2.p, v1.p, v0.p, v1.dist, v0.dist);
        }

        self.out_vertices = out;
    }

    fn calc_join(
        &self,
        out: &mut Vec<PointD>,
        v0: PointD,
        v1: PointD,
        v2: PointD,
        len1: f64,
        len2: f64,
    ) {
        let d1 = PointD::new(
            self.width * (v1.y - v0.y) / len1,
            self.width * (v1.x - v0.x) / len1,
        );
        let d2 = PointD::new(
            self.width * (v2.y - v1.y) / len2,
            self.width * (v2.x - v1.x) / len2,
        );

        let cp = cross_product(v0, v1, v2);
        if cp > 0.0 {
            // Inner join
            let limit = (len1.min(len2) / self.width).max(self.inner_miter_limit);
            self.calc_miter(out, v0, v1, v2, d1, d2, limit);
        } else {
            self.calc_miter(out, v0, v1, v2, d1, d2, self.miter_limit);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_miter(
        &self,
        out: &mut Vec<PointD>,
        v0: PointD,
        v1: PointD,
        v2: PointD,
        d1: PointD,
        d2: PointD,
        limit: f64,
    ) {
        let side1 = offset(v1, d1);
        let side2 = offset(v1, d2);

        match calc_intersection(offset(v0, d1), side1, side2, offset(v2, d2)) {
            Some(pi) => {
                if calc_distance(v1, pi) <= self.width * limit {
                    out.push(pi);
                    return;
                }
            }
            None => {
                // Parallel segments: straight continuation keeps one point,
                // a full reversal falls through to the bevel.
                if (cross_product(v0, v1, side1) < 0.0) == (cross_product(v1, v2, side1) < 0.0) {
                    out.push(side1);
                    return;
                }
            }
        }

        // Miter limit exceeded, revert to bevel.
        out.push(side1);
        out.push(side2);
    }
}

/// Point offset to the stroke side by the perpendicular `d`.
#[inline]
fn offset(v: PointD, d: PointD) -> PointD {
    PointD::new(v.x + d.x, v.y - d.y)
}

/// Butt cap at `v0` for the segment toward `v1` of length `len`.
fn calc_cap(out: &mut Vec<PointD>, width: f64, v0: PointD, v1: PointD, len: f64) {
    let dx = (v1.y - v0.y) / len * width;
    let dy = (v1.x - v0.x) / len * width;
    out.push(PointD::new(v0.x - dx, v0.y + dy));
    out.push(PointD::new(v0.x + dx, v0.y - dy));
}

impl Default for Stroker {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Stroker {
    fn rewind(&mut self, _path_id: u32) {
        self.build();
        self.out_vertex = 0;
        self.status = Status::MoveTo;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        loop {
            match self.status {
                Status::MoveTo | Status::LineTo => {
                    if self.out_vertex >= self.out_vertices.len() {
                        self.status = if self.out_vertices.is_empty() {
                            Status::Stop
                        } else {
                            Status::EndPoly
                        };
                        continue;
                    }
                    let p = self.out_vertices[self.out_vertex];
                    self.out_vertex += 1;
                    *x = p.x;
                    *y = p.y;
                    let cmd = if self.status == Status::MoveTo {
                        PATH_CMD_MOVE_TO
                    } else {
                        PATH_CMD_LINE_TO
                    };
                    self.status = Status::LineTo;
                    return cmd;
                }
                Status::EndPoly => {
                    self.status = Status::Stop;
                    return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
                }
                Status::Stop => return PATH_CMD_STOP,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
