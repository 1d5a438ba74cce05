//! Tab curve control points.
//!
//! Every tab is a 7-point notch profile taken from a fixed template and
//! placed on one interior grid line. Up/Down tabs sit on horizontal lines,
//! Right/Left tabs on vertical lines.

use crate::basics::PointD;
use crate::grid::GridLayout;

/// Direction a tab bulges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Apex {
    Up,
    Right,
    Down,
    Left,
}

impl Apex {
    /// `true` for tabs on horizontal grid lines.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Apex::Up | Apex::Down)
    }

    /// Template offsets in units of scale. For horizontal tabs the first
    /// coordinate runs along the line, for vertical tabs the second does.
    pub fn template(self) -> &'static [(f64, f64); 7] {
        match self {
            Apex::Up => &TEMPLATE_UP,
            Apex::Down => &TEMPLATE_DOWN,
            Apex::Right => &TEMPLATE_RIGHT,
            Apex::Left => &TEMPLATE_LEFT,
        }
    }
}

const TEMPLATE_UP: [(f64, f64); 7] = [
    (0.0, 100.0),
    (40.0, 101.0),
    (36.0, 79.0),
    (50.0, 67.0),
    (64.0, 79.0),
    (60.0, 101.0),
    (100.0, 100.0),
];

const TEMPLATE_DOWN: [(f64, f64); 7] = [
    (0.0, 100.0),
    (40.0, 99.0),
    (36.0, 121.0),
    (50.0, 133.0),
    (64.0, 121.0),
    (60.0, 99.0),
    (100.0, 100.0),
];

const TEMPLATE_RIGHT: [(f64, f64); 7] = [
    (100.0, 0.0),
    (99.0, 40.0),
    (121.0, 36.0),
    (133.0, 50.0),
    (121.0, 64.0),
    (99.0, 60.0),
    (100.0, 100.0),
];

const TEMPLATE_LEFT: [(f64, f64); 7] = [
    (100.0, 0.0),
    (101.0, 40.0),
    (79.0, 36.0),
    (67.0, 50.0),
    (79.0, 64.0),
    (101.0, 60.0),
    (100.0, 100.0),
];

/// One tab: seven control points for an interpolating spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabCurve {
    pub apex: Apex,
    /// Interior grid line index.
    pub i: u32,
    /// Cell index along the line.
    pub i2: u32,
    pub points: [PointD; 7],
}

impl TabCurve {
    /// Place the template for `apex` on line `i`, cell `i2`.
    ///
    /// Horizontal tabs advance `x` by `i2` cells and `y` by `i` cells;
    /// vertical tabs swap the roles. Pure: equal inputs give bit-identical
    /// points.
    pub fn generate(apex: Apex, i: u32, i2: u32, layout: &GridLayout) -> TabCurve {
        let scale = layout.scale();
        let cell = layout.cell_size();
        let origin = layout.origin();
        let (step_x, step_y) = if apex.is_horizontal() {
            (i2 as f64, i as f64)
        } else {
            (i as f64, i2 as f64)
        };

        let mut points = [PointD::default(); 7];
        for (p, &(ox, oy)) in points.iter_mut().zip(apex.template()) {
            p.x = ox * scale + cell * step_x + origin.x;
            p.y = oy * scale + cell * step_y + origin.y;
        }
        TabCurve {
            apex,
            i,
            i2,
            points,
        }
    }
}
