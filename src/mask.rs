//! Image-sized mask holding the stroked tab curves.
//!
//! Each tab goes through the full pipeline on its own: cardinal spline,
//! stroke outline, scanline rasterizer, then a solid blend into the mask.
//! Later tabs blend over earlier ones where their strokes overlap.

use crate::color::Rgba8;
use crate::curves::CardinalSpline;
use crate::rasterizer_scanline_aa::{RasterizerScanlineAa, ScanlineU8};
use crate::renderer::{render_scanlines_aa_solid, SurfaceRenderer};
use crate::stroke::Stroker;
use crate::surface::Surface;
use crate::tab::TabCurve;

/// Rasterized tab outlines over a transparent background.
///
/// The pipeline buffers are kept between rebuilds, so a rebuild after a
/// parameter change allocates nothing once warmed up.
pub struct MaskSurface {
    surface: Surface,
    spline: CardinalSpline,
    stroker: Stroker,
    ras: RasterizerScanlineAa,
    sl: ScanlineU8,
}

impl MaskSurface {
    /// A fully transparent mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: Surface::new(width, height),
            spline: CardinalSpline::new(),
            stroker: Stroker::new(),
            ras: RasterizerScanlineAa::new(),
            sl: ScanlineU8::new(),
        }
    }

    /// Clear the mask and draw every curve in order with `color` at
    /// `line_width` pixels.
    ///
    /// Equal inputs always give bit-identical masks.
    pub fn rebuild(&mut self, curves: &[TabCurve], color: Rgba8, line_width: u32) {
        self.surface.clear(Rgba8::TRANSPARENT);
        self.stroker.set_width(line_width as f64);

        let mut ren = SurfaceRenderer::new(&mut self.surface);
        for curve in curves {
            self.spline.init(&curve.points);
            self.stroker.add_path(&mut self.spline);
            self.ras.reset();
            self.ras.add_path(&mut self.stroker, 0);
            render_scanlines_aa_solid(&mut self.ras, &mut self.sl, &mut ren, &color);
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        self.surface.pixel(x, y)
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }
}

impl std::fmt::Debug for MaskSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::RectI;
    use crate::config::Pattern;
    use crate::grid::GridLayout;
    use crate::pattern::PatternBuilder;
    use crate::tab::Apex;

    fn curves(w: i32, h: i32, scale: f64) -> Vec<TabCurve> {
        let g = GridLayout::new(RectI::new(0, 0, w, h), scale, (0.0, 0.0)).unwrap();
        PatternBuilder::new(&g, Pattern::AltHorVer).build()
    }

    #[test]
    fn test_new_mask_is_transparent() {
        let m = MaskSurface::new(7, 5);
        assert_eq!((m.width(), m.height()), (7, 5));
        assert!(m.surface().pixels().iter().all(|p| p.is_transparent()));
    }

    #[test]
    fn test_empty_curve_list_clears_mask() {
        let mut m = MaskSurface::new(300, 300);
        m.rebuild(&curves(300, 300, 1.0), Rgba8::BLACK, 2);
        assert!(m.surface().pixels().iter().any(|p| !p.is_transparent()));
        m.rebuild(&[], Rgba8::BLACK, 2);
        assert!(m.surface().pixels().iter().all(|p| p.is_transparent()));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let tabs = curves(300, 300, 1.0);
        let mut a = MaskSurface::new(300, 300);
        a.rebuild(&tabs, Rgba8::new_opaque(10, 20, 30), 3);
        let first = a.surface().clone();
        a.rebuild(&tabs, Rgba8::new_opaque(10, 20, 30), 3);
        assert_eq!(a.surface(), &first);

        let mut b = MaskSurface::new(300, 300);
        b.rebuild(&tabs, Rgba8::new_opaque(10, 20, 30), 3);
        assert_eq!(b.surface(), &first);
    }

    #[test]
    fn test_stroke_covers_control_points() {
        let tabs = curves(300, 300, 1.0);
        let mut m = MaskSurface::new(300, 300);
        m.rebuild(&tabs, Rgba8::BLACK, 2);
        let bounds = m.surface().bounds();
        for tab in &tabs {
            for p in &tab.points {
                let (x, y) = (p.x.floor() as i32, p.y.floor() as i32);
                if bounds.hit_test(x, y) {
                    assert!(m.pixel(x, y).a > 0, "{:?} point ({x}, {y}) not drawn", tab.apex);
                }
            }
        }
    }

    #[test]
    fn test_mask_keeps_line_color() {
        let red = Rgba8::new_opaque(200, 0, 0);
        let mut m = MaskSurface::new(300, 300);
        m.rebuild(&curves(300, 300, 1.0), red, 4);
        let drawn: Vec<Rgba8> = m
            .surface()
            .pixels()
            .iter()
            .copied()
            .filter(|p| p.a >= 128)
            .collect();
        assert!(drawn.iter().any(|p| p.a == 255));
        // Straight alpha: partially covered pixels keep the line color.
        assert!(drawn.iter().all(|p| p.g == 0 && p.b == 0 && p.r.abs_diff(200) <= 3));
    }

    #[test]
    fn test_wider_lines_cover_more_pixels() {
        let tabs = curves(300, 300, 1.0);
        let count = |w: u32| {
            let mut m = MaskSurface::new(300, 300);
            m.rebuild(&tabs, Rgba8::BLACK, w);
            m.surface().pixels().iter().filter(|p| p.a > 0).count()
        };
        assert!(count(6) > count(2));
    }

    #[test]
    fn test_tab_straddling_the_edge_is_clipped() {
        let g = GridLayout::new(RectI::new(0, 0, 200, 200), 1.0, (0.0, 0.0)).unwrap();
        let tab = TabCurve::generate(Apex::Down, 0, 1, &g);
        let mut m = MaskSurface::new(150, 150);
        m.rebuild(&[tab], Rgba8::BLACK, 2);
        assert!(m.pixel(110, 100).a > 0);
        assert!((0..150).any(|y| m.pixel(149, y).a > 0));
    }
}
