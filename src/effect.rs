//! Effect facade: rebuild the pattern once per configuration, then render
//! any number of tiles against it.

use std::sync::atomic::AtomicBool;

use log::debug;

use crate::basics::RectI;
use crate::compositor::{Compositor, RenderStatus};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::grid::GridLayout;
use crate::mask::MaskSurface;
use crate::pattern::PatternBuilder;
use crate::surface::{Surface, SurfaceBandMut, SurfaceRowsMut};

/// Jigsaw effect for one image size.
///
/// [`rebuild`](Self::rebuild) takes `&mut self` and must finish before any
/// rendering; the render methods take `&self` and may run concurrently on
/// disjoint destination bands.
#[derive(Debug)]
pub struct JigsawEffect {
    width: u32,
    height: u32,
    mask: MaskSurface,
    layout: Option<GridLayout>,
    transparent: bool,
    tab_count: usize,
}

impl JigsawEffect {
    /// Effect for images of `width` x `height` pixels. Nothing can be
    /// rendered until the first [`rebuild`](Self::rebuild).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mask: MaskSurface::new(width, height),
            layout: None,
            transparent: true,
            tab_count: 0,
        }
    }

    pub fn bounds(&self) -> RectI {
        RectI::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Lay out the grid over `work_area`, generate the tabs and redraw the
    /// mask.
    ///
    /// On error the previous pattern stays in place.
    pub fn rebuild(&mut self, config: &Configuration, work_area: RectI) -> Result<()> {
        config.validate()?;
        if work_area.is_empty() {
            return Err(Error::EmptyWorkArea);
        }
        let bounds = self.bounds();
        if !bounds.contains_rect(&work_area) {
            return Err(Error::WorkAreaOutOfBounds { work_area, bounds });
        }

        let layout = GridLayout::new(work_area, config.scale(), config.offset())?;
        let curves = PatternBuilder::new(&layout, config.pattern()).build();
        debug!(
            "jigsaw rebuild: work area {:?}, puzzle {:?}, {}x{} cells of {:.1}px, {} tabs ({})",
            work_area,
            layout.puzzle_rect(),
            layout.cols(),
            layout.rows(),
            layout.cell_size(),
            curves.len(),
            config.pattern(),
        );

        self.mask
            .rebuild(&curves, config.line_color(), config.line_width());
        self.layout = Some(layout);
        self.transparent = config.transparent();
        self.tab_count = curves.len();
        Ok(())
    }

    /// Layout of the last successful rebuild.
    pub fn layout(&self) -> Option<&GridLayout> {
        self.layout.as_ref()
    }

    pub fn mask(&self) -> &MaskSurface {
        &self.mask
    }

    pub fn tab_count(&self) -> usize {
        self.tab_count
    }

    /// Compositor over the current pattern. Panics before the first
    /// rebuild.
    pub fn compositor(&self) -> Compositor<'_> {
        let Some(layout) = self.layout.as_ref() else {
            panic!("JigsawEffect rendered before the first rebuild");
        };
        Compositor::new(layout, self.mask.surface(), self.transparent)
    }

    /// Composite `rect` of `src` into `dst`, which is the whole destination
    /// image or one band of it.
    ///
    /// Panics when `src` does not match the effect size or `rect` is not
    /// inside `dst`.
    pub fn render_tile<D: SurfaceRowsMut + ?Sized>(
        &self,
        dst: &mut D,
        src: &Surface,
        rect: RectI,
        cancel: &AtomicBool,
    ) -> RenderStatus {
        self.check_source(src);
        self.compositor().render_tile(dst, src, rect, cancel)
    }

    /// Composite the parts of `rects` that fall inside `band`.
    ///
    /// Panics when a rectangle is not inside the image, even if its part
    /// within `band` would be.
    pub fn render_band(
        &self,
        band: &mut SurfaceBandMut<'_>,
        src: &Surface,
        rects: &[RectI],
        cancel: &AtomicBool,
    ) -> RenderStatus {
        self.check_source(src);
        let compositor = self.compositor();
        let band_bounds = band.bounds();
        for rect in rects {
            assert!(
                self.bounds().contains_rect(rect),
                "tile {rect:?} outside image {:?}",
                self.bounds()
            );
            let part = rect.intersect(&band_bounds);
            if part.is_empty() {
                continue;
            }
            if compositor.render_tile(&mut *band, src, part, cancel) == RenderStatus::Cancelled {
                return RenderStatus::Cancelled;
            }
        }
        RenderStatus::Completed
    }

    /// Composite every rectangle of `rects` in order into `dst`.
    pub fn render(
        &self,
        dst: &mut Surface,
        src: &Surface,
        rects: &[RectI],
        cancel: &AtomicBool,
    ) -> RenderStatus {
        assert_eq!(
            (dst.width(), dst.height()),
            (self.width, self.height),
            "destination size does not match the effect"
        );
        self.check_source(src);
        let compositor = self.compositor();
        for &rect in rects {
            if compositor.render_tile(&mut *dst, src, rect, cancel) == RenderStatus::Cancelled {
                return RenderStatus::Cancelled;
            }
        }
        RenderStatus::Completed
    }

    fn check_source(&self, src: &Surface) {
        assert_eq!(
            (src.width(), src.height()),
            (self.width, self.height),
            "source size does not match the effect"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::config::Pattern;

    fn gradient(w: u32, h: u32) -> Surface {
        let mut s = Surface::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                s.set_pixel(x, y, Rgba8::new((x * 3) as u8, (y * 5) as u8, 77, 255));
            }
        }
        s
    }

    fn config(pattern: Pattern, transparent: bool) -> Configuration {
        Configuration::builder()
            .pattern(pattern)
            .transparent(transparent)
            .line_width(3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_rebuild_300x300() {
        let mut fx = JigsawEffect::new(300, 300);
        assert!(fx.layout().is_none());
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        assert_eq!(fx.tab_count(), 12);
        let layout = fx.layout().unwrap();
        assert_eq!((layout.rows(), layout.cols()), (3, 3));
        assert!(fx.mask().surface().pixels().iter().any(|p| p.a > 0));
    }

    #[test]
    fn test_rebuild_sub_rect_work_area() {
        let mut fx = JigsawEffect::new(400, 300);
        fx.rebuild(&Configuration::default(), RectI::new(50, 20, 300, 270))
            .unwrap();
        let layout = fx.layout().unwrap();
        assert_eq!(layout.puzzle_rect(), RectI::new(75, 45, 275, 245));
        assert_eq!(fx.tab_count(), 4);
    }

    #[test]
    fn test_rebuild_rejects_bad_work_area() {
        let mut fx = JigsawEffect::new(100, 100);
        assert_eq!(
            fx.rebuild(&Configuration::default(), RectI::new(10, 10, 10, 50)),
            Err(Error::EmptyWorkArea)
        );
        let outside = RectI::new(0, 0, 101, 100);
        assert_eq!(
            fx.rebuild(&Configuration::default(), outside),
            Err(Error::WorkAreaOutOfBounds {
                work_area: outside,
                bounds: fx.bounds(),
            })
        );
        assert!(fx.layout().is_none());
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_pattern() {
        let mut fx = JigsawEffect::new(300, 300);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        let mask = fx.mask().surface().clone();
        assert!(fx
            .rebuild(&Configuration::default(), RectI::new(0, 0, 0, 0))
            .is_err());
        assert_eq!(fx.tab_count(), 12);
        assert_eq!(fx.mask().surface(), &mask);
    }

    #[test]
    fn test_rebuild_rejects_grid_too_dense() {
        let mut fx = JigsawEffect::new(300, 300);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        let dense = Configuration::builder().scale(1e-9).build().unwrap();
        assert!(matches!(
            fx.rebuild(&dense, fx.bounds()),
            Err(Error::GridTooDense { .. })
        ));
        assert_eq!(fx.tab_count(), 12);
        assert_eq!(fx.layout().map(|l| l.rows()), Some(3));
    }

    #[test]
    fn test_degenerate_work_area_passes_source_through() {
        let mut fx = JigsawEffect::new(80, 60);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        assert_eq!(fx.tab_count(), 0);
        let src = gradient(80, 60);
        let mut dst = Surface::new(80, 60);
        fx.render(&mut dst, &src, &[fx.bounds()], &AtomicBool::new(false));
        assert_eq!(dst, src);
    }

    #[test]
    fn test_tile_split_equivalence() {
        for transparent in [true, false] {
            let mut fx = JigsawEffect::new(250, 250);
            fx.rebuild(&config(Pattern::AltHor, transparent), fx.bounds())
                .unwrap();
            let src = gradient(250, 250);
            let never = AtomicBool::new(false);

            let mut whole = Surface::new(250, 250);
            fx.render_tile(&mut whole, &src, fx.bounds(), &never);

            let mut split = Surface::new(250, 250);
            let tiles: Vec<RectI> = (0..5)
                .flat_map(|ty| (0..5).map(move |tx| RectI::from_xywh(tx * 50, ty * 50, 50, 50)))
                .rev()
                .collect();
            assert_eq!(
                fx.render(&mut split, &src, &tiles, &never),
                RenderStatus::Completed
            );
            assert_eq!(split, whole);
        }
    }

    #[test]
    fn test_render_band_clips_rects_to_band() {
        let mut fx = JigsawEffect::new(300, 300);
        fx.rebuild(&config(Pattern::AltVer, false), fx.bounds())
            .unwrap();
        let src = gradient(300, 300);
        let never = AtomicBool::new(false);
        let selection = [RectI::new(0, 0, 300, 300)];

        let mut whole = Surface::new(300, 300);
        fx.render(&mut whole, &src, &selection, &never);

        let mut banded = Surface::new(300, 300);
        std::thread::scope(|s| {
            for mut band in banded.bands_mut(70) {
                let (fx, src, never) = (&fx, &src, &never);
                s.spawn(move || fx.render_band(&mut band, src, &selection, never));
            }
        });
        assert_eq!(banded, whole);
    }

    #[test]
    fn test_transparent_mode_preserves_channels() {
        let mut fx = JigsawEffect::new(300, 300);
        fx.rebuild(&config(Pattern::AltHorVer, true), fx.bounds())
            .unwrap();
        let src = gradient(300, 300);
        let mut dst = Surface::new(300, 300);
        fx.render(&mut dst, &src, &[fx.bounds()], &AtomicBool::new(false));
        for (s, d) in src.pixels().iter().zip(dst.pixels()) {
            assert_eq!((s.r, s.g, s.b), (d.r, d.g, d.b));
        }
        assert!(dst.pixels().iter().any(|p| p.a == 0));
    }

    #[test]
    fn test_cancelled_render_stops() {
        let mut fx = JigsawEffect::new(300, 300);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        let src = gradient(300, 300);
        let mut dst = Surface::new(300, 300);
        let status = fx.render(&mut dst, &src, &[fx.bounds()], &AtomicBool::new(true));
        assert_eq!(status, RenderStatus::Cancelled);
        assert!(dst.pixels().iter().all(|p| p.is_transparent()));
    }

    #[test]
    #[should_panic(expected = "before the first rebuild")]
    fn test_render_before_rebuild_panics() {
        let fx = JigsawEffect::new(10, 10);
        let src = Surface::new(10, 10);
        let mut dst = Surface::new(10, 10);
        fx.render(&mut dst, &src, &[fx.bounds()], &AtomicBool::new(false));
    }

    #[test]
    #[should_panic(expected = "outside destination")]
    fn test_out_of_bounds_tile_panics() {
        let mut fx = JigsawEffect::new(100, 100);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        let src = Surface::new(100, 100);
        let mut dst = Surface::new(100, 100);
        fx.render_tile(&mut dst, &src, RectI::new(-1, 0, 10, 10), &AtomicBool::new(false));
    }

    #[test]
    #[should_panic(expected = "outside image")]
    fn test_render_band_rejects_rect_past_the_image() {
        let mut fx = JigsawEffect::new(100, 100);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        let src = Surface::new(100, 100);
        let mut dst = Surface::new(100, 100);
        for mut band in dst.bands_mut(50) {
            fx.render_band(
                &mut band,
                &src,
                &[RectI::new(-50, -50, 400, 400)],
                &AtomicBool::new(false),
            );
        }
    }

    #[test]
    #[should_panic(expected = "source size")]
    fn test_mismatched_source_panics() {
        let mut fx = JigsawEffect::new(100, 100);
        fx.rebuild(&Configuration::default(), fx.bounds()).unwrap();
        let src = Surface::new(50, 100);
        let mut dst = Surface::new(100, 100);
        fx.render(&mut dst, &src, &[RectI::new(0, 0, 10, 10)], &AtomicBool::new(false));
    }
}
