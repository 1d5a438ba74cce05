//! Clipped span renderer and the scanline render loop.
//!
//! [`SurfaceRenderer`] blends solid-color spans into a [`Surface`], clipping
//! every span to a clip box inside the surface. Coverage from the
//! rasterizer scales the color's own alpha before blending.

use crate::basics::{CoverType, RectI};
use crate::color::Rgba8;
use crate::rasterizer_scanline_aa::{RasterizerScanlineAa, Scanline, ScanlineU8};
use crate::surface::Surface;

// ============================================================================
// SurfaceRenderer
// ============================================================================

pub struct SurfaceRenderer<'a> {
    surface: &'a mut Surface,
    clip_box: RectI,
}

impl<'a> SurfaceRenderer<'a> {
    /// Renderer clipped to the whole surface.
    pub fn new(surface: &'a mut Surface) -> Self {
        let clip_box = surface.bounds();
        Self { surface, clip_box }
    }

    /// Restrict drawing to `clip` (intersected with the surface bounds).
    pub fn set_clip_box(&mut self, clip: RectI) {
        self.clip_box = clip.intersect(&self.surface.bounds());
    }

    pub fn clip_box(&self) -> RectI {
        self.clip_box
    }

    pub fn surface(&self) -> &Surface {
        self.surface
    }

    /// Blend `len` pixels of `c` starting at (x, y), each weighted by the
    /// matching entry of `covers`.
    pub fn blend_solid_hspan(
        &mut self,
        mut x: i32,
        y: i32,
        mut len: i32,
        c: &Rgba8,
        covers: &[CoverType],
    ) {
        let clip = self.clip_box;
        if y < clip.y1 || y >= clip.y2 || clip.is_empty() {
            return;
        }

        let mut covers_offset = 0usize;
        if x < clip.x1 {
            let d = clip.x1 - x;
            len -= d;
            if len <= 0 {
                return;
            }
            covers_offset = d as usize;
            x = clip.x1;
        }
        if x + len > clip.x2 {
            len = clip.x2 - x;
            if len <= 0 {
                return;
            }
        }

        let width = self.surface.width() as usize;
        let start = y as usize * width + x as usize;
        let row = &mut self.surface.pixels_mut()[start..start + len as usize];
        for (p, &cover) in row.iter_mut().zip(&covers[covers_offset..]) {
            p.blend_plain(c, Rgba8::mult_cover(c.a, cover));
        }
    }

    /// Blend a run of `len` pixels with uniform coverage.
    pub fn blend_hline(&mut self, x: i32, y: i32, len: i32, c: &Rgba8, cover: CoverType) {
        if len <= 0 {
            return;
        }
        let covers = vec![cover; len as usize];
        self.blend_solid_hspan(x, y, len, c, &covers);
    }
}

// ============================================================================
// Scanline render loop
// ============================================================================

/// Sweep everything in `ras` and blend it into `ren` as solid `color`.
pub fn render_scanlines_aa_solid(
    ras: &mut RasterizerScanlineAa,
    sl: &mut ScanlineU8,
    ren: &mut SurfaceRenderer<'_>,
    color: &Rgba8,
) {
    if !ras.rewind_scanlines() {
        return;
    }

    sl.reset(ras.min_x(), ras.max_x());
    while ras.sweep_scanline(sl) {
        let y = sl.y();
        for span in sl.spans() {
            ren.blend_solid_hspan(span.x, y, span.len, color, sl.span_covers(span));
        }
    }
}
