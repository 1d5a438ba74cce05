//! Per-pixel compositing of source, mask and puzzle bounds.
//!
//! A [`Compositor`] borrows the results of the last rebuild and writes one
//! work rectangle at a time. It keeps no state between calls, so tiles can
//! be rendered in any order, or concurrently into disjoint bands, and give
//! the same image as a single call over the union.

use std::sync::atomic::{AtomicBool, Ordering};

use log::trace;

use crate::basics::RectI;
use crate::color::Rgba8;
use crate::grid::GridLayout;
use crate::surface::{Surface, SurfaceRowsMut};

/// Outcome of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Completed,
    /// The cancel flag was seen before the tile finished. Rows already
    /// written stay written.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    layout: &'a GridLayout,
    mask: &'a Surface,
    transparent: bool,
}

impl<'a> Compositor<'a> {
    pub fn new(layout: &'a GridLayout, mask: &'a Surface, transparent: bool) -> Self {
        Self {
            layout,
            mask,
            transparent,
        }
    }

    /// Combine one source pixel with the mask at (x, y).
    #[inline]
    pub fn composite_pixel(&self, x: i32, y: i32, src: Rgba8) -> Rgba8 {
        if self.layout.clips_border() && self.layout.is_outside(x, y) {
            return src.with_alpha(0);
        }
        let mask = self.mask.pixel(x, y);
        if self.transparent {
            src.with_alpha(255 - mask.a)
        } else {
            Rgba8::over(src, mask)
        }
    }

    /// Composite `rect` of `src` into `dst`.
    ///
    /// The cancel flag is polled before every row. Panics when `rect` is
    /// not inside `dst`, `src` and the mask.
    pub fn render_tile<D: SurfaceRowsMut + ?Sized>(
        &self,
        dst: &mut D,
        src: &Surface,
        rect: RectI,
        cancel: &AtomicBool,
    ) -> RenderStatus {
        let dst_bounds = dst.bounds();
        assert!(
            dst_bounds.contains_rect(&rect),
            "tile {rect:?} outside destination {dst_bounds:?}"
        );
        assert!(
            src.bounds().contains_rect(&rect),
            "tile {rect:?} outside source {:?}",
            src.bounds()
        );
        assert!(
            self.mask.bounds().contains_rect(&rect),
            "tile {rect:?} outside mask {:?}",
            self.mask.bounds()
        );
        if rect.is_empty() {
            return RenderStatus::Completed;
        }
        trace!("compositing tile {rect:?}");

        let x_start = (rect.x1 - dst_bounds.x1) as usize;
        let x_end = (rect.x2 - dst_bounds.x1) as usize;
        for y in rect.y1..rect.y2 {
            if cancel.load(Ordering::Relaxed) {
                trace!("tile {rect:?} cancelled at row {y}");
                return RenderStatus::Cancelled;
            }
            let src_row = &src.row(y)[rect.x1 as usize..rect.x2 as usize];
            let dst_row = &mut dst.row_mut(y)[x_start..x_end];
            for ((x, d), &s) in (rect.x1..).zip(dst_row.iter_mut()).zip(src_row) {
                *d = self.composite_pixel(x, y, s);
            }
        }
        RenderStatus::Completed
    }

    pub fn layout(&self) -> &GridLayout {
        self.layout
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }
}
