//! Owned RGBA pixel surfaces.
//!
//! A [`Surface`] is a flat row-major `Vec<Rgba8>` with no padding between
//! rows. The source image, the destination image and the mask are three
//! independent surfaces, so no aliasing can arise between them.
//!
//! [`Surface::bands_mut`] splits a surface into disjoint horizontal bands
//! that can be handed to separate threads for compositing.

use crate::basics::RectI;
use crate::color::Rgba8;

// ============================================================================
// Row access trait
// ============================================================================

/// Mutable row access in image coordinates.
///
/// Implemented by whole surfaces and by bands of a surface, so compositing
/// code can write into either.
pub trait SurfaceRowsMut {
    /// Pixels this target may write, in image coordinates.
    fn bounds(&self) -> RectI;

    /// Mutable slice of image row `y`, covering `bounds().x1..bounds().x2`.
    ///
    /// Panics if `y` is outside `bounds()`.
    fn row_mut(&mut self, y: i32) -> &mut [Rgba8];
}

// ============================================================================
// Surface
// ============================================================================

/// Owned row-major RGBA surface with straight (non-premultiplied) alpha.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<Rgba8>,
}

impl Surface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba8::TRANSPARENT)
    }

    /// Create a surface with every pixel set to `c`.
    pub fn filled(width: u32, height: u32, c: Rgba8) -> Self {
        Self {
            width,
            height,
            data: vec![c; width as usize * height as usize],
        }
    }

    /// Build from tightly packed RGBA bytes.
    /// Panics if `bytes.len() != width * height * 4`.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            width as usize * height as usize * 4,
            "byte count does not match {width}x{height} RGBA"
        );
        let data = bytes
            .chunks_exact(4)
            .map(|p| Rgba8::new(p[0], p[1], p[2], p[3]))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Tightly packed RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for p in &self.data {
            out.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full surface rectangle `(0, 0, width, height)`.
    pub fn bounds(&self) -> RectI {
        RectI::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        assert!(
            self.bounds().hit_test(x, y),
            "pixel ({x}, {y}) outside {}x{} surface",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        self.data[self.offset(x, y)]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, c: Rgba8) {
        let i = self.offset(x, y);
        self.data[i] = c;
    }

    /// Row `y` as a slice of `width` pixels.
    #[inline]
    pub fn row(&self, y: i32) -> &[Rgba8] {
        assert!(
            y >= 0 && (y as u32) < self.height,
            "row {y} outside surface of height {}",
            self.height
        );
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }

    /// Fill every pixel with `c`.
    pub fn clear(&mut self, c: Rgba8) {
        self.data.fill(c);
    }

    /// Split into disjoint horizontal bands of at most `rows_per_band` rows,
    /// top to bottom. Panics if `rows_per_band` is zero.
    pub fn bands_mut(&mut self, rows_per_band: u32) -> Vec<SurfaceBandMut<'_>> {
        assert!(rows_per_band > 0, "rows_per_band must be non-zero");
        let width = self.width;
        let chunk = rows_per_band as usize * width as usize;
        if chunk == 0 {
            return Vec::new();
        }
        self.data
            .chunks_mut(chunk)
            .enumerate()
            .map(|(i, data)| SurfaceBandMut {
                y0: (i as u32 * rows_per_band) as i32,
                width,
                data,
            })
            .collect()
    }
}

impl SurfaceRowsMut for Surface {
    fn bounds(&self) -> RectI {
        Surface::bounds(self)
    }

    #[inline]
    fn row_mut(&mut self, y: i32) -> &mut [Rgba8] {
        assert!(
            y >= 0 && (y as u32) < self.height,
            "row {y} outside surface of height {}",
            self.height
        );
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.data[start..start + w]
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SurfaceBandMut
// ============================================================================

/// A mutable band of full-width rows borrowed from a [`Surface`].
///
/// Rows are addressed in image coordinates, so a band starting at row 64
/// answers `row_mut(64)` with its first row.
pub struct SurfaceBandMut<'a> {
    y0: i32,
    width: u32,
    data: &'a mut [Rgba8],
}

impl<'a> SurfaceBandMut<'a> {
    /// First image row covered by the band.
    pub fn y0(&self) -> i32 {
        self.y0
    }

    pub fn rows(&self) -> u32 {
        if self.width == 0 {
            0
        } else {
            (self.data.len() / self.width as usize) as u32
        }
    }
}

impl<'a> SurfaceRowsMut for SurfaceBandMut<'a> {
    fn bounds(&self) -> RectI {
        RectI::new(0, self.y0, self.width as i32, self.y0 + self.rows() as i32)
    }

    #[inline]
    fn row_mut(&mut self, y: i32) -> &mut [Rgba8] {
        let rows = self.rows() as i32;
        assert!(
            y >= self.y0 && y < self.y0 + rows,
            "row {y} outside band {}..{}",
            self.y0,
            self.y0 + rows
        );
        let w = self.width as usize;
        let start = (y - self.y0) as usize * w;
        &mut self.data[start..start + w]
    }
}

impl<'a> std::fmt::Debug for SurfaceBandMut<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceBandMut")
            .field("y0", &self.y0)
            .field("width", &self.width)
            .field("rows", &self.rows())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
