//! 8-bit RGBA color and straight-alpha blending.
//!
//! All surfaces in this crate store non-premultiplied ("straight") RGBA.
//! Blending premultiplies internally, interpolates, and demultiplies the
//! result, the same way a plain (non-premultiplied) RGBA blender does.

use crate::basics::CoverType;

/// RGBA color with u8 components, non-premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Decode a `0xRRGGBB` integer as an opaque color. Bits above the low
    /// 24 are ignored, like the host's opaque-int color property.
    pub const fn from_opaque_u32(rgb: u32) -> Self {
        Self::new_opaque((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Encode the color channels as `0xRRGGBB`.
    pub const fn to_opaque_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Same color channels with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Fixed-point multiply, exact over u8.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Multiply a color component by a cover.
    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate p to q by a, assuming q is premultiplied by a.
    #[inline]
    pub fn prelerp(p: u8, q: u8, a: u8) -> u8 {
        p.wrapping_add(q).wrapping_sub(Self::multiply(p, a))
    }

    /// Interpolate p to q by a.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn premultiply(&mut self) -> &mut Self {
        if self.a != Self::BASE_MASK as u8 {
            if self.a == 0 {
                self.r = 0;
                self.g = 0;
                self.b = 0;
            } else {
                self.r = Self::multiply(self.r, self.a);
                self.g = Self::multiply(self.g, self.a);
                self.b = Self::multiply(self.b, self.a);
            }
        }
        self
    }

    pub fn demultiply(&mut self) -> &mut Self {
        if (self.a as u32) < Self::BASE_MASK {
            if self.a == 0 {
                self.r = 0;
                self.g = 0;
                self.b = 0;
            } else {
                let r_ = (self.r as u32 * Self::BASE_MASK) / self.a as u32;
                let g_ = (self.g as u32 * Self::BASE_MASK) / self.a as u32;
                let b_ = (self.b as u32 * Self::BASE_MASK) / self.a as u32;
                self.r = r_.min(Self::BASE_MASK) as u8;
                self.g = g_.min(Self::BASE_MASK) as u8;
                self.b = b_.min(Self::BASE_MASK) as u8;
            }
        }
        self
    }

    /// Blend the color channels of `c` over `self` with effective opacity
    /// `alpha` (straight alpha "over").
    ///
    /// `alpha == 255` replaces the pixel, `alpha == 0` leaves it untouched.
    #[inline]
    pub fn blend_plain(&mut self, c: &Rgba8, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if alpha == Self::BASE_MASK as u8 {
            *self = c.with_alpha(alpha);
            return;
        }
        let a = self.a;
        let r = Self::multiply(self.r, a);
        let g = Self::multiply(self.g, a);
        let b = Self::multiply(self.b, a);
        self.r = Self::lerp(r, c.r, alpha);
        self.g = Self::lerp(g, c.g, alpha);
        self.b = Self::lerp(b, c.b, alpha);
        self.a = Self::prelerp(a, alpha, alpha);
        self.demultiply();
    }

    /// Normal-mode composition of `top` over `bottom`, both straight alpha.
    pub fn over(bottom: Rgba8, top: Rgba8) -> Rgba8 {
        let mut out = bottom;
        out.blend_plain(&top, top.a);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        assert_eq!(Rgba8::multiply(255, 255), 255);
        assert_eq!(Rgba8::multiply(255, 0), 0);
        assert_eq!(Rgba8::multiply(128, 255), 128);
        assert_eq!(Rgba8::multiply(255, 128), 128);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Rgba8::lerp(10, 200, 0), 10);
        assert_eq!(Rgba8::lerp(10, 200, 255), 200);
        assert_eq!(Rgba8::lerp(200, 10, 255), 10);
    }

    #[test]
    fn test_opaque_u32_round_trip() {
        let c = Rgba8::from_opaque_u32(0xFF12_3456);
        assert_eq!(c, Rgba8::new(0x12, 0x34, 0x56, 255));
        assert_eq!(c.to_opaque_u32(), 0x12_3456);
    }

    #[test]
    fn test_premultiply_demultiply() {
        let mut c = Rgba8::new(255, 128, 0, 128);
        c.premultiply();
        assert_eq!(c.r, 128);
        assert_eq!(c.b, 0);
        c.demultiply();
        assert!(c.r >= 254);
        assert_eq!(c.b, 0);

        let mut t = Rgba8::new(9, 9, 9, 0);
        t.premultiply();
        assert_eq!(t, Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_blend_plain_onto_transparent_keeps_color() {
        let red = Rgba8::new_opaque(255, 0, 0);
        let mut p = Rgba8::TRANSPARENT;
        p.blend_plain(&red, 128);
        assert_eq!(p.a, 128);
        assert_eq!(p.r, 255, "straight color must not darken on empty pixels");
        assert_eq!(p.g, 0);
    }

    #[test]
    fn test_blend_plain_full_and_zero_alpha() {
        let green = Rgba8::new_opaque(0, 255, 0);
        let mut p = Rgba8::new(10, 20, 30, 40);
        p.blend_plain(&green, 0);
        assert_eq!(p, Rgba8::new(10, 20, 30, 40));
        p.blend_plain(&green, 255);
        assert_eq!(p, green);
    }

    #[test]
    fn test_blend_plain_accumulates_alpha() {
        let c = Rgba8::new_opaque(0, 0, 255);
        let mut p = Rgba8::TRANSPARENT;
        p.blend_plain(&c, 128);
        let first = p.a;
        p.blend_plain(&c, 128);
        assert!(p.a > first);
        assert!(p.a < 255);
    }

    #[test]
    fn test_over_opaque_background() {
        let white = Rgba8::new_opaque(255, 255, 255);
        let half_black = Rgba8::new(0, 0, 0, 128);
        let out = Rgba8::over(white, half_black);
        assert_eq!(out.a, 255);
        assert!((126..=128).contains(&out.r), "got {}", out.r);

        assert_eq!(Rgba8::over(white, Rgba8::TRANSPARENT), white);
        assert_eq!(Rgba8::over(white, Rgba8::BLACK), Rgba8::BLACK);
    }
}
