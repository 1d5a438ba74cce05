//! Effect configuration.
//!
//! [`Configuration`] is immutable once built. Values are validated by
//! [`ConfigurationBuilder::build`] and rejected, never clamped.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::color::Rgba8;
use crate::error::{Error, Result};

// ============================================================================
// Pattern
// ============================================================================

/// How tab apexes alternate across the interior grid lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pattern {
    /// Both horizontal and vertical lines alternate by line parity.
    #[default]
    AltHorVer,
    /// Apex depends only on the position along the line.
    AltNone,
    /// Only horizontal lines alternate by line parity.
    AltHor,
    /// Only vertical lines alternate by line parity.
    AltVer,
}

impl Pattern {
    pub const ALL: [Pattern; 4] = [
        Pattern::AltHorVer,
        Pattern::AltNone,
        Pattern::AltHor,
        Pattern::AltVer,
    ];

    /// Map a list-choice index to a pattern. Unknown indices fall back to
    /// [`Pattern::AltHorVer`].
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Pattern::AltNone,
            2 => Pattern::AltHor,
            3 => Pattern::AltVer,
            _ => Pattern::AltHorVer,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Pattern::AltHorVer => 0,
            Pattern::AltNone => 1,
            Pattern::AltHor => 2,
            Pattern::AltVer => 3,
        }
    }

    /// Outer alternation flags `(horizontal, vertical)`.
    pub fn alternation(self) -> (bool, bool) {
        match self {
            Pattern::AltHorVer => (true, true),
            Pattern::AltNone => (false, false),
            Pattern::AltHor => (true, false),
            Pattern::AltVer => (false, true),
        }
    }

    /// Short machine name, accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Pattern::AltHorVer => "alt-hor-ver",
            Pattern::AltNone => "alt-none",
            Pattern::AltHor => "alt-hor",
            Pattern::AltVer => "alt-ver",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pattern::AltHorVer => "Alternate Horizontal & Vertical",
            Pattern::AltNone => "Alternate Neither",
            Pattern::AltHor => "Alternate Horizontal",
            Pattern::AltVer => "Alternate Vertical",
        })
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Pattern::ALL
            .into_iter()
            .find(|p| p.name() == key || p.index().to_string() == key)
            .ok_or_else(|| Error::UnknownPattern(s.to_string()))
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Scale range offered by the host UI. Values outside it are valid but
/// unusual.
pub const SCALE_RANGE: (f64, f64) = (0.2, 10.0);
/// Line width range offered by the host UI.
pub const LINE_WIDTH_RANGE: (u32, u32) = (1, 10);

/// Immutable parameters for one pattern rebuild and its render passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    scale: f64,
    line_width: u32,
    pattern: Pattern,
    transparent: bool,
    line_color: Rgba8,
    offset: (f64, f64),
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            scale: 1.0,
            line_width: 2,
            pattern: Pattern::AltHorVer,
            transparent: true,
            line_color: Rgba8::BLACK,
            offset: (0.0, 0.0),
        }
    }
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Grid cell size multiplier; one cell is `100 * scale` pixels.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Stroke width in pixels.
    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Cut the tab lines out of the source instead of drawing them.
    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub fn line_color(&self) -> Rgba8 {
        self.line_color
    }

    /// Remainder distribution per axis, each in [-1, 1]. Zero centers the
    /// grid, 1 aligns it to the right/bottom of the work area.
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Check every field. Called by the builder.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidScale(self.scale));
        }
        if self.line_width < 1 {
            return Err(Error::InvalidLineWidth(self.line_width));
        }
        let (x, y) = self.offset;
        let in_range = |v: f64| (-1.0..=1.0).contains(&v);
        if !in_range(x) || !in_range(y) {
            return Err(Error::InvalidOffset { x, y });
        }

        if self.scale < SCALE_RANGE.0 || self.scale > SCALE_RANGE.1 {
            warn!(
                "scale {} is outside the usual range {:?}",
                self.scale, SCALE_RANGE
            );
        }
        if self.line_width > LINE_WIDTH_RANGE.1 {
            warn!(
                "line width {} is outside the usual range {:?}",
                self.line_width, LINE_WIDTH_RANGE
            );
        }
        Ok(())
    }
}

/// Builder for [`Configuration`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn line_width(mut self, line_width: u32) -> Self {
        self.config.line_width = line_width;
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.config.pattern = pattern;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.config.transparent = transparent;
        self
    }

    pub fn line_color(mut self, color: Rgba8) -> Self {
        self.config.line_color = color;
        self
    }

    pub fn offset(mut self, x: f64, y: f64) -> Self {
        self.config.offset = (x, y);
        self
    }

    pub fn build(self) -> Result<Configuration> {
        self.config.validate()?;
        Ok(self.config)
    }
}
