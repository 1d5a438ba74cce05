//! # jigsaw-puzzle
//!
//! Procedural jigsaw puzzle line pattern over a rectangular region of an
//! image, composited onto the source pixels either as a cut-out (the tab
//! outlines become transparent) or as an overlaid colored line.
//!
//! ## Architecture
//!
//! The effect is split into a rebuild stage, run once per configuration
//! change, and a tile stage, run once per work rectangle:
//!
//! 1. **Grid layout**: whole-cell grid over the work area
//! 2. **Tab curves**: 7-point notch profile per interior grid segment
//! 3. **Pattern**: apex alternation over all interior grid lines
//! 4. **Mask**: cardinal spline → stroke → scanline rasterizer → RGBA mask
//! 5. **Compositor**: per-pixel combine of source, mask and puzzle bounds
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use jigsaw_puzzle::{Configuration, JigsawEffect, RectI, Surface};
//!
//! let src = Surface::new(300, 300);
//! let mut dst = Surface::new(300, 300);
//! let mut effect = JigsawEffect::new(300, 300);
//! effect.rebuild(&Configuration::default(), RectI::new(0, 0, 300, 300))?;
//! effect.render_tile(&mut dst, &src, RectI::new(0, 0, 300, 300), &AtomicBool::new(false));
//! # Ok::<(), jigsaw_puzzle::Error>(())
//! ```

// Foundation types & math
pub mod basics;
pub mod color;
pub mod error;
pub mod math;
pub mod surface;

// Pattern geometry
pub mod config;
pub mod grid;
pub mod pattern;
pub mod tab;

// Curve flattening & stroking
pub mod curves;
pub mod stroke;

// Scanline rasterizer & renderer
pub mod rasterizer_cells_aa;
pub mod rasterizer_scanline_aa;
pub mod renderer;

// Mask, compositing & facade
pub mod compositor;
pub mod effect;
pub mod mask;

pub use basics::{PointD, RectI};
pub use color::Rgba8;
pub use compositor::{Compositor, RenderStatus};
pub use config::{Configuration, ConfigurationBuilder, Pattern};
pub use effect::JigsawEffect;
pub use error::{Error, Result};
pub use grid::GridLayout;
pub use mask::MaskSurface;
pub use pattern::PatternBuilder;
pub use surface::{Surface, SurfaceBandMut, SurfaceRowsMut};
pub use tab::{Apex, TabCurve};
