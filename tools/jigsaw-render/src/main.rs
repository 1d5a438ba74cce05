// Apply the jigsaw puzzle effect to an image.
//
// Usage:
//   jigsaw-render <input> <output> [--scale 1.5] [--pattern alt-hor]
//                 [--opaque --color 3366FF] [--selection x,y,w,h]

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use jigsaw_puzzle::{Configuration, JigsawEffect, Pattern, RectI, RenderStatus, Rgba8, Surface};
use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

#[derive(Parser, Debug)]
#[command(name = "jigsaw-render", about = "Cut a jigsaw puzzle pattern into an image")]
struct Args {
    /// Input image (PNG, JPEG, BMP)
    input: PathBuf,

    /// Output image; the format follows the extension
    output: PathBuf,

    /// Cell size as a multiple of 100 pixels
    #[arg(long, default_value = "1.0")]
    scale: f64,

    /// Tab line width in pixels
    #[arg(long, default_value = "2")]
    line_width: u32,

    /// alt-hor-ver, alt-none, alt-hor, alt-ver, or an index 0-3
    #[arg(long, default_value = "alt-hor-ver")]
    pattern: Pattern,

    /// Draw the lines in color instead of cutting them out
    #[arg(long)]
    opaque: bool,

    /// Line color as RRGGBB hex
    #[arg(long, default_value = "000000", value_parser = parse_color)]
    color: Rgba8,

    /// Horizontal grid offset in [-1, 1]
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    offset_x: f64,

    /// Vertical grid offset in [-1, 1]
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    offset_y: f64,

    /// Work area as x,y,w,h (defaults to the whole image)
    #[arg(long, value_parser = parse_selection)]
    selection: Option<RectI>,

    /// Worker threads for compositing (defaults to available cores)
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Write only the rendered line mask
    #[arg(long)]
    mask_only: bool,
}

fn parse_color(s: &str) -> Result<Rgba8, String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 {
        return Err(format!("expected RRGGBB, got {s:?}"));
    }
    u32::from_str_radix(hex, 16)
        .map(Rgba8::from_opaque_u32)
        .map_err(|e| format!("invalid color {s:?}: {e}"))
}

fn parse_selection(s: &str) -> Result<RectI, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid selection {s:?}: {e}"))?;
    match parts[..] {
        [x, y, w, h] => Ok(RectI::from_xywh(x, y, w, h)),
        _ => Err(format!("expected x,y,w,h, got {s:?}")),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let img = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    let src = Surface::from_rgba_bytes(width, height, img.as_raw());

    let config = Configuration::builder()
        .scale(args.scale)
        .line_width(args.line_width)
        .pattern(args.pattern)
        .transparent(!args.opaque)
        .line_color(args.color)
        .offset(args.offset_x, args.offset_y)
        .build()
        .context("invalid effect settings")?;

    let work_area = args.selection.unwrap_or_else(|| src.bounds());
    let mut fx = JigsawEffect::new(width, height);
    let start = Instant::now();
    fx.rebuild(&config, work_area)
        .context("failed to build the puzzle pattern")?;
    info!(
        "built {} tabs ({}) in {:?}",
        fx.tab_count(),
        config.pattern(),
        start.elapsed()
    );

    let out = if args.mask_only {
        fx.mask().surface().clone()
    } else {
        composite(&fx, &src, work_area, args.threads)?
    };

    let bytes = out.to_rgba_bytes();
    let Some(result) = image::RgbaImage::from_raw(width, height, bytes) else {
        bail!("output buffer does not match {width}x{height}");
    };
    result
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Wrote result ({width}x{height}) to {:?}", args.output);
    Ok(())
}

/// Copy the source and composite the work area in horizontal bands on a
/// rayon pool, one band per worker thread.
fn composite(
    fx: &JigsawEffect,
    src: &Surface,
    work_area: RectI,
    threads: Option<NonZeroUsize>,
) -> Result<Surface> {
    let mut builder = ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n.get());
    }
    let pool = builder
        .build()
        .context("failed to start the compositing thread pool")?;
    let bands = pool.current_num_threads().max(1) as u32;
    let rows_per_band = ((src.height() + bands - 1) / bands).max(1);
    let cancel = AtomicBool::new(false);

    let mut dst = src.clone();
    let start = Instant::now();
    let statuses: Vec<RenderStatus> = pool.install(|| {
        dst.bands_mut(rows_per_band)
            .into_par_iter()
            .map(|mut band| fx.render_band(&mut band, src, &[work_area], &cancel))
            .collect()
    });
    if statuses.contains(&RenderStatus::Cancelled) {
        bail!("compositing was cancelled");
    }
    info!(
        "composited {:?} on {} threads in {:?}",
        work_area,
        pool.current_num_threads(),
        start.elapsed()
    );
    Ok(dst)
}
