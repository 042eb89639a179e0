use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mesh_displace::prelude::*;
use mesh_displace_examples::{init_tracing, load_offset_document, save_raster_png};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BakePath {
    Scanline,
    Rasterized,
}

/// Bakes a displacement map from a RON offset document.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Offset document (see assets/pinch.ron).
    #[arg(default_value = "crates/mesh_displace_examples/assets/pinch.ron")]
    document: PathBuf,
    /// Bake path to use.
    #[arg(long, value_enum, default_value_t = BakePath::Scanline)]
    path: BakePath,
    /// Output PNG.
    #[arg(long, short, default_value = "bake-from-document.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let doc = load_offset_document(&args.document)?;
    let offsets = doc.offsets()?;
    info!(
        "Loaded {} offset(s) from {}; compact form: {}.",
        offsets.len(),
        args.document.display(),
        offsets.to_compact()
    );

    let compiler = DisplacementCompiler::try_new(doc.config)?;
    let map = match args.path {
        BakePath::Scanline => compiler.compile_scanline(&offsets)?,
        BakePath::Rasterized => compiler.compile_rasterized(&offsets, &SoftwareUvRasterizer)?,
    };
    save_raster_png(&map, &args.output)?;
    Ok(())
}
