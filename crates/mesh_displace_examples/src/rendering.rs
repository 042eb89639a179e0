use std::path::Path;

use anyhow::{ensure, Context};
use glam::Vec2;
use image::{Rgba, RgbaImage};
use mesh_displace::channel::decode_channel;
use mesh_displace::codec::unpack_uv;
use mesh_displace::raster::RasterBuffer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber driven by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Writes a displacement map (or any RGBA raster) to a PNG file.
pub fn save_raster_png(raster: &RasterBuffer, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let (w, h) = raster.size();
    let img = RgbaImage::from_raw(w, h, raster.as_bytes().to_vec())
        .context("raster size does not match its byte length")?;
    save_image(&img, path)
}

/// Writes a packed UV buffer as a viewable image: the top 8 bits of U and V in red and
/// green, coverage in alpha.
pub fn save_uv_preview_png(
    buffer: &[u8],
    width: u32,
    height: u32,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    ensure!(
        buffer.len() == width as usize * height as usize * 4,
        "uv buffer holds {} bytes, expected {}x{}x4",
        buffer.len(),
        width,
        height
    );
    let mut img = RgbaImage::new(width, height);
    for (i, px) in buffer.chunks_exact(4).enumerate() {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        let (qu, qv) = unpack_uv([px[0], px[1], px[2], px[3]]);
        img.put_pixel(x, y, Rgba([(qu >> 4) as u8, (qv >> 4) as u8, 0, px[3]]));
    }
    save_image(&img, path.as_ref())
}

/// A two-tone checkerboard, handy as a warp source.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([235, 235, 240, 255])
        } else {
            Rgba([40, 60, 110, 255])
        }
    })
}

/// Warps `source` the way a downstream shader would: each output pixel reads the source at
/// its own position minus the decoded offset (nearest neighbour, clamped to the edges).
pub fn warp_with_map(
    source: &RgbaImage,
    map: &RasterBuffer,
    scale: Vec2,
) -> anyhow::Result<RgbaImage> {
    let (w, h) = source.dimensions();
    ensure!(
        map.size() == (w, h),
        "map is {:?}, source is {}x{}",
        map.size(),
        w,
        h
    );

    let mut out = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let Some(px) = map.pixel(x, y) else {
                continue;
            };
            let dx = decode_channel(px[0], w as f32, scale.x);
            let dy = decode_channel(px[1], h as f32, scale.y);
            let sx = (x as f32 - dx).round().clamp(0.0, (w - 1) as f32) as u32;
            let sy = (y as f32 - dy).round().clamp(0.0, (h - 1) as f32) as u32;
            out.put_pixel(x, y, *source.get_pixel(sx, sy));
        }
    }
    Ok(out)
}

fn save_image(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "Wrote {}x{} image to {}.",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}
