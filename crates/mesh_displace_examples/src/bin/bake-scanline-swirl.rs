use glam::Vec2;
use mesh_displace::prelude::*;
use mesh_displace_examples::{checkerboard, init_tracing, save_raster_png, warp_with_map};

/// Bakes a swirl with the scanline baker and warps a checkerboard with it.
fn main() -> anyhow::Result<()> {
    init_tracing();
    let (width, height) = (512, 512);

    let config = DisplacementConfig::new(width, height)
        .with_mesh_density(16)
        .with_scale(Vec2::new(0.5, 0.5));
    let compiler = DisplacementCompiler::try_new(config)?;
    let offsets = swirl(compiler.grid(), 40.0);

    let map = compiler.compile_scanline(&offsets)?;
    save_raster_png(&map, "bake-scanline-swirl.png")?;

    let warped = warp_with_map(
        &checkerboard(width, height, 32),
        &map,
        compiler.config().scale,
    )?;
    warped.save("bake-scanline-swirl-warped.png")?;
    Ok(())
}

/// Rotates nodes around the image centre, strongest halfway out.
fn swirl(grid: &GridSpec, strength: f32) -> OffsetMap {
    let centre = Vec2::new(grid.width as f32, grid.height as f32) / 2.0;
    let radius = centre.min_element();
    let mut offsets = OffsetMap::new();
    for row in 0..grid.node_count_y {
        for col in 0..grid.node_count_x {
            let d = grid.rest_position(col, row) - centre;
            let t = (d.length() / radius).min(1.0);
            let falloff = (t * std::f32::consts::PI).sin();
            if falloff > 0.0 {
                let tangent = d.perp().normalize_or_zero();
                offsets.insert(grid.raster_index(col, row), tangent * strength * falloff);
            }
        }
    }
    offsets
}
