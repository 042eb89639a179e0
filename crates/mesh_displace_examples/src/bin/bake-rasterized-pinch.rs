use glam::Vec2;
use mesh_displace::prelude::*;
use mesh_displace_examples::{init_tracing, save_raster_png, save_uv_preview_png};

/// Pinches the centre of the mesh and bakes it through the rasterized path, using the
/// software rasterizer in place of a GPU.
fn main() -> anyhow::Result<()> {
    init_tracing();
    let (width, height) = (320, 240);

    let config = DisplacementConfig::new(width, height)
        .with_node_counts(9, 7)
        .with_scale(Vec2::ONE);
    let compiler = DisplacementCompiler::try_new(config)?;
    let grid = *compiler.grid();

    // Pull the ring around the centre node inwards. Keys address nodes in image order.
    let centre = (grid.node_count_x / 2, grid.node_count_y / 2);
    let mut offsets = OffsetMap::new();
    for (dc, dr) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
        let col = (centre.0 as i32 + dc) as u32;
        let row = (centre.1 as i32 + dr) as u32;
        let pull = Vec2::new(-dc as f32, -dr as f32) * 15.0;
        offsets.insert(grid.raster_index(col, row), pull);
    }

    let mesh = compiler.mesh(&offsets)?;
    let uv_buffer = SoftwareUvRasterizer.rasterize(&mesh, width, height)?;
    save_uv_preview_png(&uv_buffer, width, height, "bake-rasterized-pinch-uv.png")?;

    let map = compiler.compile_rasterized(&offsets, &SoftwareUvRasterizer)?;
    save_raster_png(&map, "bake-rasterized-pinch.png")?;
    Ok(())
}
