//! Scanline displacement baker.
//!
//! Produces a displacement map on the CPU, straight from node offsets, without building a
//! mesh. Each quad's four corners are encoded to channel pairs, interpolated down the left
//! and right edges, then filled left to right one scanline at a time.
//!
//! Quad corners are addressed with [`GridSpec::raster_index`]. Output pixels are
//! `(red, green, 0, 255)`.
pub mod cache;

use glam::{DVec2, Vec2};
use tracing::debug;

use crate::channel::{encode_channel, to_channel_byte};
use crate::config::validate_scale;
use crate::error::Result;
use crate::grid::{GridSpec, OffsetMap};
use crate::raster::RasterBuffer;

pub use cache::{CornerNode, NodeCache};

/// Bakes a displacement map for `grid` from `offsets`.
///
/// Offsets must already be clamped to `scale * dimension / 2`; see
/// [`OffsetMap::clamp_to_scale`].
pub fn bake(grid: &GridSpec, scale: Vec2, offsets: &OffsetMap) -> Result<RasterBuffer> {
    grid.validate()?;
    validate_scale(scale)?;

    let mut baker = ScanlineBaker {
        grid,
        scale,
        offsets,
        spacing: grid.pixel_spacing(),
        cache: NodeCache::new(grid.node_count()),
        raster: RasterBuffer::new(grid.width, grid.height),
    };
    baker.run();

    debug!(
        "Baked {}x{} displacement map over {} quads ({} nodes resolved).",
        grid.width,
        grid.height,
        grid.quad_count(),
        baker.cache.resolved()
    );
    Ok(baker.raster)
}

/// Bakes a displacement map from loose parameters.
pub fn bake_from_parts(
    width: u32,
    height: u32,
    node_count_x: u32,
    node_count_y: u32,
    scale_x: f32,
    scale_y: f32,
    offsets: &OffsetMap,
) -> Result<RasterBuffer> {
    let grid = GridSpec::try_new(node_count_x, node_count_y, width, height)?;
    bake(&grid, Vec2::new(scale_x, scale_y), offsets)
}

struct ScanlineBaker<'a> {
    grid: &'a GridSpec,
    scale: Vec2,
    offsets: &'a OffsetMap,
    spacing: DVec2,
    cache: NodeCache,
    raster: RasterBuffer,
}

impl ScanlineBaker<'_> {
    fn run(&mut self) {
        for row in 0..self.grid.node_count_y - 1 {
            let map_y = floor_px(row as f64 * self.spacing.y);
            let map_y_next = floor_px((row + 1) as f64 * self.spacing.y);

            for col in 0..self.grid.node_count_x - 1 {
                let map_x = floor_px(col as f64 * self.spacing.x);
                let map_x_next = floor_px((col + 1) as f64 * self.spacing.x);

                let top_left = self.corner(col, row, map_x, map_y);
                let top_right = self.corner(col + 1, row, map_x_next, map_y);
                let bottom_left = self.corner(col, row + 1, map_x, map_y_next);
                let bottom_right = self.corner(col + 1, row + 1, map_x_next, map_y_next);

                self.fill_quad(top_left, top_right, bottom_left, bottom_right);
            }
        }
    }

    fn corner(&mut self, col: u32, row: u32, map_x: u32, map_y: u32) -> CornerNode {
        let index = self.grid.raster_index(col, row);
        let offset = self.offsets.get_or_zero(index);
        let width = self.grid.width as f32;
        let height = self.grid.height as f32;
        let scale = self.scale;
        self.cache.get_or_insert_with(index, || CornerNode {
            red: encode_channel(offset.x, width, scale.x),
            green: encode_channel(offset.y, height, scale.y),
            map_x,
            map_y,
        })
    }

    fn fill_quad(
        &mut self,
        top_left: CornerNode,
        top_right: CornerNode,
        bottom_left: CornerNode,
        bottom_right: CornerNode,
    ) {
        let rows = step_count(self.spacing.y);
        let cols = step_count(self.spacing.x);
        let height = self.raster.height();

        for i in 0..rows {
            let y = top_left.map_y + i;
            if y >= height {
                break;
            }

            // Edge values are rounded to whole channel steps before the scanline fill.
            let t = i as f64;
            let left_red = edge_value(top_left.red, bottom_left.red, t, self.spacing.y);
            let left_green = edge_value(top_left.green, bottom_left.green, t, self.spacing.y);
            let right_red = edge_value(top_right.red, bottom_right.red, t, self.spacing.y);
            let right_green = edge_value(top_right.green, bottom_right.green, t, self.spacing.y);

            let step_red = (right_red - left_red) / self.spacing.x;
            let step_green = (right_green - left_green) / self.spacing.x;

            for j in 0..cols {
                let s = j as f64;
                let red = to_channel_byte((left_red + s * step_red) as f32);
                let green = to_channel_byte((left_green + s * step_green) as f32);
                if !self
                    .raster
                    .set_pixel(top_left.map_x + j, y, [red, green, 0, 255])
                {
                    break;
                }
            }
        }
    }
}

#[inline]
fn floor_px(v: f64) -> u32 {
    v.floor() as u32
}

/// Number of integer steps `i` with `i < span`.
#[inline]
fn step_count(span: f64) -> u32 {
    span.ceil() as u32
}

#[inline]
fn edge_value(start: u8, end: u8, t: f64, span: f64) -> f64 {
    let start = start as f64;
    (start + t * (end as f64 - start) / span).round()
}
