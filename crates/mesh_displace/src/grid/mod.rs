//! Regular control-node grids and the offsets attached to their nodes.
//!
//! A grid is described by [`GridSpec`]: node counts along each axis plus the pixel size of
//! the image it spans. Two index spaces are in use over the same nodes:
//! - [`GridSpec::raster_index`] walks nodes row-major from the top-left corner. The scanline
//!   baker uses it.
//! - [`GridSpec::mirrored_index`] flips both axes. The mesh builder uses it to look up offsets
//!   while it emits vertices in raster order.
//!
//! Both spaces address the same [`OffsetMap`] keys; they are only joined by the numbers.
pub mod offsets;

use glam::{DVec2, Vec2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use offsets::{NodeOffset, OffsetMap};

/// Node layout and pixel extent of a control grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSpec {
    /// Number of nodes along X, at least 2.
    pub node_count_x: u32,
    /// Number of nodes along Y, at least 2.
    pub node_count_y: u32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl GridSpec {
    /// Creates a grid, failing with [`Error::InvalidDimension`] when a node count is below 2
    /// or the image is empty.
    pub fn try_new(node_count_x: u32, node_count_y: u32, width: u32, height: u32) -> Result<Self> {
        let spec = Self {
            node_count_x,
            node_count_y,
            width,
            height,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the grid preconditions.
    pub fn validate(&self) -> Result<()> {
        if self.node_count_x < 2 || self.node_count_y < 2 {
            return Err(Error::InvalidDimension(format!(
                "node counts must be >= 2, got {}x{}",
                self.node_count_x, self.node_count_y
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimension(format!(
                "image size must be > 0, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_count_x as usize * self.node_count_y as usize
    }

    /// Number of quads (cells) spanned by the nodes.
    pub fn quad_count(&self) -> usize {
        (self.node_count_x as usize - 1) * (self.node_count_y as usize - 1)
    }

    /// Number of output pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major node index, counted from the top-left node.
    #[inline]
    pub fn raster_index(&self, col: u32, row: u32) -> usize {
        row as usize * self.node_count_x as usize + col as usize
    }

    /// Node index with both axes flipped relative to [`GridSpec::raster_index`].
    #[inline]
    pub fn mirrored_index(&self, col: u32, row: u32) -> usize {
        let nx = self.node_count_x as usize;
        let ny = self.node_count_y as usize;
        (ny - row as usize - 1) * nx + (nx - 1 - col as usize)
    }

    /// Column and row of a raster index, or `None` if it lies outside the grid.
    pub fn node_coords(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.node_count() {
            return None;
        }
        let nx = self.node_count_x as usize;
        Some(((index % nx) as u32, (index / nx) as u32))
    }

    /// Undisplaced pixel position of a node.
    pub fn rest_position(&self, col: u32, row: u32) -> Vec2 {
        Vec2::new(
            col as f32 / (self.node_count_x - 1) as f32 * self.width as f32,
            row as f32 / (self.node_count_y - 1) as f32 * self.height as f32,
        )
    }

    /// Real-valued pixel distance between neighbouring nodes along each axis.
    pub fn pixel_spacing(&self) -> DVec2 {
        DVec2::new(
            self.width as f64 / (self.node_count_x - 1) as f64,
            self.height as f64 / (self.node_count_y - 1) as f64,
        )
    }
}
