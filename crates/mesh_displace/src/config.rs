//! Compiler configuration: image size, node layout and displacement scale.
use glam::Vec2;
use mint::Vector2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::GridSpec;

/// Mesh density used by the editor when no explicit node counts are given.
pub const DEFAULT_MESH_DENSITY: u32 = 20;

/// Configuration for compiling a displacement map.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Nodes along X.
    pub node_count_x: u32,
    /// Nodes along Y.
    pub node_count_y: u32,
    /// Displacement scale per axis; offsets are bounded by `scale * dimension / 2`.
    pub scale: Vec2,
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            node_count_x: 2,
            node_count_y: 2,
            scale: Vec2::ONE,
        }
    }
}

impl DisplacementConfig {
    /// Creates a config for the given image size with the default mesh density.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
        .with_mesh_density(DEFAULT_MESH_DENSITY)
    }

    /// Sets the node counts explicitly.
    pub fn with_node_counts(mut self, node_count_x: u32, node_count_y: u32) -> Self {
        self.node_count_x = node_count_x;
        self.node_count_y = node_count_y;
        self
    }

    /// Derives node counts from a horizontal cell count, keeping cells roughly square.
    pub fn with_mesh_density(mut self, density: u32) -> Self {
        let (nx, ny) = node_counts_for_density(density, self.width, self.height);
        self.node_count_x = nx;
        self.node_count_y = ny;
        self
    }

    /// Sets the displacement scale.
    pub fn with_scale(mut self, scale: impl Into<Vector2<f32>>) -> Self {
        self.scale = Vec2::from(scale.into());
        self
    }

    /// Grid described by this configuration.
    pub fn grid(&self) -> Result<GridSpec> {
        GridSpec::try_new(
            self.node_count_x,
            self.node_count_y,
            self.width,
            self.height,
        )
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.grid()?;
        validate_scale(self.scale)
    }
}

/// Checks that both scale components are finite and positive.
pub fn validate_scale(scale: Vec2) -> Result<()> {
    if !(scale.x.is_finite() && scale.x > 0.0) || !(scale.y.is_finite() && scale.y > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "scale must be finite and > 0 in both components, got {scale}"
        )));
    }
    Ok(())
}

/// Node counts for a mesh density: `density + 1` columns and as many rows as keep the
/// cells close to square, never fewer than two.
pub fn node_counts_for_density(density: u32, width: u32, height: u32) -> (u32, u32) {
    let density = density.max(1);
    let node_count_x = density + 1;
    let node_count_y = if width == 0 {
        2
    } else {
        let rows = (density as f64 / width as f64 * height as f64).round() as u32;
        (rows + 1).max(2)
    };
    (node_count_x, node_count_y)
}

/// Shrinks `(width, height)` to fit within the maximum size while keeping the aspect ratio.
///
/// Sizes that already fit are returned unchanged. Results are rounded and never below 1.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return (width.min(max_width), height.min(max_height));
    }

    let ratio = width as f64 / height as f64;
    let max_ratio = max_width as f64 / max_height as f64;
    let (w, h) = if ratio > max_ratio {
        (max_width as f64, max_width as f64 / ratio)
    } else {
        (max_height as f64 * ratio, max_height as f64)
    };
    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}
