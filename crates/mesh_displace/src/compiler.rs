//! High-level entry point tying configuration, offsets and both bake paths together.
use tracing::info;

use crate::bake::bake;
use crate::codec::{decode_displacement, UvRasterizer};
use crate::config::DisplacementConfig;
use crate::error::Result;
use crate::grid::{GridSpec, OffsetMap};
use crate::mesh::{build_mesh, GridMesh};
use crate::raster::RasterBuffer;

/// Compiles displacement maps for one configuration.
///
/// Offsets handed to the compiler are copied, restricted to the grid and clamped to the
/// configured scale before either bake path sees them.
#[derive(Debug, Clone)]
pub struct DisplacementCompiler {
    config: DisplacementConfig,
    grid: GridSpec,
}

impl DisplacementCompiler {
    pub fn try_new(config: DisplacementConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.grid()?;
        Ok(Self { config, grid })
    }

    pub fn config(&self) -> &DisplacementConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Offsets as the bake paths will see them.
    pub fn prepare_offsets(&self, offsets: &OffsetMap) -> OffsetMap {
        let mut prepared = offsets.clone();
        prepared.retain_within(self.grid.node_count());
        prepared.clamp_to_scale(self.grid.width, self.grid.height, self.config.scale);
        prepared
    }

    /// Builds the displaced mesh, e.g. to hand to a renderer.
    pub fn mesh(&self, offsets: &OffsetMap) -> Result<GridMesh> {
        build_mesh(&self.grid, &self.prepare_offsets(offsets))
    }

    /// Bakes the map on the CPU with the scanline baker.
    pub fn compile_scanline(&self, offsets: &OffsetMap) -> Result<RasterBuffer> {
        let prepared = self.prepare_offsets(offsets);
        let raster = bake(&self.grid, self.config.scale, &prepared)?;
        info!(
            "Scanline bake {}x{} | nodes: {}x{} | displaced: {}.",
            self.grid.width,
            self.grid.height,
            self.grid.node_count_x,
            self.grid.node_count_y,
            prepared.len(),
        );
        Ok(raster)
    }

    /// Builds the mesh, rasterizes its UVs with `rasterizer` and decodes the result.
    pub fn compile_rasterized(
        &self,
        offsets: &OffsetMap,
        rasterizer: &dyn UvRasterizer,
    ) -> Result<RasterBuffer> {
        let mesh = self.mesh(offsets)?;
        let (width, height) = (self.grid.width, self.grid.height);
        let uv_buffer = rasterizer.rasterize(&mesh, width, height)?;
        let raster = decode_displacement(
            &uv_buffer,
            width,
            height,
            self.config.scale.x,
            self.config.scale.y,
        )?;
        info!(
            "Rasterized bake {}x{} | triangles: {}.",
            width,
            height,
            mesh.triangle_count(),
        );
        Ok(raster)
    }
}
