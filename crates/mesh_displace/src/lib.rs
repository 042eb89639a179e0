#![forbid(unsafe_code)]
//! mesh_displace: compile mesh-warp edits into displacement-map textures.
//!
//! Modules:
//! - grid: node layout, the two node index spaces, and per-node offsets
//! - mesh: vertex/UV/index buffers for a displaced grid
//! - bake: scanline CPU baker working straight from node offsets
//! - codec: 12-bit UV packing, UV-buffer decoding and the rasterizer seam
//! - channel: the 128-centred byte encoding shared by both bake paths
//! - compiler: configuration-driven facade over both paths
pub mod bake;
pub mod channel;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod raster;

/// Convenient re-exports for common types. Import with `use mesh_displace::prelude::*;`.
pub mod prelude {
    pub use crate::bake::{bake, bake_from_parts};
    pub use crate::channel::{decode_channel, encode_channel, NEUTRAL_CHANNEL};
    pub use crate::codec::{
        decode_displacement, pack_uv, unpack_uv, FnRasterizer, SoftwareUvRasterizer,
        UvRasterizer, NEUTRAL_PIXEL,
    };
    pub use crate::compiler::DisplacementCompiler;
    pub use crate::config::{fit_within, DisplacementConfig};
    pub use crate::error::{Error, Result};
    pub use crate::grid::{GridSpec, NodeOffset, OffsetMap};
    pub use crate::mesh::{build_mesh, build_mesh_from_parts, GridMesh};
    pub use crate::raster::RasterBuffer;
}
