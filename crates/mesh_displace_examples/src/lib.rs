#![forbid(unsafe_code)]

mod document;
mod rendering;

pub use document::{load_offset_document, OffsetDocument};
pub use rendering::{
    checkerboard, init_tracing, save_raster_png, save_uv_preview_png, warp_with_map,
};
