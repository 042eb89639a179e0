//! UV codec for the rasterized bake path.
//!
//! A rasterizer draws the [`crate::mesh::GridMesh`] with its UVs packed into each covered
//! pixel; this module defines that packing and turns such a buffer back into a
//! displacement map.
//!
//! Packing: each UV component is quantized to 12 bits (`round(u * 4095)`), the low bytes go
//! to R and G, and the high nibbles share B (U high, V low). Covered pixels carry alpha 255,
//! uncovered pixels alpha 0.
pub mod rasterizer;

use glam::{DVec2, Vec2};
use tracing::debug;

use crate::channel::to_channel_byte;
use crate::config::validate_scale;
use crate::error::{Error, Result};
use crate::raster::{byte_len, RasterBuffer, CHANNELS};

pub use rasterizer::{FnRasterizer, SoftwareUvRasterizer, UvRasterizer};

/// Largest quantized UV component.
pub const UV_MAX: u16 = 4095;

/// Output pixel for positions the mesh does not cover.
pub const NEUTRAL_PIXEL: [u8; 4] = [128, 128, 255, 255];

/// Packed value of an uncovered pixel.
pub const UNCOVERED: [u8; 4] = [0, 0, 0, 0];

/// Quantizes a UV component in `[0, 1]` to 12 bits. Out-of-range values are clamped and NaN
/// maps to 0.
#[inline]
pub fn quantize_uv(component: f32) -> u16 {
    if component.is_nan() {
        return 0;
    }
    (component.clamp(0.0, 1.0) * UV_MAX as f32).round() as u16
}

/// Packs a UV pair into a covered RGBA pixel.
#[inline]
pub fn pack_uv(uv: Vec2) -> [u8; 4] {
    pack_quantized(quantize_uv(uv.x), quantize_uv(uv.y))
}

/// Packs already quantized components. Bits above the low 12 are ignored.
#[inline]
pub fn pack_quantized(qu: u16, qv: u16) -> [u8; 4] {
    let hi = (((qu >> 8) & 0xF) << 4) | ((qv >> 8) & 0xF);
    [(qu & 0xFF) as u8, (qv & 0xFF) as u8, hi as u8, 255]
}

/// Recovers the quantized components from a packed pixel.
#[inline]
pub fn unpack_uv(px: [u8; 4]) -> (u16, u16) {
    let [r, g, b, _] = px;
    let qu = r as u16 | ((b as u16 & 0xF0) << 4);
    let qv = g as u16 | ((b as u16 & 0x0F) << 8);
    (qu, qv)
}

/// Decodes a rasterized UV buffer into a displacement map.
///
/// For each covered pixel the UV is mapped back to the source pixel it was sampled from;
/// the difference to the pixel's own position is scaled by `254 / (dimension * scale)`,
/// clamped to `[-128, 127]` and stored around 128. Uncovered pixels become
/// [`NEUTRAL_PIXEL`].
///
/// Fails before decoding if the buffer is not exactly `width * height * 4` bytes.
pub fn decode_displacement(
    buffer: &[u8],
    width: u32,
    height: u32,
    scale_x: f32,
    scale_y: f32,
) -> Result<RasterBuffer> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension(format!(
            "image size must be > 0, got {width}x{height}"
        )));
    }
    let expected = byte_len(width, height);
    if buffer.len() != expected {
        return Err(Error::MalformedUvBuffer {
            expected,
            actual: buffer.len(),
        });
    }
    validate_scale(Vec2::new(scale_x, scale_y))?;

    let max_scale = DVec2::new(
        127.0 / (width as f64 * scale_x as f64) * 2.0,
        127.0 / (height as f64 * scale_y as f64) * 2.0,
    );
    let source_extent = DVec2::new((width - 1) as f64, (height - 1) as f64);

    let mut out = Vec::with_capacity(expected);
    let mut covered = 0usize;
    for (i, px) in buffer.chunks_exact(CHANNELS).enumerate() {
        let px = [px[0], px[1], px[2], px[3]];
        if px[3] == 0 {
            out.extend_from_slice(&NEUTRAL_PIXEL);
            continue;
        }
        covered += 1;

        let x = (i % width as usize) as f64;
        let y = (i / width as usize) as f64;
        let (qu, qv) = unpack_uv(px);
        let source_x = (qu as f64 * source_extent.x / UV_MAX as f64).round();
        let source_y = (qv as f64 * source_extent.y / UV_MAX as f64).round();

        let offset_u = ((x - source_x) * max_scale.x).clamp(-128.0, 127.0);
        let offset_v = ((y - source_y) * max_scale.y).clamp(-128.0, 127.0);
        out.extend_from_slice(&[
            to_channel_byte((offset_u + 128.0) as f32),
            to_channel_byte((offset_v + 128.0) as f32),
            255,
            255,
        ]);
    }

    debug!(
        "Decoded {}x{} uv buffer ({} of {} pixels covered).",
        width,
        height,
        covered,
        expected / CHANNELS
    );
    RasterBuffer::from_raw(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered_at(buffer: &mut [u8], width: u32, x: u32, y: u32, qu: u16, qv: u16) {
        let i = (y as usize * width as usize + x as usize) * CHANNELS;
        buffer[i..i + CHANNELS].copy_from_slice(&pack_quantized(qu, qv));
    }

    #[test]
    fn quantize_covers_twelve_bits() {
        assert_eq!(quantize_uv(0.0), 0);
        assert_eq!(quantize_uv(1.0), 4095);
        assert_eq!(quantize_uv(0.5), 2048);
        assert_eq!(quantize_uv(-0.2), 0);
        assert_eq!(quantize_uv(f32::NAN), 0);
    }

    #[test]
    fn packing_splits_high_nibbles_into_blue() {
        assert_eq!(pack_quantized(0xABC, 0x123), [0xBC, 0x23, 0xA1, 255]);
        assert_eq!(unpack_uv([0xBC, 0x23, 0xA1, 255]), (0xABC, 0x123));
        assert_eq!(pack_uv(Vec2::ONE), [0xFF, 0xFF, 0xFF, 255]);
    }

    #[test]
    fn uncovered_buffer_decodes_to_neutral() {
        for (w, h) in [(1, 1), (7, 3), (32, 32)] {
            let buffer = vec![0u8; byte_len(w, h)];
            let out = decode_displacement(&buffer, w, h, 1.0, 1.0).expect("decode");
            assert!(out.pixels().all(|p| p == NEUTRAL_PIXEL));
        }
    }

    #[test]
    fn zero_alpha_wins_over_channel_content() {
        let buffer = vec![200, 17, 99, 0];
        let out = decode_displacement(&buffer, 1, 1, 1.0, 1.0).expect("decode");
        assert_eq!(out.pixel(0, 0), Some(NEUTRAL_PIXEL));
    }

    #[test]
    fn pixel_sampling_itself_is_undisplaced() {
        let (w, h) = (4096, 1);
        let mut buffer = vec![0u8; byte_len(w, h)];
        // qu * 4095 / 4095 maps back to column qu exactly.
        covered_at(&mut buffer, w, 1000, 0, 1000, 0);
        let out = decode_displacement(&buffer, w, h, 1.0, 1.0).expect("decode");
        assert_eq!(out.pixel(1000, 0), Some([128, 128, 255, 255]));
    }

    #[test]
    fn offsets_scale_with_dimension_and_scale() {
        let (w, h) = (128, 128);
        let mut buffer = vec![0u8; byte_len(w, h)];
        // Column 4095 * 60 / 127 lands on source column 60; the pixel sits at column 64.
        let qu = ((60.0 * 4095.0) / 127.0f64).round() as u16;
        covered_at(&mut buffer, w, 64, 0, qu, 0);
        let out = decode_displacement(&buffer, w, h, 1.0, 1.0).expect("decode");
        // 4 px * 254 / 128 = 7.9375
        assert_eq!(out.pixel(64, 0), Some([136, 128, 255, 255]));

        let out = decode_displacement(&buffer, w, h, 2.0, 1.0).expect("decode");
        // 4 px * 254 / 256 = 3.96875
        assert_eq!(out.pixel(64, 0), Some([132, 128, 255, 255]));
    }

    #[test]
    fn extreme_distances_clamp_without_wrapping() {
        let (w, h) = (100, 100);
        let mut buffer = vec![0u8; byte_len(w, h)];
        covered_at(&mut buffer, w, 0, 0, UV_MAX, UV_MAX);
        covered_at(&mut buffer, w, 99, 99, 0, 0);
        let out = decode_displacement(&buffer, w, h, 1.0, 1.0).expect("decode");
        assert_eq!(out.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(out.pixel(99, 99), Some([255, 255, 255, 255]));
    }

    #[test]
    fn decode_is_deterministic() {
        let (w, h) = (16, 9);
        let buffer: Vec<u8> = (0..byte_len(w, h))
            .map(|i| (i * 37 % 251) as u8 | 1)
            .collect();
        let a = decode_displacement(&buffer, w, h, 0.75, 1.5).expect("decode");
        let b = decode_displacement(&buffer, w, h, 0.75, 1.5).expect("decode");
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_length_fails_before_decoding() {
        let err = decode_displacement(&[0u8; 12], 2, 2, 1.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedUvBuffer {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn empty_image_is_invalid() {
        let err = decode_displacement(&[], 0, 4, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension(_)));
    }
}
