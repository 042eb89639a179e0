//! RGBA8 pixel storage shared by the baker, the UV codec and rasterizers.
//!
//! Buffers are row-major, top-to-bottom, four bytes per pixel in R, G, B, A order.
use crate::error::{Error, Result};

/// Bytes per pixel.
pub const CHANNELS: usize = 4;

/// A `width x height` RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a raster with every byte set to zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Creates a raster with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = width as usize * height as usize;
        let mut data = Vec::with_capacity(len * CHANNELS);
        for _ in 0..len {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wraps raw bytes, failing with [`Error::MalformedUvBuffer`] on a length mismatch.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(Error::MalformedUvBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the size of the raster as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte offset of the pixel at `(x, y)`, or `None` outside the raster.
    #[inline]
    pub fn offset_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset_of(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + CHANNELS]);
        Some(px)
    }

    /// Writes all four channels at `(x, y)`. Returns `false` if the pixel is outside the raster.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> bool {
        match self.offset_of(x, y) {
            Some(i) => {
                self.data[i..i + CHANNELS].copy_from_slice(&rgba);
                true
            }
            None => false,
        }
    }

    /// Iterates pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|c| [c[0], c[1], c[2], c[3]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Expected byte length of a `width x height` RGBA8 buffer.
pub fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_initializes_with_zeroes() {
        let raster = RasterBuffer::new(3, 2);
        assert_eq!(raster.size(), (3, 2));
        assert_eq!(raster.as_bytes().len(), 24);
        assert!(raster.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn filled_repeats_pixel() {
        let raster = RasterBuffer::filled(2, 2, [1, 2, 3, 4]);
        assert!(raster.pixels().all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn from_raw_checks_length() {
        let err = RasterBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedUvBuffer {
                expected: 16,
                actual: 15
            }
        ));
        assert!(RasterBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn set_pixel_ignores_out_of_bounds() {
        let mut raster = RasterBuffer::new(2, 2);
        assert!(raster.set_pixel(1, 1, [9, 8, 7, 6]));
        assert!(!raster.set_pixel(2, 0, [1, 1, 1, 1]));
        assert_eq!(raster.pixel(1, 1), Some([9, 8, 7, 6]));
        assert_eq!(raster.pixel(0, 2), None);
        assert_eq!(&raster.as_bytes()[12..16], &[9, 8, 7, 6]);
    }
}
