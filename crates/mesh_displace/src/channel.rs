//! Channel encoding between pixel offsets and 128-centred bytes.
//!
//! A channel byte `c` stands for the offset `(c - 128) * dim * scale / 128` below the centre
//! and `(c - 128) * dim * scale / 127` from the centre up, so byte 0 is `-dim * scale` and
//! byte 255 is `+dim * scale`. [`encode_channel_value`] is the exact inverse of
//! [`decode_channel`]; it is not the decode formula applied forwards.

/// Channel value meaning "no displacement".
pub const NEUTRAL_CHANNEL: u8 = 128;

/// Converts a channel byte back into a pixel offset.
#[inline]
pub fn decode_channel(channel: u8, dim: f32, scale: f32) -> f32 {
    let c = channel as f32 - 128.0;
    if channel < 128 {
        c * dim * scale / 128.0
    } else {
        c * dim * scale / 127.0
    }
}

/// Real-valued channel for a pixel offset, clamped to `[0, 255]`.
///
/// NaN offsets and degenerate ranges map to the neutral channel.
#[inline]
pub fn encode_channel_value(offset: f32, dim: f32, scale: f32) -> f32 {
    let range = dim * scale;
    if offset.is_nan() || !(range.is_finite() && range > 0.0) {
        return NEUTRAL_CHANNEL as f32;
    }
    let c = if offset < 0.0 {
        128.0 + offset * 128.0 / range
    } else {
        128.0 + offset * 127.0 / range
    };
    c.clamp(0.0, 255.0)
}

/// Channel byte for a pixel offset.
#[inline]
pub fn encode_channel(offset: f32, dim: f32, scale: f32) -> u8 {
    to_channel_byte(encode_channel_value(offset, dim, scale))
}

/// Stores a real channel value as a byte: clamped to `[0, 255]`, rounded half to even.
///
/// Every channel written by this crate goes through here.
#[inline]
pub fn to_channel_byte(value: f32) -> u8 {
    if value.is_nan() {
        return NEUTRAL_CHANNEL;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}
