/// Format-aware box filter used to generate mip chains

use losgap_gpu::losgap::resource::{ChannelKind, TexelFormat};
use crate::soft_storage::SoftSubresource;

/// Up to four channels of one texel, widened for filtering
type Channels = [f64; 4];

const B5G6R5_RED_SHIFT: u32 = 11;
const B5G6R5_GREEN_SHIFT: u32 = 5;
const DEPTH_MASK: u32 = 0x00FF_FFFF;

fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f64) -> f64 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

fn read_unsigned(bytes: &[u8]) -> u64 {
    match *bytes {
        [a] => a as u64,
        [a, b] => u16::from_le_bytes([a, b]) as u64,
        [a, b, c, d] => u32::from_le_bytes([a, b, c, d]) as u64,
        _ => 0,
    }
}

fn read_signed(bytes: &[u8]) -> i64 {
    match *bytes {
        [a] => a as i8 as i64,
        [a, b] => i16::from_le_bytes([a, b]) as i64,
        [a, b, c, d] => i32::from_le_bytes([a, b, c, d]) as i64,
        _ => 0,
    }
}

fn write_unsigned(out: &mut [u8], value: u64) {
    let width = out.len();
    out.copy_from_slice(&value.to_le_bytes()[..width]);
}

fn write_signed(out: &mut [u8], value: i64) {
    let width = out.len();
    out.copy_from_slice(&value.to_le_bytes()[..width]);
}

/// Decode one texel into normalized or integer channel values
pub(crate) fn decode_texel(format: TexelFormat, texel: &[u8]) -> Channels {
    let mut channels = [0.0; 4];
    match format {
        TexelFormat::B5G6R5_UNORM => {
            let word = read_unsigned(&texel[..2]) as u32;
            channels[0] = ((word >> B5G6R5_RED_SHIFT) & 0x1F) as f64 / 31.0;
            channels[1] = ((word >> B5G6R5_GREEN_SHIFT) & 0x3F) as f64 / 63.0;
            channels[2] = (word & 0x1F) as f64 / 31.0;
            return channels;
        }
        TexelFormat::D24_UNORM_S8_UINT => {
            let word = read_unsigned(&texel[..4]) as u32;
            channels[0] = (word & DEPTH_MASK) as f64 / DEPTH_MASK as f64;
            channels[1] = (word >> 24) as f64;
            return channels;
        }
        _ => {}
    }

    let width = (format.bits_per_channel() / 8) as usize;
    let unsigned_max = ((1u64 << format.bits_per_channel()) - 1) as f64;
    let signed_max = ((1u64 << (format.bits_per_channel() - 1)) - 1) as f64;
    for (index, channel) in channels.iter_mut().enumerate().take(format.channel_count() as usize) {
        let bytes = &texel[index * width..(index + 1) * width];
        *channel = match format.channel_kind() {
            ChannelKind::Float => bytemuck::pod_read_unaligned::<f32>(bytes) as f64,
            ChannelKind::UInt => read_unsigned(bytes) as f64,
            ChannelKind::SInt => read_signed(bytes) as f64,
            ChannelKind::UNorm => read_unsigned(bytes) as f64 / unsigned_max,
            ChannelKind::UNormSrgb => srgb_to_linear(read_unsigned(bytes) as f64 / unsigned_max),
            ChannelKind::SNorm => (read_signed(bytes) as f64 / signed_max).max(-1.0),
            ChannelKind::Packed => 0.0,
        };
    }
    channels
}

/// Encode channel values back into one texel, rounding and clamping
pub(crate) fn encode_texel(format: TexelFormat, channels: Channels, texel: &mut [u8]) {
    let unit = |value: f64, max: f64| (value.clamp(0.0, 1.0) * max).round() as u64;
    match format {
        TexelFormat::B5G6R5_UNORM => {
            let word = unit(channels[0], 31.0) << B5G6R5_RED_SHIFT
                | unit(channels[1], 63.0) << B5G6R5_GREEN_SHIFT
                | unit(channels[2], 31.0);
            write_unsigned(&mut texel[..2], word);
            return;
        }
        TexelFormat::D24_UNORM_S8_UINT => {
            let stencil = channels[1].round().clamp(0.0, 255.0) as u64;
            write_unsigned(&mut texel[..4], unit(channels[0], DEPTH_MASK as f64) | stencil << 24);
            return;
        }
        _ => {}
    }

    let bits = format.bits_per_channel();
    let width = (bits / 8) as usize;
    let unsigned_max = ((1u64 << bits) - 1) as f64;
    let signed_max = ((1u64 << (bits - 1)) - 1) as f64;
    for (index, &value) in channels.iter().enumerate().take(format.channel_count() as usize) {
        let bytes = &mut texel[index * width..(index + 1) * width];
        match format.channel_kind() {
            ChannelKind::Float => bytes.copy_from_slice(bytemuck::bytes_of(&(value as f32))),
            ChannelKind::UInt => write_unsigned(bytes, value.round().clamp(0.0, unsigned_max) as u64),
            ChannelKind::SInt => write_signed(bytes, value.round().clamp(-signed_max - 1.0, signed_max) as i64),
            ChannelKind::UNorm => write_unsigned(bytes, unit(value, unsigned_max)),
            ChannelKind::UNormSrgb => write_unsigned(bytes, unit(linear_to_srgb(value.clamp(0.0, 1.0)), unsigned_max)),
            ChannelKind::SNorm => write_signed(bytes, (value.clamp(-1.0, 1.0) * signed_max).round() as i64),
            ChannelKind::Packed => {}
        }
    }
}

/// Fill `destination` with a 2x2x2 box-filtered copy of `source`
///
/// Texels of `destination` average the source texels they cover; sources of
/// odd or unit extent clamp the footprint at their edge.
pub(crate) fn downsample(format: TexelFormat, source: &SoftSubresource, destination: &mut SoftSubresource) {
    let texel_size = format.size_bytes() as usize;
    let source_offset = |x: u32, y: u32, z: u32| {
        (z * source.depth_pitch() + y * source.row_pitch()) as usize + x as usize * texel_size
    };
    let (row_pitch, depth_pitch) = (destination.row_pitch(), destination.depth_pitch());

    for z in 0..destination.depth {
        for y in 0..destination.height {
            for x in 0..destination.width {
                let mut sum = [0.0; 4];
                let mut count = 0.0;
                for sz in 2 * z..(2 * z + 2).min(source.depth) {
                    for sy in 2 * y..(2 * y + 2).min(source.height) {
                        for sx in 2 * x..(2 * x + 2).min(source.width) {
                            let offset = source_offset(sx, sy, sz);
                            let texel = decode_texel(format, &source.data[offset..offset + texel_size]);
                            for (total, channel) in sum.iter_mut().zip(texel) {
                                *total += channel;
                            }
                            count += 1.0;
                        }
                    }
                }
                if count == 0.0 {
                    continue;
                }
                let average = sum.map(|total| total / count);
                let offset = (z * depth_pitch + y * row_pitch) as usize + x as usize * texel_size;
                encode_texel(format, average, &mut destination.data[offset..offset + texel_size]);
            }
        }
    }
}

#[cfg(test)]
#[path = "soft_mipgen_tests.rs"]
mod tests;
