//! Opus stream parameters and their 4-byte codec header.
//!
//! ```text
//! +---------------------+----------------------+------------------+
//! | sample rate u16 LE  | frames per packet u8 | frame size ms u8 |
//! +---------------------+----------------------+------------------+
//! ```
//!
//! The channel count is not part of the header; decoding always reports
//! [`AUDIO_MAX_CHANNELS`](crate::AUDIO_MAX_CHANNELS).

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::AUDIO_MAX_CHANNELS;
use crate::error::{ProtocolError, ProtocolResult};

/// Codec header length in bytes.
pub const CODEC_HEADER_LEN: usize = 4;

/// Sample rates an Opus encoder can be configured with.
pub const SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Frame sizes (milliseconds) defined by Opus.
pub const FRAME_SIZES: [f32; 6] = [2.5, 5.0, 10.0, 20.0, 40.0, 60.0];

/// Frame size in milliseconds for each TOC configuration number (RFC 6716, 3.1).
#[rustfmt::skip]
pub const FRAME_SIZE_MAP: [f32; 32] = [
    10.0, 20.0, 40.0, 60.0, // SILK NB
    10.0, 20.0, 40.0, 60.0, // SILK MB
    10.0, 20.0, 40.0, 60.0, // SILK WB
    10.0, 20.0,             // Hybrid SWB
    10.0, 20.0,             // Hybrid FB
    2.5, 5.0, 10.0, 20.0,   // CELT NB
    2.5, 5.0, 10.0, 20.0,   // CELT WB
    2.5, 5.0, 10.0, 20.0,   // CELT SWB
    2.5, 5.0, 10.0, 20.0,   // CELT FB
];

/// Parameters of an Opus audio stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpusInfo {
    /// Channel count (1 or 2; only mono is carried end-to-end).
    pub channels: u8,
    /// Encoder input sample rate in Hz.
    pub sample_rate: u32,
    /// Opus frames per packet.
    pub frames_per_packet: u32,
    /// Duration of one frame in milliseconds.
    pub frame_size: f32,
}

impl OpusInfo {
    /// Mono stream with the given parameters.
    pub fn mono(sample_rate: u32, frames_per_packet: u32, frame_size: f32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            frames_per_packet,
            frame_size,
        }
    }

    /// Duration of one frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros((self.frame_size.max(0.0) * 1000.0).round() as u64)
    }

    /// Frame size as announced in `packet_duration` fields (whole milliseconds).
    pub fn packet_duration_ms(&self) -> u32 {
        self.frame_size.max(0.0) as u32
    }

    /// PCM samples per channel in one frame.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate as f32 * self.frame_size / 1000.0).round() as usize
    }

    /// Checks every field against the values Opus allows.
    ///
    /// Decoding never calls this; it is up to the caller to decide whether
    /// out-of-range parameters are fatal.
    pub fn validate(&self) -> ProtocolResult<()> {
        if !(1..=2).contains(&self.channels) {
            return Err(ProtocolError::InvalidOpusInfo(format!(
                "unsupported channel count {}",
                self.channels
            )));
        }
        if !SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(ProtocolError::InvalidOpusInfo(format!(
                "unsupported sample rate {}",
                self.sample_rate
            )));
        }
        if !FRAME_SIZES.contains(&self.frame_size) {
            return Err(ProtocolError::InvalidOpusInfo(format!(
                "unsupported frame size {}ms",
                self.frame_size
            )));
        }
        if self.frames_per_packet == 0 {
            return Err(ProtocolError::InvalidOpusInfo(
                "frames per packet must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for OpusInfo {
    fn default() -> Self {
        Self::mono(48000, 1, 20.0)
    }
}

/// Encodes stream parameters into the 4-byte codec header.
///
/// Fractional frame sizes are truncated to whole milliseconds.
pub fn encode_header(info: &OpusInfo) -> ProtocolResult<[u8; CODEC_HEADER_LEN]> {
    let sample_rate = u16::try_from(info.sample_rate).map_err(|_| {
        ProtocolError::encoding(format!(
            "sample rate {} does not fit in 16 bits",
            info.sample_rate
        ))
    })?;
    let frames_per_packet = u8::try_from(info.frames_per_packet).map_err(|_| {
        ProtocolError::encoding(format!(
            "frames per packet {} does not fit in one byte",
            info.frames_per_packet
        ))
    })?;
    if !info.frame_size.is_finite() || info.frame_size < 0.0 || info.frame_size >= 256.0 {
        return Err(ProtocolError::encoding(format!(
            "frame size {}ms does not fit in one byte",
            info.frame_size
        )));
    }
    let frame_size = info.frame_size as u8;

    let rate = sample_rate.to_le_bytes();
    Ok([rate[0], rate[1], frames_per_packet, frame_size])
}

/// Decodes a codec header.
///
/// Bytes past the first four are ignored and the values are not checked
/// against the legal Opus sets; see [`OpusInfo::validate`].
pub fn decode_header(bytes: &[u8]) -> ProtocolResult<OpusInfo> {
    if bytes.len() < CODEC_HEADER_LEN {
        return Err(ProtocolError::decoding(format!(
            "codec header needs {} bytes, got {}",
            CODEC_HEADER_LEN,
            bytes.len()
        )));
    }
    Ok(OpusInfo {
        channels: AUDIO_MAX_CHANNELS,
        sample_rate: u32::from(u16::from_le_bytes([bytes[0], bytes[1]])),
        frames_per_packet: u32::from(bytes[2]),
        frame_size: f32::from(bytes[3]),
    })
}

/// Encodes the codec header as it travels in JSON (`codec_header`).
pub fn encode_header_base64(info: &OpusInfo) -> ProtocolResult<String> {
    Ok(STANDARD.encode(encode_header(info)?))
}

/// Decodes a base64 `codec_header` field.
pub fn decode_header_base64(header: &str) -> ProtocolResult<OpusInfo> {
    let bytes = STANDARD
        .decode(header.trim())
        .map_err(|e| ProtocolError::decoding(format!("invalid base64 codec header: {}", e)))?;
    decode_header(&bytes)
}

/// Packet layout read from the TOC byte of an Opus packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpusPacketInfo {
    /// Frames carried by the packet.
    pub frames_per_packet: u32,
    /// Duration of each frame in milliseconds.
    pub frame_size: f32,
}

/// Reads frame layout from the first packet an encoder produced.
///
/// Returns `None` for an empty packet.
pub fn opus_packet_info(packet: &[u8]) -> Option<OpusPacketInfo> {
    let toc = *packet.first()?;
    let config = usize::from(toc >> 3);
    let frames_per_packet = match toc & 0b11 {
        0 => 1,
        1 | 2 => 2,
        // code 3: frame count lives in the low six bits of the next byte
        _ => packet
            .get(1)
            .map(|count| u32::from(count & 0b0011_1111))
            .filter(|count| *count > 0)
            .unwrap_or(1),
    };
    Some(OpusPacketInfo {
        frames_per_packet,
        frame_size: FRAME_SIZE_MAP[config],
    })
}
