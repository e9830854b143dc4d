//! Binary packet framing.
//!
//! Every binary WebSocket frame is one packet:
//!
//! ```text
//! +---------+--------------------+--------------------+-----------+
//! | type u8 | field1 (u32, BE)   | field2 (u32, BE)   | payload   |
//! +---------+--------------------+--------------------+-----------+
//! ```
//!
//! For audio (`type = 1`) the fields are the stream id and the packet id.
//! For images (`type = 2`) they are the image id and the [`ImagePacketType`].

use crate::error::{ProtocolError, ProtocolResult};

/// Length of the fixed packet header in bytes.
pub const PACKET_HEADER_LEN: usize = 9;

const AUDIO_TAG: u8 = 1;
const IMAGE_TAG: u8 = 2;

/// Which rendition of an image a packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ImagePacketType {
    /// Full-size image.
    FullImage = 1,
    /// Thumbnail, sent before the full image.
    Thumbnail = 2,
}

impl ImagePacketType {
    /// Parses the header field; `None` for values the protocol does not define.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::FullImage),
            2 => Some(Self::Thumbnail),
            _ => None,
        }
    }
}

/// A decoded binary frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// One Opus packet of an audio stream.
    Audio {
        stream_id: u32,
        packet_id: u32,
        payload: Vec<u8>,
    },
    /// One rendition of an image.
    Image {
        image_id: u32,
        packet_type: u32,
        payload: Vec<u8>,
    },
    /// A packet type this crate does not know; `payload` is everything after
    /// the type byte.
    Unknown { kind: u8, payload: Vec<u8> },
}

impl Packet {
    /// Creates an audio packet.
    pub fn audio(stream_id: u32, packet_id: u32, payload: Vec<u8>) -> Self {
        Self::Audio {
            stream_id,
            packet_id,
            payload,
        }
    }

    /// Creates an image packet.
    pub fn image(image_id: u32, packet_type: ImagePacketType, payload: Vec<u8>) -> Self {
        Self::Image {
            image_id,
            packet_type: packet_type as u32,
            payload,
        }
    }

    /// Wire type byte.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Audio { .. } => AUDIO_TAG,
            Self::Image { .. } => IMAGE_TAG,
            Self::Unknown { kind, .. } => *kind,
        }
    }

    /// Payload bytes following the header.
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Audio { payload, .. }
            | Self::Image { payload, .. }
            | Self::Unknown { payload, .. } => payload,
        }
    }
}

/// Encodes a packet into a binary frame.
///
/// Fails for an `Unknown` packet carrying the audio or image tag, which would
/// not decode back to itself.
pub fn encode_packet(packet: &Packet) -> ProtocolResult<Vec<u8>> {
    let (tag, first, second, payload) = match packet {
        Packet::Audio {
            stream_id,
            packet_id,
            payload,
        } => (AUDIO_TAG, *stream_id, *packet_id, payload),
        Packet::Image {
            image_id,
            packet_type,
            payload,
        } => (IMAGE_TAG, *image_id, *packet_type, payload),
        Packet::Unknown { kind, payload } => {
            if *kind == AUDIO_TAG || *kind == IMAGE_TAG {
                return Err(ProtocolError::encoding(format!(
                    "packet type {} is not an unknown type",
                    kind
                )));
            }
            let mut buffer = Vec::with_capacity(1 + payload.len());
            buffer.push(*kind);
            buffer.extend_from_slice(payload);
            return Ok(buffer);
        }
    };

    let mut buffer = Vec::with_capacity(PACKET_HEADER_LEN + payload.len());
    buffer.push(tag);
    buffer.extend_from_slice(&first.to_be_bytes());
    buffer.extend_from_slice(&second.to_be_bytes());
    buffer.extend_from_slice(payload);
    Ok(buffer)
}

/// Decodes a binary frame.
///
/// Returns `Ok(None)` for an empty frame and an error for an audio or image
/// frame shorter than the header.
pub fn decode_packet(data: &[u8]) -> ProtocolResult<Option<Packet>> {
    let Some((&tag, rest)) = data.split_first() else {
        return Ok(None);
    };

    if tag != AUDIO_TAG && tag != IMAGE_TAG {
        return Ok(Some(Packet::Unknown {
            kind: tag,
            payload: rest.to_vec(),
        }));
    }

    if data.len() < PACKET_HEADER_LEN {
        return Err(ProtocolError::decoding(format!(
            "packet of type {} needs {} header bytes, got {}",
            tag,
            PACKET_HEADER_LEN,
            data.len()
        )));
    }

    let first = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    let second = u32::from_be_bytes([data[5], data[6], data[7], data[8]]);
    let payload = data[PACKET_HEADER_LEN..].to_vec();

    let packet = if tag == AUDIO_TAG {
        Packet::Audio {
            stream_id: first,
            packet_id: second,
            payload,
        }
    } else {
        Packet::Image {
            image_id: first,
            packet_type: second,
            payload,
        }
    };
    Ok(Some(packet))
}
