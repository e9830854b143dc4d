//! Wire types and binary codecs for the Zello channel protocol.
//!
//! The protocol runs over a single WebSocket connection carrying two kinds of
//! frames:
//!
//! - **Text frames**: JSON objects. Requests carry `command` and `seq`;
//!   responses echo `seq`; server-pushed events carry `command` only.
//! - **Binary frames**: packets with a fixed 9-byte header followed by the raw
//!   payload:
//!
//! ```text
//! +---------+--------------------+--------------------+-----------+
//! | type u8 | field1 (u32, BE)   | field2 (u32, BE)   | payload   |
//! +---------+--------------------+--------------------+-----------+
//! ```
//!
//! Audio streams are described by a 4-byte codec header exchanged in base64
//! inside `start_stream` requests and `on_stream_start` events.
//!
//! # Example
//!
//! ```rust
//! use zello_protocol::{decode_packet, encode_packet, Packet};
//!
//! let packet = Packet::audio(256, 1, vec![1, 2, 3]);
//! let bytes = encode_packet(&packet).unwrap();
//! assert_eq!(bytes, vec![1, 0, 0, 1, 0, 0, 0, 0, 1, 1, 2, 3]);
//! assert_eq!(decode_packet(&bytes).unwrap(), Some(packet));
//! ```

mod codec;
mod commands;
mod error;
mod events;
mod message;
mod packet;

pub use codec::{
    CODEC_HEADER_LEN, FRAME_SIZE_MAP, FRAME_SIZES, OpusInfo, OpusPacketInfo, SAMPLE_RATES,
    decode_header, decode_header_base64, encode_header, encode_header_base64, opus_packet_info,
};
pub use commands::{
    Command, CommandStatus, LogonRequest, LogonResponse, SendImageRequest, SendImageResponse,
    SendTextMessageRequest, StartStreamRequest, StartStreamResponse, StopStreamRequest,
};
pub use error::{ProtocolError, ProtocolResult};
pub use events::{
    ChannelStatusEvent, ErrorEvent, Event, EventCode, ImageEvent, StreamStartEvent,
    StreamStopEvent, TextMessageEvent,
};
pub use message::{Inbound, encode_raw_request, encode_request, parse_inbound};
pub use packet::{ImagePacketType, PACKET_HEADER_LEN, Packet, decode_packet, encode_packet};

/// Public Zello WebSocket endpoint.
pub const DEFAULT_SERVER_URL: &str = "wss://zello.io/ws";

/// Highest channel count the service accepts for audio streams.
pub const AUDIO_MAX_CHANNELS: u8 = 1;

/// Error strings the server is known to return.
pub mod errors {
    /// Someone else holds the channel.
    pub const CHANNEL_BUSY: &str = "channel busy";
    /// Wrong password for the account.
    pub const INVALID_PASSWORD: &str = "invalid password";
    /// Bad or missing auth token.
    pub const NOT_AUTHORIZED: &str = "not authorized";
    /// Logon succeeded but the channel did not come online.
    pub const CHANNEL_NOT_AVAILABLE: &str = "channel not available";
    /// Logon response did not grant a session.
    pub const AUTHORIZATION_FAILED: &str = "authorization failed";
}
