//! Events pushed by the server.
//!
//! Event frames carry a `command` field naming the event and no `seq`.
//! Fields are defaulted so that events from newer servers with missing or
//! extra fields still parse.

use serde::{Deserialize, Serialize};

use crate::codec::{OpusInfo, decode_header_base64};
use crate::error::ProtocolResult;

/// Event codes understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    ChannelStatus,
    TextMessage,
    StreamStart,
    StreamStop,
    Image,
    Error,
}

impl EventCode {
    pub const ALL: [EventCode; 6] = [
        Self::ChannelStatus,
        Self::TextMessage,
        Self::StreamStart,
        Self::StreamStop,
        Self::Image,
        Self::Error,
    ];

    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChannelStatus => "on_channel_status",
            Self::TextMessage => "on_text_message",
            Self::StreamStart => "on_stream_start",
            Self::StreamStop => "on_stream_stop",
            Self::Image => "on_image",
            Self::Error => "on_error",
        }
    }

    /// Parses a wire name; `None` for codes this crate does not know.
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl std::fmt::Display for EventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `on_channel_status`: the channel went online or offline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelStatusEvent {
    pub channel: String,
    /// `"online"` or `"offline"`.
    pub status: String,
    pub users_online: u32,
    pub images_supported: bool,
    pub texting_supported: bool,
    pub locations_supported: bool,
    pub error: Option<String>,
    pub error_type: Option<String>,
}

impl ChannelStatusEvent {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// `on_text_message`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMessageEvent {
    pub channel: String,
    pub from: String,
    /// Recipient name, or `false` for channel-wide messages.
    #[serde(rename = "for")]
    pub recipient: Option<serde_json::Value>,
    pub message_id: u64,
    pub text: String,
}

/// `on_stream_start`: someone started talking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamStartEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub codec: String,
    pub codec_header: String,
    pub packet_duration: u32,
    pub stream_id: u32,
    pub channel: String,
    pub from: String,
    #[serde(rename = "for")]
    pub recipient: Option<serde_json::Value>,
}

impl StreamStartEvent {
    /// Stream parameters from the codec header.
    pub fn opus_info(&self) -> ProtocolResult<OpusInfo> {
        decode_header_base64(&self.codec_header)
    }

    pub fn is_audio(&self) -> bool {
        self.kind.is_empty() || self.kind == "audio"
    }
}

/// `on_stream_stop`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamStopEvent {
    pub stream_id: u32,
}

/// `on_image`: an image announcement; its bytes follow as image packets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageEvent {
    pub channel: String,
    pub from: String,
    #[serde(rename = "for")]
    pub recipient: Option<serde_json::Value>,
    pub message_id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// `on_error`: the session has failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorEvent {
    pub error: String,
}

/// A server event with a known code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum Event {
    #[serde(rename = "on_channel_status")]
    ChannelStatus(ChannelStatusEvent),
    #[serde(rename = "on_text_message")]
    TextMessage(TextMessageEvent),
    #[serde(rename = "on_stream_start")]
    StreamStart(StreamStartEvent),
    #[serde(rename = "on_stream_stop")]
    StreamStop(StreamStopEvent),
    #[serde(rename = "on_image")]
    Image(ImageEvent),
    #[serde(rename = "on_error")]
    Error(ErrorEvent),
}

impl Event {
    pub fn code(&self) -> EventCode {
        match self {
            Self::ChannelStatus(_) => EventCode::ChannelStatus,
            Self::TextMessage(_) => EventCode::TextMessage,
            Self::StreamStart(_) => EventCode::StreamStart,
            Self::StreamStop(_) => EventCode::StreamStop,
            Self::Image(_) => EventCode::Image,
            Self::Error(_) => EventCode::Error,
        }
    }
}
