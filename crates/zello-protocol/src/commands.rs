//! Command requests and their responses.
//!
//! Requests are serialized without `command` and `seq`; those two fields are
//! added by [`encode_request`](crate::encode_request) when the frame is sent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec::{OpusInfo, encode_header_base64};
use crate::error::ProtocolResult;

/// A request the client can send, tied to its response type.
pub trait Command: Serialize {
    /// Value of the `command` field.
    const CODE: &'static str;
    /// Body the server answers with.
    type Response: DeserializeOwned;
}

/// Fields common to every command response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStatus {
    /// Sequence number of the request being answered.
    pub seq: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Named error returned by the server, e.g. `"channel busy"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandStatus {
    /// Error string if the server reported one, otherwise `Ok`.
    pub fn check(&self) -> Result<(), &str> {
        match self.error.as_deref() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// True when `success` is present and set.
    pub fn succeeded(&self) -> bool {
        self.success == Some(true)
    }
}

/// `logon`: authenticate and join a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogonRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub channel: String,
    pub auth_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogonResponse {
    #[serde(flatten)]
    pub status: CommandStatus,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Command for LogonRequest {
    const CODE: &'static str = "logon";
    type Response = LogonResponse;
}

/// `send_text_message`: post text to the channel or to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTextMessageRequest {
    pub text: String,
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl Command for SendTextMessageRequest {
    const CODE: &'static str = "send_text_message";
    type Response = CommandStatus;
}

/// `start_stream`: ask for the channel to transmit audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartStreamRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub codec: String,
    /// Base64 codec header.
    pub codec_header: String,
    /// Frame duration in milliseconds.
    pub packet_duration: u32,
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl StartStreamRequest {
    /// Opus audio stream described by `info`.
    pub fn audio(info: &OpusInfo) -> ProtocolResult<Self> {
        Ok(Self {
            kind: "audio".to_string(),
            codec: "opus".to_string(),
            codec_header: encode_header_base64(info)?,
            packet_duration: info.packet_duration_ms(),
            recipient: None,
        })
    }

    /// Sends the stream to a single user instead of the whole channel.
    #[must_use]
    pub fn to_user(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartStreamResponse {
    #[serde(flatten)]
    pub status: CommandStatus,
    #[serde(default)]
    pub stream_id: Option<u32>,
}

impl Command for StartStreamRequest {
    const CODE: &'static str = "start_stream";
    type Response = StartStreamResponse;
}

/// `stop_stream`: release the channel after transmitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopStreamRequest {
    #[serde(rename = "streamId")]
    pub stream_id: u32,
}

impl Command for StopStreamRequest {
    const CODE: &'static str = "stop_stream";
    type Response = CommandStatus;
}

/// `send_image`: announce an image; the bytes follow as image packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendImageRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub width: u32,
    pub height: u32,
    pub content_length: usize,
    pub thumbnail_content_length: usize,
}

impl SendImageRequest {
    /// JPEG picked from the library, the only combination the server accepts
    /// from bots.
    pub fn jpeg(width: u32, height: u32, content_length: usize, thumbnail_length: usize) -> Self {
        Self {
            kind: "jpeg".to_string(),
            source: "library".to_string(),
            recipient: None,
            width,
            height,
            content_length,
            thumbnail_content_length: thumbnail_length,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendImageResponse {
    #[serde(flatten)]
    pub status: CommandStatus,
    #[serde(default)]
    pub image_id: Option<u32>,
}

impl Command for SendImageRequest {
    const CODE: &'static str = "send_image";
    type Response = SendImageResponse;
}
