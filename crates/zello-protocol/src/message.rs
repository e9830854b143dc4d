//! JSON text frames.
//!
//! Outbound requests are the command's own fields plus `command` and `seq`.
//! Inbound frames are told apart by their keys: anything with `seq` answers a
//! request, anything else with `command` is an event.

use serde_json::{Map, Value};

use crate::commands::Command;
use crate::error::{ProtocolError, ProtocolResult};
use crate::events::{Event, EventCode};

/// A classified inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Answer to the request sent with `seq`.
    Response { seq: u32, body: Value },
    /// Event with a known code.
    Event(Event),
    /// Event whose code this crate does not know.
    UnknownEvent { command: String, body: Value },
    /// Neither `seq` nor `command` present.
    Unrecognized(Value),
}

/// Serializes a typed command into a request frame.
pub fn encode_request<C: Command>(command: &C, seq: u32) -> ProtocolResult<String> {
    encode_raw_request(C::CODE, seq, serde_json::to_value(command)?)
}

/// Serializes arbitrary request fields into a request frame.
///
/// `fields` must be a JSON object or `null`; `command` and `seq` override any
/// fields of the same name.
pub fn encode_raw_request(code: &str, seq: u32, fields: Value) -> ProtocolResult<String> {
    let mut object = match fields {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(ProtocolError::encoding(format!(
                "request fields must be an object, got {}",
                other
            )));
        }
    };
    object.insert("command".to_string(), Value::String(code.to_string()));
    object.insert("seq".to_string(), Value::from(seq));
    Ok(serde_json::to_string(&Value::Object(object))?)
}

/// Parses and classifies an inbound text frame.
pub fn parse_inbound(text: &str) -> ProtocolResult<Inbound> {
    let body: Value = serde_json::from_str(text)?;

    if let Some(seq) = body.get("seq") {
        let seq = seq
            .as_u64()
            .and_then(|s| u32::try_from(s).ok())
            .ok_or_else(|| ProtocolError::decoding(format!("invalid seq {}", seq)))?;
        return Ok(Inbound::Response { seq, body });
    }

    let Some(command) = body.get("command").and_then(Value::as_str) else {
        return Ok(Inbound::Unrecognized(body));
    };

    if EventCode::parse(command).is_none() {
        return Ok(Inbound::UnknownEvent {
            command: command.to_string(),
            body,
        });
    }

    Ok(Inbound::Event(serde_json::from_value(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{LogonRequest, StopStreamRequest};
    use crate::events::StreamStopEvent;
    use serde_json::json;

    #[test]
    fn request_frame_adds_command_and_seq() {
        let frame = encode_request(&StopStreamRequest { stream_id: 9 }, 4).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value,
            json!({"command": "stop_stream", "seq": 4, "streamId": 9})
        );
    }

    #[test]
    fn raw_request_overrides_reserved_fields() {
        let frame =
            encode_raw_request("logon", 2, json!({"seq": 99, "channel": "Test"})).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["seq"], 2);
        assert_eq!(value["command"], "logon");
        assert_eq!(value["channel"], "Test");

        let frame = encode_raw_request("ping", 1, Value::Null).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&frame).unwrap(),
            json!({"command": "ping", "seq": 1})
        );
    }

    #[test]
    fn raw_request_rejects_non_objects() {
        assert!(matches!(
            encode_raw_request("logon", 1, json!([1, 2])),
            Err(ProtocolError::Encoding(_))
        ));
    }

    #[test]
    fn typed_request_keeps_its_fields() {
        let logon = LogonRequest {
            username: Some("bot".into()),
            password: Some("secret".into()),
            channel: "Test".into(),
            auth_token: "jwt".into(),
        };
        let value: Value = serde_json::from_str(&encode_request(&logon, 1).unwrap()).unwrap();
        assert_eq!(value["username"], "bot");
        assert_eq!(value["auth_token"], "jwt");
    }

    #[test]
    fn seq_means_response() {
        // a response may also echo the command name
        let inbound = parse_inbound(r#"{"seq":3,"command":"logon","success":true}"#).unwrap();
        let Inbound::Response { seq, body } = inbound else {
            panic!("expected response");
        };
        assert_eq!(seq, 3);
        assert_eq!(body["success"], true);
    }

    #[test]
    fn command_without_seq_is_event() {
        let inbound = parse_inbound(r#"{"command":"on_stream_stop","stream_id":8}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Event(Event::StreamStop(StreamStopEvent { stream_id: 8 }))
        );
    }

    #[test]
    fn unknown_event_is_kept() {
        let inbound = parse_inbound(r#"{"command":"on_location","latitude":1.5}"#).unwrap();
        let Inbound::UnknownEvent { command, body } = inbound else {
            panic!("expected unknown event");
        };
        assert_eq!(command, "on_location");
        assert_eq!(body["latitude"], 1.5);
    }

    #[test]
    fn other_frames() {
        assert!(matches!(
            parse_inbound(r#"{"hello":"world"}"#).unwrap(),
            Inbound::Unrecognized(_)
        ));
        assert!(matches!(
            parse_inbound("not json"),
            Err(ProtocolError::Serialization(_))
        ));
        assert!(matches!(
            parse_inbound(r#"{"seq":-1}"#),
            Err(ProtocolError::Decoding(_))
        ));
    }
}
