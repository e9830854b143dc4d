mod common;

use std::time::Duration;

use serde_json::{Value, json};

use common::{MockServer, ServerConn};
use zello_client::{
    ClientError, ClientResult, Credentials, ImageResizer, OpusReader, ResizedImage, RetryStrategy,
    SendAudioOptions,
};
use zello_core::NameRegistry;
use zello_protocol::{OpusInfo, Packet, decode_packet, errors};

fn credentials() -> Credentials {
    Credentials::new("Test", "jwt").with_user("bot", "secret")
}

fn channel_status(status: &str) -> Value {
    json!({
        "command": "on_channel_status",
        "channel": "Test",
        "status": status,
        "users_online": 3,
    })
}

/// Answers a logon with `response` and announces the channel as `status`.
async fn serve_logon(conn: &mut ServerConn, response: Value, status: &str) -> Value {
    let logon = conn.recv_json().await;
    conn.send_json(channel_status(status)).await;
    conn.reply(&logon, response).await;
    logon
}

#[tokio::test]
async fn logon_succeeds_with_token_and_online_channel() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let logon = serve_logon(
            &mut conn,
            json!({ "success": true, "refresh_token": "refresh" }),
            "online",
        )
        .await;
        assert_eq!(logon["command"], "logon");
        assert_eq!(logon["channel"], "Test");
        assert_eq!(logon["auth_token"], "jwt");
        assert_eq!(logon["username"], "bot");
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let outcome = session
        .run(|ctx| async move { ctx.step(ctx.session().logon(&credentials())).await })
        .await
        .unwrap();
    assert_eq!(outcome.refresh_token, "refresh");
    assert_eq!(outcome.channel_status.users_online, 3);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn logon_fails_when_channel_is_offline() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        serve_logon(
            &mut conn,
            json!({ "success": true, "refresh_token": "refresh" }),
            "offline",
        )
        .await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session.logon(&credentials()).await.unwrap_err();
    assert_eq!(err, ClientError::application(errors::CHANNEL_NOT_AVAILABLE));

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn logon_without_refresh_token_is_unauthorized() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        serve_logon(&mut conn, json!({ "success": true }), "online").await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session.logon(&credentials()).await.unwrap_err();
    assert_eq!(err, ClientError::application(errors::AUTHORIZATION_FAILED));

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn logon_reports_server_error() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        serve_logon(&mut conn, json!({ "error": "invalid password" }), "online").await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session.logon(&credentials()).await.unwrap_err();
    assert_eq!(err, ClientError::application(errors::INVALID_PASSWORD));

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn logon_rejects_incomplete_credentials_before_sending() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session
        .logon(&Credentials::new("Test", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials(_)));
    assert_eq!(session.last_sent_seq(), 0);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn send_audio_retries_busy_channel_then_streams_and_stops() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let first = conn.recv_json().await;
        assert_eq!(first["command"], "start_stream");
        assert_eq!(first["type"], "audio");
        assert_eq!(first["codec"], "opus");
        assert_eq!(first["codec_header"], "gLsBFA==");
        assert_eq!(first["packet_duration"], 20);
        conn.reply(&first, json!({ "error": "channel busy" })).await;

        let second = conn.recv_json().await;
        assert_eq!(second["command"], "start_stream");
        conn.reply(&second, json!({ "success": true, "stream_id": 77 }))
            .await;

        for expected_id in 0..3u32 {
            let packet = decode_packet(&conn.recv_binary().await).unwrap();
            assert_eq!(
                packet,
                Some(Packet::audio(77, expected_id, vec![0xF8, expected_id as u8]))
            );
        }

        let stop = conn.recv_json().await;
        assert_eq!(stop["command"], "stop_stream");
        assert_eq!(stop["streamId"], 77);
        conn.reply(&stop, json!({ "success": true })).await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let packets = (0..3u8).map(|i| vec![0xF8, i]).collect();
    let audio = OpusReader::from_packets(48000, packets).unwrap();
    let options = SendAudioOptions {
        retry: RetryStrategy {
            retries: 1,
            during: Duration::ZERO,
            delay: Duration::from_millis(10),
        },
        recipient: None,
    };

    let started = tokio::time::Instant::now();
    session.send_audio(audio, &options).await.unwrap();
    // three packets paced 20ms apart
    assert!(started.elapsed() >= Duration::from_millis(40));

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn send_audio_gives_up_on_busy_channel_without_retries() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let request = conn.recv_json().await;
        conn.reply(&request, json!({ "error": "channel busy" })).await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let audio = OpusReader::from_packets(48000, vec![vec![0xF8, 0]]).unwrap();
    let err = session
        .send_audio(audio, &SendAudioOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_channel_busy());
    assert_eq!(session.last_sent_seq(), 1);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn send_audio_keeps_input_error_when_stop_fails() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let start = conn.recv_json().await;
        conn.reply(&start, json!({ "success": true, "stream_id": 5 }))
            .await;
        let packet = decode_packet(&conn.recv_binary().await).unwrap();
        assert_eq!(packet, Some(Packet::audio(5, 0, vec![0xF8, 0])));

        let stop = conn.recv_json().await;
        assert_eq!(stop["command"], "stop_stream");
        conn.reply(&stop, json!({ "error": "not authorized" })).await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let input = futures_util::stream::iter(vec![
        Ok(vec![0xF8, 0]),
        Err(ClientError::Audio("encoder crashed".into())),
    ]);
    let audio = OpusReader::new(OpusInfo::mono(48000, 1, 20.0), input);
    let err = session
        .send_audio(audio, &SendAudioOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Audio("encoder crashed".into()));

    session.close().await;
    server.join().await;
}

struct FixedResizer;

impl ImageResizer for FixedResizer {
    fn resize(&self, image: &[u8]) -> ClientResult<ResizedImage> {
        Ok(ResizedImage {
            width: 1000,
            height: 500,
            full: image.repeat(10),
            thumbnail: image.to_vec(),
        })
    }
}

#[tokio::test]
async fn send_image_sends_thumbnail_then_full_image() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let request = conn.recv_json().await;
        assert_eq!(request["command"], "send_image");
        assert_eq!(request["type"], "jpeg");
        assert_eq!(request["source"], "library");
        assert_eq!(request["for"], "alice");
        assert_eq!(request["width"], 1000);
        assert_eq!(request["height"], 500);
        assert_eq!(request["content_length"], 30);
        assert_eq!(request["thumbnail_content_length"], 3);
        conn.reply(&request, json!({ "success": true, "image_id": 12 }))
            .await;

        let thumbnail = decode_packet(&conn.recv_binary().await).unwrap().unwrap();
        assert!(matches!(thumbnail, Packet::Image { image_id: 12, packet_type: 2, ref payload } if payload.len() == 3));
        let full = decode_packet(&conn.recv_binary().await).unwrap().unwrap();
        assert!(matches!(full, Packet::Image { image_id: 12, packet_type: 1, ref payload } if payload.len() == 30));
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let image_id = session
        .send_image(&[1, 2, 3], &FixedResizer, Some("alice"))
        .await
        .unwrap();
    assert_eq!(image_id, 12);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn text_message_error_is_returned() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let request = conn.recv_json().await;
        assert_eq!(request["command"], "send_text_message");
        assert_eq!(request["text"], "hello");
        assert!(request.get("for").is_none());
        conn.reply(&request, json!({ "error": "not authorized" })).await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session
        .send_text_message("hello", None)
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::application(errors::NOT_AUTHORIZED));

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn script_can_clean_up_after_session_failure() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        conn.recv_json().await;
        conn.close(1011, "internal error").await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let result: ClientResult<&str> = session
        .run(|ctx| async move {
            match ctx.step(ctx.session().logon(&credentials())).await {
                Ok(_) => Ok("logged in"),
                Err(e) if e.is_transport() => {
                    // later steps fail straight away with the same error
                    let again = ctx.sleep(Duration::from_secs(60)).await.unwrap_err();
                    assert_eq!(again, e);
                    Ok("cleaned up")
                }
                Err(e) => Err(e),
            }
        })
        .await;
    assert_eq!(result, Ok("cleaned up"));

    session.close().await;
    server.join().await;
}
