mod common;

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use common::{MockServer, ServerConn, TEST_TIMEOUT};
use zello_client::{ClientError, ConnectionState};
use zello_core::NameRegistry;
use zello_protocol::{Event, EventCode, Packet, encode_packet};

#[tokio::test]
async fn responses_are_matched_by_seq_not_arrival_order() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        let mut requests = Vec::new();
        for _ in 0..3 {
            requests.push(conn.recv_json().await);
        }
        for request in requests.iter().rev() {
            let n = request["n"].clone();
            conn.reply(request, json!({ "n": n })).await;
        }
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let timeout = Duration::from_secs(2);
    let (a, b, c) = tokio::join!(
        session.send("echo", json!({ "n": 1 }), timeout),
        session.send("echo", json!({ "n": 2 }), timeout),
        session.send("echo", json!({ "n": 3 }), timeout),
    );
    assert_eq!(a.unwrap()["n"], 1);
    assert_eq!(b.unwrap()["n"], 2);
    assert_eq!(c.unwrap()["n"], 3);
    assert_eq!(session.last_sent_seq(), 3);
    assert_eq!(session.pending_commands(), 0);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn unexpected_close_fails_every_pending_command_and_the_script() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        for _ in 0..3 {
            conn.recv_json().await;
        }
        conn.close(4001, "maintenance").await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let timeout = Duration::from_secs(2);
    let script = session.run(|ctx| async move {
        // parks on an event that never comes
        let status = ctx
            .session()
            .wait_for_event(EventCode::ChannelStatus, |_| true, timeout);
        ctx.step(status).await
    });
    let (a, b, c, script) = tokio::join!(
        session.send("first", json!({}), timeout),
        session.send("second", json!({}), timeout),
        session.send("third", json!({}), timeout),
        script,
    );

    let expected = ClientError::transport("Unexpected close, code: 4001, reason: maintenance");
    assert_eq!(a.unwrap_err(), expected);
    assert_eq!(b.unwrap_err(), expected);
    assert_eq!(c.unwrap_err(), expected);
    assert_eq!(script.unwrap_err(), expected);

    assert_eq!(session.status(), ConnectionState::Closed);
    assert_eq!(session.failure(), Some(expected));
    assert_eq!(session.pending_commands(), 0);
    server.join().await;
}

#[tokio::test]
async fn send_after_close_is_not_connected() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    session.close().await;
    let err = session
        .send("logon", json!({}), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::NotConnected {
            state: ConnectionState::Closed
        }
    );
    assert_eq!(
        err.to_string(),
        "cannot send command: socket state is CLOSED"
    );
    server.join().await;
}

#[tokio::test]
async fn unanswered_command_times_out_and_is_forgotten() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session
        .send("logon", json!({}), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::CommandTimeout { ref command, .. } if command == "logon"));
    assert_eq!(session.pending_commands(), 0);
    assert_eq!(session.status(), ConnectionState::Open);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn error_event_rejects_pending_commands() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        conn.recv_json().await;
        conn.send_json(json!({ "command": "on_error", "error": "kicked" }))
            .await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session
        .send("logon", json!({}), Duration::from_secs(2))
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::application("kicked"));
    // the connection itself survives
    assert_eq!(session.status(), ConnectionState::Open);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn callback_is_replaced_not_added() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        conn.recv_json().await;
        conn.send_json(json!({ "command": "on_text_message", "text": "hi", "from": "alice" }))
            .await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let first = tx.clone();
    session.on(EventCode::TextMessage, move |_| {
        let _ = first.send("first");
    });
    session.on(EventCode::TextMessage, move |_| {
        let _ = tx.send("second");
    });
    let _ = session
        .send("ready", json!({}), Duration::from_millis(10))
        .await;

    let got = tokio::time::timeout(TEST_TIMEOUT, rx.recv()).await.unwrap();
    assert_eq!(got, Some("second"));
    assert!(rx.try_recv().is_err());

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn wait_for_event_applies_filter() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        // wait for the client to signal it is ready
        conn.recv_json().await;
        for text in ["first", "second"] {
            conn.send_json(json!({ "command": "on_text_message", "text": text }))
                .await;
        }
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let waiter = session.wait_for_event(
        EventCode::TextMessage,
        |event| matches!(event, Event::TextMessage(m) if m.text == "second"),
        Duration::from_secs(2),
    );
    let _ = session
        .send("ready", json!({}), Duration::from_millis(10))
        .await;

    match waiter.await.unwrap() {
        Event::TextMessage(message) => assert_eq!(message.text, "second"),
        other => panic!("unexpected event {:?}", other),
    }

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn wait_for_event_times_out() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    let err = session
        .wait_for_event(EventCode::StreamStart, |_| true, Duration::from_millis(30))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EventTimeout { ref event, .. } if event == "on_stream_start"));

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn timed_out_waiters_are_pruned_on_next_wait() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    let short = Duration::from_millis(10);
    let (a, b, c) = tokio::join!(
        session.wait_for_event(EventCode::StreamStart, |_| true, short),
        session.wait_for_event(EventCode::StreamStop, |_| true, short),
        session.wait_for_event(EventCode::ChannelStatus, |_| true, short),
    );
    for result in [a, b, c] {
        assert!(matches!(result, Err(ClientError::EventTimeout { .. })));
    }
    // nothing arrived, so the timed-out waiters are still registered
    assert_eq!(session.pending_waiters(), 3);

    let _waiter = session.wait_for_event(EventCode::TextMessage, |_| true, TEST_TIMEOUT);
    assert_eq!(session.pending_waiters(), 1);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn inbound_audio_is_routed_by_stream_id() {
    let server = MockServer::start(|mut conn: ServerConn| async move {
        conn.recv_json().await;
        conn.send_json(json!({
            "command": "on_stream_start",
            "type": "audio",
            "codec": "opus",
            "codec_header": "gLsBFA==",
            "packet_duration": 20,
            "stream_id": 5,
            "channel": "Test",
            "from": "alice",
        }))
        .await;
        conn.send_binary(encode_packet(&Packet::audio(5, 0, vec![0xF8, 1])).unwrap())
            .await;
        // nobody announced stream 9
        conn.send_binary(encode_packet(&Packet::audio(9, 0, vec![0xF8, 9])).unwrap())
            .await;
        conn.send_binary(encode_packet(&Packet::audio(5, 1, vec![0xF8, 2])).unwrap())
            .await;
        conn.send_json(json!({ "command": "on_stream_stop", "stream_id": 5 }))
            .await;
        conn.finish().await;
    })
    .await;
    let session = server.connect(&NameRegistry::new()).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    session.on_audio_stream(move |incoming| {
        let _ = tx.send(incoming);
    });
    let _ = session
        .send("ready", json!({}), Duration::from_millis(10))
        .await;

    let mut incoming = tokio::time::timeout(TEST_TIMEOUT, rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(incoming.stream_id(), 5);
    assert_eq!(incoming.event.from, "alice");
    assert_eq!(incoming.opus_info.sample_rate, 48000);
    assert_eq!(incoming.opus_info.frame_size, 20.0);

    let mut received = Vec::new();
    while let Some(packet) = tokio::time::timeout(TEST_TIMEOUT, incoming.next_packet())
        .await
        .unwrap()
    {
        received.push((packet.packet_id, packet.payload));
    }
    assert_eq!(received, vec![(0, vec![0xF8, 1]), (1, vec![0xF8, 2])]);
    assert_eq!(session.active_streams(), 0);

    session.close().await;
    server.join().await;
}

#[tokio::test]
async fn close_is_idempotent() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    tokio::join!(session.close(), session.close());
    session.close().await;

    assert_eq!(session.status(), ConnectionState::Closed);
    assert_eq!(
        session.failure(),
        Some(ClientError::transport("session closed"))
    );
    server.join().await;
}

#[tokio::test]
async fn local_close_interrupts_running_script() {
    let server = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let session = server.connect(&NameRegistry::new()).await;

    let script = session.run(|ctx| async move {
        let parked = ctx
            .step(ctx.session().wait_for_event(
                EventCode::ChannelStatus,
                |_| true,
                TEST_TIMEOUT,
            ))
            .await
            .map(|_| ());
        let next = ctx.sleep(Duration::from_secs(60)).await;
        Ok((parked, next))
    });
    let closer = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.close().await;
    };
    let (observed, ()) = tokio::time::timeout(TEST_TIMEOUT, async { tokio::join!(script, closer) })
        .await
        .unwrap();

    let expected = ClientError::transport("session closed");
    let (parked, next) = observed.unwrap();
    assert_eq!(parked, Err(expected.clone()));
    assert_eq!(next, Err(expected));
    assert_eq!(session.status(), ConnectionState::Closed);
    server.join().await;
}

#[tokio::test]
async fn sessions_get_distinct_names() {
    let names = NameRegistry::new();
    let first = MockServer::start(|conn: ServerConn| conn.finish()).await;
    let second = MockServer::start(|conn: ServerConn| conn.finish()).await;

    let a = first.connect(&names).await;
    let b = second.connect(&names).await;
    assert_eq!(a.name(), "bot");
    assert_eq!(b.name(), "bot-1");

    a.close().await;
    b.close().await;
    first.join().await;
    second.join().await;
}

#[tokio::test]
async fn connect_to_nothing_fails() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = zello_client::Session::connect(
        &format!("ws://{}/ws", addr),
        common::test_options(),
        &NameRegistry::new(),
    )
    .await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}
