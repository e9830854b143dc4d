//! In-process Zello server double for integration tests.
//!
//! Each test hands [`MockServer::start`] a script that drives exactly one
//! accepted connection.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{WebSocketStream, accept_async};

use zello_client::{Session, SessionOptions};
use zello_core::NameRegistry;

/// Upper bound for any single wait inside a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MockServer {
    pub url: String,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Listens on a random port and runs `script` on the first connection.
    pub async fn start<F, Fut>(script: F) -> MockServer
    where
        F: FnOnce(ServerConn) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = accept_async(stream).await.unwrap();
            script(ServerConn { ws }).await;
        });
        MockServer {
            url: format!("ws://{}/ws", addr),
            task,
        }
    }

    /// Connects a session with test-friendly timeouts.
    pub async fn connect(&self, names: &NameRegistry) -> Session {
        Session::connect(&self.url, test_options(), names).await.unwrap()
    }

    /// Waits for the server script to finish, surfacing its panics.
    pub async fn join(self) {
        tokio::time::timeout(TEST_TIMEOUT, self.task)
            .await
            .expect("server script timed out")
            .expect("server script panicked");
    }
}

pub fn test_options() -> SessionOptions {
    SessionOptions {
        command_timeout: Duration::from_secs(2),
        close_timeout: Duration::from_secs(2),
        ..SessionOptions::default()
    }
}

pub struct ServerConn {
    ws: WebSocketStream<TcpStream>,
}

impl ServerConn {
    /// Next text frame as JSON, skipping control frames.
    pub async fn recv_json(&mut self) -> Value {
        loop {
            match self.next().await {
                Message::Text(text) => return serde_json::from_str(&text).unwrap(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("expected a text frame, got {:?}", other),
            }
        }
    }

    /// Next binary frame.
    pub async fn recv_binary(&mut self) -> Vec<u8> {
        loop {
            match self.next().await {
                Message::Binary(data) => return data,
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("expected a binary frame, got {:?}", other),
            }
        }
    }

    async fn next(&mut self) -> Message {
        tokio::time::timeout(TEST_TIMEOUT, self.ws.next())
            .await
            .expect("no frame from client")
            .expect("client went away")
            .expect("socket error")
    }

    pub async fn send_json(&mut self, value: Value) {
        self.ws.send(Message::Text(value.to_string())).await.unwrap();
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.ws.send(Message::Binary(data)).await.unwrap();
    }

    /// Answers the request `request` with `fields` plus its `seq`.
    pub async fn reply(&mut self, request: &Value, mut fields: Value) {
        fields["seq"] = request["seq"].clone();
        self.send_json(fields).await;
    }

    /// Starts a closing handshake nobody on the client asked for.
    pub async fn close(mut self, code: u16, reason: &str) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        let _ = self.ws.close(Some(frame)).await;
        self.drain().await;
    }

    /// Reads until the client closes, answering its closing handshake.
    pub async fn finish(mut self) {
        self.drain().await;
    }

    async fn drain(&mut self) {
        let _ = tokio::time::timeout(TEST_TIMEOUT, async {
            while let Some(Ok(_)) = self.ws.next().await {}
        })
        .await;
    }
}
