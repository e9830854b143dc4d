//! One WebSocket connection to the Zello server.
//!
//! A [`Session`] owns the socket. Outbound commands get a sequence number and
//! a pending slot; a reader task classifies every inbound frame and either
//! resolves the matching slot, runs the event callback, or routes audio to
//! the stream it belongs to.
//!
//! ```text
//!              ┌──────────── reader task ────────────┐
//! socket ──►   │ text + seq      → pending[seq]      │
//!              │ text + command  → callback, waiters │
//!              │ binary audio    → streams[id]       │
//!              └─────────────────────────────────────┘
//! ```
//!
//! When the socket goes away the session exception is set and every waiting
//! call, racing against it, fails at once. A socket error or a close nobody
//! asked for is reported as unexpected; a requested close as `session closed`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, Span, debug, info, info_span, trace, warn};

use zello_core::NameRegistry;
use zello_protocol::{
    Command, CommandStatus, Event, EventCode, Inbound, Packet, StreamStartEvent, decode_packet,
    encode_packet, encode_raw_request, encode_request, parse_inbound,
};

use crate::audio::{AudioPacket, IncomingAudio};
use crate::error::{ClientError, ClientResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Close code reported when the socket went away without a close frame.
const ABNORMAL_CLOSE: u16 = 1006;

/// Lifecycle of the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        })
    }
}

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Base name for the session; made unique by the [`NameRegistry`].
    pub name: String,
    /// Limit for the WebSocket handshake.
    pub connect_timeout: Duration,
    /// Default deadline for command responses and event waits.
    pub command_timeout: Duration,
    /// How long `close` waits for the closing handshake.
    pub close_timeout: Duration,
    /// Packets buffered per inbound audio stream before dropping.
    pub inbound_queue: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            name: "bot".to_string(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(8),
            close_timeout: Duration::from_secs(5),
            inbound_queue: 256,
        }
    }
}

type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;
type EventFilter = Box<dyn Fn(&Event) -> bool + Send>;
type AudioHandler = Arc<dyn Fn(IncomingAudio) + Send + Sync>;

struct PendingCommand {
    command: String,
    tx: oneshot::Sender<ClientResult<Value>>,
}

struct EventWaiter {
    code: EventCode,
    filter: EventFilter,
    tx: oneshot::Sender<Event>,
}

#[derive(Default)]
struct Registry {
    pending: HashMap<u32, PendingCommand>,
    callbacks: HashMap<EventCode, EventCallback>,
    waiters: Vec<EventWaiter>,
    streams: HashMap<u32, mpsc::Sender<AudioPacket>>,
    audio_handler: Option<AudioHandler>,
}

/// Why the reader loop ended.
enum CloseReason {
    Frame { code: u16, reason: String },
    Error(String),
}

struct Inner {
    name: String,
    span: Span,
    options: SessionOptions,
    writer: tokio::sync::Mutex<WsSink>,
    /// Last sequence number handed out.
    reserved_seq: AtomicU32,
    /// Last sequence number that made it onto the socket.
    sent_seq: AtomicU32,
    state: watch::Sender<ConnectionState>,
    exception: watch::Sender<Option<ClientError>>,
    close_requested: AtomicBool,
    registry: Mutex<Registry>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a connected session. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.inner.name)
            .field("state", &self.status())
            .finish()
    }
}

/// Removes a pending command however its wait ends.
struct PendingGuard<'a> {
    inner: &'a Inner,
    seq: u32,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.inner.registry().pending.remove(&self.seq);
    }
}

impl Session {
    /// Opens a session to `url`.
    ///
    /// The session name is taken from `names` so that log lines of concurrent
    /// bots can be told apart.
    pub async fn connect(
        url: &str,
        options: SessionOptions,
        names: &NameRegistry,
    ) -> ClientResult<Session> {
        let name = names.assign(&options.name);
        let span = info_span!("session", bot = %name);

        async move {
            info!("starting session");
            debug!(url, "connecting");

            let (socket, _response) = tokio::time::timeout(options.connect_timeout, connect_async(url))
                .await
                .map_err(|_| {
                    warn!(url, "connection timed out");
                    ClientError::transport(format!(
                        "connection to {} timed out after {}s",
                        url,
                        options.connect_timeout.as_secs()
                    ))
                })?
                .map_err(|e| {
                    warn!(url, error = %e, "connection failed");
                    ClientError::transport(format!("failed to connect to {}: {}", url, e))
                })?;

            info!(url, "connected");
            let (sink, stream) = socket.split();
            let (state, _) = watch::channel(ConnectionState::Open);
            let (exception, _) = watch::channel(None);

            let inner = Arc::new(Inner {
                name,
                span: Span::current(),
                options,
                writer: tokio::sync::Mutex::new(sink),
                reserved_seq: AtomicU32::new(0),
                sent_seq: AtomicU32::new(0),
                state,
                exception,
                close_requested: AtomicBool::new(false),
                registry: Mutex::new(Registry::default()),
                reader: Mutex::new(None),
            });

            let reader = tokio::spawn(
                read_loop(Arc::clone(&inner), stream).instrument(Span::current()),
            );
            *inner.reader_handle() = Some(reader);

            Ok::<_, ClientError>(Session { inner })
        }
        .instrument(span)
        .await
    }

    /// Name assigned to this session.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Session settings.
    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    /// Current socket state.
    pub fn status(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Last sequence number confirmed sent, 0 before the first command.
    pub fn last_sent_seq(&self) -> u32 {
        self.inner.sent_seq.load(Ordering::SeqCst)
    }

    /// Error that ended the session, if it has ended.
    pub fn failure(&self) -> Option<ClientError> {
        self.inner.exception.borrow().clone()
    }

    /// Sends a command built from raw fields and waits for the response.
    ///
    /// The response body is returned as-is, including any `error` field.
    pub async fn send(&self, command: &str, fields: Value, timeout: Duration) -> ClientResult<Value> {
        let (seq, rx) = self
            .transmit(command, |seq| encode_raw_request(command, seq, fields))
            .await?;
        self.await_response(command, seq, rx, timeout).await
    }

    /// Sends a typed command with the default command timeout.
    pub async fn send_command<C: Command>(&self, command: &C) -> ClientResult<C::Response> {
        self.send_command_with_timeout(command, self.inner.options.command_timeout)
            .await
    }

    /// Sends a typed command and decodes the response.
    pub async fn send_command_with_timeout<C: Command>(
        &self,
        command: &C,
        timeout: Duration,
    ) -> ClientResult<C::Response> {
        let (seq, rx) = self
            .transmit(C::CODE, |seq| encode_request(command, seq))
            .await?;
        let body = self.await_response(C::CODE, seq, rx, timeout).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn transmit<F>(
        &self,
        command: &str,
        encode: F,
    ) -> ClientResult<(u32, oneshot::Receiver<ClientResult<Value>>)>
    where
        F: FnOnce(u32) -> zello_protocol::ProtocolResult<String>,
    {
        let inner = &self.inner;
        // the writer lock keeps frames in sequence order
        let mut sink = inner.writer.lock().await;

        let state = self.status();
        if state != ConnectionState::Open {
            warn!(parent: &inner.span, command, %state, "cannot send command");
            return Err(ClientError::NotConnected { state });
        }

        let seq = inner.reserved_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let frame = encode(seq)?;
        let (tx, rx) = oneshot::channel();
        inner.registry().pending.insert(
            seq,
            PendingCommand {
                command: command.to_string(),
                tx,
            },
        );

        debug!(parent: &inner.span, command, seq, "sending command");
        trace!(parent: &inner.span, frame = %frame, "command request");
        if let Err(e) = sink.send(Message::Text(frame)).await {
            inner.registry().pending.remove(&seq);
            warn!(parent: &inner.span, command, seq, error = %e, "failed to send command");
            return Err(ClientError::transport(format!(
                "failed to send `{}`: {}",
                command, e
            )));
        }
        inner.sent_seq.store(seq, Ordering::SeqCst);
        Ok((seq, rx))
    }

    async fn await_response(
        &self,
        command: &str,
        seq: u32,
        rx: oneshot::Receiver<ClientResult<Value>>,
        timeout: Duration,
    ) -> ClientResult<Value> {
        let _guard = PendingGuard {
            inner: &self.inner,
            seq,
        };
        tokio::select! {
            response = rx => match response {
                Ok(result) => result,
                Err(_) => Err(ClientError::transport("connection closed")),
            },
            _ = tokio::time::sleep(timeout) => {
                debug!(parent: &self.inner.span, command, seq, "command timed out");
                Err(ClientError::CommandTimeout {
                    command: command.to_string(),
                    timeout,
                })
            }
            err = self.exception() => Err(err),
        }
    }

    /// Sends one binary packet.
    pub async fn send_packet(&self, packet: &Packet) -> ClientResult<()> {
        let bytes = encode_packet(packet)?;
        let mut sink = self.inner.writer.lock().await;
        let state = self.status();
        if state != ConnectionState::Open {
            return Err(ClientError::NotConnected { state });
        }
        trace!(parent: &self.inner.span, kind = packet.kind(), len = bytes.len(), "sending packet");
        sink.send(Message::Binary(bytes))
            .await
            .map_err(|e| ClientError::transport(format!("failed to send packet: {}", e)))
    }

    /// Installs the callback for `code`, replacing any previous one.
    pub fn on<F>(&self, code: EventCode, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        debug!(parent: &self.inner.span, event = %code, "setting event callback");
        self.inner
            .registry()
            .callbacks
            .insert(code, Arc::new(callback));
    }

    /// Installs the handler for inbound audio streams.
    ///
    /// Every `on_stream_start` after this call gets its own packet queue,
    /// handed to `handler` as an [`IncomingAudio`].
    pub fn on_audio_stream<F>(&self, handler: F)
    where
        F: Fn(IncomingAudio) + Send + Sync + 'static,
    {
        debug!(parent: &self.inner.span, "setting audio stream handler");
        self.inner.registry().audio_handler = Some(Arc::new(handler));
    }

    /// Waits for the first `code` event accepted by `filter`.
    ///
    /// The waiter is registered when this method is called, not when the
    /// future is first polled, so an event arriving in between is not lost.
    pub fn wait_for_event<F>(
        &self,
        code: EventCode,
        filter: F,
        timeout: Duration,
    ) -> impl Future<Output = ClientResult<Event>> + Send + 'static + use<F>
    where
        F: Fn(&Event) -> bool + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        debug!(parent: &self.inner.span, event = %code, "setting event await");
        {
            let mut registry = self.inner.registry();
            // drop waiters whose futures timed out or were dropped
            registry.waiters.retain(|waiter| !waiter.tx.is_closed());
            registry.waiters.push(EventWaiter {
                code,
                filter: Box::new(filter),
                tx,
            });
        }

        let session = self.clone();
        async move {
            tokio::select! {
                event = rx => event.map_err(|_| {
                    session
                        .failure()
                        .unwrap_or_else(|| ClientError::transport("connection closed"))
                }),
                _ = tokio::time::sleep(timeout) => Err(ClientError::EventTimeout {
                    event: code.as_str().to_string(),
                    timeout,
                }),
                err = session.exception() => Err(err),
            }
        }
    }

    /// Resolves once the session has failed.
    pub async fn exception(&self) -> ClientError {
        let mut rx = self.inner.exception.subscribe();
        let failure = match rx.wait_for(Option::is_some).await {
            Ok(failure) => failure.clone(),
            Err(_) => None,
        };
        failure.unwrap_or_else(|| ClientError::transport("session dropped"))
    }

    /// Awaits `fut` unless the session fails first.
    pub async fn guard<F, T>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        tokio::select! {
            biased;
            result = fut => result,
            err = self.exception() => Err(err),
        }
    }

    /// Closes the socket and waits for the closing handshake.
    ///
    /// Safe to call more than once and on a session that already died.
    pub async fn close(&self) {
        let inner = &self.inner;
        let first = !inner.close_requested.swap(true, Ordering::SeqCst);

        if first && self.status() == ConnectionState::Open {
            debug!(parent: &inner.span, "requested socket close");
            inner.state.send_replace(ConnectionState::Closing);
            inner.teardown_streams();

            let frame = Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: Cow::Borrowed(""),
            }));
            let mut sink = inner.writer.lock().await;
            if let Err(e) = sink.send(frame).await {
                debug!(parent: &inner.span, error = %e, "failed to send close frame");
            }
        }

        let mut state = inner.state.subscribe();
        let closed = tokio::time::timeout(
            inner.options.close_timeout,
            state.wait_for(|s| *s == ConnectionState::Closed),
        )
        .await;

        if !matches!(closed, Ok(Ok(_))) {
            warn!(parent: &inner.span, "closing handshake timed out, dropping connection");
            if let Some(reader) = inner.reader_handle().take() {
                reader.abort();
            }
            inner.span.in_scope(|| inner.finish(None));
        }
    }

    /// Number of commands waiting for a response.
    pub fn pending_commands(&self) -> usize {
        self.inner.registry().pending.len()
    }

    /// Number of registered event waiters.
    pub fn pending_waiters(&self) -> usize {
        self.inner.registry().waiters.len()
    }

    /// Number of inbound audio streams currently routed.
    pub fn active_streams(&self) -> usize {
        self.inner.registry().streams.len()
    }

    pub(crate) fn span(&self) -> &Span {
        &self.inner.span
    }
}

impl Inner {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn reader_handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.reader.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn dispatch_text(&self, text: &str) {
        trace!(frame = %text, "text frame");
        match parse_inbound(text) {
            Ok(Inbound::Response { seq, body }) => {
                let pending = self.registry().pending.remove(&seq);
                match pending {
                    Some(pending) => {
                        debug!(seq, command = %pending.command, "command response");
                        let _ = pending.tx.send(Ok(body));
                    }
                    None => debug!(seq, "response for unknown or expired command"),
                }
            }
            Ok(Inbound::Event(event)) => self.dispatch_event(event),
            Ok(Inbound::UnknownEvent { command, .. }) => {
                debug!(event = %command, "ignoring unknown event");
            }
            Ok(Inbound::Unrecognized(body)) => warn!(%body, "unknown message"),
            Err(e) => warn!(error = %e, "malformed text frame"),
        }
    }

    fn dispatch_event(&self, event: Event) {
        let code = event.code();
        debug!(event = %code, "event");

        let callback = self.registry().callbacks.get(&code).cloned();
        if let Some(callback) = callback {
            debug!(event = %code, "running callback");
            callback(&event);
        }

        self.resolve_waiters(&event);

        match &event {
            Event::StreamStart(start) => self.open_incoming_stream(start),
            Event::StreamStop(stop) => {
                if self.registry().streams.remove(&stop.stream_id).is_some() {
                    debug!(stream_id = stop.stream_id, "inbound stream ended");
                }
            }
            Event::Error(error) => {
                let pending: Vec<_> = self.registry().pending.drain().collect();
                for (seq, command) in pending {
                    debug!(seq, command = %command.command, "cancelling command");
                    let _ = command
                        .tx
                        .send(Err(ClientError::application(error.error.clone())));
                }
            }
            _ => {}
        }
    }

    fn resolve_waiters(&self, event: &Event) {
        let waiters = std::mem::take(&mut self.registry().waiters);
        let mut kept = Vec::with_capacity(waiters.len());
        for waiter in waiters {
            if waiter.tx.is_closed() {
                continue;
            }
            if waiter.code == event.code() && (waiter.filter)(event) {
                let _ = waiter.tx.send(event.clone());
            } else {
                kept.push(waiter);
            }
        }
        // waiters registered by a callback while we were matching stay too
        let mut registry = self.registry();
        kept.append(&mut registry.waiters);
        registry.waiters = kept;
    }

    fn open_incoming_stream(&self, start: &StreamStartEvent) {
        let Some(handler) = self.registry().audio_handler.clone() else {
            return;
        };
        if !start.is_audio() {
            debug!(kind = %start.kind, "ignoring non-audio stream");
            return;
        }
        let opus_info = match start.opus_info() {
            Ok(info) => info,
            Err(e) => {
                warn!(stream_id = start.stream_id, error = %e, "bad codec header, ignoring stream");
                return;
            }
        };
        if let Err(e) = opus_info.validate() {
            warn!(stream_id = start.stream_id, error = %e, "unusual stream parameters");
        }

        debug!(stream_id = start.stream_id, from = %start.from, "creating inbound audio stream");
        let (tx, rx) = mpsc::channel(self.options.inbound_queue.max(1));
        self.registry().streams.insert(start.stream_id, tx);
        handler(IncomingAudio::new(start.clone(), opus_info, rx));
    }

    fn dispatch_binary(&self, data: Vec<u8>) {
        trace!(len = data.len(), "binary frame");
        match decode_packet(&data) {
            Ok(Some(Packet::Audio {
                stream_id,
                packet_id,
                payload,
            })) => {
                let sender = self.registry().streams.get(&stream_id).cloned();
                let Some(sender) = sender else {
                    trace!(stream_id, "audio for unknown stream");
                    return;
                };
                match sender.try_send(AudioPacket { packet_id, payload }) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(stream_id, packet_id, "inbound audio queue full, dropping packet");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!(stream_id, "inbound stream consumer gone");
                        self.registry().streams.remove(&stream_id);
                    }
                }
            }
            Ok(Some(Packet::Image { image_id, .. })) => {
                debug!(image_id, "image receiving is not supported, dropping packet");
            }
            Ok(Some(Packet::Unknown { kind, .. })) => debug!(kind, "unknown packet"),
            Ok(None) => warn!("empty packet"),
            Err(e) => warn!(error = %e, "malformed packet"),
        }
    }

    fn teardown_streams(&self) {
        let streams = std::mem::take(&mut self.registry().streams);
        if !streams.is_empty() {
            debug!(count = streams.len(), "tearing down inbound streams");
        }
    }

    /// Final state change once the socket is gone.
    fn finish(&self, reason: Option<CloseReason>) {
        if *self.state.borrow() == ConnectionState::Closed {
            return;
        }
        let requested = self.close_requested.load(Ordering::SeqCst);
        if requested {
            info!("socket closed (normal)");
        } else {
            warn!("socket closed (emergency)");
        }
        self.state.send_replace(ConnectionState::Closed);

        // a requested close still interrupts running scripts
        let failure = match reason {
            _ if requested => ClientError::transport("session closed"),
            Some(CloseReason::Error(e)) => {
                ClientError::transport(format!("Unexpected websocket error: {}", e))
            }
            Some(CloseReason::Frame { code, reason }) => ClientError::transport(format!(
                "Unexpected close, code: {}, reason: {}",
                code, reason
            )),
            None => ClientError::transport(format!(
                "Unexpected close, code: {}, reason: ",
                ABNORMAL_CLOSE
            )),
        };
        self.exception.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(failure.clone());
            true
        });

        let (pending, waiters) = {
            let mut registry = self.registry();
            let pending: Vec<_> = registry.pending.drain().map(|(_, p)| p).collect();
            (pending, std::mem::take(&mut registry.waiters))
        };
        for command in pending {
            let _ = command.tx.send(Err(failure.clone()));
        }
        drop(waiters);
        self.teardown_streams();
    }
}

async fn read_loop(inner: Arc<Inner>, mut stream: SplitStream<WsStream>) {
    let mut close_frame = None;

    let reason = loop {
        match stream.next().await {
            Some(Ok(message)) => {
                if *inner.state.borrow() != ConnectionState::Open {
                    if let Message::Close(frame) = message {
                        close_frame = frame;
                    } else {
                        debug!(state = %*inner.state.borrow(), "ignoring frame");
                    }
                    continue;
                }
                match message {
                    Message::Text(text) => inner.dispatch_text(&text),
                    Message::Binary(data) => inner.dispatch_binary(data),
                    Message::Close(frame) => {
                        debug!(?frame, "close frame received");
                        close_frame = frame;
                    }
                    Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                }
            }
            Some(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed))
            | None => {
                break close_frame.take().map(|frame| CloseReason::Frame {
                    code: u16::from(frame.code),
                    reason: frame.reason.into_owned(),
                });
            }
            Some(Err(e)) => {
                warn!(error = %e, "socket error");
                break Some(CloseReason::Error(e.to_string()));
            }
        }
    };

    inner.finish(reason);
}

/// Maps a response status to an application error.
pub fn check_status(status: &CommandStatus) -> ClientResult<()> {
    status.check().map_err(ClientError::application)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(ConnectionState::Connecting.to_string(), "CONNECTING");
        assert_eq!(ConnectionState::Open.to_string(), "OPEN");
        assert_eq!(ConnectionState::Closing.to_string(), "CLOSING");
        assert_eq!(ConnectionState::Closed.to_string(), "CLOSED");
    }

    #[test]
    fn default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.name, "bot");
        assert_eq!(options.command_timeout, Duration::from_secs(8));
        assert_eq!(options.inbound_queue, 256);
    }

    #[test]
    fn status_errors_become_application_errors() {
        let status = CommandStatus {
            seq: 1,
            success: None,
            error: Some("not authorized".into()),
        };
        assert_eq!(
            check_status(&status),
            Err(ClientError::application("not authorized"))
        );
        assert!(check_status(&CommandStatus::default()).is_ok());
    }
}
