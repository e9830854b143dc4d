//! Jitter buffer between network audio and a steady consumer.
//!
//! The writer side receives decoded audio in irregular bursts, the reader
//! side pulls fixed-size chunks at playback cadence. Bytes accumulate until
//! `max_bytes` are queued; from then on each pull is answered straight away
//! and each write beyond the threshold waits for the next pull, so latency
//! stays bounded at roughly `max_bytes` of audio.
//!
//! ```text
//!  write ──► [ chunk | chunk | chunk | ... ] ──► pull(size)
//!            \________ max_bytes ________/
//! ```
//!
//! One outstanding pull and one blocked write are supported; `&mut self` on
//! both halves enforces that.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::Stream;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Default)]
struct FlowState {
    queue: VecDeque<Vec<u8>>,
    queued: usize,
    max_bytes: usize,
    /// Size of the outstanding pull, 0 if none.
    requested: usize,
    pull: Option<oneshot::Sender<Vec<u8>>>,
    /// Set while a write waits for the consumer.
    blocked_writer: Option<oneshot::Sender<()>>,
    finished: bool,
    reader_closed: bool,
}

impl FlowState {
    /// Removes up to `requested` bytes from the front of the queue, splitting
    /// the boundary chunk.
    fn take_requested(&mut self) -> Vec<u8> {
        let wanted = self.requested.min(self.queued);
        let mut reply = Vec::with_capacity(wanted);
        while reply.len() < wanted {
            let Some(mut chunk) = self.queue.pop_front() else {
                break;
            };
            let missing = wanted - reply.len();
            if chunk.len() > missing {
                let rest = chunk.split_off(missing);
                self.queue.push_front(rest);
            }
            reply.extend_from_slice(&chunk);
        }
        self.queued -= reply.len();
        self.requested = 0;
        trace!(reply = reply.len(), queued = self.queued, "flow buffer read");
        reply
    }

    fn take_all(&mut self) -> Vec<u8> {
        let reply: Vec<u8> = self.queue.drain(..).flatten().collect();
        self.queued = 0;
        self.requested = 0;
        reply
    }

    /// Answers the outstanding pull, if any.
    fn serve_pull(&mut self) -> bool {
        let Some(pull) = self.pull.take() else {
            return false;
        };
        let reply = self.take_requested();
        // a dropped pull future loses its bytes, same as a dropped reader
        let _ = pull.send(reply);
        true
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<FlowState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FlowState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Creates a buffer holding up to `max_bytes`.
///
/// `max_bytes` is raised to `min_pull` when smaller so that a pull of the
/// consumer's usual size can always be served.
pub fn flow_buffer(max_bytes: usize, min_pull: usize) -> (FlowWriter, FlowReader) {
    let max_bytes = if min_pull > max_bytes {
        trace!(max_bytes, min_pull, "flow buffer size raised to pull size");
        min_pull
    } else {
        max_bytes
    };
    let shared = Arc::new(Shared {
        state: Mutex::new(FlowState {
            max_bytes: max_bytes.max(1),
            ..FlowState::default()
        }),
    });
    (
        FlowWriter {
            shared: Arc::clone(&shared),
            finished: false,
        },
        FlowReader { shared },
    )
}

/// Producer half.
#[derive(Debug)]
pub struct FlowWriter {
    shared: Arc<Shared>,
    finished: bool,
}

impl FlowWriter {
    /// Queues a chunk, waiting for the consumer once the buffer is full.
    ///
    /// Fails when the reader has been dropped.
    pub async fn write(&mut self, chunk: Vec<u8>) -> ClientResult<()> {
        let waiter = {
            let mut state = self.shared.lock();
            if state.reader_closed {
                return Err(ClientError::Audio("flow buffer reader dropped".into()));
            }
            state.queued += chunk.len();
            state.queue.push_back(chunk);
            trace!(queued = state.queued, "flow buffer write");

            if state.queued < state.max_bytes {
                return Ok(());
            }
            if state.requested > 0 && state.serve_pull() {
                return Ok(());
            }
            trace!("flow buffer full, waiting for a pull");
            let (tx, rx) = oneshot::channel();
            state.blocked_writer = Some(tx);
            rx
        };

        waiter
            .await
            .map_err(|_| ClientError::Audio("flow buffer reader dropped".into()))
    }

    /// Bytes currently queued.
    pub fn queued(&self) -> usize {
        self.shared.lock().queued
    }

    /// Ends the stream; the reader receives whatever is left as one final
    /// chunk.
    pub fn finish(mut self) {
        self.mark_finished();
    }

    fn mark_finished(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let mut state = self.shared.lock();
        state.finished = true;
        if let Some(pull) = state.pull.take() {
            let rest = state.take_all();
            if !rest.is_empty() {
                let _ = pull.send(rest);
            }
        }
    }
}

impl Drop for FlowWriter {
    fn drop(&mut self) {
        self.mark_finished();
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct FlowReader {
    shared: Arc<Shared>,
}

impl FlowReader {
    /// Pulls `size` bytes.
    ///
    /// Answered at once while the buffer is full, otherwise waits until it
    /// fills up. After the writer finishes, the
    /// remaining bytes are returned in one chunk regardless of `size`, then
    /// `None`.
    pub async fn pull(&mut self, size: usize) -> Option<Vec<u8>> {
        let waiter = {
            let mut state = self.shared.lock();
            if state.finished {
                let rest = state.take_all();
                return (!rest.is_empty()).then_some(rest);
            }
            state.requested = size.max(1);
            trace!(size, queued = state.queued, "flow buffer pull");

            let writer = state.blocked_writer.take();
            if writer.is_some() || state.queued >= state.max_bytes {
                let reply = state.take_requested();
                if let Some(writer) = writer {
                    let _ = writer.send(());
                }
                return Some(reply);
            }
            let (tx, rx) = oneshot::channel();
            state.pull = Some(tx);
            rx
        };

        // the sender is dropped without a value when the writer finishes on
        // an empty queue
        waiter.await.ok()
    }

    /// Bytes currently queued.
    pub fn queued(&self) -> usize {
        self.shared.lock().queued
    }

    /// Turns the reader into a stream of `size`-byte chunks.
    pub fn into_chunks(self, size: usize) -> impl Stream<Item = Vec<u8>> + Send {
        futures_util::stream::unfold(self, move |mut reader| async move {
            let chunk = reader.pull(size).await?;
            Some((chunk, reader))
        })
    }
}

impl Drop for FlowReader {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.reader_closed = true;
        state.pull = None;
        // releases a blocked write with an error
        state.blocked_writer = None;
    }
}
