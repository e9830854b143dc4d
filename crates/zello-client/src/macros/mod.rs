//! Multi-step workflows built on the session: logon, push-to-talk audio,
//! images and text messages.
//!
//! Each macro is an `async` method on [`Session`](crate::Session). Every
//! internal wait races the session exception, so a dead connection ends a
//! macro at once.

mod logon;
mod send_audio;
mod send_image;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::ClientResult;

pub use logon::LogonOutcome;

/// Bounded retry of a request the server refuses with `channel busy`.
///
/// After each busy answer the request is repeated after `delay`, until at
/// least `retries + 1` attempts have been made and `during` has elapsed
/// since the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStrategy {
    pub retries: u32,
    pub during: Duration,
    pub delay: Duration,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            retries: 0,
            during: Duration::ZERO,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryStrategy {
    /// No retries at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Runs `attempt` until it succeeds, fails with anything but
    /// `channel busy`, or the budget is spent.
    ///
    /// `attempt` receives the 1-based attempt number.
    pub async fn run<F, Fut, T>(&self, mut attempt: F) -> ClientResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let started = Instant::now();
        let mut number = 1u32;
        loop {
            match attempt(number).await {
                Err(e) if e.is_channel_busy() => {
                    let elapsed = started.elapsed();
                    if number > self.retries && elapsed >= self.during {
                        debug!(attempts = number, "channel still busy, giving up");
                        return Err(e);
                    }
                    debug!(attempt = number, delay_ms = self.delay.as_millis() as u64, "channel busy, retrying");
                    tokio::time::sleep(self.delay).await;
                    number += 1;
                }
                other => return other,
            }
        }
    }
}

/// Settings for [`Session::send_audio`](crate::Session::send_audio).
#[derive(Debug, Clone, Default)]
pub struct SendAudioOptions {
    pub retry: RetryStrategy,
    /// Talk to one user instead of the whole channel.
    pub recipient: Option<String>,
}

/// Spaces out packet sends to roughly real time.
#[derive(Debug)]
pub(crate) struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns once `interval` has passed since the previous tick; the first
    /// tick returns at once.
    pub(crate) async fn tick(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
