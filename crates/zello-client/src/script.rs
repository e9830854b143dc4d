//! Script executor.
//!
//! A script is an async closure that receives a [`ScriptContext`]. Every
//! suspension point wrapped in [`ScriptContext::step`] races the session
//! exception: if the connection dies while a step is pending, that step
//! returns the session error, so the script can clean up with ordinary `?`
//! or `match` handling before [`Session::run`] returns.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{Instrument, debug, info};

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Handle a running script uses to reach its session.
#[derive(Debug)]
pub struct ScriptContext {
    session: Session,
    steps: AtomicU32,
}

impl ScriptContext {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            steps: AtomicU32::new(0),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Steps started so far.
    pub fn steps(&self) -> u32 {
        self.steps.load(Ordering::Relaxed)
    }

    /// Awaits `fut`, or the session failure if that comes first.
    ///
    /// Once the session has failed every further step fails immediately.
    pub async fn step<F, T>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let step = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(parent: self.session.span(), step, "executing script step");
        let result = self.session.guard(fut).await;
        if let Err(e) = &result {
            debug!(parent: self.session.span(), step, error = %e, "script step failed");
        }
        result
    }

    /// Like [`step`](Self::step) for futures that cannot fail themselves.
    pub async fn wait<F, T>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = T>,
    {
        self.step(async { Ok::<_, ClientError>(fut.await) }).await
    }

    /// Sleeps for `duration` unless the session fails first.
    pub async fn sleep(&self, duration: std::time::Duration) -> ClientResult<()> {
        self.wait(tokio::time::sleep(duration)).await
    }
}

impl Session {
    /// Runs a script against this session and returns its result.
    ///
    /// An error the script does not handle is returned as-is.
    pub async fn run<F, Fut, R>(&self, script: F) -> ClientResult<R>
    where
        F: FnOnce(ScriptContext) -> Fut,
        Fut: Future<Output = ClientResult<R>>,
    {
        let span = self.span().clone();
        async {
            info!("executing user script");
            let result = script(ScriptContext::new(self.clone())).await;
            match &result {
                Ok(_) => debug!("exiting user script"),
                Err(e) => info!(error = %e, "user script failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
