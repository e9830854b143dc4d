//! Subcommand implementations.

pub mod config;
pub mod listen;
pub mod say;

use tracing::debug;

use zello_core::NameRegistry;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::session::Session;

/// Opens a session with the configured settings.
pub(crate) async fn connect(
    config: &ClientConfig,
    url: &str,
    names: &NameRegistry,
) -> ClientResult<Session> {
    debug!(url, "opening session");
    Session::connect(url, config.session_options(), names).await
}
