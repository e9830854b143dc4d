use tracing::{Instrument, debug, info};

use zello_protocol::{ChannelStatusEvent, Event, EventCode, errors};

use crate::credentials::Credentials;
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, check_status};

/// What a successful logon returns.
#[derive(Debug, Clone, PartialEq)]
pub struct LogonOutcome {
    pub refresh_token: String,
    pub channel_status: ChannelStatusEvent,
}

impl Session {
    /// Logs on to the channel named in `credentials`.
    ///
    /// Sends `logon` and waits for the first `on_channel_status` at the same
    /// time; both have to come back positive.
    pub async fn logon(&self, credentials: &Credentials) -> ClientResult<LogonOutcome> {
        credentials.validate()?;
        let span = self.span().clone();

        async {
            debug!(channel = %credentials.channel, "logging in");
            let timeout = self.options().command_timeout;
            // registered before the command goes out so a fast status is not missed
            let status = self.wait_for_event(EventCode::ChannelStatus, |_| true, timeout);

            let command = async {
                let response = self.send_command(&credentials.logon_request()).await?;
                check_status(&response.status)?;
                match response.refresh_token {
                    Some(token) if response.status.succeeded() && !token.is_empty() => Ok(token),
                    _ => Err(ClientError::application(errors::AUTHORIZATION_FAILED)),
                }
            };
            let channel = async {
                match status.await? {
                    Event::ChannelStatus(status) if status.is_online() => Ok(status),
                    Event::ChannelStatus(status) => {
                        debug!(status = %status.status, "channel is not online");
                        Err(ClientError::application(errors::CHANNEL_NOT_AVAILABLE))
                    }
                    other => Err(ClientError::Protocol(format!(
                        "expected channel status, got {}",
                        other.code()
                    ))),
                }
            };

            let (refresh_token, channel_status) =
                self.guard(async { tokio::try_join!(command, channel) }).await?;
            info!(channel = %credentials.channel, "successfully logged in to channel");
            Ok(LogonOutcome {
                refresh_token,
                channel_status,
            })
        }
        .instrument(span)
        .await
    }
}
