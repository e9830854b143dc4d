//! Logon credentials and where they come from.

use std::fmt;

use serde::{Deserialize, Serialize};

use zello_protocol::LogonRequest;

use crate::error::{ClientError, ClientResult};

/// One account's logon record.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub auth_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("channel", &self.channel)
            .field("auth_token", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(channel: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            auth_token: auth_token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Checks the fields the server requires, without touching the network.
    pub fn validate(&self) -> ClientResult<()> {
        if self.channel.trim().is_empty() {
            return Err(ClientError::InvalidCredentials("channel is required".into()));
        }
        if self.auth_token.trim().is_empty() {
            return Err(ClientError::InvalidCredentials("auth_token is required".into()));
        }
        Ok(())
    }

    pub fn logon_request(&self) -> LogonRequest {
        LogonRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            channel: self.channel.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}

/// Supplies credentials for numbered accounts.
pub trait CredentialSource {
    /// Number of accounts available.
    fn account_count(&self) -> usize;

    /// Resolved credentials for account `index`.
    fn credentials(&self, index: usize) -> ClientResult<Credentials>;
}

impl CredentialSource for Vec<Credentials> {
    fn account_count(&self) -> usize {
        self.len()
    }

    fn credentials(&self, index: usize) -> ClientResult<Credentials> {
        self.get(index).cloned().ok_or_else(|| {
            ClientError::Config(format!(
                "account {} not found ({} configured)",
                index,
                self.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_and_token_are_required() {
        assert!(Credentials::new("Test", "jwt").validate().is_ok());
        assert!(matches!(
            Credentials::new("", "jwt").validate(),
            Err(ClientError::InvalidCredentials(msg)) if msg.contains("channel")
        ));
        assert!(matches!(
            Credentials::new("Test", " ").validate(),
            Err(ClientError::InvalidCredentials(msg)) if msg.contains("auth_token")
        ));
    }

    #[test]
    fn debug_hides_secrets() {
        let creds = Credentials::new("Test", "jwt-token").with_user("bot", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("bot"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("jwt-token"));
    }

    #[test]
    fn logon_request_copies_fields() {
        let request = Credentials::new("Test", "jwt")
            .with_user("bot", "pw")
            .logon_request();
        assert_eq!(request.username.as_deref(), Some("bot"));
        assert_eq!(request.channel, "Test");
        assert_eq!(request.auth_token, "jwt");
    }

    #[test]
    fn vec_source_reports_missing_account() {
        let source = vec![Credentials::new("Test", "jwt")];
        assert_eq!(source.account_count(), 1);
        assert!(source.credentials(0).is_ok());
        assert!(matches!(source.credentials(3), Err(ClientError::Config(_))));
    }
}
