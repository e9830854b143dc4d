//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/zello/config.toml` by default.
//!
//! Account values (`username`, `password`, `channel`, `auth_token`) support
//! secret references:
//! - `pass::path/in/store`: resolved via `pass show`
//! - `env::VAR_NAME`: resolved from the environment
//! - plain text: used as-is

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use zello_protocol::DEFAULT_SERVER_URL;

use crate::audio::PlaybackOptions;
use crate::credentials::{CredentialSource, Credentials};
use crate::error::{ClientError, ClientResult};
use crate::macros::RetryStrategy;
use crate::session::SessionOptions;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the zello client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Server/connection settings.
    pub server: ServerSettings,

    /// Session naming and buffering.
    pub session: SessionSettings,

    /// Inbound audio playback.
    pub playback: PlaybackSettings,

    /// Channel acquisition retries for outbound audio.
    pub push_to_talk: PushToTalkSettings,

    /// Logon records, addressed by index.
    pub accounts: Vec<AccountSettings>,
}

/// Server/connection settings. Timeouts are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// WebSocket endpoint.
    pub url: String,

    pub connect_timeout: u64,

    /// Default deadline for command responses.
    pub command_timeout: u64,

    pub close_timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout: 10,
            command_timeout: 8,
            close_timeout: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Base name for log tagging; repeated sessions get `-1`, `-2`…
    pub name: String,

    /// Packets buffered per inbound stream before dropping.
    pub inbound_queue: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            name: "bot".to_string(),
            inbound_queue: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Audio held back before playback, in seconds.
    pub buffer_secs: f32,

    /// Consumer pull size in bytes.
    pub pull_bytes: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        let defaults = PlaybackOptions::default();
        Self {
            buffer_secs: defaults.buffer_secs,
            pull_bytes: defaults.pull_bytes,
        }
    }
}

/// `channel busy` retry budget. Durations are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushToTalkSettings {
    pub retries: u32,
    pub during: u64,
    pub delay: u64,
}

impl Default for PushToTalkSettings {
    fn default() -> Self {
        Self {
            retries: 0,
            during: 0,
            delay: 3,
        }
    }
}

/// One `[[accounts]]` entry; values may be secret references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub channel: String,
    pub auth_token: String,
}

impl AccountSettings {
    /// Expands secret references into usable credentials.
    pub fn resolve(&self) -> Result<Credentials, String> {
        let field = |name: &str, raw: &str| {
            crate::secret::resolve(raw).map_err(|e| format!("failed to resolve {}: {}", name, e))
        };
        Ok(Credentials {
            username: self
                .username
                .as_deref()
                .map(|raw| field("username", raw))
                .transpose()?,
            password: self
                .password
                .as_deref()
                .map(|raw| field("password", raw))
                .transpose()?,
            channel: field("channel", &self.channel)?,
            auth_token: field("auth_token", &self.auth_token)?,
        })
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zello")
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), String> {
        if !self.server.url.starts_with("ws://") && !self.server.url.starts_with("wss://") {
            return Err(format!(
                "server.url must be a ws:// or wss:// URL, got `{}`",
                self.server.url
            ));
        }
        url::Url::parse(&self.server.url)
            .map_err(|e| format!("invalid server.url `{}`: {}", self.server.url, e))?;
        if self.server.command_timeout == 0 {
            return Err("server.command_timeout must be positive".to_string());
        }
        if self.session.name.trim().is_empty() {
            return Err("session.name must not be empty".to_string());
        }
        if self.playback.buffer_secs < 0.0 {
            return Err("playback.buffer_secs must not be negative".to_string());
        }
        for (index, account) in self.accounts.iter().enumerate() {
            if account.channel.is_empty() || account.auth_token.is_empty() {
                return Err(format!(
                    "accounts[{}] needs both channel and auth_token",
                    index
                ));
            }
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            name: self.session.name.clone(),
            connect_timeout: Duration::from_secs(self.server.connect_timeout),
            command_timeout: Duration::from_secs(self.server.command_timeout),
            close_timeout: Duration::from_secs(self.server.close_timeout),
            inbound_queue: self.session.inbound_queue,
        }
    }

    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy {
            retries: self.push_to_talk.retries,
            during: Duration::from_secs(self.push_to_talk.during),
            delay: Duration::from_secs(self.push_to_talk.delay),
        }
    }

    pub fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            buffer_secs: self.playback.buffer_secs,
            pull_bytes: self.playback.pull_bytes,
        }
    }
}

impl CredentialSource for ClientConfig {
    fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn credentials(&self, index: usize) -> ClientResult<Credentials> {
        let account = self.accounts.get(index).ok_or_else(|| {
            ClientError::Config(format!(
                "account {} not found in {} ({} configured)",
                index,
                Self::default_path().display(),
                self.accounts.len()
            ))
        })?;
        account.resolve().map_err(ClientError::Config)
    }
}
