//! Zello channel client: WebSocket session, script executor, push-to-talk
//! macros and the `zello` CLI.
//!
//! ```no_run
//! use zello_client::{Credentials, Session, SessionOptions};
//! use zello_core::NameRegistry;
//!
//! # async fn example() -> zello_client::ClientResult<()> {
//! let names = NameRegistry::new();
//! let session = Session::connect("wss://zello.io/ws", SessionOptions::default(), &names).await?;
//! let credentials = Credentials::new("Test channel", "auth-token");
//!
//! session
//!     .run(|ctx| async move {
//!         ctx.step(ctx.session().logon(&credentials)).await?;
//!         ctx.step(ctx.session().send_text_message("hello", None)).await
//!     })
//!     .await?;
//! session.close().await;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod image;
pub mod macros;
pub mod script;
pub mod secret;
pub mod session;

pub use audio::{
    AudioDecoder, AudioEncoder, AudioPacket, IncomingAudio, OpusReader, PlaybackOptions,
};
pub use credentials::{CredentialSource, Credentials};
pub use error::{ClientError, ClientResult};
pub use flow::{FlowReader, FlowWriter, flow_buffer};
pub use image::{ImageResizer, ResizedImage};
pub use macros::{LogonOutcome, RetryStrategy, SendAudioOptions};
pub use script::ScriptContext;
pub use session::{ConnectionState, Session, SessionOptions};
