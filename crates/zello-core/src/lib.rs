//! Core utilities shared by the zello crates: tracing setup and session naming.

pub mod names;
pub mod tracing;

pub use names::NameRegistry;
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
