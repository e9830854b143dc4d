//! Session name assignment.
//!
//! Bots started with the same base name are told apart by a numeric suffix:
//! the first session is called `bot`, the next ones `bot-1`, `bot-2`, and so
//! on. The registry is an explicit object so that unrelated groups of
//! sessions (tests, separate bot fleets) can keep independent counters.

use std::collections::HashMap;
use std::sync::Mutex;

/// Hands out unique, human-readable session names.
#[derive(Debug, Default)]
pub struct NameRegistry {
    counters: Mutex<HashMap<String, u32>>,
}

impl NameRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next name for `base`.
    pub fn assign(&self, base: &str) -> String {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let counter = counters.entry(base.to_string()).or_insert(0);
        let name = if *counter == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, counter)
        };
        *counter += 1;
        name
    }

    /// Number of names handed out for `base` so far.
    pub fn issued(&self, base: &str) -> u32 {
        let counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters.get(base).copied().unwrap_or(0)
    }
}
