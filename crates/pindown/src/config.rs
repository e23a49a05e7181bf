//! Session configuration.

use std::time::Duration;

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Re-read the ledger after every submit.
    ///
    /// Bulk loaders turn this off and refresh once at the end.
    pub refresh_after_submit: bool,
    /// Upper bound on a single ledger call. `None` waits forever.
    pub operation_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_after_submit: true,
            operation_timeout: None,
        }
    }
}
