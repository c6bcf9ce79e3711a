//! Keep-alive ("foreground service") toggle.
//!
//! Independent of nudge scheduling: while running it shows one persistent
//! message. Only the boundary is modelled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::JsonStore;

const KEEP_ALIVE_KEY: &str = "keep_alive";

pub const DEFAULT_MESSAGE: &str = "Your custom persistent message here.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepAliveStatus {
    pub message: String,
    pub started_at: DateTime<Utc>,
}

pub trait KeepAlive: Send + Sync {
    /// Start, or replace the message if already running.
    fn start(&self, message: &str) -> Result<KeepAliveStatus, StoreError>;

    /// Returns whether it was running.
    fn stop(&self) -> Result<bool, StoreError>;

    fn status(&self) -> Result<Option<KeepAliveStatus>, StoreError>;

    fn is_running(&self) -> Result<bool, StoreError> {
        Ok(self.status()?.is_some())
    }
}

/// Records the running state next to the other blobs.
pub struct LocalKeepAlive {
    store: JsonStore,
}

impl LocalKeepAlive {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }
}

impl KeepAlive for LocalKeepAlive {
    fn start(&self, message: &str) -> Result<KeepAliveStatus, StoreError> {
        let status = KeepAliveStatus {
            message: message.to_string(),
            started_at: Utc::now(),
        };
        self.store.write(KEEP_ALIVE_KEY, &status)?;
        tracing::info!("keep-alive started");
        Ok(status)
    }

    fn stop(&self) -> Result<bool, StoreError> {
        let was_running = self.store.remove(KEEP_ALIVE_KEY)?;
        if was_running {
            tracing::info!("keep-alive stopped");
        } else {
            tracing::info!("keep-alive was not running");
        }
        Ok(was_running)
    }

    fn status(&self) -> Result<Option<KeepAliveStatus>, StoreError> {
        self.store.read(KEEP_ALIVE_KEY)
    }
}
