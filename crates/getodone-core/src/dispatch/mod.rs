//! Notification delivery boundary.
//!
//! The scheduler never renders anything itself. It hands one-shot
//! notifications to a [`NotificationDispatcher`] and registers periodic
//! callbacks with a [`TriggerRegistry`]. Both are injected so the
//! controller's invariants can be checked against [`MemoryDispatcher`].

mod local;
mod memory;
mod state;

pub use local::LocalDispatcher;
pub use memory::{MemoryDispatcher, RegistryCall};
pub use state::ScheduleState;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;

/// Name of the single recurring nudge trigger.
pub const BACKGROUND_TASK_NAME: &str = "motivation-task";

/// A pending one-shot notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    /// `None` means "as soon as the platform can show it".
    pub fires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Platform directives for a periodic trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringOptions {
    /// Minimum seconds between firings.
    pub interval_secs: u64,
    pub stop_on_terminate: bool,
    pub start_on_boot: bool,
}

impl RecurringOptions {
    /// Survives process termination and resumes after restart.
    pub fn persistent(interval_secs: u64) -> Self {
        Self {
            interval_secs,
            stop_on_terminate: false,
            start_on_boot: true,
        }
    }
}

/// A registered periodic trigger as held by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRegistration {
    pub name: String,
    #[serde(flatten)]
    pub options: RecurringOptions,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub last_fired_at: Option<DateTime<Utc>>,
}

impl RecurringRegistration {
    /// Next instant this trigger is allowed to fire.
    pub fn next_due(&self) -> DateTime<Utc> {
        let since = self.last_fired_at.unwrap_or(self.registered_at);
        let interval = i64::try_from(self.options.interval_secs).unwrap_or(i64::MAX);
        since
            .checked_add_signed(chrono::Duration::seconds(interval))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Queue `body` for delivery at `fires_at`; returns the new identifier.
    async fn schedule_one_shot(
        &self,
        body: &str,
        fires_at: Option<DateTime<Utc>>,
    ) -> Result<String, SchedulingError>;

    async fn cancel_all(&self) -> Result<(), SchedulingError>;

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, SchedulingError>;

    /// Cancelling an unknown identifier is not an error.
    async fn cancel(&self, id: &str) -> Result<(), SchedulingError>;
}

#[async_trait]
pub trait TriggerRegistry: Send + Sync {
    async fn register_recurring(
        &self,
        name: &str,
        options: RecurringOptions,
    ) -> Result<(), SchedulingError>;

    async fn unregister_recurring(&self, name: &str) -> Result<(), SchedulingError>;

    async fn is_recurring_registered(&self, name: &str) -> Result<bool, SchedulingError>;
}

/// The host-side view of a dispatcher: what is due, and what has fired.
#[async_trait]
pub trait DeliveryQueue: NotificationDispatcher + TriggerRegistry {
    /// Names of recurring triggers whose interval has elapsed at `now`.
    async fn due_triggers(&self, now: DateTime<Utc>) -> Result<Vec<String>, SchedulingError>;

    async fn mark_fired(&self, name: &str, at: DateTime<Utc>) -> Result<(), SchedulingError>;

    /// Remove and return every notification due at `now`.
    async fn take_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledNotification>, SchedulingError>;
}
