use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    DeliveryQueue, NotificationDispatcher, RecurringOptions, ScheduleState,
    ScheduledNotification, TriggerRegistry,
};
use crate::error::SchedulingError;

/// A registry call as observed by [`MemoryDispatcher`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Register { name: String, interval_secs: u64 },
    Unregister { name: String },
}

#[derive(Default)]
struct Inner {
    state: ScheduleState,
    calls: Vec<RegistryCall>,
    reject: bool,
}

/// In-process dispatcher and trigger registry.
///
/// Nothing is persisted. Records every register/unregister so callers can
/// check ordering, and can be told to reject requests to simulate a
/// platform refusal.
pub struct MemoryDispatcher {
    title: String,
    inner: Mutex<Inner>,
}

impl Default for MemoryDispatcher {
    fn default() -> Self {
        Self::new("Getodone Nudge!")
    }
}

impl MemoryDispatcher {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent schedule/register call fail.
    pub fn reject_requests(&self, reject: bool) {
        self.inner().reject = reject;
    }

    pub fn registry_calls(&self) -> Vec<RegistryCall> {
        self.inner().calls.clone()
    }

    pub fn snapshot(&self) -> ScheduleState {
        self.inner().state.clone()
    }

    fn check(inner: &Inner) -> Result<(), SchedulingError> {
        if inner.reject {
            return Err(SchedulingError::Rejected("dispatcher is rejecting requests".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for MemoryDispatcher {
    async fn schedule_one_shot(
        &self,
        body: &str,
        fires_at: Option<DateTime<Utc>>,
    ) -> Result<String, SchedulingError> {
        let mut inner = self.inner();
        Self::check(&inner)?;
        Ok(inner
            .state
            .push_one_shot(&self.title, body, fires_at, Utc::now()))
    }

    async fn cancel_all(&self) -> Result<(), SchedulingError> {
        self.inner().state.cancel_all();
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, SchedulingError> {
        Ok(self.inner().state.notifications.clone())
    }

    async fn cancel(&self, id: &str) -> Result<(), SchedulingError> {
        self.inner().state.cancel(id);
        Ok(())
    }
}

#[async_trait]
impl TriggerRegistry for MemoryDispatcher {
    async fn register_recurring(
        &self,
        name: &str,
        options: RecurringOptions,
    ) -> Result<(), SchedulingError> {
        let mut inner = self.inner();
        Self::check(&inner)?;
        inner.calls.push(RegistryCall::Register {
            name: name.to_string(),
            interval_secs: options.interval_secs,
        });
        inner.state.register(name, options, Utc::now());
        Ok(())
    }

    async fn unregister_recurring(&self, name: &str) -> Result<(), SchedulingError> {
        let mut inner = self.inner();
        inner.calls.push(RegistryCall::Unregister {
            name: name.to_string(),
        });
        inner.state.unregister(name);
        Ok(())
    }

    async fn is_recurring_registered(&self, name: &str) -> Result<bool, SchedulingError> {
        Ok(self.inner().state.recurring.contains_key(name))
    }
}

#[async_trait]
impl DeliveryQueue for MemoryDispatcher {
    async fn due_triggers(&self, now: DateTime<Utc>) -> Result<Vec<String>, SchedulingError> {
        Ok(self.inner().state.due_triggers(now))
    }

    async fn mark_fired(&self, name: &str, at: DateTime<Utc>) -> Result<(), SchedulingError> {
        self.inner().state.mark_fired(name, at);
        Ok(())
    }

    async fn take_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledNotification>, SchedulingError> {
        Ok(self.inner().state.take_due(now))
    }
}
