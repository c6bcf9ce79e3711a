use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{
    DeliveryQueue, NotificationDispatcher, RecurringOptions, ScheduleState,
    ScheduledNotification, TriggerRegistry,
};
use crate::error::SchedulingError;

/// Dispatcher that keeps its queue in `schedule.json`.
///
/// Pending notifications and recurring registrations outlive the process,
/// so a later `getodone daemon` picks up what an earlier command scheduled.
/// Every operation is a read-modify-write of the whole file under a lock.
pub struct LocalDispatcher {
    path: PathBuf,
    title: String,
    lock: Mutex<()>,
}

impl LocalDispatcher {
    pub const FILE_NAME: &'static str = "schedule.json";

    pub fn new(dir: &Path, title: impl Into<String>) -> Self {
        Self {
            path: dir.join(Self::FILE_NAME),
            title: title.into(),
            lock: Mutex::new(()),
        }
    }

    fn storage_error(&self, message: impl ToString) -> SchedulingError {
        SchedulingError::Storage {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    async fn load(&self) -> Result<ScheduleState, SchedulingError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| self.storage_error(e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ScheduleState::default()),
            Err(e) => Err(self.storage_error(e)),
        }
    }

    async fn store(&self, state: &ScheduleState) -> Result<(), SchedulingError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| self.storage_error(e))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.storage_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.storage_error(e))
    }

    /// Apply `f` to the persisted state and write it back.
    async fn update<T: Send>(
        &self,
        f: impl FnOnce(&mut ScheduleState) -> T + Send,
    ) -> Result<T, SchedulingError> {
        let _guard = self.lock.lock().await;
        let mut state = self.load().await?;
        let out = f(&mut state);
        self.store(&state).await?;
        Ok(out)
    }

    async fn read(&self) -> Result<ScheduleState, SchedulingError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Current queue and registrations.
    pub async fn snapshot(&self) -> Result<ScheduleState, SchedulingError> {
        self.read().await
    }
}

#[async_trait]
impl NotificationDispatcher for LocalDispatcher {
    async fn schedule_one_shot(
        &self,
        body: &str,
        fires_at: Option<DateTime<Utc>>,
    ) -> Result<String, SchedulingError> {
        let title = self.title.clone();
        self.update(|s| s.push_one_shot(&title, body, fires_at, Utc::now()))
            .await
    }

    async fn cancel_all(&self) -> Result<(), SchedulingError> {
        let cancelled = self.update(ScheduleState::cancel_all).await?;
        tracing::debug!(cancelled, "cancelled all scheduled notifications");
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, SchedulingError> {
        Ok(self.read().await?.notifications)
    }

    async fn cancel(&self, id: &str) -> Result<(), SchedulingError> {
        self.update(|s| s.cancel(id)).await?;
        Ok(())
    }
}

#[async_trait]
impl TriggerRegistry for LocalDispatcher {
    async fn register_recurring(
        &self,
        name: &str,
        options: RecurringOptions,
    ) -> Result<(), SchedulingError> {
        self.update(|s| s.register(name, options, Utc::now())).await
    }

    async fn unregister_recurring(&self, name: &str) -> Result<(), SchedulingError> {
        self.update(|s| s.unregister(name)).await?;
        Ok(())
    }

    async fn is_recurring_registered(&self, name: &str) -> Result<bool, SchedulingError> {
        Ok(self.read().await?.recurring.contains_key(name))
    }
}

#[async_trait]
impl DeliveryQueue for LocalDispatcher {
    async fn due_triggers(&self, now: DateTime<Utc>) -> Result<Vec<String>, SchedulingError> {
        Ok(self.read().await?.due_triggers(now))
    }

    async fn mark_fired(&self, name: &str, at: DateTime<Utc>) -> Result<(), SchedulingError> {
        self.update(|s| s.mark_fired(name, at)).await
    }

    async fn take_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledNotification>, SchedulingError> {
        self.update(|s| s.take_due(now)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::BACKGROUND_TASK_NAME;
    use chrono::Duration;

    #[tokio::test]
    async fn queue_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let first = LocalDispatcher::new(dir.path(), "Nudge");
        let id = first
            .schedule_one_shot("go", Some(Utc::now() + Duration::seconds(60)))
            .await
            .unwrap();
        first
            .register_recurring(BACKGROUND_TASK_NAME, RecurringOptions::persistent(3600))
            .await
            .unwrap();

        let second = LocalDispatcher::new(dir.path(), "Nudge");
        let listed = second.list_scheduled().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].title, "Nudge");
        assert!(second
            .is_recurring_registered(BACKGROUND_TASK_NAME)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn cancel_and_unregister_remove_entries() {
        let dir = tempfile::tempdir().unwrap();
        let d = LocalDispatcher::new(dir.path(), "Nudge");
        let id = d.schedule_one_shot("a", None).await.unwrap();
        d.schedule_one_shot("b", None).await.unwrap();
        d.cancel(&id).await.unwrap();
        assert_eq!(d.list_scheduled().await.unwrap().len(), 1);
        d.cancel_all().await.unwrap();
        assert!(d.list_scheduled().await.unwrap().is_empty());

        d.register_recurring("r", RecurringOptions::persistent(60))
            .await
            .unwrap();
        d.unregister_recurring("r").await.unwrap();
        d.unregister_recurring("r").await.unwrap();
        assert!(!d.is_recurring_registered("r").await.unwrap());
    }

    #[tokio::test]
    async fn take_due_removes_delivered_entries() {
        let dir = tempfile::tempdir().unwrap();
        let d = LocalDispatcher::new(dir.path(), "Nudge");
        d.schedule_one_shot("now", None).await.unwrap();
        d.schedule_one_shot("later", Some(Utc::now() + Duration::hours(1)))
            .await
            .unwrap();

        let due = d.take_due(Utc::now()).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].body, "now");
        assert_eq!(d.list_scheduled().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LocalDispatcher::FILE_NAME), "[").unwrap();
        let d = LocalDispatcher::new(dir.path(), "Nudge");
        assert!(matches!(
            d.list_scheduled().await,
            Err(SchedulingError::Storage { .. })
        ));
    }
}
