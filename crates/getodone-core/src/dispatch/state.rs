use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecurringOptions, RecurringRegistration, ScheduledNotification};

/// Pending notifications and recurring registrations.
///
/// Shared by the in-memory and file-backed dispatchers; all mutation goes
/// through these methods so both behave identically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    #[serde(default)]
    pub notifications: Vec<ScheduledNotification>,
    #[serde(default)]
    pub recurring: BTreeMap<String, RecurringRegistration>,
}

impl ScheduleState {
    pub fn push_one_shot(
        &mut self,
        title: &str,
        body: &str,
        fires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        self.notifications.push(ScheduledNotification {
            id: id.clone(),
            title: title.to_string(),
            body: body.to_string(),
            fires_at,
            created_at: now,
        });
        id
    }

    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.notifications.len();
        self.notifications.clear();
        count
    }

    /// Registering an existing name replaces it.
    pub fn register(&mut self, name: &str, options: RecurringOptions, now: DateTime<Utc>) {
        self.recurring.insert(
            name.to_string(),
            RecurringRegistration {
                name: name.to_string(),
                options,
                registered_at: now,
                last_fired_at: None,
            },
        );
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.recurring.remove(name).is_some()
    }

    pub fn due_triggers(&self, now: DateTime<Utc>) -> Vec<String> {
        self.recurring
            .values()
            .filter(|r| r.next_due() <= now)
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn mark_fired(&mut self, name: &str, at: DateTime<Utc>) {
        if let Some(reg) = self.recurring.get_mut(name) {
            reg.last_fired_at = Some(at);
        }
    }

    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledNotification> {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .notifications
            .drain(..)
            .partition(|n| n.fires_at.map_or(true, |at| at <= now));
        self.notifications = pending;
        due
    }
}
