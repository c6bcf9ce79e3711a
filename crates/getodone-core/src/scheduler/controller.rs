//! Schedule controller.
//!
//! Stateless between calls: everything it manages lives in the injected
//! dispatcher and trigger registry. Two invariants hold after every
//! [`ScheduleController::apply_preferences`]:
//!
//! - at most one recurring trigger exists, under [`BACKGROUND_TASK_NAME`];
//! - one-shot and recurring delivery never coexist.
//!
//! ```text
//! disabled        -> unregister recurring, cancel one-shots
//! 1-min / custom  -> unregister recurring, generate, replace one-shots
//! hourly / daily  -> cancel one-shots, unregister, register at interval
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::Serialize;

use super::cycle::CycleResult;
use super::frequency::{
    interval_secs, next_occurrence, CYCLE_SETTLE_DELAY_SECS, ONE_SHOT_SOON_DELAY_SECS,
};
use crate::dispatch::{
    NotificationDispatcher, RecurringOptions, TriggerRegistry, BACKGROUND_TASK_NAME,
};
use crate::error::{ScheduleError, SchedulingError, StoreError};
use crate::generator::MessageGenerator;
use crate::preferences::{FrequencyMode, PreferenceStore, Preferences};
use crate::prompt;
use crate::task::{pending, Task, TaskStore};

/// What `apply_preferences` left scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScheduleOutcome {
    /// Nothing scheduled.
    Disabled,
    /// The recurring trigger is registered at this interval.
    Recurring { interval_secs: u64 },
    /// One notification is pending.
    OneShot {
        id: String,
        fires_at: DateTime<Utc>,
        message: String,
    },
}

/// Clears the in-flight flag when a cycle ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ScheduleController {
    tasks: Arc<dyn TaskStore>,
    preferences: Arc<dyn PreferenceStore>,
    generator: Arc<dyn MessageGenerator>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    triggers: Arc<dyn TriggerRegistry>,
    in_flight: AtomicBool,
}

impl ScheduleController {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        preferences: Arc<dyn PreferenceStore>,
        generator: Arc<dyn MessageGenerator>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        triggers: Arc<dyn TriggerRegistry>,
    ) -> Self {
        Self {
            tasks,
            preferences,
            generator,
            dispatcher,
            triggers,
            in_flight: AtomicBool::new(false),
        }
    }

    // ── Store access ────────────────────────────────────────────────

    // Stores are synchronous; keep their file I/O off the async workers.

    async fn load_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = Arc::clone(&self.tasks);
        tokio::task::spawn_blocking(move || tasks.list_tasks())
            .await
            .map_err(|e| StoreError::Interrupted(e.to_string()))?
    }

    async fn load_preferences(&self) -> Result<Option<Preferences>, StoreError> {
        let preferences = Arc::clone(&self.preferences);
        tokio::task::spawn_blocking(move || preferences.get_preferences())
            .await
            .map_err(|e| StoreError::Interrupted(e.to_string()))?
    }

    // ── Preferences ─────────────────────────────────────────────────

    /// Re-derive the schedule from freshly saved preferences.
    pub async fn apply_preferences(
        &self,
        prefs: &Preferences,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        self.apply_preferences_at(prefs, &Local::now()).await
    }

    /// [`apply_preferences`](Self::apply_preferences) against an explicit
    /// clock. `now`'s zone decides the wall clock for `custom` times.
    pub async fn apply_preferences_at<Tz: TimeZone>(
        &self,
        prefs: &Preferences,
        now: &DateTime<Tz>,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let now_utc = now.with_timezone(&Utc);

        if !prefs.notifications_enabled {
            self.unregister_recurring().await?;
            self.dispatcher.cancel_all().await?;
            tracing::info!("notifications disabled; schedule cleared");
            return Ok(ScheduleOutcome::Disabled);
        }

        match prefs.frequency_mode {
            FrequencyMode::OneShotSoon => {
                self.unregister_recurring().await?;
                let fires_at = now_utc + Duration::seconds(ONE_SHOT_SOON_DELAY_SECS);
                self.schedule_one_shot(prefs, fires_at).await
            }
            FrequencyMode::OneShotAtTime => {
                self.unregister_recurring().await?;
                let fires_at =
                    next_occurrence(prefs.effective_custom_time(), now).with_timezone(&Utc);
                self.schedule_one_shot(prefs, fires_at).await
            }
            mode @ (FrequencyMode::Hourly | FrequencyMode::ThreePerDay | FrequencyMode::Daily) => {
                self.dispatcher.cancel_all().await?;
                self.unregister_recurring().await?;
                let interval = interval_secs(mode);
                self.triggers
                    .register_recurring(BACKGROUND_TASK_NAME, RecurringOptions::persistent(interval))
                    .await?;
                tracing::info!(mode = %mode, interval_secs = interval, "recurring trigger registered");
                Ok(ScheduleOutcome::Recurring {
                    interval_secs: interval,
                })
            }
        }
    }

    async fn unregister_recurring(&self) -> Result<(), SchedulingError> {
        if self
            .triggers
            .is_recurring_registered(BACKGROUND_TASK_NAME)
            .await?
        {
            self.triggers
                .unregister_recurring(BACKGROUND_TASK_NAME)
                .await?;
            tracing::debug!(name = BACKGROUND_TASK_NAME, "recurring trigger unregistered");
        }
        Ok(())
    }

    /// Generate now, then replace every pending notification with one
    /// firing at `fires_at`.
    async fn schedule_one_shot(
        &self,
        prefs: &Preferences,
        fires_at: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let message = self.generate_for_pending(prefs).await?;

        self.dispatcher.cancel_all().await?;
        let id = self
            .dispatcher
            .schedule_one_shot(&message, Some(fires_at))
            .await?;
        tracing::info!(id = %id, fires_at = %fires_at, "one-shot nudge scheduled");
        Ok(ScheduleOutcome::OneShot {
            id,
            fires_at,
            message,
        })
    }

    /// Compose and generate for the pending tasks, refusing when there are
    /// none or the backend is not configured.
    async fn generate_for_pending(&self, prefs: &Preferences) -> Result<String, ScheduleError> {
        let tasks = self.load_tasks().await?;
        if pending(&tasks).next().is_none() {
            tracing::info!("no pending tasks; nothing to nudge about");
            return Err(ScheduleError::NoPendingTasks);
        }
        if !prefs.has_credentials() {
            return Err(ScheduleError::ConfigurationMissing);
        }

        let prompt = prompt::compose(&tasks, prefs.tone);
        let message = self
            .generator
            .generate(&prompt, &prefs.api_key, &prefs.model_id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "nudge generation failed"))?;
        if message.is_empty() {
            return Err(ScheduleError::EmptyMessage);
        }
        Ok(message)
    }

    // ── Cycles ──────────────────────────────────────────────────────

    /// One generate-and-notify cycle, as run by the recurring trigger and
    /// by the manual "trigger now" action.
    ///
    /// Never fails: errors are logged and reported as [`CycleResult::Failed`].
    /// A call made while another cycle is still running returns
    /// [`CycleResult::NoData`] without doing anything.
    pub async fn run_cycle(&self) -> CycleResult {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::warn!("cycle already in flight; skipping");
            return CycleResult::NoData;
        };

        match self.cycle().await {
            Ok(result) => {
                tracing::info!(result = %result, "cycle finished");
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "cycle failed");
                CycleResult::Failed
            }
        }
    }

    async fn cycle(&self) -> Result<CycleResult, ScheduleError> {
        let Some(prefs) = self.load_preferences().await? else {
            tracing::info!("no preferences saved; skipping cycle");
            return Ok(CycleResult::NoData);
        };
        if !prefs.has_credentials() {
            tracing::info!("API key or model not configured; skipping cycle");
            return Ok(CycleResult::NoData);
        }
        if !prefs.notifications_enabled {
            return Ok(CycleResult::NoData);
        }
        if prefs.frequency_mode.is_one_shot() {
            // Delivered by apply_preferences; firing here would double up.
            return Ok(CycleResult::NoData);
        }

        let tasks = self.load_tasks().await?;
        let prompt = prompt::compose(&tasks, prefs.tone);
        let message = self
            .generator
            .generate(&prompt, &prefs.api_key, &prefs.model_id)
            .await?;
        if message.is_empty() {
            tracing::warn!("generator returned an empty message");
            return Ok(CycleResult::NoData);
        }

        let fires_at = Utc::now() + Duration::seconds(CYCLE_SETTLE_DELAY_SECS);
        self.dispatcher
            .schedule_one_shot(&message, Some(fires_at))
            .await?;
        Ok(CycleResult::NewData)
    }

    /// Send a nudge right away regardless of frequency mode.
    ///
    /// Returns the generated text for display.
    pub async fn test_nudge(&self) -> Result<String, ScheduleError> {
        let prefs = self
            .load_preferences()
            .await?
            .filter(Preferences::has_credentials)
            .ok_or(ScheduleError::ConfigurationMissing)?;

        let message = self.generate_for_pending(&prefs).await?;
        self.dispatcher.schedule_one_shot(&message, None).await?;
        tracing::info!("test nudge sent");
        Ok(message)
    }
}
