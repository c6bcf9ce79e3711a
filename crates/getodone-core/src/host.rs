//! Background trigger host.
//!
//! Stands in for the OS facility that wakes the app for periodic work.
//! Handlers are attached by name with [`TriggerHost::define`] once at
//! startup; nothing registers itself as a side effect of being loaded.
//!
//! Each tick the host:
//! 1. fires every recurring trigger whose interval has elapsed,
//! 2. delivers every one-shot notification that is due.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::dispatch::{DeliveryQueue, ScheduledNotification};
use crate::error::SchedulingError;
use crate::scheduler::{sweep, CycleResult, ScheduleController};

/// Work run when a recurring trigger fires.
#[async_trait]
pub trait TriggerHandler: Send + Sync {
    async fn fire(&self) -> CycleResult;
}

#[async_trait]
impl TriggerHandler for ScheduleController {
    async fn fire(&self) -> CycleResult {
        self.run_cycle().await
    }
}

/// Shows a delivered notification to the user.
pub trait Presenter: Send + Sync {
    fn present(&self, notification: &ScheduledNotification);
}

/// What one tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub fired: Vec<(String, CycleResult)>,
    pub delivered: usize,
}

pub struct TriggerHost {
    queue: Arc<dyn DeliveryQueue>,
    presenter: Arc<dyn Presenter>,
    handlers: HashMap<String, Arc<dyn TriggerHandler>>,
    tick: Duration,
}

impl TriggerHost {
    pub fn new(queue: Arc<dyn DeliveryQueue>, presenter: Arc<dyn Presenter>, tick: Duration) -> Self {
        Self {
            queue,
            presenter,
            handlers: HashMap::new(),
            tick,
        }
    }

    /// Attach the handler run when the trigger called `name` fires.
    pub fn define(&mut self, name: impl Into<String>, handler: Arc<dyn TriggerHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Fire due triggers, then deliver due notifications.
    pub async fn tick_once(&self, now: DateTime<Utc>) -> Result<TickReport, SchedulingError> {
        let mut report = TickReport::default();

        for name in self.queue.due_triggers(now).await? {
            // Marked first so a failing handler waits a full interval.
            self.queue.mark_fired(&name, now).await?;
            let Some(handler) = self.handlers.get(&name) else {
                tracing::warn!(name = %name, "recurring trigger has no handler defined");
                continue;
            };
            tracing::info!(name = %name, "recurring trigger fired");
            let result = handler.fire().await;
            report.fired.push((name, result));
        }

        for notification in self.queue.take_due(now).await? {
            self.presenter.present(&notification);
            report.delivered += 1;
        }

        Ok(report)
    }

    /// Run until `shutdown` completes.
    ///
    /// Notifications that went stale while nothing was running are swept
    /// once at startup rather than delivered late. Tick errors are logged
    /// and the loop keeps going.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        match sweep(self.queue.as_ref(), Utc::now()).await {
            Ok(n) if n > 0 => tracing::info!(count = n, "dropped notifications that expired while stopped"),
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "startup sweep failed"),
        }

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(tick_secs = self.tick.as_secs(), "trigger host running");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    if let Err(e) = self.tick_once(Utc::now()).await {
                        tracing::error!(error = %e, "tick failed");
                    }
                }
            }
        }
        tracing::info!("trigger host stopped");
    }
}
