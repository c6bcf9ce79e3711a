use chrono::{DateTime, Utc};

use crate::dispatch::NotificationDispatcher;
use crate::error::SchedulingError;

/// Cancel every scheduled notification whose fire instant is before `now`.
///
/// Immediate entries (no fire instant) and entries at or after `now` are
/// left alone. Returns how many were cancelled. Safe to run repeatedly.
pub async fn sweep<D: NotificationDispatcher + ?Sized>(
    dispatcher: &D,
    now: DateTime<Utc>,
) -> Result<usize, SchedulingError> {
    let stale: Vec<String> = dispatcher
        .list_scheduled()
        .await?
        .into_iter()
        .filter(|n| n.fires_at.is_some_and(|at| at < now))
        .map(|n| n.id)
        .collect();

    for id in &stale {
        dispatcher.cancel(id).await?;
        tracing::debug!(id = %id, "cancelled stale notification");
    }
    if !stale.is_empty() {
        tracing::info!(count = stale.len(), "swept stale notifications");
    }
    Ok(stale.len())
}
