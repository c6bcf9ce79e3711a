//! Foreground runner for recurring triggers and notification delivery.

use std::sync::Arc;
use std::time::Duration;

use getodone_core::{Presenter, ScheduledNotification, TriggerHost, BACKGROUND_TASK_NAME};

use super::{CmdResult, Context};

/// Prints delivered notifications to stdout.
struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn present(&self, notification: &ScheduledNotification) {
        println!("[{}] {}", notification.title, notification.body);
    }
}

pub async fn run() -> CmdResult {
    let ctx = Context::open()?;
    let controller = Arc::new(ctx.controller()?);

    let tick = Duration::from_secs(ctx.config.daemon.tick_secs.max(1));
    let mut host = TriggerHost::new(ctx.dispatcher.clone(), Arc::new(StdoutPresenter), tick);
    host.define(BACKGROUND_TASK_NAME, controller);

    tracing::info!(dir = %ctx.dir.display(), "daemon starting; Ctrl-C to stop");
    host.run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    })
    .await;
    Ok(())
}
