use chrono::Utc;
use clap::Subcommand;
use getodone_core::scheduler::sweep;
use getodone_core::NotificationDispatcher;

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List pending notifications and the recurring trigger
    List {
        /// Print the raw schedule as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel notifications whose fire time has passed
    Sweep,
    /// Cancel every pending notification
    CancelAll,
}

pub async fn run(action: NotificationsAction) -> CmdResult {
    let ctx = Context::open()?;

    match action {
        NotificationsAction::List { json } => {
            ctx.sweep_on_view().await?;
            let state = ctx.dispatcher.snapshot().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
                return Ok(());
            }
            if state.notifications.is_empty() {
                println!("No pending notifications.");
            }
            for n in &state.notifications {
                let when = n
                    .fires_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "now".to_string());
                println!("{}  {when}  {}", n.id, n.body);
            }
            for reg in state.recurring.values() {
                println!(
                    "recurring {} every {}s, next due {}",
                    reg.name,
                    reg.options.interval_secs,
                    reg.next_due().to_rfc3339()
                );
            }
        }
        NotificationsAction::Sweep => {
            let count = sweep(ctx.dispatcher.as_ref(), Utc::now()).await?;
            println!("Swept {count} stale notification(s).");
        }
        NotificationsAction::CancelAll => {
            ctx.dispatcher.cancel_all().await?;
            println!("All notifications cancelled.");
        }
    }
    Ok(())
}
