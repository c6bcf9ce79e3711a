use clap::Subcommand;
use getodone_core::keep_alive::DEFAULT_MESSAGE;
use getodone_core::storage::data_dir;
use getodone_core::{JsonStore, KeepAlive, LocalKeepAlive};

use super::CmdResult;

#[derive(Subcommand)]
pub enum KeepAliveAction {
    /// Show a persistent message
    Start {
        #[arg(default_value = DEFAULT_MESSAGE)]
        message: String,
    },
    /// Remove the persistent message
    Stop,
    /// Whether the keep-alive is running
    Status,
}

pub fn run(action: KeepAliveAction) -> CmdResult {
    let keep_alive = LocalKeepAlive::new(JsonStore::new(data_dir()?));

    match action {
        KeepAliveAction::Start { message } => {
            keep_alive.start(&message)?;
            println!("Keep-alive started: {message}");
        }
        KeepAliveAction::Stop => {
            if keep_alive.stop()? {
                println!("Keep-alive stopped.");
            } else {
                println!("Keep-alive was not running.");
            }
        }
        KeepAliveAction::Status => match keep_alive.status()? {
            Some(status) => println!(
                "running since {}: {}",
                status.started_at.to_rfc3339(),
                status.message
            ),
            None => println!("not running"),
        },
    }
    Ok(())
}
