use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "getodone", version, about = "Getodone CLI: tasks and AI nudges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Todo list management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Nudge preferences (frequency, tone, AI credentials)
    Prefs {
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate a nudge on demand
    Nudge {
        #[command(subcommand)]
        action: commands::nudge::NudgeAction,
    },
    /// Inspect and manage scheduled notifications
    Notifications {
        #[command(subcommand)]
        action: commands::notifications::NotificationsAction,
    },
    /// Run the background trigger host until Ctrl-C
    Daemon,
    /// Persistent keep-alive message
    KeepAlive {
        #[command(subcommand)]
        action: commands::keep_alive::KeepAliveAction,
    },
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(commands::configured_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action).await,
        Commands::Prefs { action } => commands::prefs::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Nudge { action } => commands::nudge::run(action).await,
        Commands::Notifications { action } => commands::notifications::run(action).await,
        Commands::Daemon => commands::daemon::run().await,
        Commands::KeepAlive { action } => commands::keep_alive::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
