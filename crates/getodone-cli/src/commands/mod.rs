//! Subcommand implementations and the wiring they share.

pub mod config;
pub mod daemon;
pub mod keep_alive;
pub mod notifications;
pub mod nudge;
pub mod prefs;
pub mod task;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use getodone_core::scheduler::sweep;
use getodone_core::storage::data_dir;
use getodone_core::{
    Config, CoreError, HttpMessageGenerator, JsonStore, LocalDispatcher, ScheduleController,
    SchedulingError,
};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Level used when `RUST_LOG` is unset. Falls back to `info` if the
/// config cannot be read; the command itself will report that error.
pub fn configured_log_level() -> String {
    Config::load()
        .map(|config| config.log.level)
        .unwrap_or_else(|_| "info".to_string())
}

/// Stores and dispatcher rooted in the data directory.
pub struct Context {
    pub dir: PathBuf,
    pub config: Config,
    pub store: Arc<JsonStore>,
    pub dispatcher: Arc<LocalDispatcher>,
}

impl Context {
    pub fn open() -> Result<Self, CoreError> {
        let dir = data_dir()?;
        let config = Config::load_from(&dir)?;
        let store = Arc::new(JsonStore::new(&dir));
        let dispatcher = Arc::new(LocalDispatcher::new(&dir, config.notifications.title.clone()));
        Ok(Self {
            dir,
            config,
            store,
            dispatcher,
        })
    }

    pub fn controller(&self) -> Result<ScheduleController, CoreError> {
        let generator = Arc::new(HttpMessageGenerator::from_config(&self.config.generation)?);
        Ok(ScheduleController::new(
            self.store.clone(),
            self.store.clone(),
            generator,
            self.dispatcher.clone(),
            self.dispatcher.clone(),
        ))
    }

    /// Sweep run when a listing is shown.
    ///
    /// Lags two daemon ticks behind the clock so a running daemon gets to
    /// deliver entries that just came due.
    pub async fn sweep_on_view(&self) -> Result<usize, SchedulingError> {
        sweep(self.dispatcher.as_ref(), view_cutoff(Utc::now(), self.config.daemon.tick_secs)).await
    }
}

/// `now` minus two ticks, or `now` itself when that is not representable.
fn view_cutoff(now: DateTime<Utc>, tick_secs: u64) -> DateTime<Utc> {
    i64::try_from(tick_secs.saturating_mul(2))
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|grace| now.checked_sub_signed(grace))
        .unwrap_or(now)
}
