//! # Getodone Core Library
//!
//! Core logic for the Getodone task tracker's AI nudges: deciding when to
//! generate a motivational message about pending tasks, generating it
//! through a remote chat-completions service, and handing it to a
//! notification facility with the right timing.
//!
//! ## Architecture
//!
//! - **Prompt**: pure composition of tasks and tone into a request
//! - **Generator**: one HTTP call per message, failures classified
//! - **Dispatch**: one-shot notifications and recurring triggers behind traits
//! - **Scheduler**: the controller that keeps those two consistent with the
//!   saved preferences, plus the stale-notification sweeper
//! - **Host**: the background loop that fires triggers and delivers notifications
//! - **Storage**: JSON blobs for tasks and preferences, TOML for app config
//!
//! ## Key Components
//!
//! - [`ScheduleController`]: applies preferences and runs cycles
//! - [`TriggerHost`]: runs recurring triggers in-process
//! - [`LocalDispatcher`]: file-backed notification queue
//! - [`Config`]: application configuration

pub mod dispatch;
pub mod error;
pub mod generator;
pub mod host;
pub mod keep_alive;
pub mod preferences;
pub mod prompt;
pub mod scheduler;
pub mod storage;
pub mod task;

pub use dispatch::{
    LocalDispatcher, MemoryDispatcher, NotificationDispatcher, ScheduledNotification,
    TriggerRegistry, BACKGROUND_TASK_NAME,
};
pub use error::{
    ConfigError, CoreError, GenerationError, ScheduleError, SchedulingError, StoreError,
    ValidationError,
};
pub use generator::{HttpMessageGenerator, MessageGenerator};
pub use host::{Presenter, TriggerHandler, TriggerHost};
pub use keep_alive::{KeepAlive, LocalKeepAlive};
pub use preferences::{FrequencyMode, PreferenceStore, Preferences, Tone, WallClockTime};
pub use scheduler::{CycleResult, ScheduleController, ScheduleOutcome};
pub use storage::{Config, JsonStore};
pub use task::{Task, TaskStore};
