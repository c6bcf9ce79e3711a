//! Nudge scheduling: when to generate a message and how to hand it off.
//!
//! - [`ScheduleController`] turns saved preferences into either nothing, a
//!   single one-shot notification, or one recurring trigger, and runs the
//!   generate-and-notify cycle those triggers invoke.
//! - [`frequency`] holds the time arithmetic.
//! - [`sweep`] cancels one-shot notifications whose instant has passed.

mod controller;
mod cycle;
pub mod frequency;
mod sweeper;

pub use controller::{ScheduleController, ScheduleOutcome};
pub use cycle::CycleResult;
pub use sweeper::sweep;
