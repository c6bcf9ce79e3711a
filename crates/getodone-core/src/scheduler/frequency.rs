//! Frequency-to-interval mapping and fire-instant arithmetic.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};

use crate::preferences::{FrequencyMode, WallClockTime};

/// Delay before a [`FrequencyMode::OneShotSoon`] nudge fires.
pub const ONE_SHOT_SOON_DELAY_SECS: i64 = 60;

/// Delay before a cycle's notification fires, so the platform can settle.
pub const CYCLE_SETTLE_DELAY_SECS: i64 = 1;

pub const DEFAULT_INTERVAL_SECS: u64 = 86_400;

/// Minimum seconds between recurring firings for `mode`.
pub fn interval_secs(mode: FrequencyMode) -> u64 {
    match mode {
        FrequencyMode::Hourly => 3_600,
        FrequencyMode::ThreePerDay => 28_800,
        FrequencyMode::Daily => 86_400,
        FrequencyMode::OneShotSoon | FrequencyMode::OneShotAtTime => DEFAULT_INTERVAL_SECS,
    }
}

/// Map a naive local datetime into `tz`.
///
/// Ambiguous times take the earlier instant; times inside a DST gap are
/// pushed forward by an hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// The next instant at which the wall clock reads `time`, strictly after `now`.
///
/// Today's occurrence is used unless it is at or before `now`, in which
/// case the occurrence one calendar day later is returned.
pub fn next_occurrence<Tz: TimeZone>(time: WallClockTime, now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = resolve_local(&tz, today.and_time(time.as_naive()));
    if candidate > *now {
        return candidate;
    }
    match today.succ_opt() {
        Some(tomorrow) => resolve_local(&tz, tomorrow.and_time(time.as_naive())),
        None => candidate + Duration::days(1),
    }
}
