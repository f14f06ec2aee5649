//! Deciding whether notifications should be snoozed right now.

use std::time::Duration;

use chrono::{Datelike, NaiveDateTime};
use log::trace;

use crate::{
    error::ScheduleError,
    schedule::IntervalSet,
    types::{TimeInterval, WeekDay, WeekSchedule},
};

/// How often snoozed notifications are delivered, unless configured otherwise.
pub const DEFAULT_DELIVERY_FREQUENCY: Duration = Duration::from_secs(15 * 60);

/// Whether snoozing is active at `now`.
///
/// A day that is missing from `days` counts as disabled.
///
/// ```
/// use chrono::NaiveDate;
/// use snooze_schedule::{checker::is_snooze_active, schedule::IntervalSet, types::WeekSchedule};
///
/// // 2021-09-08 is a Wednesday.
/// let now = NaiveDate::from_ymd_opt(2021, 9, 8).unwrap().and_hms_opt(16, 45, 0).unwrap();
/// assert!(is_snooze_active(now, &WeekSchedule::default(), &IntervalSet::default()));
/// ```
pub fn is_snooze_active(now: NaiveDateTime, days: &WeekSchedule, hours: &IntervalSet) -> bool {
    active_interval(now, days, hours).is_some()
}

fn active_interval<'a>(
    now: NaiveDateTime,
    days: &WeekSchedule,
    hours: &'a IntervalSet,
) -> Option<&'a TimeInterval> {
    let today = WeekDay::from(now.weekday());
    match days.get(today) {
        None => {
            trace!("{today} is not in the schedule, not snoozing");
            return None;
        }
        Some(false) => {
            trace!("{today} is disabled, not snoozing");
            return None;
        }
        Some(true) => {}
    }
    let time = now.time();
    let found = hours.iter().find(|interval| interval.contains(time));
    trace!("{now}: active interval {found:?}");
    found
}

/// How long until the window containing `now` closes.
///
/// Fails with [`ScheduleError::NotActive`] if snoozing is not active at `now`.
pub fn delay_until_window_end(
    now: NaiveDateTime,
    days: &WeekSchedule,
    hours: &IntervalSet,
) -> Result<Duration, ScheduleError> {
    active_interval(now, days, hours)
        .and_then(|interval| interval.remaining(now.time()))
        .ok_or(ScheduleError::NotActive)
}

/// How long until the next batch of snoozed notifications is due.
///
/// Batches go out every `every`, counted from the start of the active window,
/// so at the very start of a window the full period remains.
pub fn delay_until_next_delivery(
    now: NaiveDateTime,
    days: &WeekSchedule,
    hours: &IntervalSet,
    every: Duration,
) -> Result<Duration, ScheduleError> {
    if every.is_zero() {
        return Err(ScheduleError::InvalidFrequency);
    }
    let interval = active_interval(now, days, hours).ok_or(ScheduleError::NotActive)?;
    let elapsed = (now.time() - interval.from())
        .to_std()
        .unwrap_or(Duration::ZERO);
    // Below both `elapsed` and `every`, so it fits and the subtraction cannot underflow.
    let into_period = elapsed.as_nanos() % every.as_nanos();
    let into_period = Duration::from_nanos(u64::try_from(into_period).unwrap_or(u64::MAX));
    Ok(every.saturating_sub(into_period))
}
