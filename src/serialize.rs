//! The compact text formats schedules are persisted as.
//!
//! - hours: `9:0–12:30,14:0–18:0` (en dash between bounds, no padding; seconds
//!   are only written when non-zero, as `H:M:S`);
//! - days: `MONDAY=true,FRIDAY=false`.

use chrono::{NaiveTime, Timelike};
use itertools::Itertools;
use lazy_regex::regex_captures;
use log::debug;

use crate::{
    error::ScheduleError,
    schedule::IntervalSet,
    types::{TimeInterval, WeekDay, WeekSchedule},
};

const INTERVAL_SEPARATOR: char = '–';
const ENTRY_SEPARATOR: char = ',';

fn serialize_time(time: NaiveTime) -> String {
    let mut result = format!("{}:{}", time.hour(), time.minute());
    if time.second() != 0 || time.nanosecond() != 0 {
        result.push_str(&format!(":{}", time.second()));
    }
    if time.nanosecond() != 0 {
        result.push_str(&format!(".{:09}", time.nanosecond()));
    }
    result
}

fn deserialize_time(source: &str) -> Result<NaiveTime, ScheduleError> {
    let Some((_, hh, mm, ss, fraction)) =
        regex_captures!(r"^([0-9]{1,2}):([0-9]{1,2})(?::([0-9]{1,2})(?:\.([0-9]{1,9}))?)?$", source)
    else {
        return Err(ScheduleError::parse(format!(
            "time of day with invalid format: '{source}', expecting e.g. \"9:30\""
        )));
    };
    let number = |digits: &str| -> Result<u32, ScheduleError> {
        if digits.is_empty() {
            return Ok(0);
        }
        digits
            .parse::<u32>()
            .map_err(|err| ScheduleError::parse(format!("invalid number in '{source}': {err}")))
    };
    // Right-pad to nanoseconds, `.5` is half a second.
    let nanos = number(&format!("{fraction:0<9}"))?;
    let (h, m, s) = (number(hh)?, number(mm)?, number(ss)?);
    if h > 23 {
        return Err(ScheduleError::parse(format!(
            "invalid hours {h} in '{source}', expected a number in [0, 23]"
        )));
    }
    if m > 59 || s > 59 {
        return Err(ScheduleError::parse(format!(
            "invalid minutes or seconds in '{source}', expected a number in [0, 59]"
        )));
    }
    NaiveTime::from_hms_nano_opt(h, m, s, nanos)
        .ok_or_else(|| ScheduleError::parse(format!("invalid time of day '{source}'")))
}

/// Serialize a list of intervals, failing if it is empty.
pub fn serialize_intervals(intervals: &[TimeInterval]) -> Result<String, ScheduleError> {
    if intervals.is_empty() {
        return Err(ScheduleError::EmptySet);
    }
    Ok(intervals
        .iter()
        .map(|interval| {
            format!(
                "{}{INTERVAL_SEPARATOR}{}",
                serialize_time(interval.from()),
                serialize_time(interval.to())
            )
        })
        .join(&ENTRY_SEPARATOR.to_string()))
}

/// ```
/// use snooze_schedule::{schedule::IntervalSet, serialize::*};
///
/// let text = serialize_hours(&IntervalSet::default());
/// assert_eq!(text, "9:0–12:30,14:0–18:0");
/// assert_eq!(deserialize_hours(&text).unwrap(), IntervalSet::default());
/// ```
pub fn serialize_hours(schedule: &IntervalSet) -> String {
    serialize_intervals(schedule.as_slice())
        .expect("an IntervalSet always holds at least one interval")
}

pub fn deserialize_hours(raw: &str) -> Result<IntervalSet, ScheduleError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScheduleError::parse("the raw schedule must not be blank"));
    }
    let intervals: Vec<TimeInterval> = raw
        .split(ENTRY_SEPARATOR)
        .map(|entry| {
            let Some((from, to)) = entry.trim().split(INTERVAL_SEPARATOR).collect_tuple() else {
                return Err(ScheduleError::parse(format!(
                    "entry with invalid number of parts: '{entry}'"
                )));
            };
            TimeInterval::new(deserialize_time(from.trim())?, deserialize_time(to.trim())?)
        })
        .collect::<Result<_, _>>()?;
    debug!("deserialized {} intervals from '{raw}'", intervals.len());
    IntervalSet::of(intervals)
}

/// Serialize the days, failing if there are none.
///
/// ```
/// use snooze_schedule::{serialize::*, types::{WeekDay, WeekSchedule}};
///
/// let days: WeekSchedule = [(WeekDay::Monday, true), (WeekDay::Friday, false)].into_iter().collect();
/// assert_eq!(serialize_days(&days).unwrap(), "MONDAY=true,FRIDAY=false");
/// ```
pub fn serialize_days(days: &WeekSchedule) -> Result<String, ScheduleError> {
    if days.is_empty() {
        return Err(ScheduleError::EmptySet);
    }
    Ok(days
        .iter()
        .map(|(day, active)| format!("{}={active}", day.persisted_name()))
        .join(&ENTRY_SEPARATOR.to_string()))
}

pub fn deserialize_days(raw: &str) -> Result<WeekSchedule, ScheduleError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScheduleError::parse("the raw schedule must not be blank"));
    }
    raw.split(ENTRY_SEPARATOR)
        .map(|entry| {
            let Some((day, active)) = entry.trim().split('=').collect_tuple() else {
                return Err(ScheduleError::parse(format!(
                    "entry with invalid number of parts: '{entry}'"
                )));
            };
            let day = WeekDay::from_persisted_name(day)
                .ok_or_else(|| ScheduleError::parse(format!("unknown day '{day}'")))?;
            let active = match active {
                "true" => true,
                "false" => false,
                other => {
                    return Err(ScheduleError::parse(format!(
                        "expected 'true' or 'false', got '{other}'"
                    )))
                }
            };
            Ok((day, active))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn at(hours: u32, minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hours, minutes, 0).unwrap()
    }

    #[test]
    fn serializing_empty_intervals_fails() {
        assert_eq!(serialize_intervals(&[]), Err(ScheduleError::EmptySet));
    }

    #[test]
    fn serializes_without_padding() {
        let schedule = IntervalSet::of([
            TimeInterval::new(at(7, 5), at(8, 0)).unwrap(),
            TimeInterval::new(at(21, 0), at(23, 59)).unwrap(),
        ])
        .unwrap();
        assert_eq!(serialize_hours(&schedule), "7:5–8:0,21:0–23:59");
    }

    #[test]
    fn serializes_seconds_only_when_needed() {
        let from = NaiveTime::from_hms_opt(7, 5, 30).unwrap();
        let to = NaiveTime::from_hms_milli_opt(8, 0, 0, 500).unwrap();
        let schedule = IntervalSet::of([TimeInterval::new(from, to).unwrap()]).unwrap();
        let text = serialize_hours(&schedule);
        assert_eq!(text, "7:5:30–8:0:0.500000000");
        assert_eq!(deserialize_hours(&text).unwrap(), schedule);
    }

    #[test]
    fn accepts_padded_and_spaced_input() {
        let schedule = deserialize_hours(" 09:00–12:30 , 14:00–18:00 ").unwrap();
        assert_eq!(schedule, IntervalSet::default());
    }

    #[test]
    fn deserializing_blank_fails() {
        assert!(matches!(deserialize_hours("  "), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn deserializing_malformed_fails() {
        for raw in [
            "9:0-12:30",
            "9:0–12:30–13:0",
            "9–12:30",
            "9:0–12:30,",
            "a:0–12:30",
            "24:0–24:30",
            "9:60–12:30",
            "9:0:0:0–12:30",
            "\u{0669}:0–12:30",
            "9:\u{0663}0–12:30",
        ] {
            assert!(
                matches!(deserialize_hours(raw), Err(ScheduleError::Parse(_))),
                "{raw} should not parse"
            );
        }
    }

    #[test]
    fn deserializing_invalid_schedule_fails() {
        assert!(matches!(
            deserialize_hours("12:30–9:0"),
            Err(ScheduleError::InvalidInterval { .. })
        ));
        assert!(matches!(
            deserialize_hours("9:0–12:30,12:30–13:0"),
            Err(ScheduleError::Overlap { .. })
        ));
    }

    #[test]
    fn serializing_empty_days_fails() {
        let empty: WeekSchedule = std::iter::empty().collect();
        assert_eq!(serialize_days(&empty), Err(ScheduleError::EmptySet));
    }

    #[test]
    fn deserializes_days() {
        let days = deserialize_days("MONDAY=true,FRIDAY=false").unwrap();
        assert_eq!(days.get(WeekDay::Monday), Some(true));
        assert_eq!(days.get(WeekDay::Friday), Some(false));
        assert_eq!(days.get(WeekDay::Sunday), None);
    }

    #[test]
    fn deserializing_malformed_days_fails() {
        for raw in [" ", "MONDAY", "MONDAY=true=false", "monday=true", "MONDAY=yes", "MONDAY=True"] {
            assert!(
                matches!(deserialize_days(raw), Err(ScheduleError::Parse(_))),
                "{raw} should not parse"
            );
        }
    }

    #[test]
    fn default_days_round_trip() {
        let days = WeekSchedule::default();
        assert_eq!(deserialize_days(&serialize_days(&days).unwrap()).unwrap(), days);
    }

    fn arb_time() -> impl Strategy<Value = NaiveTime> {
        (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    proptest! {
        #[test]
        fn hours_round_trip(times in proptest::collection::btree_set(arb_time(), 2..10)) {
            let times = times.into_iter().collect_vec();
            let intervals = times
                .chunks_exact(2)
                .map(|pair| TimeInterval::new(pair[0], pair[1]).unwrap())
                .collect_vec();
            // Adjacent chunks may touch only if times repeat, which a set forbids.
            let schedule = IntervalSet::of(intervals).unwrap();
            let text = serialize_hours(&schedule);
            prop_assert_eq!(deserialize_hours(&text).unwrap(), schedule);
        }
    }
}
