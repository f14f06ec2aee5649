use std::{collections::BTreeMap, fmt::Display, str::FromStr, time::Duration};

use chrono::{NaiveTime, Timelike, Weekday};
use derive_more::{AsRef, From};
#[allow(unused)]
use log::{debug, trace};
use serde::{
    de::{Unexpected, Visitor},
    Deserialize, Serialize,
};

use crate::error::ScheduleError;

pub(crate) const fn time_of_day(hours: u32, minutes: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hours, minutes, 0) {
        Some(time) => time,
        None => panic!("invalid time of day"),
    }
}

/// The first instant of the day.
pub const DAY_BEGINS: NaiveTime = time_of_day(0, 0);

/// The last instant of the day, at nanosecond resolution.
pub const DAY_ENDS: NaiveTime = match NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999) {
    Some(time) => time,
    None => panic!("invalid time of day"),
};

/// The last minute an interval may be edited or appended up to.
pub const LAST_AVAILABLE_MINUTE_OF_DAY: NaiveTime = time_of_day(23, 59);

/// A window of time within a single day, `from` strictly before `to`.
///
/// Intervals are values: editing one (see [`crate::picker::TimePicker`])
/// produces a new interval.
///
/// ```
/// use chrono::NaiveTime;
/// use snooze_schedule::types::TimeInterval;
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let afternoon = TimeInterval::new(at(14, 0), at(18, 0)).unwrap();
/// assert!(afternoon.contains(at(18, 0)));
/// assert!(!afternoon.contains(at(18, 1)));
/// assert!(TimeInterval::new(at(18, 0), at(14, 0)).is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    from: NaiveTime,
    to: NaiveTime,
}

#[derive(Deserialize)]
struct RawInterval {
    from: NaiveTime,
    to: NaiveTime,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = ScheduleError;
    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.from, raw.to)
    }
}

impl TimeInterval {
    pub fn new(from: NaiveTime, to: NaiveTime) -> Result<Self, ScheduleError> {
        let reason = if is_leap_second(from) || is_leap_second(to) {
            Some("bounds must not fall on a leap second")
        } else if from >= DAY_ENDS {
            Some("'from' must be before the end of the day")
        } else if to <= DAY_BEGINS {
            Some("'to' must be after the start of the day")
        } else if from >= to {
            Some("'from' must be before 'to'")
        } else {
            None
        };
        if let Some(reason) = reason {
            debug!("rejecting interval {from}–{to}: {reason}");
            return Err(ScheduleError::InvalidInterval { from, to, reason });
        }
        Ok(TimeInterval { from, to })
    }

    /// For constant bounds already known to satisfy [`TimeInterval::new`].
    pub(crate) const fn new_unchecked(from: NaiveTime, to: NaiveTime) -> Self {
        TimeInterval { from, to }
    }

    pub fn from(&self) -> NaiveTime {
        self.from
    }

    pub fn to(&self) -> NaiveTime {
        self.to
    }

    /// Both bounds are inclusive: a boundary instant counts as inside.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.from <= time && time <= self.to
    }

    /// How long until the end of this interval, if `time` falls within it.
    pub fn remaining(&self, time: NaiveTime) -> Option<Duration> {
        if !self.contains(time) {
            return None;
        }
        // `time <= to`, so this is never negative.
        Some((self.to - time).to_std().unwrap_or(Duration::ZERO))
    }
}

/// chrono encodes a leap second as a nanosecond count past one billion.
fn is_leap_second(time: NaiveTime) -> bool {
    time.nanosecond() >= 1_000_000_000
}

impl Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.from, self.to)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Clone, Copy)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    /// The name under which a day is persisted, e.g. `MONDAY`.
    pub fn persisted_name(&self) -> &'static str {
        match self {
            WeekDay::Monday => "MONDAY",
            WeekDay::Tuesday => "TUESDAY",
            WeekDay::Wednesday => "WEDNESDAY",
            WeekDay::Thursday => "THURSDAY",
            WeekDay::Friday => "FRIDAY",
            WeekDay::Saturday => "SATURDAY",
            WeekDay::Sunday => "SUNDAY",
        }
    }

    /// Strict inverse of [`WeekDay::persisted_name`].
    pub fn from_persisted_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.persisted_name() == name)
    }
}

impl From<Weekday> for WeekDay {
    fn from(day: Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl From<WeekDay> for Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Monday => Weekday::Mon,
            WeekDay::Tuesday => Weekday::Tue,
            WeekDay::Wednesday => Weekday::Wed,
            WeekDay::Thursday => Weekday::Thu,
            WeekDay::Friday => Weekday::Fri,
            WeekDay::Saturday => Weekday::Sat,
            WeekDay::Sunday => Weekday::Sun,
        }
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.persisted_name().to_ascii_lowercase())
    }
}

/// Lenient parsing, for humans: `monday`, `Mon`, `MONDAY` or `0` (Monday) to `6` (Sunday).
impl FromStr for WeekDay {
    type Err = ScheduleError;
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let lower = source.trim().to_ascii_lowercase();
        let prefix = lower.get(0..3).unwrap_or(&lower);
        trace!("WeekDay - attempting to parse {prefix}");
        match prefix {
            "0" | "mon" => Ok(WeekDay::Monday),
            "1" | "tue" => Ok(WeekDay::Tuesday),
            "2" | "wed" => Ok(WeekDay::Wednesday),
            "3" | "thu" => Ok(WeekDay::Thursday),
            "4" | "fri" => Ok(WeekDay::Friday),
            "5" | "sat" => Ok(WeekDay::Saturday),
            "6" | "sun" => Ok(WeekDay::Sunday),
            _ => Err(ScheduleError::parse(format!("unknown day of week '{source}'"))),
        }
    }
}

impl<'de> Deserialize<'de> for WeekDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DayVisitor;
        impl Visitor<'_> for DayVisitor {
            type Value = WeekDay;

            fn visit_str<E: serde::de::Error>(self, source: &str) -> Result<Self::Value, E> {
                source.parse().map_err(|_| {
                    E::invalid_value(
                        Unexpected::Str(source),
                        &"day of week (either a number in [0, 6] or a named day)",
                    )
                })
            }
            fn visit_u64<E: serde::de::Error>(self, source: u64) -> Result<Self::Value, E> {
                trace!("WeekDay - attempting to deserialize number {source}");
                usize::try_from(source)
                    .ok()
                    .and_then(|index| WeekDay::ALL.get(index).copied())
                    .ok_or_else(|| {
                        E::invalid_value(
                            Unexpected::Unsigned(source),
                            &"day of week (either a number in [0, 6] or a named day)",
                        )
                    })
            }
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "expecting either a numbered day of week (Monday = 0) or a named day of week (Monday/mon/...)")
            }
        }
        deserializer.deserialize_any(DayVisitor)
    }
}

impl Serialize for WeekDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Which days of the week snoozing may happen on.
///
/// A day missing from the map is treated as disabled by the checker, which is
/// why [`WeekSchedule::default`] lists every day explicitly.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize, AsRef, From)]
#[serde(transparent)]
pub struct WeekSchedule(BTreeMap<WeekDay, bool>);

impl WeekSchedule {
    pub fn get(&self, day: WeekDay) -> Option<bool> {
        self.0.get(&day).copied()
    }

    /// Return a copy with `day` set to `active`.
    pub fn with(&self, day: WeekDay, active: bool) -> Self {
        let mut days = self.0.clone();
        days.insert(day, active);
        WeekSchedule(days)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeekDay, bool)> + '_ {
        self.0.iter().map(|(day, active)| (*day, *active))
    }
}

impl Default for WeekSchedule {
    fn default() -> Self {
        WeekSchedule(WeekDay::ALL.into_iter().map(|day| (day, true)).collect())
    }
}

impl FromIterator<(WeekDay, bool)> for WeekSchedule {
    fn from_iter<T: IntoIterator<Item = (WeekDay, bool)>>(iter: T) -> Self {
        WeekSchedule(iter.into_iter().collect())
    }
}
