//! Nudging one bound of a [`TimeInterval`] by an hour or a minute, as an
//! hour/minute stepper control does.

use std::{fmt::Display, str::FromStr};

use chrono::{NaiveTime, TimeDelta};
use log::debug;

use crate::{
    error::ScheduleError,
    types::{TimeInterval, LAST_AVAILABLE_MINUTE_OF_DAY},
};

/// Which bound of the interval is being edited.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Extremity {
    From,
    To,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum PartOfHour {
    Hour,
    Minute,
}

impl PartOfHour {
    fn step(self) -> TimeDelta {
        match self {
            PartOfHour::Hour => TimeDelta::hours(1),
            PartOfHour::Minute => TimeDelta::minutes(1),
        }
    }
}

/// Add `delta` to `time`, or `None` if that would cross midnight.
fn shift(time: NaiveTime, delta: TimeDelta) -> Option<NaiveTime> {
    let (shifted, wrapped) = time.overflowing_add_signed(delta);
    (wrapped == 0).then_some(shifted)
}

/// An interval with one bound selected for editing.
///
/// `minimum_allowable_from` and `maximum_allowable_to` are usually the bounds of
/// the neighbouring intervals in an [`crate::schedule::IntervalSet`], see
/// [`crate::schedule::IntervalSet::picker`].
///
/// ```
/// use chrono::NaiveTime;
/// use snooze_schedule::picker::{Extremity, PartOfHour, TimePicker};
/// use snooze_schedule::types::TimeInterval;
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let interval = TimeInterval::new(at(10, 0), at(11, 0)).unwrap();
///
/// // Moving `from` forward by an hour would make the interval empty.
/// let picker = TimePicker::new(interval, Extremity::From, PartOfHour::Hour);
/// assert!(!picker.can_increment());
///
/// let picker = TimePicker::new(interval, Extremity::To, PartOfHour::Minute);
/// assert_eq!(picker.increment().unwrap().to(), at(11, 1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimePicker {
    interval: TimeInterval,
    extremity: Extremity,
    part: PartOfHour,
    minimum_allowable_from: Option<NaiveTime>,
    maximum_allowable_to: Option<NaiveTime>,
}

impl TimePicker {
    pub fn new(interval: TimeInterval, extremity: Extremity, part: PartOfHour) -> Self {
        TimePicker {
            interval,
            extremity,
            part,
            minimum_allowable_from: None,
            maximum_allowable_to: None,
        }
    }

    /// Constrain by the neighbouring intervals.
    pub fn with_bounds(
        mut self,
        minimum_allowable_from: Option<NaiveTime>,
        maximum_allowable_to: Option<NaiveTime>,
    ) -> Self {
        self.minimum_allowable_from = minimum_allowable_from;
        self.maximum_allowable_to = maximum_allowable_to;
        self
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn can_increment(&self) -> bool {
        self.incremented().is_some()
    }

    pub fn can_decrement(&self) -> bool {
        self.decremented().is_some()
    }

    /// A copy of the interval with the selected part moved forward by one unit.
    pub fn increment(&self) -> Result<TimeInterval, ScheduleError> {
        self.incremented().ok_or_else(|| self.refuse(self.part.step()))
    }

    /// A copy of the interval with the selected part moved backward by one unit.
    pub fn decrement(&self) -> Result<TimeInterval, ScheduleError> {
        self.decremented().ok_or_else(|| self.refuse(-self.part.step()))
    }

    fn incremented(&self) -> Option<TimeInterval> {
        let step = self.part.step();
        let (from, to) = (self.interval.from(), self.interval.to());
        match self.extremity {
            Extremity::From => {
                let from = shift(from, step).filter(|from| *from < to)?;
                TimeInterval::new(from, to).ok()
            }
            Extremity::To => {
                let to = shift(to, step)
                    .filter(|to| *to <= LAST_AVAILABLE_MINUTE_OF_DAY)
                    .filter(|to| self.maximum_allowable_to.map_or(true, |max| *to < max))?;
                TimeInterval::new(from, to).ok()
            }
        }
    }

    fn decremented(&self) -> Option<TimeInterval> {
        let step = self.part.step();
        let (from, to) = (self.interval.from(), self.interval.to());
        match self.extremity {
            Extremity::From => {
                let from = shift(from, -step)
                    .filter(|from| self.minimum_allowable_from.map_or(true, |min| *from > min))?;
                TimeInterval::new(from, to).ok()
            }
            Extremity::To => {
                let to = shift(to, -step).filter(|to| *to > from)?;
                TimeInterval::new(from, to).ok()
            }
        }
    }

    fn refuse(&self, delta: TimeDelta) -> ScheduleError {
        debug!(
            "refusing to move {:?} of {} by {}min",
            self.extremity,
            self.interval,
            delta.num_minutes()
        );
        // A move across midnight is reported as no move at all.
        let moved = |time| shift(time, delta).unwrap_or(time);
        let (from, to) = match self.extremity {
            Extremity::From => (moved(self.interval.from()), self.interval.to()),
            Extremity::To => (self.interval.from(), moved(self.interval.to())),
        };
        ScheduleError::InvalidInterval {
            from,
            to,
            reason: "bound cannot be moved any further",
        }
    }
}

impl Display for Extremity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Extremity::From => "from",
            Extremity::To => "to",
        })
    }
}

impl FromStr for Extremity {
    type Err = ScheduleError;
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "from" => Ok(Extremity::From),
            "to" => Ok(Extremity::To),
            _ => Err(ScheduleError::parse(format!(
                "expected 'from' or 'to', got '{source}'"
            ))),
        }
    }
}

impl FromStr for PartOfHour {
    type Err = ScheduleError;
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "hour" | "hours" | "h" => Ok(PartOfHour::Hour),
            "minute" | "minutes" | "m" => Ok(PartOfHour::Minute),
            _ => Err(ScheduleError::parse(format!(
                "expected 'hour' or 'minute', got '{source}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hours: u32, minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hours, minutes, 0).unwrap()
    }

    fn interval(from: NaiveTime, to: NaiveTime) -> TimeInterval {
        TimeInterval::new(from, to).unwrap()
    }

    fn can_increment(interval: TimeInterval, extremity: Extremity, part: PartOfHour) -> bool {
        TimePicker::new(interval, extremity, part).can_increment()
    }

    fn can_decrement(interval: TimeInterval, extremity: Extremity, part: PartOfHour) -> bool {
        TimePicker::new(interval, extremity, part).can_decrement()
    }

    use super::Extremity::{From, To};
    use super::PartOfHour::{Hour, Minute};

    #[test]
    fn decrementing_from_stays_within_the_day() {
        let to = at(15, 0);
        assert!(!can_decrement(interval(at(0, 0), to), From, Hour));
        assert!(!can_decrement(interval(at(0, 0), to), From, Minute));
        assert!(!can_decrement(interval(at(0, 59), to), From, Hour));
        assert!(can_decrement(interval(at(0, 1), to), From, Minute));
        assert!(can_decrement(interval(at(1, 0), to), From, Hour));
    }

    #[test]
    fn incrementing_from_keeps_it_before_to() {
        let any = at(15, 0);
        assert!(!can_increment(interval(any, at(15, 59)), From, Hour));
        assert!(!can_increment(interval(any, at(16, 0)), From, Hour));
        assert!(!can_increment(interval(any, at(15, 1)), From, Minute));
        assert!(can_increment(interval(any, at(16, 1)), From, Hour));
        assert!(can_increment(interval(any, at(15, 2)), From, Minute));
    }

    #[test]
    fn incrementing_from_near_midnight() {
        assert!(!can_increment(interval(at(23, 58), at(23, 59)), From, Hour));
        assert!(!can_increment(interval(at(23, 58), at(23, 59)), From, Minute));
        assert!(!can_increment(interval(at(23, 0), at(23, 59)), From, Hour));
        assert!(can_increment(interval(at(23, 57), at(23, 59)), From, Minute));
        assert!(can_increment(interval(at(22, 58), at(23, 59)), From, Hour));
    }

    #[test]
    fn decrementing_to_keeps_it_after_from() {
        let any = at(15, 0);
        assert!(!can_decrement(interval(any, at(16, 0)), To, Hour));
        assert!(!can_decrement(interval(any, at(15, 1)), To, Minute));
        assert!(can_decrement(interval(any, at(16, 1)), To, Hour));
        assert!(can_decrement(interval(any, at(15, 2)), To, Minute));
    }

    #[test]
    fn incrementing_to_stops_at_last_minute() {
        let any = at(15, 0);
        assert!(!can_increment(interval(any, at(23, 0)), To, Hour));
        assert!(!can_increment(interval(any, at(23, 59)), To, Minute));
        assert!(can_increment(interval(any, at(22, 59)), To, Hour));
        assert!(can_increment(interval(any, at(23, 58)), To, Minute));
    }

    #[test]
    fn neighbours_constrain_the_picker() {
        let base = interval(at(10, 0), at(12, 0));

        let picker = TimePicker::new(base, From, Hour).with_bounds(Some(at(9, 0)), None);
        assert!(!picker.can_decrement());
        let picker = TimePicker::new(base, From, Minute).with_bounds(Some(at(9, 59)), None);
        assert!(!picker.can_decrement());
        let picker = TimePicker::new(base, From, Minute).with_bounds(Some(at(9, 58)), None);
        assert!(picker.can_decrement());

        let picker = TimePicker::new(base, To, Hour).with_bounds(None, Some(at(13, 0)));
        assert!(!picker.can_increment());
        let picker = TimePicker::new(base, To, Minute).with_bounds(None, Some(at(12, 1)));
        assert!(!picker.can_increment());
        let picker = TimePicker::new(base, To, Minute).with_bounds(None, Some(at(12, 2)));
        assert!(picker.can_increment());
    }

    #[test]
    fn bounds_only_apply_to_their_own_extremity() {
        let base = interval(at(10, 0), at(12, 0));
        // A tight lower bound does not prevent moving `to` back.
        let picker = TimePicker::new(base, To, Hour).with_bounds(Some(at(10, 0)), Some(at(12, 1)));
        assert!(picker.can_decrement());
        // A tight upper bound does not prevent moving `from` forward.
        let picker = TimePicker::new(base, From, Hour).with_bounds(Some(at(9, 59)), Some(at(12, 1)));
        assert!(picker.can_increment());
    }

    #[test]
    fn moves_exactly_one_bound() {
        let base = interval(at(10, 0), at(12, 0));
        let cases = [
            (From, Hour, true, interval(at(11, 0), at(12, 0))),
            (From, Minute, true, interval(at(10, 1), at(12, 0))),
            (To, Hour, true, interval(at(10, 0), at(13, 0))),
            (To, Minute, true, interval(at(10, 0), at(12, 1))),
            (From, Hour, false, interval(at(9, 0), at(12, 0))),
            (From, Minute, false, interval(at(9, 59), at(12, 0))),
            (To, Hour, false, interval(at(10, 0), at(11, 0))),
            (To, Minute, false, interval(at(10, 0), at(11, 59))),
        ];
        for (extremity, part, up, expected) in cases {
            let picker = TimePicker::new(base, extremity, part);
            let actual = if up { picker.increment() } else { picker.decrement() };
            assert_eq!(actual.unwrap(), expected, "{extremity} {part:?} up={up}");
        }
    }

    #[test]
    fn refuses_to_move_without_room() {
        let base = interval(at(10, 0), at(10, 1));
        let picker = TimePicker::new(base, From, Minute);
        assert!(matches!(
            picker.increment(),
            Err(ScheduleError::InvalidInterval { .. })
        ));
        let picker = TimePicker::new(interval(at(0, 0), at(1, 0)), From, Minute);
        assert!(picker.decrement().is_err());
    }

    #[test]
    fn refusal_never_reports_wrapped_bounds() {
        let picker = TimePicker::new(interval(at(0, 0), at(15, 0)), From, Hour);
        assert_eq!(
            picker.decrement(),
            Err(ScheduleError::InvalidInterval {
                from: at(0, 0),
                to: at(15, 0),
                reason: "bound cannot be moved any further",
            })
        );
        let picker = TimePicker::new(interval(at(10, 0), at(10, 30)), From, Hour);
        assert_eq!(
            picker.increment(),
            Err(ScheduleError::InvalidInterval {
                from: at(11, 0),
                to: at(10, 30),
                reason: "bound cannot be moved any further",
            })
        );
    }

    #[test]
    fn parses_cli_words() {
        assert_eq!("from".parse::<Extremity>().unwrap(), From);
        assert_eq!("minutes".parse::<PartOfHour>().unwrap(), Minute);
        assert!("middle".parse::<Extremity>().is_err());
    }
}
