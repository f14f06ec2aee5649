use std::fmt::Display;

use chrono::{NaiveTime, TimeDelta};
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    error::ScheduleError,
    picker::{Extremity, PartOfHour, TimePicker},
    types::{time_of_day, TimeInterval, LAST_AVAILABLE_MINUTE_OF_DAY},
};

fn minimum_range_duration() -> TimeDelta {
    TimeDelta::minutes(1)
}

/// The sorted, non-overlapping, never empty list of windows during which
/// snoozing may happen on any given day.
///
/// Every edit returns a new, re-validated set; the receiver is never modified.
///
/// ```
/// use snooze_schedule::schedule::IntervalSet;
///
/// let schedule = IntervalSet::default();
/// assert_eq!(schedule.to_string(), "09:00:00–12:30:00, 14:00:00–18:00:00");
///
/// let schedule = schedule.append().unwrap();
/// assert_eq!(schedule.len(), 3);
/// assert_eq!(schedule.last().to_string(), "18:01:00–19:00:00");
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimeInterval>", into = "Vec<TimeInterval>")]
pub struct IntervalSet {
    intervals: Vec<TimeInterval>,
}

impl IntervalSet {
    /// Sort `intervals` by start time and check that they leave a gap between each other.
    pub fn of(intervals: impl IntoIterator<Item = TimeInterval>) -> Result<Self, ScheduleError> {
        let mut intervals = intervals.into_iter().collect_vec();
        if intervals.is_empty() {
            return Err(ScheduleError::EmptySet);
        }
        intervals.sort_by_key(|interval| interval.from());
        // Touching bounds count as overlapping: `contains` is inclusive on both ends.
        if let Some((index, _)) = intervals
            .iter()
            .tuple_windows()
            .find_position(|(previous, current)| current.from() <= previous.to())
        {
            debug!(
                "interval {} overlaps {}",
                intervals[index + 1],
                intervals[index]
            );
            return Err(ScheduleError::Overlap { index: index + 1 });
        }
        Ok(IntervalSet { intervals })
    }

    pub fn can_append_another_range(&self) -> bool {
        self.last().to() < LAST_AVAILABLE_MINUTE_OF_DAY - minimum_range_duration()
    }

    /// There must always be at least one interval left.
    pub fn can_remove_ranges(&self) -> bool {
        self.intervals.len() > 1
    }

    /// Add an interval right after the last one: it starts a minute after the
    /// end of the last interval and ends an hour after it, or at 23:59.
    pub fn append(&self) -> Result<Self, ScheduleError> {
        if !self.can_append_another_range() {
            return Err(ScheduleError::CannotAppend);
        }
        let last_to = self.last().to();
        let from = last_to + minimum_range_duration();
        let (to, wrapped) = last_to.overflowing_add_signed(TimeDelta::hours(1));
        let to = if wrapped != 0 || to > LAST_AVAILABLE_MINUTE_OF_DAY {
            LAST_AVAILABLE_MINUTE_OF_DAY
        } else {
            to
        };
        let appended = TimeInterval::new(from, to)?;
        trace!("appending {appended}");
        Self::of(self.intervals.iter().copied().chain([appended]))
    }

    /// Replace `old` with `new`, then re-sort. `new` may move past its neighbours
    /// as long as it overlaps none of them.
    pub fn update(&self, old: &TimeInterval, new: TimeInterval) -> Result<Self, ScheduleError> {
        let index = self.position(old)?;
        let mut intervals = self.intervals.clone();
        intervals[index] = new;
        Self::of(intervals)
    }

    pub fn remove(&self, interval: &TimeInterval) -> Result<Self, ScheduleError> {
        if !self.can_remove_ranges() {
            return Err(ScheduleError::CannotRemove);
        }
        let index = self.position(interval)?;
        let mut intervals = self.intervals.clone();
        intervals.remove(index);
        Ok(IntervalSet { intervals })
    }

    fn position(&self, interval: &TimeInterval) -> Result<usize, ScheduleError> {
        self.intervals
            .iter()
            .position(|candidate| candidate == interval)
            .ok_or(ScheduleError::NotFound(*interval))
    }

    pub fn get(&self, index: usize) -> Option<&TimeInterval> {
        self.intervals.get(index)
    }

    pub fn first(&self) -> &TimeInterval {
        &self.intervals[0]
    }

    pub fn last(&self) -> &TimeInterval {
        &self.intervals[self.intervals.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Always `false`, provided for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeInterval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[TimeInterval] {
        &self.intervals
    }

    /// The bounds an editor must respect when moving the interval at `index`:
    /// the end of the previous interval and the start of the next one.
    pub fn picker_bounds(&self, index: usize) -> (Option<NaiveTime>, Option<NaiveTime>) {
        let minimum_allowable_from = index
            .checked_sub(1)
            .and_then(|previous| self.intervals.get(previous))
            .map(TimeInterval::to);
        let maximum_allowable_to = self.intervals.get(index + 1).map(TimeInterval::from);
        (minimum_allowable_from, maximum_allowable_to)
    }

    /// An editor for one bound of the interval at `index`, constrained by its neighbours.
    pub fn picker(&self, index: usize, extremity: Extremity, part: PartOfHour) -> Option<TimePicker> {
        let interval = *self.intervals.get(index)?;
        let (minimum_allowable_from, maximum_allowable_to) = self.picker_bounds(index);
        Some(
            TimePicker::new(interval, extremity, part)
                .with_bounds(minimum_allowable_from, maximum_allowable_to),
        )
    }
}

impl Default for IntervalSet {
    /// 09:00–12:30 and 14:00–18:00.
    fn default() -> Self {
        IntervalSet {
            intervals: vec![
                TimeInterval::new_unchecked(time_of_day(9, 0), time_of_day(12, 30)),
                TimeInterval::new_unchecked(time_of_day(14, 0), time_of_day(18, 0)),
            ],
        }
    }
}

impl TryFrom<Vec<TimeInterval>> for IntervalSet {
    type Error = ScheduleError;
    fn try_from(intervals: Vec<TimeInterval>) -> Result<Self, Self::Error> {
        Self::of(intervals)
    }
}

impl From<IntervalSet> for Vec<TimeInterval> {
    fn from(set: IntervalSet) -> Self {
        set.intervals
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;
    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl Display for IntervalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.intervals.iter().join(", "))
    }
}
