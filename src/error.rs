use chrono::NaiveTime;
use thiserror::Error;

use crate::types::TimeInterval;

/// Everything that can go wrong while building, editing or checking a schedule.
///
/// None of these are transient: they report either a caller bug (a precondition
/// that should have been checked first) or invalid user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid interval {from}–{to}: {reason}")]
    InvalidInterval {
        from: NaiveTime,
        to: NaiveTime,
        reason: &'static str,
    },

    #[error("there needs to be at least one interval in the schedule")]
    EmptySet,

    #[error("interval at position {index} overlaps the previous interval")]
    Overlap { index: usize },

    #[error("interval not found: {0}")]
    NotFound(TimeInterval),

    #[error("no room left in the day to append another interval")]
    CannotAppend,

    #[error("cannot remove the only interval left in the schedule")]
    CannotRemove,

    #[error("could not parse schedule: {0}")]
    Parse(String),

    #[error("snoozing is not active now")]
    NotActive,

    #[error("delivery frequency must be greater than zero")]
    InvalidFrequency,
}

impl ScheduleError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        ScheduleError::Parse(message.into())
    }
}
