//! When may notifications be snoozed?
//!
//! A day is split into a few non-overlapping windows ([`schedule::IntervalSet`]),
//! enabled per day of the week ([`types::WeekSchedule`]). [`checker`] decides
//! whether a given local moment falls within an enabled window and how long
//! until it ends.

pub mod checker;
pub mod config;
pub mod error;
pub mod picker;
pub mod schedule;
pub mod serialize;
pub mod types;

use std::{path::PathBuf, time::Duration};

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::{
    checker::{delay_until_next_delivery, delay_until_window_end},
    config::{manager::ConfigManager, Config},
};

pub use error::ScheduleError;

#[derive(TypedBuilder, Debug)]
pub struct Options {
    /// How often to check the schedule.
    #[builder(default = Duration::from_secs(60))]
    pub sleep: Duration,

    pub config: PathBuf,
}

/// The verdict for one moment.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Snooze {
    Inactive,
    Active {
        /// Until the current window closes.
        until_window_end: Duration,
        /// Until the next batch of snoozed notifications is due.
        until_next_delivery: Duration,
    },
}

impl Snooze {
    /// Fails on a broken configuration, e.g. a zero delivery frequency.
    pub fn at(now: NaiveDateTime, config: &Config) -> Result<Self, ScheduleError> {
        // The frequency is validated even when no window is active.
        let until_next_delivery = match delay_until_next_delivery(
            now,
            &config.days,
            &config.hours,
            config.delivery_every(),
        ) {
            Ok(delay) => delay,
            Err(ScheduleError::NotActive) => {
                debug!("not snoozing at {now}");
                return Ok(Snooze::Inactive);
            }
            Err(err) => return Err(err),
        };
        let until_window_end = delay_until_window_end(now, &config.days, &config.hours)?;
        Ok(Snooze::Active {
            until_window_end,
            until_next_delivery,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Snooze::Active { .. })
    }
}

/// Periodically re-evaluates the schedule, following changes to the configuration file.
pub struct SnoozeWatcher {
    /// Runtime options.
    options: Options,

    manager: ConfigManager,

    /// The verdict of the latest `tick()`, if any.
    latest: Option<Snooze>,
}

impl SnoozeWatcher {
    pub fn try_new(options: Options) -> Result<Self, anyhow::Error> {
        debug!("options: {:?}", options);
        let manager = ConfigManager::try_new(options.config.clone())?;
        Ok(Self {
            options,
            manager,
            latest: None,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn config(&self) -> &Config {
        self.manager.config()
    }

    /// Reload any change to the configuration, then decide for `now`.
    ///
    /// Transitions between active and inactive are logged at `info` level.
    pub fn tick(&mut self, now: NaiveDateTime) -> Result<Snooze, ScheduleError> {
        if self.manager.load_config() {
            info!("schedule is now {}", self.manager.config().hours);
        }
        let snooze = Snooze::at(now, self.manager.config())?;
        let was_active = self.latest.map(|latest| latest.is_active());
        match snooze {
            Snooze::Active {
                until_window_end, ..
            } if was_active != Some(true) => {
                info!(
                    "snoozing notifications for the next {} minutes",
                    until_window_end.as_secs().div_ceil(60)
                );
            }
            Snooze::Inactive if was_active != Some(false) => {
                info!("not snoozing notifications");
            }
            _ => {}
        }
        self.latest = Some(snooze);
        Ok(snooze)
    }
}
