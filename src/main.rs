use std::{
    path::{Path, PathBuf},
    thread,
};

use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use log::{info, set_max_level, warn, LevelFilter};
use serde::Serialize;
use snooze_schedule::{
    config::Config,
    picker::{Extremity, PartOfHour},
    schedule::IntervalSet,
    serialize::{serialize_days, serialize_hours},
    types::TimeInterval,
    Options, Snooze, SnoozeWatcher,
};
use systemd_journal_logger::{connected_to_journal, JournalLog};

const CONFIG_PATH: &str = "/etc/snooze-schedule.yaml";

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tell whether notifications are snoozed.
    Check {
        /// Local date and time to check, e.g. 2021-09-08T16:45:00. Defaults to now.
        #[arg(long)]
        at: Option<NaiveDateTime>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the schedule.
    Show {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Keep checking the schedule, logging whenever snoozing starts or stops.
    Watch {
        /// How often to check, in seconds.
        #[arg(short, long, default_value = "60")]
        sleep_s: u64,
    },

    /// Add an interval after the last one.
    Append,

    /// Remove the interval at `index` (starting from 0).
    Remove { index: usize },

    /// Replace the interval at `index` (starting from 0).
    Set {
        index: usize,
        from: NaiveTime,
        to: NaiveTime,
    },

    /// Move one bound of the interval at `index` by an hour or a minute.
    Nudge {
        index: usize,
        /// `from` or `to`.
        extremity: Extremity,
        /// `hour` or `minute`.
        part: PartOfHour,
        #[arg(value_enum)]
        direction: Direction,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Up,
    Down,
}

pub fn main() -> Result<(), anyhow::Error> {
    if connected_to_journal() {
        eprintln!("using journal log");
        JournalLog::new()
            .context("could not connect to journal")?
            .install()
            .context("could not install journal logger")?;
        set_max_level(LevelFilter::Debug);
    } else {
        simple_logger::SimpleLogger::new()
            .with_level(LevelFilter::Warn)
            .env()
            .init()
            .context("could not install logger")?;
    }

    let args = Args::parse();
    match args.command {
        Command::Check { at, json } => {
            let config = Config::load(&args.config)?;
            let now = at.unwrap_or_else(|| Local::now().naive_local());
            let snooze = Snooze::at(now, &config).context("invalid configuration")?;
            if json {
                print_json(&snooze)?;
            } else {
                match snooze {
                    Snooze::Inactive => println!("{now}: not snoozing"),
                    Snooze::Active {
                        until_window_end,
                        until_next_delivery,
                    } => println!(
                        "{now}: snoozing, window ends in {}s, next delivery in {}s",
                        until_window_end.as_secs(),
                        until_next_delivery.as_secs()
                    ),
                }
            }
        }
        Command::Show { json } => {
            let config = Config::load(&args.config)?;
            if json {
                print_json(&config)?;
            } else {
                println!("hours: {}", serialize_hours(&config.hours));
                println!(
                    "days: {}",
                    serialize_days(&config.days).unwrap_or_else(|_| "(none)".to_string())
                );
                println!("delivery every {} minutes", config.delivery_every_minutes);
                println!(
                    "can append: {}, can remove: {}",
                    config.hours.can_append_another_range(),
                    config.hours.can_remove_ranges()
                );
            }
        }
        Command::Watch { sleep_s } => {
            info!("starting");
            let options = Options::builder()
                .config(args.config)
                .sleep(std::time::Duration::from_secs(sleep_s))
                .build();
            let mut watcher = SnoozeWatcher::try_new(options)?;
            loop {
                if let Err(err) = watcher.tick(Local::now().naive_local()) {
                    warn!("could not check the schedule: {err}");
                }
                thread::sleep(watcher.options().sleep);
            }
        }
        Command::Append => edit(&args.config, |hours| Ok(hours.append()?))?,
        Command::Remove { index } => edit(&args.config, |hours| {
            let interval = *nth(hours, index)?;
            Ok(hours.remove(&interval)?)
        })?,
        Command::Set { index, from, to } => edit(&args.config, |hours| {
            let old = *nth(hours, index)?;
            Ok(hours.update(&old, TimeInterval::new(from, to)?)?)
        })?,
        Command::Nudge {
            index,
            extremity,
            part,
            direction,
        } => edit(&args.config, |hours| {
            let old = *nth(hours, index)?;
            let picker = hours
                .picker(index, extremity, part)
                .ok_or_else(|| anyhow!("no interval at position {index}"))?;
            let new = match direction {
                Direction::Up => picker.increment()?,
                Direction::Down => picker.decrement()?,
            };
            Ok(hours.update(&old, new)?)
        })?,
    }
    Ok(())
}

fn nth(hours: &IntervalSet, index: usize) -> Result<&TimeInterval, anyhow::Error> {
    hours
        .get(index)
        .ok_or_else(|| anyhow!("no interval at position {index}, there are {}", hours.len()))
}

/// Load the configuration, replace its hours with the result of `change`, save it back.
fn edit<F>(path: &Path, change: F) -> Result<(), anyhow::Error>
where
    F: FnOnce(&IntervalSet) -> Result<IntervalSet, anyhow::Error>,
{
    let mut config = Config::load(path)?;
    config.hours = change(&config.hours).context("could not edit schedule")?;
    config.save(path)?;
    println!("hours: {}", serialize_hours(&config.hours));
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), anyhow::Error> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("error during serialization")?
    );
    Ok(())
}
