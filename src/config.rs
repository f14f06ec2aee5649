pub mod manager;

use std::{path::Path, time::Duration};

use anyhow::{anyhow, Context};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    checker::DEFAULT_DELIVERY_FREQUENCY, schedule::IntervalSet, serialize::deserialize_hours,
    types::WeekSchedule,
};

/// Deliveries are batched at least once a day.
pub const MAX_DELIVERY_EVERY_MINUTES: u64 = 24 * 60;

/// The on-disk snooze configuration.
///
/// ```yaml
/// days:
///   monday: true
///   saturday: false
/// hours:
///   - from: "09:00:00"
///     to: "12:30:00"
/// delivery_every_minutes: 15
/// ```
///
/// `hours` may also use the legacy text format, e.g. `hours: "9:0–12:30,14:0–18:0"`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Days on which snoozing may happen. Days not listed never snooze.
    #[serde(default)]
    pub days: WeekSchedule,

    #[serde(default, deserialize_with = "deserialize_hours_field")]
    pub hours: IntervalSet,

    #[serde(default = "Config::default_delivery_every_minutes")]
    pub delivery_every_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            days: WeekSchedule::default(),
            hours: IntervalSet::default(),
            delivery_every_minutes: Self::default_delivery_every_minutes(),
        }
    }
}

impl Config {
    fn default_delivery_every_minutes() -> u64 {
        DEFAULT_DELIVERY_FREQUENCY.as_secs() / 60
    }

    /// Saturates on overflow.
    pub fn delivery_every(&self) -> Duration {
        Duration::from_secs(self.delivery_every_minutes.saturating_mul(60))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        info!("reading config {}", path.display());
        let reader = std::fs::File::open(path)
            .with_context(|| format!("could not open file {}", path.display()))?;
        Self::from_reader(reader)
            .with_context(|| format!("could not parse file {}", path.display()))
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, anyhow::Error> {
        let config: Config = serde_yaml::from_reader(reader).context("Invalid format")?;
        if !(1..=MAX_DELIVERY_EVERY_MINUTES).contains(&config.delivery_every_minutes) {
            return Err(anyhow!(
                "delivery_every_minutes must be between 1 and {MAX_DELIVERY_EVERY_MINUTES}, got {}",
                config.delivery_every_minutes
            ));
        }
        debug!("config: {config:?}");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let path = path.as_ref();
        info!("writing config {}", path.display());
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to open {} for writing", path.display()))?;
        serde_yaml::to_writer(std::io::BufWriter::new(file), self)
            .with_context(|| format!("failed to write to {}", path.display()))?;
        Ok(())
    }
}

/// Accept either a list of intervals or the legacy text format, migrating the latter.
fn deserialize_hours_field<'de, D>(deserializer: D) -> Result<IntervalSet, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    // untagged enum parsers are really bad for error messages, so we use an intermediate
    // yaml value
    let value = serde_yaml::Value::deserialize(deserializer)?;
    match value.as_str() {
        Some(legacy) => {
            debug!("migrating legacy hours format {legacy:?}");
            deserialize_hours(legacy).map_err(D::Error::custom)
        }
        None => IntervalSet::deserialize(value).map_err(D::Error::custom),
    }
}
