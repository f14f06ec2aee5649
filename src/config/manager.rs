use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use log::{debug, info, warn};

use super::Config;

/// Keeps the latest valid configuration read from disk, reloading it whenever
/// the file changes.
pub struct ConfigManager {
    path: PathBuf,

    /// The last configuration that parsed successfully.
    config: Config,

    /// When the file was last changed and read.
    latest_update: SystemTime,
}

impl ConfigManager {
    /// Read the configuration for the first time. Unlike later reloads, a
    /// failure here is an error.
    pub fn try_new(path: PathBuf) -> Result<Self, anyhow::Error> {
        let mut me = Self {
            path,
            config: Config::default(), // Data will be filled by `fetch()`.
            latest_update: UNIX_EPOCH,
        };
        me.fetch()?;
        Ok(me)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn modified(&self) -> Result<SystemTime, anyhow::Error> {
        std::fs::metadata(&self.path)
            .with_context(|| format!("could not access configuration at {}", self.path.display()))?
            .modified()
            .with_context(|| format!("no latest modification time for {}", self.path.display()))
    }

    /// Reread the file if it has changed since the last read.
    fn fetch(&mut self) -> Result<bool, anyhow::Error> {
        let latest_update = self.modified()?;
        if latest_update <= self.latest_update {
            // No change, keep cache.
            return Ok(false);
        }
        self.config = Config::load(&self.path)?;
        self.latest_update = latest_update;
        Ok(true)
    }

    /// Reload the configuration if needed, keeping the previous one if the new
    /// one cannot be read. Returns `true` if the configuration changed.
    pub fn load_config(&mut self) -> bool {
        match self.fetch() {
            Err(err) => {
                warn!("Failed to reload config, keeping previous config: {:#}", err);
                false
            }
            Ok(true) => {
                info!("reloaded config from {}", self.path.display());
                true
            }
            Ok(false) => {
                debug!("config {} unchanged", self.path.display());
                false
            }
        }
    }
}
