//! Run and cluster configuration.
//!
//! Everything a participant needs to know about the run is passed in
//! explicitly through these values; nothing is read from globals.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use tracing::Level;

use crate::Error;
use crate::launch::{check_participants, expected_participants};

/// Parameters shared by every participant of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Side length N of the operands and of the processor grid.
    pub grid_size: usize,
    pub log_level: Level,
}

impl RunConfig {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            log_level: Level::INFO,
        }
    }

    pub fn with_log_level(mut self, log_level: Level) -> Self {
        self.log_level = log_level;
        self
    }

    /// N² workers plus the coordinator.
    pub fn participants(&self) -> Result<usize, Error> {
        expected_participants(self.grid_size)
    }
}

/// Layout of a multi-process run, loaded from TOML.
///
/// ```toml
/// grid_size = 2
/// log_level = "debug"
/// seed = 7
/// peers = [
///     "127.0.0.1:7000",
///     "127.0.0.1:7001",
///     "127.0.0.1:7002",
///     "127.0.0.1:7003",
///     "127.0.0.1:7004",
/// ]
/// ```
///
/// `peers[r]` is the listening address of rank `r`; rank 0 is the coordinator.
#[derive(Clone, Debug, Deserialize)]
pub struct ClusterConfig {
    pub grid_size: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seed for random operands. Without one the demo operands are used,
    /// which only exist for a 3x3 grid.
    #[serde(default)]
    pub seed: Option<u64>,
    pub peers: Vec<SocketAddr>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClusterConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let config: ClusterConfig = toml::from_str(content)?;
        config.run_config()?;
        check_participants(config.grid_size, config.peers.len())?;
        Ok(config)
    }

    pub fn run_config(&self) -> Result<RunConfig, Error> {
        let log_level = self
            .log_level
            .parse()
            .map_err(|_| Error::Configuration(format!("unknown log level {:?}", self.log_level)))?;
        Ok(RunConfig::new(self.grid_size).with_log_level(log_level))
    }
}
