//! Harness configuration.
//!
//! All knobs are explicit values threaded through constructors; nothing is
//! process-wide mutable state. An optional TOML file can override the
//! defaults, and the command line overrides the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid harness configuration: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Seconds a single ciao-cli invocation may take before it is killed.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Attempt budget when polling for a cluster state change.
    #[serde(default = "default_poll_attempts")]
    pub cluster_poll_attempts: u32,
    /// Constant interval between polling attempts.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Settle wait between a launch and the single-instance listing check.
    #[serde(default = "default_launch_settle")]
    pub launch_settle_secs: u64,
    /// Settle wait after each case's cleanup.
    #[serde(default = "default_teardown_settle")]
    pub teardown_settle_secs: u64,
    #[serde(default = "default_cli_binary")]
    pub cli_binary: PathBuf,
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    #[serde(default = "default_event_log_root")]
    pub event_log_root: PathBuf,
}

fn default_command_timeout() -> u64 {
    300
}

fn default_poll_attempts() -> u32 {
    60
}

fn default_poll_interval() -> u64 {
    1
}

fn default_launch_settle() -> u64 {
    5
}

fn default_teardown_settle() -> u64 {
    2
}

fn default_cli_binary() -> PathBuf {
    PathBuf::from("ciao-cli")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("report.tap")
}

fn default_event_log_root() -> PathBuf {
    PathBuf::from(".bat/events")
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
            cluster_poll_attempts: default_poll_attempts(),
            poll_interval_secs: default_poll_interval(),
            launch_settle_secs: default_launch_settle(),
            teardown_settle_secs: default_teardown_settle(),
            cli_binary: default_cli_binary(),
            report_path: default_report_path(),
            event_log_root: default_event_log_root(),
        }
    }
}

impl HarnessConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn launch_settle(&self) -> Duration {
        Duration::from_secs(self.launch_settle_secs)
    }

    pub fn teardown_settle(&self) -> Duration {
        Duration::from_secs(self.teardown_settle_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "command_timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.cluster_poll_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "cluster_poll_attempts must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

pub fn parse_harness_config(contents: &str) -> Result<HarnessConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_harness_config(path: impl AsRef<Path>) -> Result<HarnessConfig, ConfigError> {
    let path_ref = path.as_ref();
    let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_harness_config(&body).map_err(|source| ConfigError::Parse {
        path: path_ref.to_path_buf(),
        source,
    })
}
