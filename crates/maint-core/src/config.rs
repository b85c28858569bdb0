use crate::error::{MaintenanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// MaintenanceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Number of pool workers.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Cooldown after an action finishes before an identical one may run.
    #[serde(default = "default_seconds_actions_block")]
    pub seconds_actions_block: u64,
    /// How long finished actions stay listed before they are dropped.
    #[serde(default = "default_seconds_actions_linger")]
    pub seconds_actions_linger: u64,
    /// How long an idle worker waits for new work before re-checking shutdown.
    #[serde(default = "default_idle_wait_ms")]
    pub idle_wait_ms: u64,
}

fn default_worker_threads() -> usize {
    2
}

fn default_seconds_actions_block() -> u64 {
    2
}

fn default_seconds_actions_linger() -> u64 {
    3600
}

fn default_idle_wait_ms() -> u64 {
    100
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            seconds_actions_block: default_seconds_actions_block(),
            seconds_actions_linger: default_seconds_actions_linger(),
            idle_wait_ms: default_idle_wait_ms(),
        }
    }
}

impl MaintenanceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    pub fn from_yaml_str(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: MaintenanceConfig = serde_yaml::from_str(data)?;
        if config.worker_threads == 0 {
            tracing::warn!("worker_threads = 0, using 1");
            config.worker_threads = 1;
        }
        if config.idle_wait_ms == 0 {
            return Err(MaintenanceError::Config(
                "idle_wait_ms must be greater than zero".into(),
            ));
        }
        Ok(config)
    }

    pub fn block_window(&self) -> Duration {
        Duration::from_secs(self.seconds_actions_block)
    }

    pub fn linger_window(&self) -> Duration {
        Duration::from_secs(self.seconds_actions_linger)
    }

    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.seconds_actions_block == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "seconds_actions_block is 0: identical actions may be resubmitted \
                          immediately after finishing"
                    .into(),
            });
        }
        if self.seconds_actions_linger < self.seconds_actions_block {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "seconds_actions_linger ({}) is shorter than seconds_actions_block ({}); \
                     finished actions would be dropped before their cooldown ends",
                    self.seconds_actions_linger, self.seconds_actions_block
                ),
            });
        }
        warnings
    }
}
