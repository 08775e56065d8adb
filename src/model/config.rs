use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from taskflow.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// What the store does when a task is started while another one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnSwitch {
    /// Move the current active task back to `next` in the same write
    #[default]
    Demote,
    /// Refuse the start with a conflict error
    Reject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub on_switch: OnSwitch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Default: see CONFIG_TEMPLATE in io/config_io.rs
    #[serde(default = "default_frequency_days")]
    pub frequency_days: i64,
    /// Seconds since epoch of the last completed weekly review
    #[serde(default)]
    pub last_review_at: Option<i64>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig {
            frequency_days: default_frequency_days(),
            last_review_at: None,
        }
    }
}

/// Default: see CONFIG_TEMPLATE in io/config_io.rs
fn default_frequency_days() -> i64 {
    7
}

/// Default: see CONFIG_TEMPLATE in io/config_io.rs
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "taskflow=debug". `TASKFLOW_LOG` wins.
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Ask before replacing the active task
    #[serde(default = "default_true")]
    pub confirm_switch: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            confirm_switch: true,
            colors: HashMap::new(),
        }
    }
}
