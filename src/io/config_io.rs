use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::task_file::atomic_write;
use crate::model::config::Config;

pub const CONFIG_FILE: &str = "taskflow.toml";

/// Written by `tf init`. Every key is optional.
pub const CONFIG_TEMPLATE: &str = r##"# taskflow configuration

[store]
# What starting a task does while another task is active:
#   "demote"  move the active task back to next
#   "reject"  refuse with a conflict error
on_switch = "demote"

[review]
# Days between weekly reviews. `tf review` records the last one.
frequency_days = 7

[log]
# Filter directive for diagnostics on stderr. TASKFLOW_LOG overrides it.
# level = "info"

[ui]
# Ask before replacing the active task
confirm_switch = true

# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# cyan = "#44DDFF"
# selection_bg = "#3D1438"
"##;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Edit(#[from] toml_edit::TomlError),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

fn read_text(data_dir: &Path) -> Result<Option<String>, ConfigError> {
    let path = config_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}

/// Parse `taskflow.toml`, falling back to defaults when it does not exist.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    match read_text(data_dir)? {
        Some(text) => Ok(toml::from_str(&text)?),
        None => Ok(Config::default()),
    }
}

/// Write the commented template unless a config already exists.
/// Returns whether a file was written.
pub fn write_default_config(data_dir: &Path) -> Result<bool, ConfigError> {
    let path = config_path(data_dir);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, CONFIG_TEMPLATE).map_err(|source| ConfigError::Write { path, source })?;
    Ok(true)
}

/// Set `[review] last_review_at` in the document, creating the table if needed.
pub fn set_last_review(doc: &mut toml_edit::DocumentMut, at: i64) {
    if !doc.contains_key("review") {
        doc["review"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["review"]["last_review_at"] = toml_edit::value(at);
}

/// Record a completed review, keeping the rest of the file as the user wrote it.
pub fn record_review(data_dir: &Path, at: i64) -> Result<(), ConfigError> {
    let text = read_text(data_dir)?.unwrap_or_default();
    let mut doc: toml_edit::DocumentMut = text.parse()?;
    set_last_review(&mut doc, at);
    let path = config_path(data_dir);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|source| ConfigError::Write { path, source })
}
