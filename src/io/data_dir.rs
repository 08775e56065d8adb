use std::path::{Path, PathBuf};

/// Resolve the data directory: an explicit path wins, then `TASKFLOW_DIR`,
/// then `$XDG_DATA_HOME/taskflow`, then `~/.local/share/taskflow`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_with(explicit, |key| std::env::var(key).ok())
}

fn resolve_with(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);
    if let Some(dir) = non_empty("TASKFLOW_DIR") {
        return dir;
    }
    let data_home = non_empty("XDG_DATA_HOME").unwrap_or_else(|| {
        non_empty("HOME")
            .unwrap_or_else(|| PathBuf::from("/"))
            .join(".local")
            .join("share")
    });
    data_home.join("taskflow")
}
