use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::io::lock::LockError;
use crate::model::collection::TaskCollection;

pub const TASKS_FILE: &str = "tasks.json";

/// Error type for the persisted task file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid task file: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

pub fn tasks_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TASKS_FILE)
}

/// Load `tasks.json`. A missing file is an empty collection.
///
/// Every task is validated on the way in, along with ID uniqueness and the
/// single-active-task rule.
pub fn load_collection(data_dir: &Path) -> Result<TaskCollection, StoreError> {
    let path = tasks_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TaskCollection::new()),
        Err(source) => return Err(StoreError::Read { path, source }),
    };
    let collection: TaskCollection =
        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
    debug!(path = %path.display(), tasks = collection.len(), "task file loaded");
    Ok(collection)
}

/// Write the collection to `tasks.json`, replacing the file atomically.
pub fn save_collection(data_dir: &Path, collection: &TaskCollection) -> Result<(), StoreError> {
    let path = tasks_path(data_dir);
    let mut json = serde_json::to_string_pretty(collection)?;
    json.push('\n');
    atomic_write(&path, json.as_bytes()).map_err(|source| StoreError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), tasks = collection.len(), "task file written");
    Ok(())
}

/// Write through a temp file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
