use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus, ValidationError};

/// Problems found while loading a stored task collection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("duplicate task id: {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("more than one active task: {}", .0.join(", "))]
    MultipleActive(Vec<String>),
}

/// The full task set held by the authoritative store, keyed by task ID in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredCollection", into = "StoredCollection")]
pub struct TaskCollection {
    tasks: IndexMap<String, Task>,
}

/// On-disk shape of `tasks.json`
#[derive(Serialize, Deserialize)]
struct StoredCollection {
    #[serde(default = "current_format")]
    format: u32,
    #[serde(default)]
    tasks: Vec<Task>,
}

fn current_format() -> u32 {
    1
}

impl TryFrom<StoredCollection> for TaskCollection {
    type Error = CollectionError;

    fn try_from(stored: StoredCollection) -> Result<Self, Self::Error> {
        TaskCollection::from_tasks(stored.tasks)
    }
}

impl From<TaskCollection> for StoredCollection {
    fn from(collection: TaskCollection) -> Self {
        StoredCollection {
            format: current_format(),
            tasks: collection.tasks.into_values().collect(),
        }
    }
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, checking task shape, ID uniqueness and the
    /// single-active-task rule.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, CollectionError> {
        let mut map = IndexMap::with_capacity(tasks.len());
        for task in tasks {
            task.validate()?;
            if map.contains_key(&task.id) {
                return Err(CollectionError::DuplicateId(task.id));
            }
            map.insert(task.id.clone(), task);
        }
        let collection = TaskCollection { tasks: map };
        let active = collection.active_ids();
        if active.len() > 1 {
            return Err(CollectionError::MultipleActive(active));
        }
        Ok(collection)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub(crate) fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Task> {
        self.tasks.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// IDs of every task currently in `now`. More than one is corruption.
    pub fn active_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|t| t.status == TaskStatus::Now)
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.iter().filter(|t| t.status == status).count()
    }
}
