use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::io::config_io::{self, ConfigError};
use crate::io::lock::FileLock;
use crate::io::task_file::{self, StoreError};
use crate::model::collection::TaskCollection;
use crate::model::config::{Config, ReviewConfig};
use crate::model::dashboard::DashboardView;
use crate::model::task::{Task, TaskSource, TaskStatus};
use crate::ops::capture::parse_capture;
use crate::ops::projection::{ProjectionError, project_dashboard};
use crate::ops::review::review_due_in_days;
use crate::ops::transition::{
    self, NewTask, SwitchPolicy, TransitionError, TransitionOutcome, TransitionRequest,
};
use crate::sync::commands::{CommandError, CommandResult, TaskCommands};

/// Error type for the local store
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<LocalStoreError> for CommandError {
    fn from(err: LocalStoreError) -> Self {
        CommandError::Rejected(err.to_string())
    }
}

impl From<crate::io::lock::LockError> for LocalStoreError {
    fn from(err: crate::io::lock::LockError) -> Self {
        LocalStoreError::Store(err.into())
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

enum Backing {
    Memory {
        tasks: Mutex<TaskCollection>,
        review: Mutex<ReviewConfig>,
    },
    Dir(PathBuf),
}

/// The authoritative task store: owns the collection, runs every mutation
/// through the transition rules, and serves the command interface.
///
/// Either held in memory or persisted as `tasks.json` in a data directory.
/// Directory-backed stores reload the file under the lock for every write,
/// so several processes can share one directory.
pub struct LocalTaskStore {
    backing: Backing,
    policy: SwitchPolicy,
    clock: Clock,
}

impl LocalTaskStore {
    /// An empty store that lives only as long as this value.
    pub fn in_memory(config: &Config) -> Self {
        Self::from_collection(TaskCollection::new(), config)
    }

    pub fn from_collection(tasks: TaskCollection, config: &Config) -> Self {
        LocalTaskStore {
            backing: Backing::Memory {
                tasks: Mutex::new(tasks),
                review: Mutex::new(config.review.clone()),
            },
            policy: config.store.on_switch.into(),
            clock: Box::new(Utc::now),
        }
    }

    /// Open the store in `data_dir`, creating the directory if needed.
    /// The existing task file is validated before anything else happens.
    pub fn open(data_dir: &Path) -> Result<Self, LocalStoreError> {
        fs::create_dir_all(data_dir).map_err(|source| LocalStoreError::CreateDir {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let config = config_io::read_config(data_dir)?;
        task_file::load_collection(data_dir)?;
        Ok(LocalTaskStore {
            backing: Backing::Dir(data_dir.to_path_buf()),
            policy: config.store.on_switch.into(),
            clock: Box::new(Utc::now),
        })
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_policy(mut self, policy: SwitchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn data_dir(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Dir(dir) => Some(dir),
            Backing::Memory { .. } => None,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// A copy of the full collection, done and someday tasks included.
    pub fn tasks(&self) -> Result<TaskCollection, LocalStoreError> {
        match &self.backing {
            Backing::Memory { tasks, .. } => Ok(lock(tasks).clone()),
            Backing::Dir(dir) => Ok(task_file::load_collection(dir)?),
        }
    }

    fn review_config(&self) -> Result<ReviewConfig, LocalStoreError> {
        match &self.backing {
            Backing::Memory { review, .. } => Ok(lock(review).clone()),
            Backing::Dir(dir) => Ok(config_io::read_config(dir)?.review),
        }
    }

    pub fn dashboard(&self) -> Result<DashboardView, LocalStoreError> {
        let tasks = self.tasks()?;
        let review = self.review_config()?;
        let due = review_due_in_days(
            review.last_review_at,
            review.frequency_days,
            self.now().timestamp(),
        );
        Ok(project_dashboard(tasks.iter(), due)?)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Run `f` against the collection and persist the result. Nothing is
    /// written if `f` fails.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut TaskCollection, i64) -> Result<T, TransitionError>,
    ) -> Result<T, LocalStoreError> {
        let now = self.now().timestamp();
        match &self.backing {
            Backing::Memory { tasks, .. } => Ok(f(&mut *lock(tasks), now)?),
            Backing::Dir(dir) => {
                let _lock = FileLock::acquire_default(dir)?;
                let mut tasks = task_file::load_collection(dir)?;
                let out = f(&mut tasks, now)?;
                task_file::save_collection(dir, &tasks)?;
                Ok(out)
            }
        }
    }

    /// Parse capture text and create a `next` task from it.
    pub fn capture(&self, input: &str) -> Result<Task, LocalStoreError> {
        let parsed = parse_capture(input, self.now());
        let new = NewTask {
            title: parsed.title,
            context: parsed.context,
            scheduled_for: parsed.scheduled_for,
            original_input: Some(input.to_string()),
            source: TaskSource::QuickCapture,
            tags: parsed.tags,
        };
        let id = Uuid::new_v4().to_string();
        self.mutate(|tasks, now| transition::create_task(tasks, id, new, now).cloned())
    }

    pub fn set_status(
        &self,
        id: &str,
        status: TaskStatus,
        expected_version: Option<u64>,
    ) -> Result<TransitionOutcome, LocalStoreError> {
        let mut request = TransitionRequest::new(id, status).with_policy(self.policy);
        request.expected_version = expected_version;
        self.mutate(|tasks, now| transition::apply_status(tasks, &request, now))
    }

    pub fn rename(
        &self,
        id: &str,
        title: &str,
        expected_version: Option<u64>,
    ) -> Result<Task, LocalStoreError> {
        self.mutate(|tasks, now| {
            transition::rename_task(tasks, id, title, expected_version, now).cloned()
        })
    }

    pub fn delete(&self, id: &str) -> Result<Task, LocalStoreError> {
        self.mutate(|tasks, _| transition::delete_task(tasks, id))
    }

    /// Record that the periodic review happened now.
    pub fn record_review(&self) -> Result<(), LocalStoreError> {
        let now = self.now().timestamp();
        match &self.backing {
            Backing::Memory { review, .. } => lock(review).last_review_at = Some(now),
            Backing::Dir(dir) => config_io::record_review(dir, now)?,
        }
        debug!(at = now, "review recorded");
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reject(command: &str, err: LocalStoreError) -> CommandError {
    warn!(command, error = %err, "command rejected");
    err.into()
}

#[async_trait]
impl TaskCommands for LocalTaskStore {
    async fn get_dashboard_data(&self) -> CommandResult<DashboardView> {
        self.dashboard().map_err(|e| reject("get_dashboard_data", e))
    }

    async fn quick_capture(&self, title: &str) -> CommandResult<()> {
        self.capture(title)
            .map(|_| ())
            .map_err(|e| reject("quick_capture", e))
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> CommandResult<()> {
        self.set_status(id, status, None)
            .map(|_| ())
            .map_err(|e| reject("update_task_status", e))
    }

    async fn delete_task(&self, id: &str) -> CommandResult<()> {
        self.delete(id)
            .map(|_| ())
            .map_err(|e| reject("delete_task", e))
    }

    async fn rename_task(&self, id: &str, title: &str) -> CommandResult<()> {
        self.rename(id, title, None)
            .map(|_| ())
            .map_err(|e| reject("rename_task", e))
    }

    async fn complete_review(&self) -> CommandResult<()> {
        self.record_review().map_err(|e| reject("complete_review", e))
    }
}
