//! Background load and persist tasks
//!
//! Every task runs on the tokio runtime, works only on values moved into it
//! and reports back by sending exactly one [`Action`]. Tasks are never
//! aborted: quitting stops the dispatcher from reading results, and the
//! process exit takes care of the rest.
//!
//! # Example
//!
//! ```ignore
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut scheduler = Scheduler::new(action_tx, config_store);
//! scheduler.add_source(Arc::new(DemoSource::new()));
//!
//! scheduler.load("demo");
//! // later: Action::BatchLoaded { source: "demo", .. } arrives on action_rx
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::action::Action;
use crate::error::LoadError;
use crate::filter::FilterState;
use crate::source::{ConfigStore, DataSource};

/// What a task is doing, for logging and inspection
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TaskKey {
    Load(String),
    Persist,
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKey::Load(source) => write!(f, "load:{source}"),
            TaskKey::Persist => f.write_str("persist"),
        }
    }
}

/// Spawns futures whose output is sent back as an action.
///
/// Several tasks may share a key; a new task never replaces a running one.
/// Dropping the manager detaches the tasks instead of aborting them.
pub struct TaskManager {
    tasks: Vec<(TaskKey, JoinHandle<()>)>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl TaskManager {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            tasks: Vec::new(),
            action_tx,
        }
    }

    /// Spawn a task. The action it resolves to is sent on completion.
    pub fn spawn<F>(&mut self, key: TaskKey, future: F) -> &mut Self
    where
        F: Future<Output = Action> + Send + 'static,
    {
        self.prune();

        tracing::debug!(task = %key, "spawning task");
        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            let action = future.await;
            // The receiver is gone once the loop has quit; the result is moot then.
            let _ = tx.send(action);
        });

        self.tasks.push((key, handle));
        self
    }

    /// Send an action without spawning, for results known up front
    pub fn resolve_now(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }

    /// Number of tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .iter()
            .any(|(k, handle)| k == key && !handle.is_finished())
    }

    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(key, _)| key)
    }

    fn prune(&mut self) {
        self.tasks.retain(|(_, handle)| !handle.is_finished());
    }
}

/// Turns load and persist requests into tasks against the collaborators.
pub struct Scheduler {
    tasks: TaskManager,
    sources: Vec<Arc<dyn DataSource>>,
    config: Arc<dyn ConfigStore>,
    /// Fires once the most recently requested persist has finished
    last_persist: Option<oneshot::Receiver<()>>,
}

impl Scheduler {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, config: Arc<dyn ConfigStore>) -> Self {
        Self {
            tasks: TaskManager::new(action_tx),
            sources: Vec::new(),
            config,
            last_persist: None,
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn DataSource>) {
        self.sources.push(source);
    }

    /// Names of the registered sources, in registration order
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.name())
    }

    /// Fetch everything from `source`. Resolves to `BatchLoaded` or `LoadFailed`.
    pub fn load(&mut self, source: &str) {
        let name = source.to_string();
        let Some(source) = self.sources.iter().find(|s| s.name() == name).cloned() else {
            tracing::warn!(source = %name, "load requested for unknown source");
            self.tasks.resolve_now(Action::LoadFailed {
                error: LoadError::UnknownSource(name.clone()),
                source: name,
            });
            return;
        };

        self.tasks.spawn(TaskKey::Load(name.clone()), async move {
            match source.fetch().await {
                Ok(items) => Action::BatchLoaded { source: name, items },
                Err(error) => Action::LoadFailed {
                    source: name,
                    error,
                },
            }
        });
    }

    /// Save a snapshot of the filter. Resolves to `PersistSucceeded` or `PersistFailed`.
    ///
    /// Saves run one at a time in request order, so the newest snapshot is
    /// the one left in the store.
    pub fn persist(&mut self, filter: FilterState) {
        let config = Arc::clone(&self.config);
        let previous = self.last_persist.take();
        let (done_tx, done_rx) = oneshot::channel();
        self.last_persist = Some(done_rx);

        self.tasks.spawn(TaskKey::Persist, async move {
            if let Some(previous) = previous {
                // a dropped sender means the earlier save is gone either way
                let _ = previous.await;
            }
            let result = config.save(filter).await;
            let _ = done_tx.send(());
            match result {
                Ok(()) => Action::PersistSucceeded,
                Err(error) => Action::PersistFailed(error),
            }
        });
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }
}
