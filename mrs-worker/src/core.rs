use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use common::{NodeError, NodeKind, WorkerStatus};

/// A unit of business logic a worker can run.
///
/// Implementations are shared between a worker and its rebuilt
/// replacements, so they must not carry per-attempt state.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    type Input: Clone + Send + 'static;
    type Output: Send + 'static;

    /// The role reported in errors raised by workers running this task.
    const KIND: NodeKind;

    async fn run(&self, id: usize, input: Self::Input) -> anyhow::Result<Self::Output>;
}

/// A worker: wraps a [`Task`] behind a uniform execute/status contract.
pub struct Executor<T: Task> {
    id: usize,
    task: Arc<T>,
    fail: bool,
    status: WorkerStatus,
}

impl<T: Task> fmt::Debug for Executor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("id", &self.id)
            .field("kind", &T::KIND)
            .field("fail", &self.fail)
            .field("status", &self.status)
            .finish()
    }
}

impl<T: Task> Executor<T> {
    pub fn new(id: usize, task: Arc<T>) -> Self {
        debug!("{} Executor job with id = '{id}' CREATED", T::KIND);
        Self {
            id,
            task,
            fail: false,
            status: WorkerStatus::Inactive,
        }
    }

    /// A worker whose every execution fails without running its task.
    pub fn failing(id: usize, task: Arc<T>) -> Self {
        Self {
            fail: true,
            ..Self::new(id, task)
        }
    }

    /// The replacement for this worker after a failure: same id and task,
    /// failure flag cleared.
    pub fn rebuild(&self) -> Self {
        Self::new(self.id, Arc::clone(&self.task))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        T::KIND
    }

    pub fn will_fail(&self) -> bool {
        self.fail
    }

    pub fn status(&self) -> WorkerStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: WorkerStatus) {
        self.status = status;
    }

    /// Run the task on `input`.
    ///
    /// The task runs as its own tokio task. Errors and panics inside it come
    /// back as a [`NodeError`] tagged with this worker's id and kind.
    pub async fn execute(&self, input: T::Input) -> Result<T::Output, NodeError> {
        let (id, kind) = (self.id, T::KIND);

        if self.fail {
            warn!("{kind} Executor job with id = '{id}' FAILED (injected)");
            return Err(NodeError::injected(id, kind));
        }

        info!("{kind} Executor job with id = '{id}' START WORKING");
        let task = Arc::clone(&self.task);
        let handle = tokio::spawn(async move { task.run(id, input).await });

        match handle.await {
            Ok(Ok(output)) => {
                info!("{kind} Executor job with id = '{id}' COMPLETE");
                Ok(output)
            }
            Ok(Err(err)) => {
                warn!("{kind} Executor job with id = '{id}' FAILED: {err:#}");
                Err(NodeError::wrap(&err, id, kind))
            }
            Err(err) => {
                warn!("{kind} Executor job with id = '{id}' ABORTED: {err}");
                Err(NodeError::new(format!("task aborted: {err}"), id, kind))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Doubles its input and counts how often it actually ran.
    #[derive(Default)]
    pub(crate) struct Doubler {
        pub(crate) runs: AtomicUsize,
    }

    #[async_trait]
    impl Task for Doubler {
        type Input = u64;
        type Output = u64;
        const KIND: NodeKind = NodeKind::Mapper;

        async fn run(&self, _id: usize, input: u64) -> anyhow::Result<u64> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match input {
                13 => Err(anyhow!("unlucky input")),
                99 => panic!("boom"),
                n => Ok(n * 2),
            }
        }
    }

    #[tokio::test]
    async fn test_execute_runs_task() {
        let executor = Executor::new(4, Arc::new(Doubler::default()));
        assert_eq!(executor.status(), WorkerStatus::Inactive);
        assert_eq!(executor.execute(21).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_injected_failure_skips_task() {
        let task = Arc::new(Doubler::default());
        let executor = Executor::failing(2, Arc::clone(&task));

        let err = executor.execute(1).await.unwrap_err();
        assert_eq!(err, NodeError::injected(2, NodeKind::Mapper));
        assert_eq!(task.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_task_error_is_wrapped() {
        let executor = Executor::new(1, Arc::new(Doubler::default()));
        let err = executor.execute(13).await.unwrap_err();

        assert_eq!(err.id, 1);
        assert_eq!(err.kind, NodeKind::Mapper);
        assert_eq!(err.message, "unlucky input");
    }

    #[tokio::test]
    async fn test_task_panic_is_wrapped() {
        let executor = Executor::new(5, Arc::new(Doubler::default()));
        let err = executor.execute(99).await.unwrap_err();

        assert_eq!(err.id, 5);
        assert!(err.message.starts_with("task aborted"));
    }

    #[tokio::test]
    async fn test_rebuild_clears_failure_flag() {
        let task = Arc::new(Doubler::default());
        let failing = Executor::failing(3, Arc::clone(&task));
        let rebuilt = failing.rebuild();

        assert_eq!(rebuilt.id(), 3);
        assert!(!rebuilt.will_fail());
        assert_eq!(rebuilt.execute(5).await.unwrap(), 10);
        assert_eq!(task.runs.load(Ordering::SeqCst), 1);
    }
}
