use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use common::{JobError, JobResult, NodeError, NodeKind, WorkerStatus};

use crate::core::{Executor, Task};

/// The fixed set of workers for one phase.
///
/// Waves run under an all-or-nothing protocol. If any worker fails, every
/// result of the attempt is dropped, the failed slot is rebuilt and the whole
/// wave starts over.
pub struct WorkerPool<T: Task> {
    /// One executor per partition, indexed by worker id.
    workers: Vec<Executor<T>>,

    /// Rebuilds tolerated per wave. `None` retries forever.
    max_rebuilds: Option<usize>,

    /// Every id rebuilt so far, in rebuild order.
    rebuilt: Vec<usize>,
}

impl<T: Task> WorkerPool<T> {
    /// Create `size` workers sharing `task`. The worker at index `failing`,
    /// if any, is constructed with its failure flag set.
    pub fn new(task: Arc<T>, size: usize, failing: Option<usize>, max_rebuilds: Option<usize>) -> Self {
        let workers = (0..size)
            .map(|id| {
                if failing == Some(id) {
                    Executor::failing(id, Arc::clone(&task))
                } else {
                    Executor::new(id, Arc::clone(&task))
                }
            })
            .collect();

        info!("Set up {size} {} jobs", T::KIND);
        Self {
            workers,
            max_rebuilds,
            rebuilt: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn get_worker(&self, id: usize) -> Option<&Executor<T>> {
        self.workers.get(id)
    }

    pub fn statuses(&self) -> Vec<WorkerStatus> {
        self.workers.iter().map(Executor::status).collect()
    }

    /// Ids of every worker rebuilt after a failure.
    pub fn rebuilt(&self) -> &[usize] {
        &self.rebuilt
    }

    fn set_pool_state(&mut self, status: WorkerStatus) {
        self.workers
            .iter_mut()
            .for_each(|worker| worker.set_status(status));
    }

    /// Swap the failed slot for a fresh worker. Only that slot changes.
    fn rebuild_worker(&mut self, id: usize) {
        let replacement = self.workers[id].rebuild();
        self.workers[id] = replacement;
        self.rebuilt.push(id);
    }

    /// Run one wave: worker `i` executes `inputs[i]`, all concurrently.
    ///
    /// Results come back in worker order. When a worker fails, the lowest
    /// failing id is rebuilt and the wave restarts until it succeeds or the
    /// rebuild bound is exhausted.
    pub async fn run_wave(&mut self, inputs: Vec<T::Input>) -> JobResult<Vec<T::Output>> {
        if inputs.len() != self.workers.len() {
            return Err(NodeError::new(
                format!(
                    "{} wave has {} partitions for {} workers",
                    T::KIND,
                    inputs.len(),
                    self.workers.len()
                ),
                0,
                NodeKind::Coordinator,
            )
            .into());
        }

        let mut rebuilds = 0;
        let mut attempt = 1;
        loop {
            info!("{} wave attempt {attempt} with {} workers", T::KIND, self.workers.len());
            self.set_pool_state(WorkerStatus::InProgress);

            let results = join_all(
                self.workers
                    .iter()
                    .zip(inputs.iter().cloned())
                    .map(|(worker, input)| worker.execute(input)),
            )
            .await;

            let failure = results.iter().find_map(|result| result.as_ref().err()).cloned();
            let Some(failure) = failure else {
                self.set_pool_state(WorkerStatus::Complete);
                info!("{} wave complete after {attempt} attempt(s)", T::KIND);
                return Ok(results.into_iter().flatten().collect());
            };

            // The attempt is void as a whole, including siblings that finished.
            self.set_pool_state(WorkerStatus::Inactive);
            drop(results);

            if self.max_rebuilds.is_some_and(|max| rebuilds >= max) {
                error!("{} wave giving up after {rebuilds} rebuilds: {failure}", T::KIND);
                return Err(JobError::RetriesExhausted {
                    rebuilds,
                    last: failure,
                });
            }

            warn!("{} wave aborted by {failure}; rebuilding worker {}", T::KIND, failure.id);
            self.rebuild_worker(failure.id);
            rebuilds += 1;
            attempt += 1;
        }
    }
}
