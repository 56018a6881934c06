use std::sync::Arc;

use anyhow::{Context, Error};
use async_trait::async_trait;
use tracing::info;

use common::store::Store;
use common::{NodeKind, ReduceFn, ReducedRecord, ShuffleHandle};

use crate::core::Task;

/// Reads a reducer partition back from the store, folds each key's values
/// and persists the result.
pub struct ReduceTask {
    reduce_fn: ReduceFn,
    store: Arc<dyn Store>,
}

impl ReduceTask {
    pub fn new(reduce_fn: ReduceFn, store: Arc<dyn Store>) -> Self {
        Self { reduce_fn, store }
    }
}

#[async_trait]
impl Task for ReduceTask {
    type Input = ShuffleHandle;
    type Output = ReducedRecord;
    const KIND: NodeKind = NodeKind::Reducer;

    async fn run(&self, id: usize, handle: ShuffleHandle) -> Result<ReducedRecord, Error> {
        let group = self.store.materialize_shuffle_bucket(&handle).await?;
        let reduce_fn = self.reduce_fn;

        let mut reduced = ReducedRecord::new();
        for (key, values) in &group {
            let total = reduce_fn(key, values).with_context(|| format!("reduce failed on key `{key}`"))?;
            reduced.insert(key.clone(), total);
        }

        self.store.persist_reducer_output(&reduced, id).await?;
        info!("Reducer {id} reduced {} keys from {handle}", reduced.len());
        Ok(reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::memory::MemoryStore;
    use common::ShuffleGroup;

    #[tokio::test]
    async fn test_reduce_sums_each_group() {
        let store = Arc::new(MemoryStore::new(10));
        let group = ShuffleGroup::from([("cat".to_string(), vec![1, 1]), ("the".to_string(), vec![2, 1])]);
        let handle = store.persist_shuffle_bucket(&group, 0).await.unwrap();

        let task = ReduceTask::new(workload::wc::reduce, store.clone());
        let reduced = task.run(0, handle).await.unwrap();

        assert_eq!(reduced, ReducedRecord::from([("cat".to_string(), 2), ("the".to_string(), 3)]));
        assert_eq!(store.reducer_output(0), Some(reduced));
    }

    #[tokio::test]
    async fn test_unknown_handle_fails() {
        let store = Arc::new(MemoryStore::new(10));
        let task = ReduceTask::new(workload::wc::reduce, store.clone());

        assert!(task.run(0, ShuffleHandle::new("nowhere")).await.is_err());
        assert_eq!(store.reducer_outputs(), 0);
    }
}
