/// The storage and input-splitting collaborator of the pipeline.
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::{CombinedRecord, InputUnit, KeyValue, ReducedRecord, ShuffleGroup, ShuffleHandle};

/// Everything the pipeline persists or reads back goes through a `Store`.
///
/// Each worker only writes to the location indexed by its own worker or
/// bucket index, so implementations need no cross-worker locking as long as
/// indices are unique within a wave.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Split the source into ordered input units.
    async fn split_input(&self, source: &str) -> Result<Vec<InputUnit>>;

    /// Read back the raw contents of one input unit.
    async fn materialize(&self, unit: &InputUnit) -> Result<Bytes>;

    /// Persist the raw pairs a mapper emitted, before combining.
    async fn persist_emitted(&self, pairs: &[KeyValue], worker: usize) -> Result<()>;

    /// Persist the combined output of one mapper.
    async fn persist_mapper_output(&self, record: &CombinedRecord, worker: usize) -> Result<()>;

    /// Read back the combined output of mappers `0..num_mappers`, in index order.
    async fn retrieve_mapper_outputs(&self, num_mappers: usize) -> Result<Vec<CombinedRecord>>;

    /// Persist one reducer partition and return the handle that addresses it.
    async fn persist_shuffle_bucket(&self, group: &ShuffleGroup, bucket: usize) -> Result<ShuffleHandle>;

    /// Read back a reducer partition.
    async fn materialize_shuffle_bucket(&self, handle: &ShuffleHandle) -> Result<ShuffleGroup>;

    /// Persist the output of one reducer.
    async fn persist_reducer_output(&self, record: &ReducedRecord, worker: usize) -> Result<()>;

    /// Persist the final, sorted result of the job.
    async fn persist_final_result(&self, result: &[KeyValue]) -> Result<()>;
}
