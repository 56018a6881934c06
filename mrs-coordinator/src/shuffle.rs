use std::sync::Arc;

use itertools::Itertools;
use tracing::{info, warn};

use common::store::Store;
use common::{CombinedRecord, NodeError, NodeKind, ShuffleGroup};

/// Merges every mapper's combined output into one group per key.
///
/// Nothing retries this stage; any failure here ends the job.
pub struct Shuffler {
    store: Arc<dyn Store>,
    num_mappers: usize,
    fail: bool,
}

impl Shuffler {
    pub fn new(store: Arc<dyn Store>, num_mappers: usize, fail: bool) -> Self {
        Self {
            store,
            num_mappers,
            fail,
        }
    }

    pub async fn execute(&self) -> Result<ShuffleGroup, NodeError> {
        if self.fail {
            warn!("Shuffler FAILED (injected)");
            return Err(NodeError::injected(0, NodeKind::Shuffler));
        }

        let records = self
            .store
            .retrieve_mapper_outputs(self.num_mappers)
            .await
            .map_err(|e| NodeError::wrap(&e, 0, NodeKind::Shuffler))?;

        let group = group_by_key(records);
        info!("Shuffled output of {} mappers into {} keys", self.num_mappers, group.len());
        Ok(group)
    }
}

/// Flatten the records, sort by key, and collect each run of equal keys into
/// one value list.
///
/// The sort is stable and only looks at the key, so a key's values stay in
/// mapper-index order.
pub fn group_by_key(records: Vec<CombinedRecord>) -> ShuffleGroup {
    let mut pairs = records.into_iter().flatten().collect::<Vec<_>>();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let group: ShuffleGroup = pairs
        .into_iter()
        .chunk_by(|(key, _)| key.clone())
        .into_iter()
        .map(|(key, run)| (key, run.map(|(_, value)| value).collect()))
        .collect();
    group
}
