use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{error, info};

use common::store::Store;
use common::{
    JobError, JobResult, KeyValue, NodeError, NodeKind, ReducedRecord, ShuffleHandle, WorkerStatus,
    Workload,
};
use mrs_worker::{MapInput, MapTask, ReduceTask, WorkerPool};

use crate::config::JobConfig;
use crate::faults::FaultPlan;
use crate::jobs::{Job, JobReport, JobState};
use crate::partition::{distribute, round_robin};
use crate::shuffle::Shuffler;

/// Store failures inside coordinator-owned steps are coordinator failures.
fn coordinator_err(err: anyhow::Error) -> NodeError {
    NodeError::wrap(&err, 0, NodeKind::Coordinator)
}

/// Drives one job through split, map, shuffle, reduce and final aggregation.
pub struct Coordinator {
    config: JobConfig,
    faults: FaultPlan,
    store: Arc<dyn Store>,
    mappers: WorkerPool<MapTask>,
    reducers: WorkerPool<ReduceTask>,
    job: Job,
}

impl Coordinator {
    pub fn new(config: JobConfig, faults: FaultPlan, store: Arc<dyn Store>, workload: Workload) -> Self {
        let mappers = WorkerPool::new(
            Arc::new(MapTask::new(workload.map_fn, Arc::clone(&store))),
            config.num_mappers,
            faults.mapper,
            config.max_rebuilds,
        );
        let reducers = WorkerPool::new(
            Arc::new(ReduceTask::new(workload.reduce_fn, Arc::clone(&store))),
            config.num_reducers,
            faults.reducer,
            config.max_rebuilds,
        );

        Self {
            config,
            faults,
            store,
            mappers,
            reducers,
            job: Job::new(),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn mapper_statuses(&self) -> Vec<WorkerStatus> {
        self.mappers.statuses()
    }

    pub fn reducer_statuses(&self) -> Vec<WorkerStatus> {
        self.reducers.statuses()
    }

    /// Run the whole job over `source` and return the sorted result.
    pub async fn run(&mut self, source: &str) -> JobResult<JobReport> {
        self.job.set_source(source);

        match self.run_phases().await {
            Ok(result) => {
                self.job.set_map_rebuilds(self.mappers.rebuilt());
                self.job.set_reduce_rebuilds(self.reducers.rebuilt());
                Ok(self.job.complete(result))
            }
            Err(err) => {
                let node = err.node();
                error!("Job `{source}` failed in {} {}: {err}", node.kind, node.id);
                self.job.set_state(JobState::Failed);
                Err(err)
            }
        }
    }

    async fn run_phases(&mut self) -> JobResult<Vec<KeyValue>> {
        if self.faults.coordinator {
            return Err(NodeError::injected(0, NodeKind::Coordinator).into());
        }

        self.job.set_state(JobState::Mapping);
        let inputs = self.map_inputs().await?;
        let combined = self.mappers.run_wave(inputs).await?;
        for (worker, record) in combined.iter().enumerate() {
            self.store
                .persist_mapper_output(record, worker)
                .await
                .map_err(coordinator_err)?;
        }

        self.job.set_state(JobState::Shuffling);
        let shuffler = Shuffler::new(
            Arc::clone(&self.store),
            self.config.num_mappers,
            self.faults.shuffler,
        );
        let group = shuffler.execute().await?;

        let mut handles: Vec<ShuffleHandle> = Vec::with_capacity(self.config.num_reducers);
        for (bucket, part) in distribute(group, self.config.num_reducers).iter().enumerate() {
            let handle = self
                .store
                .persist_shuffle_bucket(part, bucket)
                .await
                .map_err(coordinator_err)?;
            handles.push(handle);
        }

        self.job.set_state(JobState::Reducing);
        let reduced = self.reducers.run_wave(handles).await?;

        let result = aggregate(reduced);
        self.store
            .persist_final_result(&result)
            .await
            .map_err(coordinator_err)?;
        info!("Job `{}` produced {} keys", self.job.get_source(), result.len());
        Ok(result)
    }

    /// Split the source, deal the units to mappers and read every unit's
    /// contents.
    async fn map_inputs(&self) -> Result<Vec<Vec<MapInput>>, JobError> {
        let units = self
            .store
            .split_input(self.job.get_source())
            .await
            .map_err(coordinator_err)?;
        info!("Split `{}` into {} units", self.job.get_source(), units.len());

        let mut inputs = Vec::with_capacity(self.config.num_mappers);
        for bucket in round_robin(units, self.config.num_mappers) {
            let contents = try_join_all(bucket.iter().map(|unit| self.store.materialize(unit)))
                .await
                .map_err(coordinator_err)?;
            inputs.push(
                bucket
                    .iter()
                    .zip(contents)
                    .map(|(unit, contents)| MapInput::new(unit.as_str(), contents))
                    .collect(),
            );
        }
        Ok(inputs)
    }
}

/// Merge the reducer outputs and order them by value, largest first.
/// Equal values come out in no particular order.
pub fn aggregate(reduced: Vec<ReducedRecord>) -> Vec<KeyValue> {
    let merged: BTreeMap<String, u64> = reduced.into_iter().flatten().collect();
    let mut result = merged.into_iter().map(KeyValue::from).collect::<Vec<_>>();
    result.sort_unstable_by(|a, b| b.value().cmp(&a.value()));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_sorts_descending() {
        let reduced = vec![
            ReducedRecord::from([("cat".to_string(), 2), ("on".to_string(), 1)]),
            ReducedRecord::from([("the".to_string(), 3), ("mat".to_string(), 1)]),
        ];

        let result = aggregate(reduced);
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], KeyValue::new("the", 3));
        assert_eq!(result[1], KeyValue::new("cat", 2));
        assert!(result.windows(2).all(|w| w[0].value() >= w[1].value()));
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(vec![ReducedRecord::new(), ReducedRecord::new()]).is_empty());
    }
}
