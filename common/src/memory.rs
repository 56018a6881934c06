//! A [`Store`] that keeps everything in memory.
//!
//! Every slot is indexed by worker or bucket, so concurrent writers from one
//! wave never contend on the same entry.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Error};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::store::Store;
use crate::utils::{chunk_lines, string_from_bytes};
use crate::{CombinedRecord, InputUnit, KeyValue, ReducedRecord, ShuffleGroup, ShuffleHandle};

#[derive(Debug, Default)]
pub struct MemoryStore {
    lines_per_split: usize,
    calls: AtomicUsize,
    sources: DashMap<String, Bytes>,
    splits: DashMap<String, Bytes>,
    emitted: DashMap<usize, Vec<KeyValue>>,
    combined: DashMap<usize, CombinedRecord>,
    shuffle: DashMap<String, ShuffleGroup>,
    reduced: DashMap<usize, ReducedRecord>,
    result: Mutex<Option<Vec<KeyValue>>>,
}

impl MemoryStore {
    pub fn new(lines_per_split: usize) -> Self {
        Self {
            lines_per_split: lines_per_split.max(1),
            ..Default::default()
        }
    }

    /// Register a named source that [`Store::split_input`] can later split.
    pub fn insert_source(&self, name: impl Into<String>, contents: impl Into<Bytes>) {
        self.sources.insert(name.into(), contents.into());
    }

    /// Number of [`Store`] calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn emitted(&self, worker: usize) -> Option<Vec<KeyValue>> {
        self.emitted.get(&worker).map(|e| e.value().clone())
    }

    pub fn mapper_output(&self, worker: usize) -> Option<CombinedRecord> {
        self.combined.get(&worker).map(|e| e.value().clone())
    }

    pub fn shuffle_bucket(&self, handle: &ShuffleHandle) -> Option<ShuffleGroup> {
        self.shuffle.get(handle.as_str()).map(|e| e.value().clone())
    }

    pub fn reducer_output(&self, worker: usize) -> Option<ReducedRecord> {
        self.reduced.get(&worker).map(|e| e.value().clone())
    }

    pub fn reducer_outputs(&self) -> usize {
        self.reduced.len()
    }

    pub async fn final_result(&self) -> Option<Vec<KeyValue>> {
        self.result.lock().await.clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn split_input(&self, source: &str) -> Result<Vec<InputUnit>, Error> {
        self.record_call();
        let contents = self
            .sources
            .get(source)
            .map(|e| e.value().clone())
            .ok_or_else(|| anyhow!("unknown source `{source}`"))?;
        let text = string_from_bytes(contents)?;

        let units = chunk_lines(&text, self.lines_per_split)
            .into_iter()
            .enumerate()
            .map(|(n, chunk)| {
                let name = format!("{source}#split-{}", n + 1);
                self.splits.insert(name.clone(), Bytes::from(chunk));
                InputUnit::new(name)
            })
            .collect::<Vec<_>>();

        debug!("Split source `{source}` into {} units", units.len());
        Ok(units)
    }

    async fn materialize(&self, unit: &InputUnit) -> Result<Bytes, Error> {
        self.record_call();
        self.splits
            .get(unit.as_str())
            .map(|e| e.value().clone())
            .ok_or_else(|| anyhow!("unknown input unit `{unit}`"))
    }

    async fn persist_emitted(&self, pairs: &[KeyValue], worker: usize) -> Result<(), Error> {
        self.record_call();
        self.emitted.insert(worker, pairs.to_vec());
        Ok(())
    }

    async fn persist_mapper_output(&self, record: &CombinedRecord, worker: usize) -> Result<(), Error> {
        self.record_call();
        self.combined.insert(worker, record.clone());
        Ok(())
    }

    async fn retrieve_mapper_outputs(&self, num_mappers: usize) -> Result<Vec<CombinedRecord>, Error> {
        self.record_call();
        (0..num_mappers)
            .map(|worker| {
                self.combined
                    .get(&worker)
                    .map(|e| e.value().clone())
                    .ok_or_else(|| anyhow!("no output persisted for mapper {worker}"))
            })
            .collect()
    }

    async fn persist_shuffle_bucket(&self, group: &ShuffleGroup, bucket: usize) -> Result<ShuffleHandle, Error> {
        self.record_call();
        let handle = ShuffleHandle::new(format!("shuffle-partition-{bucket}"));
        self.shuffle.insert(handle.as_str().to_string(), group.clone());
        Ok(handle)
    }

    async fn materialize_shuffle_bucket(&self, handle: &ShuffleHandle) -> Result<ShuffleGroup, Error> {
        self.record_call();
        self.shuffle_bucket(handle)
            .ok_or_else(|| anyhow!("unknown shuffle bucket `{handle}`"))
    }

    async fn persist_reducer_output(&self, record: &ReducedRecord, worker: usize) -> Result<(), Error> {
        self.record_call();
        self.reduced.insert(worker, record.clone());
        Ok(())
    }

    async fn persist_final_result(&self, result: &[KeyValue]) -> Result<(), Error> {
        self.record_call();
        *self.result.lock().await = Some(result.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_split_and_materialize() {
        let store = MemoryStore::new(1);
        store.insert_source("doc", "one\ntwo");

        let units = store.split_input("doc").await.unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(store.materialize(&units[1]).await.unwrap(), Bytes::from("two"));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_source_fails() {
        let store = MemoryStore::new(1);
        assert!(store.split_input("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_mapper_output_fails_retrieval() {
        let store = MemoryStore::new(1);
        store
            .persist_mapper_output(&CombinedRecord::from([("a".to_string(), 1)]), 0)
            .await
            .unwrap();

        assert_eq!(store.retrieve_mapper_outputs(1).await.unwrap().len(), 1);
        assert!(store.retrieve_mapper_outputs(2).await.is_err());
    }
}
