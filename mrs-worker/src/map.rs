use std::sync::Arc;

use anyhow::{Context, Error};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use common::store::Store;
use common::{CombinedRecord, MapFn, NodeKind};

use crate::combine::Combiner;
use crate::core::Task;

/// The materialized contents of one input unit.
#[derive(Debug, Clone)]
pub struct MapInput {
    pub name: String,
    pub contents: Bytes,
}

impl MapInput {
    pub fn new(name: impl Into<String>, contents: Bytes) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }
}

/// Runs the map function over a mapper's partition, persists the raw pairs,
/// then combines them.
pub struct MapTask {
    map_fn: MapFn,
    store: Arc<dyn Store>,
}

impl MapTask {
    pub fn new(map_fn: MapFn, store: Arc<dyn Store>) -> Self {
        Self { map_fn, store }
    }
}

#[async_trait]
impl Task for MapTask {
    type Input = Vec<MapInput>;
    type Output = CombinedRecord;
    const KIND: NodeKind = NodeKind::Mapper;

    async fn run(&self, id: usize, input: Vec<MapInput>) -> Result<CombinedRecord, Error> {
        let units = input.len();
        let map_fn = self.map_fn;

        let mut emitted = Vec::new();
        for unit in input {
            let pairs = map_fn(&unit.name, unit.contents)
                .with_context(|| format!("map failed on `{}`", unit.name))?;
            emitted.extend(pairs);
        }

        self.store.persist_emitted(&emitted, id).await?;
        let combined = Combiner.execute(&emitted, id)?;

        info!(
            "Mapper {id} mapped {units} units into {} pairs, {} keys after combining",
            emitted.len(),
            combined.len()
        );
        Ok(combined)
    }
}
