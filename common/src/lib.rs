//! Shared types for the in-process MapReduce simulator.
//!
//! A job is split across a fixed pool of mapper and reducer workers that run
//! inside a single process. Everything that crosses a phase boundary goes
//! through a [`store::Store`], so the orchestration never touches files or
//! memory buffers directly.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub mod codec;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod utils;

pub use error::{JobError, JobResult, NodeError, NodeKind};

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function takes the name of one input unit and its raw contents.
///
/// It returns every pair emitted for that unit, in emission order.
pub type MapFn = fn(name: &str, contents: Bytes) -> anyhow::Result<Vec<KeyValue>>;

/// A reduce function takes in a key and every value grouped under it by the
/// shuffle, and folds them into a single value.
pub type ReduceFn = fn(key: &str, values: &[u64]) -> anyhow::Result<u64>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/// Output of one mapper worker after its combiner pass.
pub type CombinedRecord = BTreeMap<String, u64>;

/// Every value emitted for a key, across all mappers, in merge order.
///
/// Iteration is in ascending key order, which the reducer partitioning
/// relies on.
pub type ShuffleGroup = BTreeMap<String, Vec<u64>>;

/// Output of one reducer worker.
pub type ReducedRecord = BTreeMap<String, u64>;

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct KeyValue {
    /// The key.
    pub key: String,

    /// The value.
    pub value: u64,
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.value)
    }
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: u64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Get the key of this key-value pair.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value of this key-value pair.
    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Consumes the key-value pair and returns the key.
    #[inline]
    pub fn into_key(self) -> String {
        self.key
    }
}

impl From<(String, u64)> for KeyValue {
    fn from((key, value): (String, u64)) -> Self {
        Self { key, value }
    }
}

/////////////////////////////////////////////////////////////////////////////
// Handles
/////////////////////////////////////////////////////////////////////////////

/// Opaque reference to one chunk of raw input.
///
/// Only the [`store::Store`] that produced it knows how to read it back.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InputUnit(String);

impl InputUnit {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a persisted shuffle bucket. This is what a reducer
/// is handed as its partition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ShuffleHandle(String);

impl ShuffleHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShuffleHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/////////////////////////////////////////////////////////////////////////////
// Worker status
/////////////////////////////////////////////////////////////////////////////

/// Lifecycle of a worker within a wave.
///
/// Only `Inactive -> InProgress -> {Complete, Inactive}` is legal. A worker
/// that goes back to `Inactive` after `InProgress` belonged to an aborted
/// wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerStatus {
    #[default]
    Inactive,
    InProgress,
    Complete,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerStatus::Inactive => "inactive",
            WorkerStatus::InProgress => "inProgress",
            WorkerStatus::Complete => "complete",
        };
        f.write_str(s)
    }
}
