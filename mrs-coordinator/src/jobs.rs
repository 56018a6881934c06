use std::fmt;

use tracing::info;

use common::KeyValue;

/// State of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Job not started.
    Pending,

    /// Mapping phase.
    Mapping,

    /// Merging and repartitioning mapper output.
    Shuffling,

    /// Reducing phase.
    Reducing,

    /// Job completed.
    Completed,

    /// Job aborted by a fatal error.
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A job context.
#[derive(Debug, Clone)]
pub struct Job {
    /// The current state of the job.
    state: JobState,

    /// Where the input came from, as passed to the store.
    source: String,

    /// Mapper ids rebuilt during the map wave.
    map_rebuilds: Vec<usize>,

    /// Reducer ids rebuilt during the reduce wave.
    reduce_rebuilds: Vec<usize>,
}

impl Job {
    pub fn new() -> Self {
        Self {
            state: JobState::Pending,
            source: String::new(),
            map_rebuilds: vec![],
            reduce_rebuilds: vec![],
        }
    }

    /// Get the state of the job.
    pub fn get_state(&self) -> JobState {
        self.state
    }

    pub fn get_source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    /// Move the job to `state`.
    pub fn set_state(&mut self, state: JobState) {
        info!("Job `{}`: {} -> {}", self.source, self.state, state);
        self.state = state;
    }

    pub fn set_map_rebuilds(&mut self, rebuilt: &[usize]) {
        self.map_rebuilds = rebuilt.to_vec();
    }

    pub fn set_reduce_rebuilds(&mut self, rebuilt: &[usize]) {
        self.reduce_rebuilds = rebuilt.to_vec();
    }

    /// Finish the job with its final result.
    pub fn complete(&mut self, result: Vec<KeyValue>) -> JobReport {
        self.set_state(JobState::Completed);
        JobReport {
            result,
            map_rebuilds: self.map_rebuilds.clone(),
            reduce_rebuilds: self.reduce_rebuilds.clone(),
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// What a successful run hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Every key with its total, sorted by total descending.
    pub result: Vec<KeyValue>,

    /// Mapper ids rebuilt after failures, in rebuild order.
    pub map_rebuilds: Vec<usize>,

    /// Reducer ids rebuilt after failures, in rebuild order.
    pub reduce_rebuilds: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_carries_rebuilds() {
        let mut job = Job::new();
        job.set_source("input.txt");
        job.set_state(JobState::Mapping);
        job.set_map_rebuilds(&[2]);

        let report = job.complete(vec![KeyValue::new("a", 1)]);
        assert_eq!(job.get_state(), JobState::Completed);
        assert_eq!(report.map_rebuilds, vec![2]);
        assert!(report.reduce_rebuilds.is_empty());
    }
}
