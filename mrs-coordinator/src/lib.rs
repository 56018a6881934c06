//! Coordinator side of the simulator: the pipeline driver, partitioning, the
//! shuffle stage, fault planning and job configuration.

pub mod config;
pub mod core;
pub mod faults;
pub mod jobs;
pub mod partition;
pub mod shuffle;

pub use crate::core::Coordinator;
pub use config::JobConfig;
pub use faults::{FaultPlan, FaultSwitches};
pub use jobs::{Job, JobReport, JobState};
