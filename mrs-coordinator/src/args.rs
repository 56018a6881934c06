use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use mrs_coordinator::{FaultSwitches, JobConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Glob of the input files.
    pub input: String,

    /// Directory holding every intermediate file and the result.
    #[arg(short, long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// JSON job config. Flags below override its fields.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of mapper workers.
    #[arg(short, long, env = "MRS_MAPPERS")]
    pub mappers: Option<usize>,

    /// Number of reducer workers.
    #[arg(short, long, env = "MRS_REDUCERS")]
    pub reducers: Option<usize>,

    /// Lines per input chunk.
    #[arg(short, long)]
    pub lines_per_split: Option<usize>,

    /// Workload to run: `wc` or `vertex_degree`.
    #[arg(short, long)]
    pub workload: Option<String>,

    /// Rebuilds tolerated per wave. 0 retries forever.
    #[arg(long)]
    pub max_rebuilds: Option<usize>,

    /// Seed for picking the failing workers.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fail one randomly chosen mapper on its first run.
    #[arg(long)]
    pub fail_mapper: bool,

    /// Fail one randomly chosen reducer on its first run.
    #[arg(long)]
    pub fail_reducer: bool,

    /// Fail the coordinator before any work is done.
    #[arg(long)]
    pub fail_coordinator: bool,

    /// Fail the shuffle stage.
    #[arg(long)]
    pub fail_shuffler: bool,
}

impl Args {
    /// The config file, if any, with command line values layered on top.
    pub fn job_config(&self) -> Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => JobConfig::load(path)?,
            None => JobConfig::default(),
        };

        if let Some(n) = self.mappers {
            config.num_mappers = n;
        }
        if let Some(n) = self.reducers {
            config.num_reducers = n;
        }
        if let Some(n) = self.lines_per_split {
            config.lines_per_split = n;
        }
        if let Some(name) = &self.workload {
            config.workload = name.clone();
        }
        if let Some(n) = self.max_rebuilds {
            config.max_rebuilds = (n > 0).then_some(n);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn fault_switches(&self) -> FaultSwitches {
        FaultSwitches {
            mapper: self.fail_mapper,
            reducer: self.fail_reducer,
            shuffler: self.fail_shuffler,
            coordinator: self.fail_coordinator,
        }
    }
}
