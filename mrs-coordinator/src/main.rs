mod args;

use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use args::Args;
use common::file::FileStore;
use mrs_coordinator::{Coordinator, FaultPlan};

/// How many of the top results get logged.
const TOP_RESULTS: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.job_config()?;
    let workload = workload::try_named(&config.workload)
        .ok_or_else(|| anyhow!("unknown workload `{}`", config.workload))?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let faults = FaultPlan::from_switches(
        args.fault_switches(),
        config.num_mappers,
        config.num_reducers,
        &mut rng,
    );

    let store = FileStore::new(&args.data_dir, config.lines_per_split);
    store.prepare().await?;
    let result_path = store.result_path();

    let mut coordinator = Coordinator::new(config, faults, Arc::new(store), workload);
    match coordinator.run(&args.input).await {
        Ok(report) => {
            info!(
                "Job complete: {} keys, mappers rebuilt {:?}, reducers rebuilt {:?}",
                report.result.len(),
                report.map_rebuilds,
                report.reduce_rebuilds
            );
            for kv in report.result.iter().take(TOP_RESULTS) {
                info!("{kv}");
            }
            info!("Full result written to {}", result_path.display());
            Ok(())
        }
        Err(err) => {
            let node = err.node();
            error!("{} (kind = {}, id = {})", err, node.kind, node.id);
            Err(err.into())
        }
    }
}
