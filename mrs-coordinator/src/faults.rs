use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which fault injections are switched on for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultSwitches {
    pub mapper: bool,
    pub reducer: bool,
    pub shuffler: bool,
    pub coordinator: bool,
}

/// The concrete faults a coordinator is built with.
///
/// At most one mapper and one reducer fail, and each only once: the
/// replacement built after the failure never carries the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultPlan {
    /// Id of the mapper that fails on its first execution.
    pub mapper: Option<usize>,

    /// Id of the reducer that fails on its first execution.
    pub reducer: Option<usize>,

    /// The shuffle stage fails. Fatal.
    pub shuffler: bool,

    /// The coordinator fails before doing any work. Fatal.
    pub coordinator: bool,
}

impl FaultPlan {
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolve switches into a plan, drawing the failing worker ids from `rng`.
    pub fn from_switches<R: Rng>(
        switches: FaultSwitches,
        num_mappers: usize,
        num_reducers: usize,
        rng: &mut R,
    ) -> Self {
        let pick = |enabled: bool, size: usize, rng: &mut R| {
            (enabled && size > 0).then(|| rng.gen_range(0..size))
        };

        let plan = Self {
            mapper: pick(switches.mapper, num_mappers, rng),
            reducer: pick(switches.reducer, num_reducers, rng),
            shuffler: switches.shuffler,
            coordinator: switches.coordinator,
        };
        info!("Fault plan: {plan:?}");
        plan
    }
}
