//! Worker side of the simulator: the generic executor, the map and reduce
//! tasks it wraps, the combiner, and the pool that runs a phase's wave.

pub mod combine;
pub mod core;
pub mod map;
pub mod pool;
pub mod reduce;

pub use crate::core::{Executor, Task};
pub use combine::Combiner;
pub use map::{MapInput, MapTask};
pub use pool::WorkerPool;
pub use reduce::ReduceTask;
