//! Business-logic units that can be plugged into the pipeline by name.

use common::Workload;

pub mod vertex_degree;
pub mod wc;

/// Look up a workload by the name used on the command line.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "wc" => Some(Workload {
            map_fn: wc::map,
            reduce_fn: wc::reduce,
        }),
        "vertex_degree" => Some(Workload {
            map_fn: vertex_degree::map,
            reduce_fn: vertex_degree::reduce,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_workloads() {
        assert!(try_named("wc").is_some());
        assert!(try_named("vertex_degree").is_some());
        assert!(try_named("grep").is_none());
    }
}
