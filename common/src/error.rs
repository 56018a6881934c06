//! Failure types shared by every node of the pipeline.

use std::fmt;

/// The role of the node an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Coordinator,
    Mapper,
    Reducer,
    Shuffler,
    Combinator,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Coordinator => "Coordinator",
            NodeKind::Mapper => "Mapper",
            NodeKind::Reducer => "Reducer",
            NodeKind::Shuffler => "Shuffler",
            NodeKind::Combinator => "Combinator",
        };
        f.write_str(s)
    }
}

/// A failure tagged with the id and role of the node that raised it.
///
/// The id is what lets a worker pool rebuild exactly the failed slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}Error (id = {id}): {message}")]
pub struct NodeError {
    pub message: String,
    pub id: usize,
    pub kind: NodeKind,
}

impl NodeError {
    pub fn new(message: impl Into<String>, id: usize, kind: NodeKind) -> Self {
        Self {
            message: message.into(),
            id,
            kind,
        }
    }

    /// The error raised by a node whose failure flag was set.
    pub fn injected(id: usize, kind: NodeKind) -> Self {
        Self::new("injected failure", id, kind)
    }

    /// Wrap an arbitrary error, keeping its whole context chain in the message.
    pub fn wrap(err: &anyhow::Error, id: usize, kind: NodeKind) -> Self {
        Self::new(format!("{err:#}"), id, kind)
    }
}

/// Errors that end a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("{} {} still failing after {rebuilds} rebuilds", .last.kind, .last.id)]
    RetriesExhausted {
        rebuilds: usize,
        #[source]
        last: NodeError,
    },
}

impl JobError {
    /// The node error at the root of this failure.
    pub fn node(&self) -> &NodeError {
        match self {
            JobError::Node(err) => err,
            JobError::RetriesExhausted { last, .. } => last,
        }
    }
}

/// Result type for operations that can end a job.
pub type JobResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_wrap_keeps_context_chain() {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("persisting mapper output")
            .unwrap_err();
        let node = NodeError::wrap(&err, 3, NodeKind::Mapper);

        assert_eq!(node.id, 3);
        assert_eq!(node.kind, NodeKind::Mapper);
        assert_eq!(node.message, "persisting mapper output: disk full");
        assert_eq!(
            node.to_string(),
            "MapperError (id = 3): persisting mapper output: disk full"
        );
    }

    #[test]
    fn test_exhausted_points_at_last_failure() {
        let err = JobError::RetriesExhausted {
            rebuilds: 3,
            last: NodeError::injected(1, NodeKind::Reducer),
        };

        assert_eq!(err.node().id, 1);
        assert_eq!(err.to_string(), "Reducer 1 still failing after 3 rebuilds");
    }
}
