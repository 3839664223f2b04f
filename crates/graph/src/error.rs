//! Graph-subsystem error types.

use thiserror::Error;

use routesrv_core::{EdgeId, NodeId};

/// Errors raised while constructing a [`RoadGraph`](crate::RoadGraph).
///
/// These are construction-time / fatal by the calling convention described
/// in the server's error-handling design: a loader that receives one of
/// these should abort the process rather than attempt to start serving.
#[derive(Debug, Error)]
pub enum GraphBuildError {
    #[error("node id {0} out of range")]
    NodeOutOfRange(NodeId),

    #[error("edge id {0} out of range")]
    EdgeOutOfRange(EdgeId),

    #[error("edge {0} added more than once")]
    DuplicateEdge(EdgeId),

    #[error("edge {edge} references invalid node ({from} -> {to})")]
    InvalidEndpoint { edge: EdgeId, from: NodeId, to: NodeId },

    #[error("edge {0} has a non-positive speed limit")]
    NonPositiveSpeed(EdgeId),

    #[error("edge {0} was declared but never added")]
    MissingEdge(EdgeId),
}

/// Outcome of applying a traffic observation to an edge.
///
/// Modelled as its own error type (rather than folded into
/// [`GraphBuildError`]) because it is a per-command client error, not a
/// fatal one — the caller reports it as `ERR BAD_EDGE` / `ERR BAD_SPEED` and
/// keeps the connection open.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrafficUpdateError {
    #[error("edge {0} out of range")]
    BadEdge(EdgeId),

    #[error("speed must be positive")]
    BadSpeed,
}
