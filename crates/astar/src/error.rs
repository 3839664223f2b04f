//! Errors for the A* route-search engine.

use thiserror::Error;

use routesrv_core::NodeId;

/// Construction-time/query-time error from [`find_route`](crate::find_route).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    #[error("source node {0} out of range")]
    BadSource(NodeId),

    #[error("target node {0} out of range")]
    BadTarget(NodeId),
}
