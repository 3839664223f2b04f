//! `routesrv-graph` — the CSR road graph and its mutable traffic state.
//!
//! | Module    | Contents                                         |
//! |-----------|---------------------------------------------------|
//! | [`store`] | `RoadGraph`, `RoadGraphBuilder`                    |
//! | [`error`] | `GraphBuildError`, `TrafficUpdateError`            |

pub mod error;
pub mod store;

pub use error::{GraphBuildError, TrafficUpdateError};
pub use store::{RoadGraph, RoadGraphBuilder};
