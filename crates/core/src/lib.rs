//! `routesrv-core` — foundational types shared by every `routesrv-*` crate.
//!
//! This crate is a dependency of every other crate in the workspace. It
//! intentionally has no further dependencies.
//!
//! # What lives here
//!
//! | Module    | Contents                  |
//! |-----------|----------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`         |
//! | [`point`] | `Point`, Euclidean distance |

pub mod ids;
pub mod point;

pub use ids::{EdgeId, NodeId};
pub use point::Point;
