//! `routesrv-astar` — A* route search over a `routesrv-graph` road graph.
//!
//! | Module     | Contents                                |
//! |------------|-------------------------------------------|
//! | [`heap`]   | `IndexedMinHeap`                           |
//! | [`engine`] | `find_route`, `Route`, `RouteOutcome`      |
//! | [`error`]  | `RouteError`                               |

pub mod engine;
pub mod error;
pub mod heap;

pub use engine::{find_route, Route, RouteOutcome};
pub use error::RouteError;
