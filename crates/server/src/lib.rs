//! `routesrv-server` — the TCP dispatcher: wire protocol, task queues,
//! worker pools, and per-connection handling.
//!
//! | Module         | Contents                                      |
//! |-----------------|------------------------------------------------|
//! | [`protocol`]    | `Command`, `Reason`, parsing and formatting     |
//! | [`task`]        | `Task` — one in-flight command + its handoff    |
//! | [`queue`]       | `TaskQueue` — FIFO with blocking pop            |
//! | [`worker`]      | routing/traffic worker thread bodies            |
//! | [`connection`]  | per-client handler loop                         |
//! | [`dispatcher`]  | `Dispatcher`, `DispatcherConfig`                |
//! | [`error`]       | `ServerError`                                   |

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod queue;
pub mod task;
pub mod worker;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::ServerError;
