//! Fatal, construction-time server errors.

use thiserror::Error;

/// Errors that abort startup before the dispatcher accepts its first
/// connection. Every variant is fatal — see the error-handling design's
/// three-way partition (construction-time / per-command client / per-command
/// internal); this type covers only the first class.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {worker_kind} worker thread {index}: {source}")]
    ThreadSpawn {
        worker_kind: &'static str,
        index: usize,
        #[source]
        source: std::io::Error,
    },
}
