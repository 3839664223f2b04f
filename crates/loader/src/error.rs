//! Errors from parsing the meta/nodes/edges CSV triple.

use std::path::PathBuf;

use routesrv_graph::GraphBuildError;
use thiserror::Error;

/// All loader failures are fatal by convention — the caller should log at
/// `error` level and exit with a distinct, non-zero code rather than start
/// serving a partially-constructed graph.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("meta file {path:?}: missing or invalid counts (num_nodes={num_nodes:?}, num_edges={num_edges:?})")]
    BadMeta { path: PathBuf, num_nodes: Option<i64>, num_edges: Option<i64> },

    #[error("malformed row in {file:?}: {source}")]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("edges count mismatch: meta declared {expected}, body contained {actual}")]
    EdgeCountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Graph(#[from] GraphBuildError),
}
