//! Parser for the `graph.meta` key/value counts file.

use std::path::Path;

use crate::error::LoaderError;

/// Node and edge counts declared by a meta file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphMeta {
    pub num_nodes: usize,
    pub num_edges: usize,
}

/// Parse whitespace-separated `key value` pairs, one or more per line.
/// Only `num_nodes` and `num_edges` are meaningful; unknown keys are
/// ignored, matching the reference loader.
pub fn parse_meta(path: &Path) -> Result<GraphMeta, LoaderError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| LoaderError::Io { path: path.to_path_buf(), source })?;

    let mut num_nodes: Option<i64> = None;
    let mut num_edges: Option<i64> = None;

    let mut tokens = contents.split_ascii_whitespace();
    while let Some(key) = tokens.next() {
        let Some(raw_val) = tokens.next() else { break };
        let Ok(val) = raw_val.parse::<i64>() else { continue };
        match key {
            "num_nodes" => num_nodes = Some(val),
            "num_edges" => num_edges = Some(val),
            _ => {}
        }
    }

    match (num_nodes, num_edges) {
        (Some(n), Some(m)) if n > 0 && m >= 0 => {
            Ok(GraphMeta { num_nodes: n as usize, num_edges: m as usize })
        }
        _ => Err(LoaderError::BadMeta { path: path.to_path_buf(), num_nodes, num_edges }),
    }
}
