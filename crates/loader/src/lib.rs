//! `routesrv-loader` — parses the meta/nodes/edges CSV triple into a
//! [`RoadGraph`](routesrv_graph::RoadGraph).
//!
//! | Module        | Contents                          |
//! |----------------|------------------------------------|
//! | [`meta`]       | `parse_meta`, `GraphMeta`           |
//! | [`csv_tables`] | `load_nodes`, `load_edges`          |
//! | [`error`]      | `LoaderError`                       |
//!
//! Loading is single-pass and does not run concurrently with serving: the
//! binary calls [`load`] once at startup, before the dispatcher's accept
//! loop begins.

pub mod csv_tables;
pub mod error;
pub mod meta;

use std::path::{Path, PathBuf};

use routesrv_graph::{RoadGraph, RoadGraphBuilder};

pub use error::LoaderError;
pub use meta::GraphMeta;

/// Paths to the three files that make up one graph's on-disk representation.
#[derive(Debug, Clone)]
pub struct GraphPaths {
    pub meta: PathBuf,
    pub nodes: PathBuf,
    pub edges: PathBuf,
}

impl GraphPaths {
    /// The conventional layout: `<dir>/graph.meta`, `<dir>/nodes.csv`,
    /// `<dir>/edges.csv`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            meta: dir.join("graph.meta"),
            nodes: dir.join("nodes.csv"),
            edges: dir.join("edges.csv"),
        }
    }
}

/// Load a complete, validated [`RoadGraph`] from `paths`.
///
/// Fatal on any malformed input: a bad meta file, an out-of-range node/edge
/// id, a non-positive speed limit, or an edge-count mismatch between the
/// meta header and the edges body all return `Err` before any graph is
/// handed back — there is no partially-constructed graph to observe.
pub fn load(paths: &GraphPaths) -> Result<RoadGraph, LoaderError> {
    let meta = meta::parse_meta(&paths.meta)?;
    let mut builder = RoadGraphBuilder::new(meta.num_nodes, meta.num_edges);

    csv_tables::load_nodes(&mut builder, &paths.nodes)?;
    let loaded_edges = csv_tables::load_edges(&mut builder, &paths.edges)?;

    if loaded_edges != meta.num_edges {
        return Err(LoaderError::EdgeCountMismatch { expected: meta.num_edges, actual: loaded_edges });
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use routesrv_core::EdgeId;

    use super::*;

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("routesrv-loader-it-{}-{n}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_triple(dir: &Path, meta: &str, nodes: &str, edges: &str) -> GraphPaths {
        let paths = GraphPaths::in_dir(dir);
        std::fs::write(&paths.meta, meta).unwrap();
        std::fs::write(&paths.nodes, nodes).unwrap();
        std::fs::write(&paths.edges, edges).unwrap();
        paths
    }

    #[test]
    fn well_formed_triple_loads_with_correct_initial_travel_time() {
        let dir = temp_dir();
        let paths = write_triple(
            &dir,
            "num_nodes 3\nnum_edges 2\n",
            "node_id,x,y\n0,0,0\n1,1,0\n2,2,0\n",
            "edge_id,from,to,base_length,base_speed_limit\n0,0,1,10,10\n1,1,2,20,10\n",
        );

        let graph = load(&paths).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge_weight(EdgeId(0)), 1.0);
        assert_eq!(graph.edge_weight(EdgeId(1)), 2.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_meta_keys_are_fatal() {
        let dir = temp_dir();
        let paths = write_triple(&dir, "num_nodes 3\n", "node_id,x,y\n", "edge_id,from,to,base_length,base_speed_limit\n");
        assert!(matches!(load(&paths), Err(LoaderError::BadMeta { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn out_of_range_node_id_is_fatal() {
        let dir = temp_dir();
        let paths = write_triple(
            &dir,
            "num_nodes 2\nnum_edges 0\n",
            "node_id,x,y\n0,0,0\n5,1,1\n",
            "edge_id,from,to,base_length,base_speed_limit\n",
        );
        assert!(matches!(load(&paths), Err(LoaderError::Graph(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_positive_speed_is_fatal() {
        let dir = temp_dir();
        let paths = write_triple(
            &dir,
            "num_nodes 2\nnum_edges 1\n",
            "node_id,x,y\n0,0,0\n1,1,1\n",
            "edge_id,from,to,base_length,base_speed_limit\n0,0,1,10,0\n",
        );
        assert!(matches!(load(&paths), Err(LoaderError::Graph(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn edge_count_mismatch_is_fatal() {
        let dir = temp_dir();
        let paths = write_triple(
            &dir,
            "num_nodes 2\nnum_edges 2\n",
            "node_id,x,y\n0,0,0\n1,1,1\n",
            "edge_id,from,to,base_length,base_speed_limit\n0,0,1,10,10\n",
        );
        assert!(matches!(
            load(&paths),
            Err(LoaderError::EdgeCountMismatch { expected: 2, actual: 1 })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
