//! Parsers for the `nodes.csv` and `edges.csv` tables.

use std::path::Path;

use routesrv_core::{EdgeId, NodeId};
use routesrv_graph::RoadGraphBuilder;
use serde::Deserialize;

use crate::error::LoaderError;

#[derive(Deserialize)]
struct NodeRecord {
    node_id: u32,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    edge_id: u32,
    from: u32,
    to: u32,
    base_length: f64,
    base_speed_limit: f64,
}

/// Read `node_id,x,y` rows (header skipped) and apply each to `builder`.
pub fn load_nodes(builder: &mut RoadGraphBuilder, path: &Path) -> Result<usize, LoaderError> {
    let file = std::fs::File::open(path)
        .map_err(|source| LoaderError::Io { path: path.to_path_buf(), source })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut count = 0usize;
    for result in reader.deserialize::<NodeRecord>() {
        let row = result.map_err(|source| LoaderError::Csv { file: path.to_path_buf(), source })?;
        builder.set_coordinates(NodeId(row.node_id), row.x, row.y)?;
        count += 1;
    }
    Ok(count)
}

/// Read `edge_id,from,to,base_length,base_speed_limit` rows (header skipped)
/// and apply each to `builder`. Returns the number of rows read, which the
/// caller should check against the meta-declared edge count.
pub fn load_edges(builder: &mut RoadGraphBuilder, path: &Path) -> Result<usize, LoaderError> {
    let file = std::fs::File::open(path)
        .map_err(|source| LoaderError::Io { path: path.to_path_buf(), source })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut count = 0usize;
    for result in reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|source| LoaderError::Csv { file: path.to_path_buf(), source })?;
        builder.add_edge(
            EdgeId(row.edge_id),
            NodeId(row.from),
            NodeId(row.to),
            row.base_length,
            row.base_speed_limit,
        )?;
        count += 1;
    }
    Ok(count)
}
