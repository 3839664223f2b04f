//! A* shortest-path search over a [`RoadGraph`].

use routesrv_core::{EdgeId, NodeId};
use routesrv_graph::RoadGraph;

use crate::error::RouteError;
use crate::heap::IndexedMinHeap;

/// Successful route: nodes and edges from source to target, plus summed cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub cost: f64,
    /// `node_path[0] == source`, `node_path[last] == target`.
    pub node_path: Vec<NodeId>,
    /// `edge_path[i]` connects `node_path[i]` to `node_path[i + 1]`.
    pub edge_path: Vec<EdgeId>,
}

/// Outcome of a route search, distinguishing "no path" from hard errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    NoPath,
}

/// Search for the shortest-cost path from `source` to `target` in `graph`.
///
/// Uses A* with an admissible Euclidean/`max_speed` heuristic (see
/// [`RoadGraph::heuristic`]) over current edge weights. `graph` is read-only
/// for the duration of the call — callers run this under a shared (read)
/// lock.
pub fn find_route(graph: &RoadGraph, source: NodeId, target: NodeId) -> Result<RouteOutcome, RouteError> {
    if !graph.has_node(source) {
        return Err(RouteError::BadSource(source));
    }
    if !graph.has_node(target) {
        return Err(RouteError::BadTarget(target));
    }

    let n = graph.node_count();
    let mut g_score = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<NodeId>> = vec![None; n];
    let mut heap = IndexedMinHeap::new(n);

    g_score[source.index()] = 0.0;
    heap.decrease_key(source, graph.heuristic(source, target));

    while let Some((u, u_f)) = heap.extract_min() {
        if u_f == f64::INFINITY {
            // Eager unreachability check: nothing left in the heap has a
            // finite key, so the target (if not already found) cannot be.
            return Ok(RouteOutcome::NoPath);
        }

        if u == target {
            let (node_path, edge_path) = reconstruct_path(graph, &parent, source, target);
            return Ok(RouteOutcome::Found(Route { cost: g_score[u.index()], node_path, edge_path }));
        }

        for edge in graph.out_edges(u) {
            let v = graph.edge_to(edge);
            let tentative_g = g_score[u.index()] + graph.edge_weight(edge);

            if tentative_g < g_score[v.index()] {
                g_score[v.index()] = tentative_g;
                parent[v.index()] = Some(u);
                let f = tentative_g + graph.heuristic(v, target);
                if heap.contains(v) {
                    heap.decrease_key(v, f);
                }
            }
        }
    }

    Ok(RouteOutcome::NoPath)
}

/// Walk `parent` back from `target` to `source`, reverse to forward order,
/// then map consecutive node pairs to edge ids via adjacency lookup.
fn reconstruct_path(
    graph: &RoadGraph,
    parent: &[Option<NodeId>],
    source: NodeId,
    target: NodeId,
) -> (Vec<NodeId>, Vec<EdgeId>) {
    let mut node_path = vec![target];
    let mut cur = target;
    while cur != source {
        let p = parent[cur.index()].expect("path reconstruction: missing parent before reaching source");
        node_path.push(p);
        cur = p;
    }
    node_path.reverse();

    let edge_path = node_path
        .windows(2)
        .map(|w| {
            graph
                .find_edge(w[0], w[1])
                .expect("path reconstruction: adjacency edge vanished for a relaxed pair")
        })
        .collect();

    (node_path, edge_path)
}
