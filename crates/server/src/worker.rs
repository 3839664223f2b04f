//! Routing and traffic worker-pool thread bodies.
//!
//! Routing workers always take the graph's read lock; traffic workers
//! always take the write lock. Neither ever holds the lock across the
//! queue wait or the client socket write — it is acquired fresh for each
//! task and released before [`Task::complete`] wakes the handler.

use std::sync::Arc;

use parking_lot::RwLock;
use routesrv_astar::RouteOutcome;
use routesrv_core::{EdgeId, NodeId};
use routesrv_graph::{RoadGraph, TrafficUpdateError};
use tracing::{debug, warn};

use crate::protocol::{format_ack, format_err, format_route, Reason};
use crate::queue::TaskQueue;
use crate::task::Task;

/// Run a routing worker's main loop. Never returns.
pub fn routing_worker_main(graph: Arc<RwLock<RoadGraph>>, queue: Arc<TaskQueue>) {
    loop {
        let task = queue.pop();
        let crate::protocol::Command::Route { src, dst } = task.command else {
            unreachable!("routing queue received a non-Route task");
        };

        let response = {
            let g = graph.read();
            build_route_response(&g, src, dst)
        };
        task.complete(response);
    }
}

/// Run a traffic worker's main loop. Never returns.
pub fn traffic_worker_main(graph: Arc<RwLock<RoadGraph>>, queue: Arc<TaskQueue>) {
    loop {
        let task = queue.pop();
        let crate::protocol::Command::Update { edge, speed } = task.command else {
            unreachable!("traffic queue received a non-Update task");
        };

        let response = {
            let mut g = graph.write();
            apply_update_response(&mut g, edge, speed)
        };
        task.complete(response);
    }
}

/// Validate `src`/`dst`, run A*, and render the wire response.
fn build_route_response(graph: &RoadGraph, src: u64, dst: u64) -> String {
    let (Some(src), Some(dst)) = (to_node_id(graph, src), to_node_id(graph, dst)) else {
        debug!(src, dst, "REQ with out-of-range node id");
        return format_err(Reason::BadNodes);
    };

    match routesrv_astar::find_route(graph, src, dst) {
        Ok(RouteOutcome::Found(route)) => format_route(&route),
        Ok(RouteOutcome::NoPath) => format_err(Reason::NoRoute),
        Err(e) => {
            warn!(error = %e, "A* rejected already-validated node ids");
            format_err(Reason::RouteFail)
        }
    }
}

/// Validate `edge`/`speed` and apply the traffic observation.
fn apply_update_response(graph: &mut RoadGraph, edge: u64, speed: f64) -> String {
    let Some(edge_id) = to_edge_id(graph, edge) else {
        debug!(edge, "UPD with out-of-range edge id");
        return format_err(Reason::BadEdge);
    };

    match graph.apply_observation(edge_id, speed) {
        Ok(()) => format_ack(),
        Err(TrafficUpdateError::BadEdge(_)) => format_err(Reason::BadEdge),
        Err(TrafficUpdateError::BadSpeed) => {
            debug!(speed, "UPD with non-positive speed");
            format_err(Reason::BadSpeed)
        }
    }
}

fn to_node_id(graph: &RoadGraph, raw: u64) -> Option<NodeId> {
    let id = u32::try_from(raw).ok()?;
    let node = NodeId(id);
    graph.has_node(node).then_some(node)
}

fn to_edge_id(graph: &RoadGraph, raw: u64) -> Option<EdgeId> {
    let id = u32::try_from(raw).ok()?;
    let edge = EdgeId(id);
    graph.has_edge(edge).then_some(edge)
}
