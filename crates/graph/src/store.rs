//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing
//! adjacency. Given a `NodeId n`, its outgoing edge ids occupy the slice:
//!
//! ```text
//! adjacency[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Edge *attributes* (`edge_from`, `edge_to`, `edge_base_length`, …) are kept
//! in separate dense arrays indexed directly by `EdgeId` — not by CSR
//! position — because edge ids are assigned externally by the graph loader
//! (from the edges CSV) rather than by insertion order, and the traffic
//! protocol addresses edges by that externally-assigned id. `adjacency` is
//! therefore an array of `EdgeId`s, grouped by source node and otherwise
//! unordered, while the attribute arrays give O(1) lookup by the id a
//! client actually sends. Iteration over a node's outgoing edges is a
//! contiguous memory scan — ideal for the A* inner loop.

use routesrv_core::{EdgeId, NodeId, Point};

use crate::error::{GraphBuildError, TrafficUpdateError};

/// Mixing weight for observations after the first. The first observation on
/// an edge replaces the construction-time estimate outright (`α = 1.0`).
const EMA_ALPHA: f64 = 0.2;

/// Floor applied to observed speeds before computing `measured = length / speed`,
/// avoiding division by zero on degenerate (but positive) inputs.
const MIN_SPEED: f64 = 1e-6;

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road graph in CSR format, with mutable per-edge traffic state.
///
/// All fields are private; access goes through the methods below so that
/// the read/write split enforced by the dispatcher's lock (many readers
/// xor one writer) lines up with Rust's own `&self` / `&mut self` split:
/// every read-only method takes `&self`, and [`apply_observation`] — the
/// only mutator — takes `&mut self`.
///
/// Do not construct directly; use [`RoadGraphBuilder`].
///
/// [`apply_observation`]: RoadGraph::apply_observation
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    node_pos: Vec<Point>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// CSR row pointer. Length = `node_count + 1`.
    node_out_start: Vec<u32>,
    /// Flat adjacency content: outgoing `EdgeId`s grouped by source node.
    adjacency: Vec<EdgeId>,

    // ── Edge attributes (indexed directly by EdgeId) ──────────────────────
    edge_from: Vec<NodeId>,
    edge_to: Vec<NodeId>,
    edge_base_length: Vec<f64>,
    edge_base_speed_limit: Vec<f64>,
    /// Exponential moving average of observed travel time, seconds.
    edge_ema_travel_time: Vec<f64>,
    /// Published travel time used as the A* edge cost. Always equal to
    /// `edge_ema_travel_time` once an update has completed.
    edge_current_travel_time: Vec<f64>,
    edge_observation_count: Vec<u64>,

    /// `max(base_speed_limit)` over all edges, cached once at construction
    /// so the A* heuristic is O(1) per call instead of O(edge_count).
    max_speed: f64,
}

impl RoadGraph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_from.len()
    }

    #[inline]
    pub fn has_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    #[inline]
    pub fn has_edge(&self, edge: EdgeId) -> bool {
        edge.index() < self.edge_count()
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Iterator over the outgoing `EdgeId`s of `node`.
    ///
    /// A contiguous index range — no heap allocation. Order matches CSR
    /// construction order, which is not semantically meaningful.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        self.adjacency[start..end].iter().copied()
    }

    #[inline]
    pub fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Point {
        self.node_pos[node.index()]
    }

    // ── Read surface ──────────────────────────────────────────────────────

    /// Current travel-time cost of `edge`, used as the A* edge weight.
    #[inline]
    pub fn edge_weight(&self, edge: EdgeId) -> f64 {
        self.edge_current_travel_time[edge.index()]
    }

    /// Number of traffic observations applied to `edge` so far.
    #[inline]
    pub fn observation_count(&self, edge: EdgeId) -> u64 {
        self.edge_observation_count[edge.index()]
    }

    /// Time-based admissible lower bound on the cost from `from` to `to`:
    /// straight-line distance divided by the fastest speed limit in the
    /// graph. Admissible because every edge's current travel time is at
    /// least `base_length / base_speed_limit ≥ base_length / max_speed`.
    #[inline]
    pub fn heuristic(&self, from: NodeId, to: NodeId) -> f64 {
        let dist = self.node_pos(from).distance(self.node_pos(to));
        if self.max_speed > 0.0 {
            dist / self.max_speed
        } else {
            dist
        }
    }

    /// Find the edge id from `from` to `to` among `from`'s outgoing edges.
    ///
    /// If parallel edges exist, returns the first one found in adjacency
    /// order — the documented tie-break for path reconstruction.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|&e| self.edge_to(e) == to)
    }

    // ── Write surface ─────────────────────────────────────────────────────

    /// Fuse a speed observation into `edge`'s exponential moving average and
    /// publish it as the edge's active travel time.
    ///
    /// The only mutating operation on the graph after construction. Callers
    /// are expected to hold exclusive access (the dispatcher's write lock)
    /// for the duration of the call.
    pub fn apply_observation(
        &mut self,
        edge: EdgeId,
        speed: f64,
    ) -> Result<(), TrafficUpdateError> {
        if !self.has_edge(edge) {
            return Err(TrafficUpdateError::BadEdge(edge));
        }
        if speed <= 0.0 {
            return Err(TrafficUpdateError::BadSpeed);
        }
        let speed = speed.max(MIN_SPEED);

        let i = edge.index();
        let alpha = if self.edge_observation_count[i] == 0 {
            1.0
        } else {
            EMA_ALPHA
        };
        let measured = self.edge_base_length[i] / speed;

        self.edge_ema_travel_time[i] =
            alpha * measured + (1.0 - alpha) * self.edge_ema_travel_time[i];
        self.edge_current_travel_time[i] = self.edge_ema_travel_time[i];
        self.edge_observation_count[i] += 1;

        Ok(())
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

struct RawEdge {
    from: NodeId,
    to: NodeId,
    base_length: f64,
    base_speed_limit: f64,
}

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Mirrors the `init` / `set_coordinates` / `add_edge` contract: node and
/// edge counts are fixed up front, coordinates may be set in any order, and
/// every edge slot in `[0, edge_count)` must be filled exactly once before
/// `build()` succeeds.
pub struct RoadGraphBuilder {
    node_pos: Vec<Point>,
    edges: Vec<Option<RawEdge>>,
}

impl RoadGraphBuilder {
    /// Allocate a node array of length `num_nodes` (zero coordinates) and an
    /// edge array of length `num_edges` (unfilled).
    pub fn new(num_nodes: usize, num_edges: usize) -> Self {
        Self {
            node_pos: vec![Point::default(); num_nodes],
            edges: (0..num_edges).map(|_| None).collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Set the coordinates of `node`. Idempotent and order-independent —
    /// later calls simply overwrite earlier ones.
    pub fn set_coordinates(&mut self, node: NodeId, x: f64, y: f64) -> Result<(), GraphBuildError> {
        let slot = self
            .node_pos
            .get_mut(node.index())
            .ok_or(GraphBuildError::NodeOutOfRange(node))?;
        *slot = Point::new(x, y);
        Ok(())
    }

    /// Fill edge slot `id`. Each id may be added at most once.
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        base_length: f64,
        base_speed_limit: f64,
    ) -> Result<(), GraphBuildError> {
        if from.index() >= self.node_pos.len() || to.index() >= self.node_pos.len() {
            return Err(GraphBuildError::InvalidEndpoint { edge: id, from, to });
        }
        if base_speed_limit <= 0.0 {
            return Err(GraphBuildError::NonPositiveSpeed(id));
        }
        let slot = self
            .edges
            .get_mut(id.index())
            .ok_or(GraphBuildError::EdgeOutOfRange(id))?;
        if slot.is_some() {
            return Err(GraphBuildError::DuplicateEdge(id));
        }
        *slot = Some(RawEdge { from, to, base_length, base_speed_limit });
        Ok(())
    }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Fails if any edge slot in `[0, edge_count)` was never filled.
    /// Time complexity: O(E log E) for the CSR sort.
    pub fn build(self) -> Result<RoadGraph, GraphBuildError> {
        let node_count = self.node_pos.len();
        let edge_count = self.edges.len();

        let mut edge_from = Vec::with_capacity(edge_count);
        let mut edge_to = Vec::with_capacity(edge_count);
        let mut edge_base_length = Vec::with_capacity(edge_count);
        let mut edge_base_speed_limit = Vec::with_capacity(edge_count);
        let mut max_speed = 0.0f64;

        for (i, slot) in self.edges.into_iter().enumerate() {
            let raw = slot.ok_or_else(|| GraphBuildError::MissingEdge(EdgeId(i as u32)))?;
            max_speed = max_speed.max(raw.base_speed_limit);
            edge_from.push(raw.from);
            edge_to.push(raw.to);
            edge_base_length.push(raw.base_length);
            edge_base_speed_limit.push(raw.base_speed_limit);
        }

        // Initial travel time: base_length / base_speed_limit, per edge.
        let edge_current_travel_time: Vec<f64> = (0..edge_count)
            .map(|i| edge_base_length[i] / edge_base_speed_limit[i])
            .collect();
        let edge_ema_travel_time = edge_current_travel_time.clone();
        let edge_observation_count = vec![0u64; edge_count];

        // Build CSR row pointer + flat adjacency, grouping edge ids by source node.
        let mut node_out_start = vec![0u32; node_count + 1];
        for &from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let mut cursor = node_out_start.clone();
        let mut adjacency = vec![EdgeId::INVALID; edge_count];
        for (i, &from) in edge_from.iter().enumerate() {
            let pos = cursor[from.index()] as usize;
            adjacency[pos] = EdgeId(i as u32);
            cursor[from.index()] += 1;
        }

        Ok(RoadGraph {
            node_pos: self.node_pos,
            node_out_start,
            adjacency,
            edge_from,
            edge_to,
            edge_base_length,
            edge_base_speed_limit,
            edge_ema_travel_time,
            edge_current_travel_time,
            edge_observation_count,
            max_speed,
        })
    }
}
