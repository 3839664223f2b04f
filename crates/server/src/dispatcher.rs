//! Shared server state: the graph lock, the two task queues, and the
//! worker pools and accept loop built on top of them.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use routesrv_graph::RoadGraph;
use tracing::{error, info, warn};

use crate::connection::handle_connection;
use crate::error::ServerError;
use crate::queue::TaskQueue;
use crate::worker::{routing_worker_main, traffic_worker_main};

/// Worker-pool sizing. Reference values: 8 routing workers, 2 traffic
/// workers; both configuration-exposed.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub routing_workers: usize,
    pub traffic_workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { routing_workers: 8, traffic_workers: 2 }
    }
}

/// Owns the graph lock and both FIFO queues. Cheap to clone (`Arc` inside);
/// share one instance between the accept loop and every worker/handler
/// thread.
pub struct Dispatcher {
    graph: Arc<RwLock<RoadGraph>>,
    routing_q: Arc<TaskQueue>,
    traffic_q: Arc<TaskQueue>,
}

impl Dispatcher {
    pub fn new(graph: RoadGraph) -> Arc<Self> {
        Arc::new(Self {
            graph: Arc::new(RwLock::new(graph)),
            routing_q: Arc::new(TaskQueue::new()),
            traffic_q: Arc::new(TaskQueue::new()),
        })
    }

    pub(crate) fn routing_queue(&self) -> &Arc<TaskQueue> {
        &self.routing_q
    }

    pub(crate) fn traffic_queue(&self) -> &Arc<TaskQueue> {
        &self.traffic_q
    }

    /// Spawn the fixed-size routing and traffic worker pools. Routing
    /// workers only ever take the read lock; traffic workers only ever
    /// take the write lock. Neither pool steals work from the other.
    pub fn spawn_workers(self: &Arc<Self>, config: DispatcherConfig) -> Result<(), ServerError> {
        for i in 0..config.routing_workers {
            let graph = Arc::clone(&self.graph);
            let queue = Arc::clone(&self.routing_q);
            thread::Builder::new()
                .name(format!("routesrv-routing-{i}"))
                .spawn(move || routing_worker_main(graph, queue))
                .map_err(|source| ServerError::ThreadSpawn { worker_kind: "routing", index: i, source })?;
        }

        for i in 0..config.traffic_workers {
            let graph = Arc::clone(&self.graph);
            let queue = Arc::clone(&self.traffic_q);
            thread::Builder::new()
                .name(format!("routesrv-traffic-{i}"))
                .spawn(move || traffic_worker_main(graph, queue))
                .map_err(|source| ServerError::ThreadSpawn { worker_kind: "traffic", index: i, source })?;
        }

        info!(
            routing_workers = config.routing_workers,
            traffic_workers = config.traffic_workers,
            "worker pools started"
        );
        Ok(())
    }

    /// Accept connections forever, spawning one handler thread per client.
    /// A failed `accept` is logged and retried, matching the reference
    /// server's tolerance for transient accept errors.
    pub fn run(self: Arc<Self>, listener: TcpListener) -> ! {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    info!(%addr, "client connected");
                    let dispatcher = Arc::clone(&self);
                    let spawned = thread::Builder::new()
                        .name(format!("routesrv-client-{addr}"))
                        .spawn(move || handle_connection(stream, dispatcher, addr));
                    if let Err(e) = spawned {
                        warn!(error = %e, "failed to spawn client handler thread");
                    }
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;

    use routesrv_core::{EdgeId as Eid, NodeId as Nid};
    use routesrv_graph::RoadGraphBuilder;

    use super::*;

    /// 0,1,2 at (0,0),(1,0),(1,1); edges (0->1 len1 speed1), (1->2 len1
    /// speed1), (0->2 len sqrt(2) speed1) — same fixture used for the S1/S2
    /// scenarios in the worker and protocol tests.
    fn triangle() -> RoadGraph {
        let mut b = RoadGraphBuilder::new(3, 3);
        b.set_coordinates(Nid(0), 0.0, 0.0).unwrap();
        b.set_coordinates(Nid(1), 1.0, 0.0).unwrap();
        b.set_coordinates(Nid(2), 1.0, 1.0).unwrap();
        b.add_edge(Eid(0), Nid(0), Nid(1), 1.0, 1.0).unwrap();
        b.add_edge(Eid(1), Nid(1), Nid(2), 1.0, 1.0).unwrap();
        b.add_edge(Eid(2), Nid(0), Nid(2), 2.0f64.sqrt(), 1.0).unwrap();
        b.build().unwrap()
    }

    fn spawn_test_server(graph: RoadGraph) -> std::net::SocketAddr {
        let dispatcher = Dispatcher::new(graph);
        dispatcher
            .spawn_workers(DispatcherConfig { routing_workers: 2, traffic_workers: 1 })
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || dispatcher.run(listener));
        addr
    }

    fn read_line(reader: &mut impl BufRead) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        line
    }

    #[test]
    fn single_connection_sees_responses_in_submission_order() {
        let addr = spawn_test_server(triangle());

        let stream = TcpStream::connect(addr).unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);

        // S1: direct edge beats the two-hop route.
        writer.write_all(b"REQ 0 2\n").unwrap();
        assert_eq!(read_line(&mut reader), "ROUTE2 1.414 2 0 2 1 2\n");

        // S2: after slowing the direct edge, the two-hop route wins, and the
        // REQ that follows the UPD on the same connection observes it.
        writer.write_all(b"UPD 2 0.5\n").unwrap();
        assert_eq!(read_line(&mut reader), "ACK\n");

        writer.write_all(b"REQ 0 2\n").unwrap();
        assert_eq!(read_line(&mut reader), "ROUTE2 2.000 3 0 1 2 2 0 1\n");

        // A malformed line after that doesn't close the connection.
        writer.write_all(b"FOO\n").unwrap();
        assert_eq!(read_line(&mut reader), "ERR UNKNOWN_CMD\n");

        writer.write_all(b"REQ 5 5\n").unwrap();
        assert!(read_line(&mut reader).starts_with("ERR BAD_NODES"));
    }

    #[test]
    fn one_connections_update_is_visible_to_another_connections_request() {
        let addr = spawn_test_server(triangle());

        let mut writer_a = TcpStream::connect(addr).unwrap();
        let stream_b = TcpStream::connect(addr).unwrap();
        let mut writer_b = stream_b.try_clone().unwrap();
        let mut reader_b = BufReader::new(stream_b);

        writer_a.write_all(b"UPD 2 0.5\n").unwrap();

        // Poll on connection B until the update has propagated; the two
        // connections are served by independent handler threads with no
        // ordering guarantee relative to each other, only within each one.
        loop {
            writer_b.write_all(b"REQ 0 2\n").unwrap();
            let response = read_line(&mut reader_b);
            if response == "ROUTE2 2.000 3 0 1 2 2 0 1\n" {
                break;
            }
            assert_eq!(response, "ROUTE2 1.414 2 0 2 1 2\n", "unexpected response: {response}");
        }
    }

    #[test]
    fn requests_interleaved_with_updates_stay_in_submission_order() {
        let addr = spawn_test_server(triangle());

        let stream = TcpStream::connect(addr).unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);

        // Slower speed observations raise travel time (measured = base_length / speed).
        let commands = ["REQ 0 1", "UPD 0 0.5", "REQ 0 1", "REQ 1 2", "UPD 1 0.25", "REQ 1 2"];
        for cmd in commands {
            writer.write_all(cmd.as_bytes()).unwrap();
            writer.write_all(b"\n").unwrap();
        }

        // Every response line must arrive before the connection is read
        // again, so this order is exactly the submission order above.
        assert_eq!(read_line(&mut reader), "ROUTE2 1.000 2 0 1 1 0\n");
        assert_eq!(read_line(&mut reader), "ACK\n");
        assert_eq!(read_line(&mut reader), "ROUTE2 2.000 2 0 1 1 0\n");
        assert_eq!(read_line(&mut reader), "ROUTE2 1.000 2 1 2 1 1\n");
        assert_eq!(read_line(&mut reader), "ACK\n");
        assert_eq!(read_line(&mut reader), "ROUTE2 4.000 2 1 2 1 1\n");
    }
}
