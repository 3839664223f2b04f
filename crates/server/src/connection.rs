//! Per-client connection handler: one thread per accepted socket, looping
//! read-line → dispatch → write-response until EOF.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::protocol::{self, Command};
use crate::task::Task;

/// Serve one client connection to completion (EOF or I/O error).
///
/// Strict per-connection ordering falls out of the control flow itself:
/// the next line is not read until the current task's response has been
/// written.
pub fn handle_connection(stream: TcpStream, dispatcher: Arc<Dispatcher>, addr: SocketAddr) {
    let mut writer = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            warn!(%addr, error = %e, "failed to clone client socket");
            return;
        }
    };
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line);
        let n = match read {
            Ok(n) => n,
            Err(e) => {
                warn!(%addr, error = %e, "read error");
                break;
            }
        };
        if n == 0 {
            break; // peer closed
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        let response = dispatch_line(&dispatcher, trimmed);

        if let Err(e) = writer.write_all(response.as_bytes()) {
            warn!(%addr, error = %e, "write error");
            break;
        }
    }

    info!(%addr, "client disconnected");
}

/// Parse one line and route it to the matching queue, blocking for the
/// response. Parse failures are answered directly — no task is created
/// for an empty line or an unrecognized command.
fn dispatch_line(dispatcher: &Dispatcher, line: &str) -> String {
    match protocol::parse_line(line) {
        Err(reason) => {
            debug!(%reason, "rejecting line");
            protocol::format_err(reason)
        }
        Ok(command @ Command::Route { .. }) => {
            let task = Arc::new(Task::new(command));
            dispatcher.routing_queue().push(Arc::clone(&task));
            task.wait()
        }
        Ok(command @ Command::Update { .. }) => {
            let task = Arc::new(Task::new(command));
            dispatcher.traffic_queue().push(Arc::clone(&task));
            task.wait()
        }
    }
}
