//! Wire protocol: newline-delimited ASCII commands and responses.
//!
//! ```text
//! REQ <src> <dst>      -> ROUTE2 <cost> <nc> <node>... <ec> <edge>...
//! UPD <edge_id> <speed> -> ACK
//! (anything else)      -> ERR <reason>
//! ```

use std::fmt;

use routesrv_astar::Route;
use routesrv_core::{EdgeId, NodeId};

/// A parsed client command, still carrying raw (unvalidated) ids — range
/// checks against the live graph happen in the worker, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Route { src: u64, dst: u64 },
    Update { edge: u64, speed: f64 },
}

/// Error/ACK reason codes sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    BadNodes,
    BadEdge,
    BadSpeed,
    NoRoute,
    RouteFail,
    NoMem,
    UnknownCmd,
    Empty,
    Internal,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reason::BadNodes => "BAD_NODES",
            Reason::BadEdge => "BAD_EDGE",
            Reason::BadSpeed => "BAD_SPEED",
            Reason::NoRoute => "NO_ROUTE",
            Reason::RouteFail => "ROUTE_FAIL",
            Reason::NoMem => "NO_MEM",
            Reason::UnknownCmd => "UNKNOWN_CMD",
            Reason::Empty => "EMPTY",
            Reason::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

/// Parse one input line (already stripped of `\n`/`\r`) into a [`Command`].
///
/// An empty line and an unrecognized command are distinct failure reasons,
/// per the protocol's `ERR EMPTY` vs. `ERR UNKNOWN_CMD` split.
pub fn parse_line(line: &str) -> Result<Command, Reason> {
    if line.is_empty() {
        return Err(Reason::Empty);
    }

    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("REQ") => {
            let src = parts.next().and_then(|s| s.parse::<u64>().ok());
            let dst = parts.next().and_then(|s| s.parse::<u64>().ok());
            match (src, dst, parts.next()) {
                (Some(src), Some(dst), None) => Ok(Command::Route { src, dst }),
                _ => Err(Reason::UnknownCmd),
            }
        }
        Some("UPD") => {
            let edge = parts.next().and_then(|s| s.parse::<u64>().ok());
            let speed = parts.next().and_then(|s| s.parse::<f64>().ok());
            match (edge, speed, parts.next()) {
                (Some(edge), Some(speed), None) if speed.is_finite() => {
                    Ok(Command::Update { edge, speed })
                }
                _ => Err(Reason::UnknownCmd),
            }
        }
        _ => Err(Reason::UnknownCmd),
    }
}

/// Render `ERR <reason>\n`.
pub fn format_err(reason: Reason) -> String {
    format!("ERR {reason}\n")
}

/// Render `ACK\n`.
pub fn format_ack() -> String {
    "ACK\n".to_string()
}

/// Render `ROUTE2 <cost> <nc> <nodes...> <ec> <edges...>\n`.
pub fn format_route(route: &Route) -> String {
    let mut out = format!("ROUTE2 {:.3} {}", route.cost, route.node_path.len());
    for node in &route.node_path {
        push_node(&mut out, *node);
    }
    out.push(' ');
    out.push_str(&route.edge_path.len().to_string());
    for edge in &route.edge_path {
        push_edge(&mut out, *edge);
    }
    out.push('\n');
    out
}

fn push_node(out: &mut String, node: NodeId) {
    out.push(' ');
    out.push_str(&node.index().to_string());
}

fn push_edge(out: &mut String, edge: EdgeId) {
    out.push(' ');
    out.push_str(&edge.index().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_req() {
        assert_eq!(parse_line("REQ 0 2"), Ok(Command::Route { src: 0, dst: 2 }));
    }

    #[test]
    fn parses_upd() {
        assert_eq!(parse_line("UPD 2 0.5"), Ok(Command::Update { edge: 2, speed: 0.5 }));
    }

    #[test]
    fn tolerates_no_trailing_whitespace_issues() {
        assert_eq!(parse_line("REQ  0   2"), Ok(Command::Route { src: 0, dst: 2 }));
    }

    #[test]
    fn empty_line_is_its_own_reason() {
        assert_eq!(parse_line(""), Err(Reason::Empty));
    }

    #[test]
    fn unknown_command_is_unknown_cmd() {
        assert_eq!(parse_line("FOO"), Err(Reason::UnknownCmd));
        assert_eq!(parse_line("REQ 1"), Err(Reason::UnknownCmd));
        assert_eq!(parse_line("REQ 1 2 3"), Err(Reason::UnknownCmd));
        assert_eq!(parse_line("UPD 1 -1x"), Err(Reason::UnknownCmd));
    }

    #[test]
    fn reason_display_matches_wire_strings() {
        assert_eq!(Reason::BadNodes.to_string(), "BAD_NODES");
        assert_eq!(Reason::NoRoute.to_string(), "NO_ROUTE");
        assert_eq!(format_err(Reason::Empty), "ERR EMPTY\n");
        assert_eq!(format_ack(), "ACK\n");
    }

    #[test]
    fn formats_route_response() {
        let route = Route {
            cost: 1.41421356,
            node_path: vec![NodeId(0), NodeId(2)],
            edge_path: vec![EdgeId(2)],
        };
        assert_eq!(format_route(&route), "ROUTE2 1.414 2 0 2 1 2\n");
    }
}
