//! `routesrv` — concurrent A*/traffic-aware routing server binary.
//!
//! Parses CLI configuration, initializes structured logging, loads the
//! graph from its meta/nodes/edges CSV triple, and runs the dispatcher's
//! accept loop forever.

use std::net::TcpListener;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use routesrv_loader::{GraphPaths, LoaderError};
use routesrv_server::{Dispatcher, DispatcherConfig, ServerError};

/// Concurrent A*/traffic-aware routing server.
#[derive(Debug, Parser)]
#[command(name = "routesrv", version, about)]
struct Cli {
    /// Listen port.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Directory containing graph.meta, nodes.csv, edges.csv.
    #[arg(long)]
    data_dir: PathBuf,

    /// Routing worker pool size.
    #[arg(long, default_value_t = 8)]
    routing_workers: usize,

    /// Traffic worker pool size.
    #[arg(long, default_value_t = 2)]
    traffic_workers: usize,

    /// Increase log verbosity (repeatable). Overridden by `RUST_LOG` if set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Fatal startup errors, each mapped to a distinct process exit code so
/// operators can distinguish failure classes without parsing stderr.
#[derive(Debug, Error)]
enum AppError {
    #[error("failed to load graph: {0}")]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Loader(_) => 2,
            AppError::Server(ServerError::Bind { .. }) => 3,
            AppError::Server(ServerError::ThreadSpawn { .. }) => 4,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "fatal error during startup");
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let paths = GraphPaths::in_dir(&cli.data_dir);
    let graph = routesrv_loader::load(&paths)?;
    info!(nodes = graph.node_count(), edges = graph.edge_count(), "graph loaded");

    let dispatcher = Dispatcher::new(graph);
    dispatcher.spawn_workers(DispatcherConfig {
        routing_workers: cli.routing_workers,
        traffic_workers: cli.traffic_workers,
    })?;

    let listener = TcpListener::bind(("0.0.0.0", cli.port))
        .map_err(|source| ServerError::Bind { port: cli.port, source })?;
    info!(port = cli.port, "listening");

    dispatcher.run(listener);
}

/// Initialize `tracing-subscriber` at a verbosity derived from `-v` repeat
/// count, honoring `RUST_LOG` if set (the standard env-filter convention).
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
