//! bestrate Console
//!
//! Reads price updates and rate requests line by line, from a file or
//! stdin, and writes best rate responses to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bestrate_graph::{GraphConfig, RateGraph};

mod demo;
mod session;

use session::{OutputFormat, Session, SessionSummary};

/// bestrate CLI
#[derive(Parser, Debug)]
#[command(name = "bestrate")]
#[command(about = "Best exchange rate paths over streamed price updates")]
struct Args {
    /// Read requests from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Replay the built-in demo before reading input
    #[arg(long)]
    demo: bool,

    /// Response format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Graph name shown in logs (overrides BESTRATE_GRAPH_NAME)
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            args.json_logs
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!args.json_logs)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    // Load configuration
    let mut config = GraphConfig::from_env();
    if let Some(name) = args.name.clone() {
        config.name = name;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(graph = %config.name, "Starting bestrate");

    let graph = Arc::new(RateGraph::new(config));
    let session = Session::new(graph.clone(), args.format);
    let mut stdout = tokio::io::stdout();

    let mut finished = false;
    if args.demo {
        info!("Replaying demo");
        let script = demo::script();
        match drive(&session, script.as_bytes(), &mut stdout).await? {
            Some(summary) => info!(responses = summary.responses, "Demo complete"),
            None => finished = true,
        }
    }

    if !finished {
        let summary = match &args.input {
            Some(path) => {
                info!(path = %path.display(), "Reading requests from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                drive(&session, BufReader::new(file), &mut stdout).await?
            }
            None => {
                info!("Reading requests from stdin, Ctrl+C or `exit` to stop");
                drive(&session, BufReader::new(tokio::io::stdin()), &mut stdout).await?
            }
        };
        if let Some(summary) = summary {
            info!(
                lines = summary.lines,
                invalid = summary.invalid,
                responses = summary.responses,
                "Input complete"
            );
        }
    }

    let stats = graph.stats();
    info!(
        graph = %graph.name(),
        vertices = stats.vertices,
        edges = stats.edges,
        metrics = %stats.metrics.to_json(),
        "Shutdown complete"
    );
    Ok(())
}

/// Run a session until EOF, `exit` or Ctrl+C. `None` means interrupted.
async fn drive<R>(
    session: &Session,
    reader: R,
    stdout: &mut tokio::io::Stdout,
) -> anyhow::Result<Option<SessionSummary>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        summary = session.run(reader, stdout) => summary.map(Some),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Shutdown signal received");
            Ok(None)
        }
    }
}
