//! Line dispatch between the wire format and the rate graph.

use anyhow::Context;
use clap::ValueEnum;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use bestrate_graph::{GraphError, SharedRateGraph, UpdateOutcome};
use bestrate_protocol::{BestRatesResponse, RateRequest, Request};

/// How responses are written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `BEST_RATES_BEGIN … BEST_RATES_END` blocks.
    #[default]
    Text,
    /// One JSON object per response.
    Json,
}

/// What the caller should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Write these lines and read the next request.
    Continue(Vec<String>),
    /// Line was malformed and dropped.
    Rejected,
    /// Stop reading.
    Exit,
}

/// Counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub lines: u64,
    pub invalid: u64,
    pub responses: u64,
}

/// Feeds parsed lines into a shared rate graph.
pub struct Session {
    graph: SharedRateGraph,
    format: OutputFormat,
}

impl Session {
    /// Create a new session.
    pub fn new(graph: SharedRateGraph, format: OutputFormat) -> Self {
        Self { graph, format }
    }

    /// Handle one input line.
    ///
    /// Bad input is logged and skipped. Only an internal invariant
    /// violation is returned as an error.
    pub fn handle_line(&self, line: &str) -> anyhow::Result<LineOutcome> {
        if line.trim().is_empty() {
            return Ok(LineOutcome::Continue(Vec::new()));
        }

        match Request::parse(line) {
            Ok(Request::Exit) => Ok(LineOutcome::Exit),
            Ok(Request::Quote(quote)) => {
                match self.graph.apply_quote(&quote) {
                    Ok(report) => {
                        if report.outcome == UpdateOutcome::Discarded {
                            debug!(line, "Quote older than stored rate");
                        }
                    }
                    Err(e) => return Err(fatal(e)),
                }
                Ok(LineOutcome::Continue(Vec::new()))
            }
            Ok(Request::RateRequest(request)) => {
                let response = self.answer(&request)?;
                Ok(LineOutcome::Continue(self.render(&response)?))
            }
            Err(e) => {
                warn!(line, error = %e, code = e.error_code(), field = ?e.field, "Invalid input");
                Ok(LineOutcome::Rejected)
            }
        }
    }

    fn answer(&self, request: &RateRequest) -> anyhow::Result<BestRatesResponse> {
        match self
            .graph
            .best_rate(&request.source, &request.destination)
        {
            Ok(best) => Ok(BestRatesResponse::found(request, best.rate, best.path)),
            Err(e) if !e.is_fatal() => {
                match &e {
                    GraphError::NotFound {
                        source_vertex,
                        destination_vertex,
                    } => {
                        if let Some(vertex) = source_vertex {
                            warn!(vertex = %vertex, "Source vertex not registered");
                        }
                        if let Some(vertex) = destination_vertex {
                            warn!(vertex = %vertex, "Destination vertex not registered");
                        }
                    }
                    _ => warn!(request = %request, code = e.error_code(), "No rate available"),
                }
                Ok(BestRatesResponse::unavailable(request).with_reason(e.to_string()))
            }
            Err(e) => Err(fatal(e)),
        }
    }

    fn render(&self, response: &BestRatesResponse) -> anyhow::Result<Vec<String>> {
        match self.format {
            OutputFormat::Text => Ok(response.lines()),
            OutputFormat::Json => Ok(vec![response
                .to_json()
                .context("Failed to serialize response")?]),
        }
    }

    /// Process every line from `reader` until EOF or `exit`.
    pub async fn run<R, W>(&self, reader: R, writer: &mut W) -> anyhow::Result<SessionSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = SessionSummary::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await.context("Failed to read input")? {
            summary.lines += 1;

            match self.handle_line(&line)? {
                LineOutcome::Exit => {
                    info!("Exit requested");
                    break;
                }
                LineOutcome::Rejected => summary.invalid += 1,
                LineOutcome::Continue(output) => {
                    if output.is_empty() {
                        continue;
                    }
                    summary.responses += 1;
                    for out in output {
                        writer.write_all(out.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    writer.flush().await?;
                }
            }
        }

        Ok(summary)
    }
}

fn fatal(e: GraphError) -> anyhow::Error {
    error!(error = %e, code = e.error_code(), "Rate graph invariant violated");
    anyhow::Error::new(e).context("Rate graph is inconsistent")
}
