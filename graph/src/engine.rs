//! Thread-safe rate graph: quote ingestion and best-rate queries.

use std::sync::Arc;

use bestrate_common::{Currency, Exchange, QuoteUpdate, VertexId};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::processor::UpdateReport;
use crate::state::GraphState;

/// Best achievable conversion between two vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestRate {
    /// Vertex converted from.
    pub source: VertexId,
    /// Vertex converted to.
    pub destination: VertexId,
    /// Product of rates along `path`; 0 when unreachable.
    pub rate: f64,
    /// Vertices visited, source first and destination last.
    /// Empty when unreachable.
    pub path: Vec<VertexId>,
}

impl BestRate {
    /// Whether any path connects the two vertices.
    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// The rate graph.
///
/// Registry, store, path table and staleness flag sit behind a single
/// lock. Updates take it exclusively; a query reads under a shared guard
/// when the table is fresh and rebuilds under an exclusive one otherwise.
pub struct RateGraph {
    state: RwLock<GraphState>,
    metrics: Metrics,
    config: GraphConfig,
}

impl RateGraph {
    /// Create an empty graph.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            state: RwLock::new(GraphState::new()),
            metrics: Metrics::new(),
            config,
        }
    }

    /// Graph name from the configuration.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Apply a validated quote.
    #[instrument(skip(self, quote), fields(graph = %self.config.name, exchange = %quote.exchange))]
    pub fn apply_quote(&self, quote: &QuoteUpdate) -> GraphResult<UpdateReport> {
        let report = self.state.write().apply_quote(quote).map_err(|e| {
            error!(error = %e, "Quote left the graph inconsistent");
            e
        })?;

        self.metrics
            .vertices_registered(report.registered.len() as u64);
        if report.outcome.is_applied() {
            self.metrics.quote_applied();
        } else {
            debug!(quote = %quote, "Discarded quote older than stored rate");
            self.metrics.quote_discarded();
        }
        Ok(report)
    }

    /// Validate raw quote fields and apply them.
    pub fn submit_quote(
        &self,
        timestamp: &str,
        exchange: &str,
        source_currency: &str,
        destination_currency: &str,
        forward_rate: f64,
        backward_rate: f64,
    ) -> GraphResult<UpdateReport> {
        let quote = QuoteUpdate::parse(
            timestamp,
            exchange,
            source_currency,
            destination_currency,
            forward_rate,
            backward_rate,
        )
        .map_err(|e| {
            warn!(error = %e, code = e.error_code(), field = ?e.field, "Rejected quote");
            self.metrics.quote_rejected();
            GraphError::from(e)
        })?;
        self.apply_quote(&quote)
    }

    /// Best rate and path between two vertices.
    ///
    /// Rebuilds the path table first if any quote changed the store since
    /// the last rebuild.
    #[instrument(skip(self), fields(graph = %self.config.name, source = %source, destination = %destination))]
    pub fn best_rate(&self, source: &VertexId, destination: &VertexId) -> GraphResult<BestRate> {
        let result = self.query(source, destination);
        match &result {
            Ok(_) => self.metrics.query(),
            Err(GraphError::NotFound { .. }) => self.metrics.query_not_found(),
            Err(e @ GraphError::Arbitrage { .. }) => {
                warn!(error = %e, "Best rate unbounded");
                self.metrics.query_arbitrage();
            }
            Err(e) => error!(error = %e, "Best rate query failed"),
        }
        result
    }

    /// Best rate between `(exchange, currency)` pairs given as strings.
    pub fn best_rate_between(
        &self,
        source_exchange: &str,
        source_currency: &str,
        destination_exchange: &str,
        destination_currency: &str,
    ) -> GraphResult<BestRate> {
        let source = VertexId::new(
            Exchange::new(source_exchange),
            Currency::new(source_currency),
        );
        let destination = VertexId::new(
            Exchange::new(destination_exchange),
            Currency::new(destination_currency),
        );
        self.best_rate(&source, &destination)
    }

    fn query(&self, source: &VertexId, destination: &VertexId) -> GraphResult<BestRate> {
        {
            let state = self.state.read();
            let (s, d) = state.resolve(source, destination)?;
            if !state.is_stale() {
                debug!("Path table fresh");
                return state.lookup(s, d);
            }
        }

        let mut state = self.state.write();
        // Another query may have rebuilt while we waited.
        if state.is_stale() {
            state.rebuild(self.config.vertex_warn_threshold)?;
            self.metrics.rebuild();
        }
        let state = RwLockWriteGuard::downgrade(state);
        let (s, d) = state.resolve(source, destination)?;
        state.lookup(s, d)
    }

    /// Whether the next query will rebuild the path table.
    pub fn is_stale(&self) -> bool {
        self.state.read().is_stale()
    }

    /// Registered vertices in registration order.
    pub fn vertices(&self) -> Vec<VertexId> {
        self.state
            .read()
            .registry()
            .iter()
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Direct stored rate between two vertices, if any.
    pub fn direct_rate(&self, from: &VertexId, to: &VertexId) -> Option<f64> {
        let state = self.state.read();
        let from = state.registry().index_of(from)?;
        let to = state.registry().index_of(to)?;
        state.store().edge(from, to).map(|edge| edge.rate)
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let state = self.state.read();
        GraphStats {
            vertices: state.registry().len(),
            edges: state.store().edge_count(),
            stale: state.is_stale(),
            metrics: self.metrics.snapshot(),
        }
    }
}

impl Default for RateGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

/// Graph statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub vertices: usize,
    pub edges: usize,
    pub stale: bool,
    pub metrics: MetricsSnapshot,
}

/// Shared rate graph.
pub type SharedRateGraph = Arc<RateGraph>;
