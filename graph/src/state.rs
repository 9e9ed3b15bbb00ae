//! Graph state guarded as one consistency unit.

use bestrate_common::VertexId;
use tracing::{debug, info, warn};

use crate::engine::BestRate;
use crate::error::{GraphError, GraphResult};
use crate::registry::{VertexIndex, VertexRegistry};
use crate::store::RateStore;
use crate::table::PathTable;

/// Registry, store, derived table and the flag tying them together.
///
/// The table is a pure function of the store as of the last rebuild;
/// `stale` is set by every store mutation and cleared only by
/// [`GraphState::rebuild`].
#[derive(Debug)]
pub struct GraphState {
    pub(crate) registry: VertexRegistry,
    pub(crate) store: RateStore,
    table: PathTable,
    stale: bool,
}

impl Default for GraphState {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphState {
    /// Create an empty, stale state.
    pub fn new() -> Self {
        Self {
            registry: VertexRegistry::new(),
            store: RateStore::new(),
            table: PathTable::default(),
            stale: true,
        }
    }

    /// Whether the path table lags the store.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Registered vertices.
    pub fn registry(&self) -> &VertexRegistry {
        &self.registry
    }

    /// Stored rates.
    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Rebuild the path table from the store and mark it fresh.
    pub fn rebuild(&mut self, warn_threshold: usize) -> GraphResult<()> {
        let vertices = self.registry.len();
        if vertices > warn_threshold {
            warn!(
                vertices,
                threshold = warn_threshold,
                "Path table rebuild is cubic in vertex count"
            );
        }

        self.table = PathTable::build(vertices, &self.store)?;
        self.stale = false;

        let arbitrage = self.table.arbitrage_vertices();
        if !arbitrage.is_empty() {
            warn!(
                count = arbitrage.len(),
                vertices = ?self.vertex_names(arbitrage),
                "Rates contain a cycle with product above 1"
            );
        }

        info!(
            vertices,
            edges = self.store.edge_count(),
            "Path table rebuilt"
        );
        Ok(())
    }

    /// Resolve both ends of a query, reporting each missing side.
    pub fn resolve(
        &self,
        source: &VertexId,
        destination: &VertexId,
    ) -> GraphResult<(VertexIndex, VertexIndex)> {
        match (
            self.registry.index_of(source),
            self.registry.index_of(destination),
        ) {
            (Some(s), Some(d)) => Ok((s, d)),
            (s, d) => Err(GraphError::NotFound {
                source_vertex: s.is_none().then(|| source.clone()),
                destination_vertex: d.is_none().then(|| destination.clone()),
            }),
        }
    }

    /// Read the best rate and path from a fresh table.
    pub fn lookup(&self, source: VertexIndex, destination: VertexIndex) -> GraphResult<BestRate> {
        if self.stale {
            return Err(GraphError::invariant("lookup against a stale path table"));
        }

        let cycle = self.table.arbitrage_between(source, destination)?;
        if !cycle.is_empty() {
            return Err(GraphError::Arbitrage {
                source_vertex: self.vertex(source)?.clone(),
                destination_vertex: self.vertex(destination)?.clone(),
                cycle_vertices: cycle
                    .into_iter()
                    .map(|index| self.vertex(index).cloned())
                    .collect::<GraphResult<_>>()?,
            });
        }

        let rate = self.table.rate(source, destination)?;
        let path = self
            .table
            .path(source, destination)?
            .into_iter()
            .map(|index| self.vertex(index).cloned())
            .collect::<GraphResult<Vec<_>>>()?;

        let best = BestRate {
            source: self.vertex(source)?.clone(),
            destination: self.vertex(destination)?.clone(),
            rate,
            path,
        };
        debug!(
            source = %best.source,
            destination = %best.destination,
            rate = best.rate,
            hops = best.path.len(),
            "Best rate resolved"
        );
        Ok(best)
    }

    fn vertex_names(&self, indices: &[VertexIndex]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&index| self.registry.vertex(index))
            .map(ToString::to_string)
            .collect()
    }

    fn vertex(&self, index: VertexIndex) -> GraphResult<&VertexId> {
        self.registry
            .vertex(index)
            .ok_or_else(|| GraphError::invariant(format!("vertex {} is not registered", index)))
    }
}
