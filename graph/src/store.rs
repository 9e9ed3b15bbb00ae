//! Sparse storage of the latest accepted rate per ordered vertex pair.

use bestrate_common::Timestamp;
use std::collections::HashMap;

use crate::error::{GraphError, GraphResult};
use crate::registry::VertexIndex;

/// A directed rate observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Units of the target vertex per unit of the origin vertex.
    pub rate: f64,
    /// When the rate was observed.
    pub observed_at: Timestamp,
}

impl Edge {
    /// Create a new edge.
    pub fn new(rate: f64, observed_at: Timestamp) -> Self {
        Self { rate, observed_at }
    }
}

/// Adjacency map keyed by dense vertex index.
///
/// One slot per registered vertex; slots are allocated by the registry and
/// never removed.
#[derive(Debug, Default)]
pub struct RateStore {
    slots: Vec<HashMap<VertexIndex, Edge>>,
}

impl RateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the slot for the next vertex and return its index.
    pub fn add_slot(&mut self) -> VertexIndex {
        self.slots.push(HashMap::new());
        VertexIndex(self.slots.len() - 1)
    }

    /// Number of allocated slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether a slot exists for this vertex.
    pub fn has_slot(&self, index: VertexIndex) -> bool {
        index.0 < self.slots.len()
    }

    /// Get the direct edge between two vertices.
    pub fn edge(&self, from: VertexIndex, to: VertexIndex) -> Option<&Edge> {
        self.slots.get(from.0)?.get(&to)
    }

    /// Overwrite the edge between two vertices.
    pub fn set_edge(
        &mut self,
        from: VertexIndex,
        to: VertexIndex,
        rate: f64,
        observed_at: Timestamp,
    ) -> GraphResult<()> {
        if !self.has_slot(to) {
            return Err(GraphError::invariant(format!(
                "rate store has no slot for target vertex #{}",
                to.0
            )));
        }
        let slot = self.slots.get_mut(from.0).ok_or_else(|| {
            GraphError::invariant(format!("rate store has no slot for vertex #{}", from.0))
        })?;
        slot.insert(to, Edge::new(rate, observed_at));
        Ok(())
    }

    /// Iterate outgoing edges of a vertex.
    pub fn edges_from(&self, from: VertexIndex) -> impl Iterator<Item = (VertexIndex, &Edge)> {
        self.slots
            .get(from.0)
            .into_iter()
            .flat_map(|slot| slot.iter().map(|(to, edge)| (*to, edge)))
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.slots.iter().map(HashMap::len).sum()
    }
}
