//! Ordered registry of known (exchange, currency) vertices.

use bestrate_common::{Timestamp, VertexId};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::store::RateStore;

/// Identity rate between the same currency at two exchanges.
pub const IDENTITY_RATE: f64 = 1.0;

/// Dense position of a vertex in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIndex(pub(crate) usize);

impl fmt::Display for VertexIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of [`VertexRegistry::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Index of the vertex.
    pub index: VertexIndex,
    /// Whether this call registered it.
    pub is_new: bool,
}

/// Insertion-ordered set of vertices. Grows only.
#[derive(Debug, Default)]
pub struct VertexRegistry {
    vertices: Vec<VertexId>,
    index: HashMap<VertexId, VertexIndex>,
}

impl VertexRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vertex if unknown.
    ///
    /// A new vertex gets a rate store slot and an identity edge in both
    /// directions to every registered vertex holding the same currency,
    /// stamped with `registered_at`. Ensuring a known vertex has no effect.
    pub fn ensure(
        &mut self,
        vertex: &VertexId,
        store: &mut RateStore,
        registered_at: Timestamp,
    ) -> GraphResult<Registration> {
        if let Some(&index) = self.index.get(vertex) {
            return Ok(Registration {
                index,
                is_new: false,
            });
        }

        let index = store.add_slot();
        if index.0 != self.vertices.len() {
            return Err(GraphError::invariant(format!(
                "rate store slot {} does not match registry position {} for {}",
                index,
                self.vertices.len(),
                vertex
            )));
        }

        let peers: Vec<VertexIndex> = self
            .iter()
            .filter(|(_, other)| other.same_currency(vertex))
            .map(|(peer, _)| peer)
            .collect();
        for peer in peers {
            store.set_edge(peer, index, IDENTITY_RATE, registered_at)?;
            store.set_edge(index, peer, IDENTITY_RATE, registered_at)?;
            debug!(vertex = %vertex, peer = %self.vertices[peer.0], "Seeded identity edge");
        }

        self.vertices.push(vertex.clone());
        self.index.insert(vertex.clone(), index);

        Ok(Registration {
            index,
            is_new: true,
        })
    }

    /// Look up a vertex's index.
    pub fn index_of(&self, vertex: &VertexId) -> Option<VertexIndex> {
        self.index.get(vertex).copied()
    }

    /// Whether the vertex is registered.
    pub fn contains(&self, vertex: &VertexId) -> bool {
        self.index.contains_key(vertex)
    }

    /// Get the vertex at an index.
    pub fn vertex(&self, index: VertexIndex) -> Option<&VertexId> {
        self.vertices.get(index.0)
    }

    /// Number of registered vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if no vertex is registered.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate vertices in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexIndex, &VertexId)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexIndex(i), v))
    }
}
