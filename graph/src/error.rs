//! Rate graph error types.

use bestrate_common::{ValidationError, VertexId};
use thiserror::Error;

/// Errors that can occur in the rate graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed quote or query; the event is dropped.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query references vertices that were never registered.
    /// Each side is reported independently.
    #[error("{}", describe_missing(.source_vertex, .destination_vertex))]
    NotFound {
        source_vertex: Option<VertexId>,
        destination_vertex: Option<VertexId>,
    },

    /// A route between the two vertices can loop a cycle whose rates
    /// multiply above 1, so the rate grows without bound.
    #[error(
        "No best rate from {source_vertex} to {destination_vertex}: route reaches a cycle with rate product above 1 at {}",
        join_vertices(.cycle_vertices)
    )]
    Arbitrage {
        source_vertex: VertexId,
        destination_vertex: VertexId,
        /// Gaining-cycle vertices on the way, in registration order.
        cycle_vertices: Vec<VertexId>,
    },

    /// Registry, store and table disagree. Indicates a defect, not bad input.
    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

impl GraphError {
    /// Check if this error signals a defect rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GraphError::InternalInvariantViolation(_))
    }

    /// Get error code for logs and responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::Validation(_) => "INVALID_INPUT",
            GraphError::NotFound { .. } => "VERTEX_NOT_FOUND",
            GraphError::Arbitrage { .. } => "ARBITRAGE_CYCLE",
            GraphError::InternalInvariantViolation(_) => "INTERNAL_ERROR",
        }
    }

    /// Missing vertices, source first.
    pub fn missing_vertices(&self) -> Vec<&VertexId> {
        match self {
            GraphError::NotFound {
                source_vertex,
                destination_vertex,
            } => source_vertex.iter().chain(destination_vertex.iter()).collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        GraphError::InternalInvariantViolation(message.into())
    }
}

fn describe_missing(source: &Option<VertexId>, destination: &Option<VertexId>) -> String {
    match (source, destination) {
        (Some(s), Some(d)) => format!(
            "Source vertex {} and destination vertex {} are not registered",
            s, d
        ),
        (Some(s), None) => format!("Source vertex {} is not registered", s),
        (None, Some(d)) => format!("Destination vertex {} is not registered", d),
        (None, None) => "Vertex not registered".to_string(),
    }
}

fn join_vertices(vertices: &[VertexId]) -> String {
    vertices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_each_side() {
        let err = GraphError::NotFound {
            source_vertex: None,
            destination_vertex: Some(VertexId::new("KRAKEN", "RMB")),
        };
        assert_eq!(
            err.to_string(),
            "Destination vertex KRAKEN_RMB is not registered"
        );
        assert_eq!(err.missing_vertices(), vec![&VertexId::new("KRAKEN", "RMB")]);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invariant_is_fatal() {
        let err = GraphError::invariant("table corrupted");
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_arbitrage_is_not_fatal() {
        let err = GraphError::Arbitrage {
            source_vertex: VertexId::new("KRAKEN", "BTC"),
            destination_vertex: VertexId::new("GDAX", "USD"),
            cycle_vertices: vec![VertexId::new("KRAKEN", "BTC"), VertexId::new("KRAKEN", "USD")],
        };
        assert!(!err.is_fatal());
        assert_eq!(err.error_code(), "ARBITRAGE_CYCLE");
        assert!(err.to_string().ends_with("at KRAKEN_BTC, KRAKEN_USD"));
    }

    #[test]
    fn test_validation_converts() {
        let err: GraphError = ValidationError::new("bad").into();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_fatal());
    }
}
