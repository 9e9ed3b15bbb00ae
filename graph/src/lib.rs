//! bestrate Rate Graph
//!
//! Best achievable conversion rates over a streamed exchange rate graph.
//!
//! Each vertex is one currency at one exchange. Quotes add directed edges
//! in both directions; the same currency at two exchanges is linked at par.
//! Queries return the path with the highest product of rates.
//!
//! # Example
//!
//! ```rust
//! use bestrate_graph::{GraphConfig, RateGraph};
//!
//! let graph = RateGraph::new(GraphConfig::named("Sydney Exchange"));
//! graph.submit_quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009)?;
//! graph.submit_quote("2017-11-01T09:43:23+00:00", "GDAX", "BTC", "USD", 1001.0, 0.0008)?;
//!
//! let best = graph.best_rate_between("KRAKEN", "BTC", "GDAX", "USD")?;
//! assert_eq!(best.rate, 1001.0);
//! assert_eq!(best.path.len(), 3);
//! # Ok::<(), bestrate_graph::GraphError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod registry;
pub mod state;
pub mod store;
pub mod table;

pub use config::GraphConfig;
pub use engine::{BestRate, GraphStats, RateGraph, SharedRateGraph};
pub use error::{GraphError, GraphResult};
pub use metrics::MetricsSnapshot;
pub use processor::{UpdateOutcome, UpdateReport};
pub use registry::{VertexIndex, VertexRegistry};
pub use store::{Edge, RateStore};
pub use table::PathTable;
