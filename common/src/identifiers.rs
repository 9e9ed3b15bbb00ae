//! Identifier types for exchanges, currencies and rate-graph vertices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a trading venue (e.g. `KRAKEN`).
/// Kept verbatim, comparisons are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exchange(String);

impl Exchange {
    /// Create a new exchange name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the name is usable as a single wire token.
    pub fn is_valid(&self) -> bool {
        is_token(&self.0)
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Exchange {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Exchange {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Currency code (e.g. `BTC`, `USD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Check the code is usable as a single wire token.
    pub fn is_valid(&self) -> bool {
        is_token(&self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A vertex of the rate graph: one currency held at one exchange.
///
/// Both halves are stored separately so names containing `_` or any other
/// separator never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId {
    /// Exchange holding the currency.
    pub exchange: Exchange,
    /// Currency held.
    pub currency: Currency,
}

impl VertexId {
    /// Create a new vertex ID.
    pub fn new(exchange: impl Into<Exchange>, currency: impl Into<Currency>) -> Self {
        Self {
            exchange: exchange.into(),
            currency: currency.into(),
        }
    }

    /// Whether two vertices hold the same currency (at any exchange).
    pub fn same_currency(&self, other: &VertexId) -> bool {
        self.currency == other.currency
    }

    /// Render as a path line: `<exchange>, <currency>`.
    pub fn path_line(&self) -> String {
        format!("{}, {}", self.exchange, self.currency)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.exchange, self.currency)
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}
