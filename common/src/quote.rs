//! Quote events fed into the rate graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ValidationError, ValidationResult};
use crate::identifiers::{Currency, Exchange, VertexId};
use crate::time::{parse_timestamp, Timestamp};

/// One observation of a two-way rate between two currencies at one exchange.
///
/// Forward and backward rates describe a single observation and are always
/// applied together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteUpdate {
    /// When the quote was observed.
    pub timestamp: Timestamp,
    /// Exchange quoting both currencies.
    pub exchange: Exchange,
    /// Currency converted from by the forward rate.
    pub source: Currency,
    /// Currency converted to by the forward rate.
    pub destination: Currency,
    /// Units of destination per unit of source.
    pub forward_rate: f64,
    /// Units of source per unit of destination.
    pub backward_rate: f64,
}

impl QuoteUpdate {
    /// Create a validated quote.
    pub fn new(
        timestamp: Timestamp,
        exchange: Exchange,
        source: Currency,
        destination: Currency,
        forward_rate: f64,
        backward_rate: f64,
    ) -> ValidationResult<Self> {
        if !exchange.is_valid() {
            return Err(ValidationError::with_field(
                "exchange",
                format!("exchange '{}' must be a non-empty token", exchange),
            ));
        }
        if !source.is_valid() {
            return Err(ValidationError::with_field(
                "source_currency",
                format!("currency '{}' must be a non-empty token", source),
            ));
        }
        if !destination.is_valid() {
            return Err(ValidationError::with_field(
                "destination_currency",
                format!("currency '{}' must be a non-empty token", destination),
            ));
        }
        if source == destination {
            return Err(ValidationError::with_field(
                "destination_currency",
                format!("quote converts {} into itself", source),
            ));
        }
        check_rate("forward_rate", forward_rate)?;
        check_rate("backward_rate", backward_rate)?;

        Ok(Self {
            timestamp,
            exchange,
            source,
            destination,
            forward_rate,
            backward_rate,
        })
    }

    /// Create a validated quote from raw fields.
    pub fn parse(
        timestamp: &str,
        exchange: &str,
        source: &str,
        destination: &str,
        forward_rate: f64,
        backward_rate: f64,
    ) -> ValidationResult<Self> {
        Self::new(
            parse_timestamp(timestamp)?,
            Exchange::new(exchange),
            Currency::new(source),
            Currency::new(destination),
            forward_rate,
            backward_rate,
        )
    }

    /// Vertex the forward rate converts from.
    pub fn source_vertex(&self) -> VertexId {
        VertexId::new(self.exchange.clone(), self.source.clone())
    }

    /// Vertex the forward rate converts to.
    pub fn destination_vertex(&self) -> VertexId {
        VertexId::new(self.exchange.clone(), self.destination.clone())
    }
}

impl fmt::Display for QuoteUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {:?} {:?}",
            self.timestamp.to_rfc3339(),
            self.exchange,
            self.source,
            self.destination,
            self.forward_rate,
            self.backward_rate
        )
    }
}

/// Parse a rate token as a float.
pub fn parse_rate(field: &str, raw: &str) -> ValidationResult<f64> {
    raw.parse::<f64>().map_err(|_| {
        ValidationError::with_field(field, format!("'{}' is not a number", raw))
    })
}

// Zero reads as "unreachable" in the path table and negative rates break
// the max-product relaxation.
fn check_rate(field: &str, rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() {
        return Err(ValidationError::with_field(
            field,
            format!("rate {} is not finite", rate),
        ));
    }
    if rate <= 0.0 {
        return Err(ValidationError::with_field(
            field,
            format!("rate {} must be positive", rate),
        ));
    }
    Ok(())
}
