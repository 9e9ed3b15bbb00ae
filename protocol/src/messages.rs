//! Wire messages.
//!
//! One request per line, fields separated by whitespace:
//!
//! ```text
//! 2017-11-01T09:42:23+00:00 KRAKEN BTC USD 1000.0 0.0009
//! EXCHANGE_RATE_REQUEST KRAKEN BTC GDAX USD
//! ```
//!
//! A rate request is answered with a `BEST_RATES_BEGIN` line, one line per
//! vertex on the path, and `BEST_RATES_END`.

use bestrate_common::{parse_rate, QuoteUpdate, ValidationError, ValidationResult, VertexId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keyword opening a rate request line.
pub const RATE_REQUEST_KEYWORD: &str = "EXCHANGE_RATE_REQUEST";
/// Keyword opening a rate response.
pub const RESPONSE_BEGIN: &str = "BEST_RATES_BEGIN";
/// Line closing a rate response.
pub const RESPONSE_END: &str = "BEST_RATES_END";
/// Keyword ending an interactive session.
pub const EXIT_KEYWORD: &str = "exit";
/// Rate printed when no rate is available.
pub const NO_RATE: &str = "none";

const QUOTE_FIELDS: usize = 6;
const RATE_REQUEST_FIELDS: usize = 5;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Price update.
    Quote(QuoteUpdate),
    /// Best rate query.
    RateRequest(RateRequest),
    /// End of session.
    Exit,
}

impl Request {
    /// Parse one input line.
    ///
    /// Any line starting with `exit` ends the session, whatever follows.
    pub fn parse(line: &str) -> ValidationResult<Self> {
        if line.trim_start().starts_with(EXIT_KEYWORD) {
            return Ok(Request::Exit);
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => Err(ValidationError::new("empty request")),
            [keyword, ..] if *keyword == RATE_REQUEST_KEYWORD => {
                RateRequest::from_fields(&fields).map(Request::RateRequest)
            }
            _ => parse_quote(&fields).map(Request::Quote),
        }
    }
}

impl FromStr for Request {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_quote(fields: &[&str]) -> ValidationResult<QuoteUpdate> {
    let [timestamp, exchange, source, destination, forward, backward] = fields else {
        return Err(ValidationError::new(format!(
            "price update needs {} fields, got {}",
            QUOTE_FIELDS,
            fields.len()
        )));
    };
    QuoteUpdate::parse(
        timestamp,
        exchange,
        source,
        destination,
        parse_rate("forward_rate", forward)?,
        parse_rate("backward_rate", backward)?,
    )
}

/// Query for the best rate between two vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateRequest {
    /// Vertex converted from.
    pub source: VertexId,
    /// Vertex converted to.
    pub destination: VertexId,
}

impl RateRequest {
    /// Create a new rate request.
    pub fn new(source: VertexId, destination: VertexId) -> Self {
        Self {
            source,
            destination,
        }
    }

    fn from_fields(fields: &[&str]) -> ValidationResult<Self> {
        let [_, source_exchange, source_currency, destination_exchange, destination_currency] =
            fields
        else {
            return Err(ValidationError::new(format!(
                "{} needs {} fields, got {}",
                RATE_REQUEST_KEYWORD,
                RATE_REQUEST_FIELDS,
                fields.len()
            )));
        };
        Ok(Self::new(
            VertexId::new(*source_exchange, *source_currency),
            VertexId::new(*destination_exchange, *destination_currency),
        ))
    }
}

impl fmt::Display for RateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            RATE_REQUEST_KEYWORD,
            self.source.exchange,
            self.source.currency,
            self.destination.exchange,
            self.destination.currency
        )
    }
}

/// Answer to a [`RateRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRatesResponse {
    /// Vertex converted from.
    pub source: VertexId,
    /// Vertex converted to.
    pub destination: VertexId,
    /// Best rate; `None` when unreachable or unknown.
    pub rate: Option<f64>,
    /// Vertices on the best path, both ends included.
    pub path: Vec<VertexId>,
    /// Why no rate could be given, when the query itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BestRatesResponse {
    /// Response carrying a resolved path. An empty path yields no rate.
    pub fn found(request: &RateRequest, rate: f64, path: Vec<VertexId>) -> Self {
        Self {
            source: request.source.clone(),
            destination: request.destination.clone(),
            rate: (!path.is_empty()).then_some(rate),
            path,
            reason: None,
        }
    }

    /// Response with no rate and no path.
    pub fn unavailable(request: &RateRequest) -> Self {
        Self {
            source: request.source.clone(),
            destination: request.destination.clone(),
            rate: None,
            path: Vec::new(),
            reason: None,
        }
    }

    /// Attach the reason no rate is given. Only the JSON form carries it;
    /// the text form stays `none` with no path lines.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Header line.
    pub fn begin_line(&self) -> String {
        let rate = match self.rate {
            Some(rate) => format!("{:?}", rate),
            None => NO_RATE.to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            RESPONSE_BEGIN,
            self.source.exchange,
            self.source.currency,
            self.destination.exchange,
            self.destination.currency,
            rate
        )
    }

    /// All response lines, markers included.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.path.len() + 2);
        lines.push(self.begin_line());
        lines.extend(self.path.iter().map(VertexId::path_line));
        lines.push(RESPONSE_END.to_string());
        lines
    }

    /// Serialize as a single JSON line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for BestRatesResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(src_ex: &str, src: &str, dst_ex: &str, dst: &str) -> RateRequest {
        RateRequest::new(VertexId::new(src_ex, src), VertexId::new(dst_ex, dst))
    }

    #[test]
    fn test_parse_quote_line() {
        let parsed = Request::parse("2017-11-01T09:42:23+00:00 KRAKEN BTC USD 1000.0 0.0009").unwrap();
        match parsed {
            Request::Quote(quote) => {
                assert_eq!(quote.source_vertex(), VertexId::new("KRAKEN", "BTC"));
                assert_eq!(quote.destination_vertex(), VertexId::new("KRAKEN", "USD"));
                assert_eq!(quote.forward_rate, 1000.0);
                assert_eq!(quote.backward_rate, 0.0009);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rate_request_line() {
        let parsed: Request = "EXCHANGE_RATE_REQUEST KRAKEN BTC GDAX USD".parse().unwrap();
        assert_eq!(
            parsed,
            Request::RateRequest(request("KRAKEN", "BTC", "GDAX", "USD"))
        );
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let parsed = Request::parse("  EXCHANGE_RATE_REQUEST\tKRAKEN BTC  GDAX USD \n").unwrap();
        assert!(matches!(parsed, Request::RateRequest(_)));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(Request::parse("exit").unwrap(), Request::Exit);
        assert_eq!(Request::parse("  exit now").unwrap(), Request::Exit);
        assert_eq!(Request::parse("exit\r").unwrap(), Request::Exit);
        assert!(Request::parse("EXIT").is_err());
    }

    #[test]
    fn test_wrong_field_counts_rejected() {
        assert!(Request::parse("").is_err());
        assert!(Request::parse("EXCHANGE_RATE_REQUEST KRAKEN BTC GDAX").is_err());
        assert!(Request::parse("EXCHANGE_RATE_REQUEST KRAKEN BTC GDAX USD EUR").is_err());
        assert!(Request::parse("2017-11-01T09:42:23+00:00 KRAKEN BTC USD 1000.0").is_err());
    }

    #[test]
    fn test_non_numeric_rate_rejected() {
        let err = Request::parse("2017-11-01T09:42:23+00:00 KRAKEN BTC USD abc 0.0009").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("forward_rate"));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let err = Request::parse("hello KRAKEN BTC USD 1000.0 0.0009").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("timestamp"));
    }

    #[test]
    fn test_rate_request_display_round_trips() {
        let req = request("KRAKEN", "BTC", "GDAX", "USD");
        assert_eq!(req.to_string(), "EXCHANGE_RATE_REQUEST KRAKEN BTC GDAX USD");
        assert_eq!(
            Request::parse(&req.to_string()).unwrap(),
            Request::RateRequest(req)
        );
    }

    #[test]
    fn test_response_with_path() {
        let req = request("KRAKEN", "BTC", "GDAX", "USD");
        let response = BestRatesResponse::found(
            &req,
            1001.0,
            vec![
                VertexId::new("KRAKEN", "BTC"),
                VertexId::new("GDAX", "BTC"),
                VertexId::new("GDAX", "USD"),
            ],
        );

        assert_eq!(
            response.to_string(),
            "BEST_RATES_BEGIN KRAKEN BTC GDAX USD 1001.0\n\
             KRAKEN, BTC\n\
             GDAX, BTC\n\
             GDAX, USD\n\
             BEST_RATES_END"
        );
    }

    #[test]
    fn test_unreachable_response_has_no_rate() {
        let req = request("KRAKEN", "BTC", "GDAX", "EUR");
        let response = BestRatesResponse::found(&req, 0.0, Vec::new());

        assert_eq!(response.rate, None);
        assert_eq!(
            response.lines(),
            vec![
                "BEST_RATES_BEGIN KRAKEN BTC GDAX EUR none".to_string(),
                "BEST_RATES_END".to_string(),
            ]
        );
        assert_eq!(response, BestRatesResponse::unavailable(&req));
    }

    #[test]
    fn test_response_json() {
        let req = request("KRAKEN", "BTC", "KRAKEN", "USD");
        let response = BestRatesResponse::found(
            &req,
            1000.0,
            vec![VertexId::new("KRAKEN", "BTC"), VertexId::new("KRAKEN", "USD")],
        );

        let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(json["rate"], 1000.0);
        assert_eq!(json["source"]["exchange"], "KRAKEN");
        assert_eq!(json["path"][1]["currency"], "USD");

        let unavailable = BestRatesResponse::unavailable(&req).to_json().unwrap();
        assert!(unavailable.contains("\"rate\":null"));
        assert!(!unavailable.contains("reason"));
    }

    #[test]
    fn test_reason_only_in_json() {
        let req = request("GDAX", "BTC", "KRAKEN", "RMB");
        let response = BestRatesResponse::unavailable(&req)
            .with_reason("Destination vertex KRAKEN_RMB is not registered");

        assert_eq!(
            response.lines(),
            vec![
                "BEST_RATES_BEGIN GDAX BTC KRAKEN RMB none".to_string(),
                "BEST_RATES_END".to_string(),
            ]
        );
        let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(json["reason"], "Destination vertex KRAKEN_RMB is not registered");
    }
}
