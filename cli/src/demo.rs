//! Built-in demo script.

/// Two exchanges quoting BTC/USD, then the five reference queries.
/// The last one names a vertex that is never registered.
pub const DEMO_SCRIPT: &[&str] = &[
    "2017-11-01T09:42:23+00:00 KRAKEN BTC USD 1000.0 0.0009",
    "2017-11-01T09:43:23+00:00 GDAX BTC USD 1001.0 0.0008",
    "EXCHANGE_RATE_REQUEST KRAKEN BTC GDAX USD",
    "EXCHANGE_RATE_REQUEST KRAKEN USD GDAX BTC",
    "EXCHANGE_RATE_REQUEST GDAX USD KRAKEN BTC",
    "EXCHANGE_RATE_REQUEST GDAX BTC KRAKEN USD",
    "EXCHANGE_RATE_REQUEST GDAX BTC KRAKEN RMB",
];

/// The script as newline-terminated input.
pub fn script() -> String {
    DEMO_SCRIPT.iter().map(|line| format!("{}\n", line)).collect()
}
