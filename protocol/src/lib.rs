//! bestrate Protocol Messages
//!
//! Parsing of price update and rate request lines, and rendering of
//! `BEST_RATES_BEGIN … BEST_RATES_END` responses as text or JSON.
//! The rate graph itself has no knowledge of this format.

pub mod messages;

pub use messages::*;
