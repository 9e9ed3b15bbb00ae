//! bestrate Common Types
//!
//! This crate contains shared types used across bestrate,
//! including vertex identifiers, timestamps and quote validation.

pub mod identifiers;
pub mod quote;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use quote::*;
pub use error::*;
pub use time::*;
