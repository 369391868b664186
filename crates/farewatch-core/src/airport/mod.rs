//! Airport reference data.
//!
//! This module resolves IATA codes for request validation and powers the
//! airport autocomplete lookup.

mod directory;
mod model;

pub use directory::{AirportDirectory, AirportLookup};
pub use model::Airport;
