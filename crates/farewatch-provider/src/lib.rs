//! # farewatch-provider
//!
//! Client for the third-party flight-pricing API used by farewatch.
//!
//! ## Features
//!
//! - **Round-trip search**: one HTTP call per query, no hidden retries
//! - **Versioned decoding**: each known payload shape maps into a single
//!   [`FlightSnapshot`] model; unknown shapes fail instead of looking empty
//! - **Provider errors**: application errors inside 2xx responses are
//!   reported as [`Error::Provider`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use farewatch_provider::{Client, ClientConfig, SearchQuery};
//!
//! let client = Client::new(ClientConfig::default(), api_key)?;
//! let fetched = client.search(&query).await?;
//! for (group, itinerary) in fetched.snapshot.itineraries() {
//!     println!("{:?} {}", group.category, itinerary.departs_at);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod query;
pub mod snapshot;

pub use client::{Client, ClientConfig, FetchedSnapshot};
pub use error::{Error, Result};
pub use query::SearchQuery;
pub use snapshot::{
    FlightSnapshot, GroupCategory, Itinerary, ItineraryGroup, PayloadFormat, decode, decode_body,
};
