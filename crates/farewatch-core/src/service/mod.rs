//! Services that connect validation, storage and the provider.

mod fetch;
mod submit;

pub use fetch::{FetchError, FlightSource, ProviderSource};
pub use submit::{Contact, SubmitError, submit_preference};
