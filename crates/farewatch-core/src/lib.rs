//! # farewatch-core
//!
//! Core logic for farewatch, a flight-price watcher that notifies users
//! when a flight matching their standing search appears.
//!
//! This crate provides:
//! - **Search requests** - validation of raw trip parameters
//! - **Airport directory** - IATA code resolution and autocomplete
//! - **Preference storage** (`SQLite`) - users, channels and standing searches
//! - **Matching** - exact-date matching with price and airline filters
//! - **Notifications** - message templates, email and Telegram transports
//! - **Scheduler** - the recurring fetch, match, notify and retire run

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod airport;
mod error;
pub mod matcher;
pub mod notify;
pub mod preference;
pub mod request;
pub mod scheduler;
pub mod service;
#[cfg(test)]
mod test_support;

pub use airport::{Airport, AirportDirectory, AirportLookup};
pub use error::{Error, Result, StoreError};
pub use matcher::{
    FlightMatch, MatchCriteria, MatchResult, extract_link, find_match, matching_itineraries,
};
pub use notify::{
    DispatchError, Dispatcher, EmailConfig, HttpEmailTransport, Message, TelegramConfig,
    TelegramTransport, Template, Transport, compose,
};
pub use preference::{
    ChannelMethod, FlightPreference, OwnerContact, PendingPreference, PreferenceExtras,
    PreferenceId, PreferenceStore, SqliteStore, UserId, UserStore,
};
pub use request::{
    RawSearchRequest, SearchRequest, SeatClass, TripWindow, ValidationError, validate,
};
pub use scheduler::{RunError, RunReport, Scheduler, SchedulerOptions};
pub use service::{
    Contact, FetchError, FlightSource, ProviderSource, SubmitError, submit_preference,
};
