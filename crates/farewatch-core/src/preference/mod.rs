//! Flight preferences, their owners and notification channels.

mod model;
mod repository;
mod store;

pub use model::{
    ChannelMethod, FlightPreference, OwnerContact, PendingPreference, PreferenceExtras,
    PreferenceId, UserId,
};
pub use repository::SqliteStore;
pub use store::{PreferenceStore, UserStore};
