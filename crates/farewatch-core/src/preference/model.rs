//! Preference and user model types.

use serde::{Deserialize, Serialize};

use crate::request::SearchRequest;

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a flight preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreferenceId(pub i64);

impl PreferenceId {
    /// Create a new preference ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PreferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification delivery method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMethod {
    /// Email to the user's address.
    Email,
    /// Telegram message to the user's chat.
    Telegram,
}

impl ChannelMethod {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Telegram => "telegram",
        }
    }

    /// Parses a stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "email" => Some(Self::Email),
            "telegram" => Some(Self::Telegram),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChannelMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional filters attached to a preference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceExtras {
    /// Highest acceptable itinerary price, in the request currency.
    pub max_price: Option<f64>,
    /// Airline the itinerary must be operated by.
    pub preferred_airline: Option<String>,
}

/// A user's standing flight search.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPreference {
    /// Preference ID.
    pub id: PreferenceId,
    /// Owning user.
    pub user_id: UserId,
    /// The validated search this preference runs.
    pub request: SearchRequest,
    /// Highest acceptable price.
    pub max_price: Option<f64>,
    /// Required airline.
    pub preferred_airline: Option<String>,
}

/// Contact details of a preference owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerContact {
    /// Email address.
    pub email: Option<String>,
    /// Telegram chat handle.
    pub telegram_handle: Option<String>,
    /// Enabled notification methods.
    pub channels: Vec<ChannelMethod>,
}

impl OwnerContact {
    /// Address to use for a method, if the owner has one.
    #[must_use]
    pub fn address(&self, method: ChannelMethod) -> Option<&str> {
        match method {
            ChannelMethod::Email => self.email.as_deref(),
            ChannelMethod::Telegram => self.telegram_handle.as_deref(),
        }
    }

    /// Enabled methods paired with their address, skipping methods without one.
    pub fn deliverable(&self) -> impl Iterator<Item = (ChannelMethod, &str)> {
        self.channels
            .iter()
            .filter_map(|&method| self.address(method).map(|address| (method, address)))
    }
}

/// A pending preference joined with its owner's contact info.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPreference {
    /// The preference.
    pub preference: FlightPreference,
    /// Owner contact info.
    pub owner: OwnerContact,
}
