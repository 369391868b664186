//! Search request model types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cabin class of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatClass {
    /// Economy.
    #[default]
    Economy,
    /// Premium economy.
    PremiumEconomy,
    /// Business.
    Business,
    /// First.
    First,
}

impl SeatClass {
    /// All cabin classes in provider code order.
    pub const ALL: [Self; 4] = [
        Self::Economy,
        Self::PremiumEconomy,
        Self::Business,
        Self::First,
    ];

    /// Maps a form code (`1`..`4`) to a cabin class.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Economy),
            "2" => Some(Self::PremiumEconomy),
            "3" => Some(Self::Business),
            "4" => Some(Self::First),
            _ => None,
        }
    }

    /// Provider numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Economy => 1,
            Self::PremiumEconomy => 2,
            Self::Business => 3,
            Self::First => 4,
        }
    }

    /// Stored name, e.g. `PREMIUM_ECONOMY`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }

    /// Parses a stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::PremiumEconomy => "Premium economy",
            Self::Business => "Business",
            Self::First => "First",
        }
    }
}

impl std::fmt::Display for SeatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Raw trip parameters as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchRequest {
    /// Departure date, `YYYY-MM-DD`.
    pub target_departure: String,
    /// Return date, `YYYY-MM-DD`.
    pub return_date: String,
    /// Departure airport code.
    pub departure_airport: String,
    /// Arrival airport code.
    pub arrival_airport: String,
    /// Currency code.
    pub currency: String,
    /// Seat class code `1`..`4`.
    pub seat_class: String,
}

/// A validated, normalized flight search.
///
/// Only [`validate`](super::validate) (or a stored preference that went
/// through it) can produce one, so every instance is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchRequest {
    departure_airport: String,
    arrival_airport: String,
    target_departure: NaiveDate,
    return_date: NaiveDate,
    currency: String,
    seat_class: SeatClass,
}

impl SearchRequest {
    pub(crate) fn from_parts(
        departure_airport: String,
        arrival_airport: String,
        target_departure: NaiveDate,
        return_date: NaiveDate,
        currency: String,
        seat_class: SeatClass,
    ) -> Self {
        Self {
            departure_airport,
            arrival_airport,
            target_departure,
            return_date,
            currency,
            seat_class,
        }
    }

    /// Departure airport IATA code.
    #[must_use]
    pub fn departure_airport(&self) -> &str {
        &self.departure_airport
    }

    /// Arrival airport IATA code.
    #[must_use]
    pub fn arrival_airport(&self) -> &str {
        &self.arrival_airport
    }

    /// Target departure date.
    #[must_use]
    pub const fn target_departure(&self) -> NaiveDate {
        self.target_departure
    }

    /// Return date.
    #[must_use]
    pub const fn return_date(&self) -> NaiveDate {
        self.return_date
    }

    /// Currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Cabin class.
    #[must_use]
    pub const fn seat_class(&self) -> SeatClass {
        self.seat_class
    }
}

impl From<&SearchRequest> for farewatch_provider::SearchQuery {
    fn from(request: &SearchRequest) -> Self {
        Self {
            departure_id: request.departure_airport.clone(),
            arrival_id: request.arrival_airport.clone(),
            outbound_date: request.target_departure,
            return_date: request.return_date,
            currency: request.currency.clone(),
            cabin_class: request.seat_class.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_class_codes() {
        assert_eq!(SeatClass::from_code("1"), Some(SeatClass::Economy));
        assert_eq!(SeatClass::from_code(" 4 "), Some(SeatClass::First));
        assert_eq!(SeatClass::from_code("0"), None);
        assert_eq!(SeatClass::from_code("ECONOMY"), None);
        for class in SeatClass::ALL {
            assert_eq!(SeatClass::from_code(&class.code().to_string()), Some(class));
            assert_eq!(SeatClass::from_name(class.as_str()), Some(class));
        }
    }

    #[test]
    fn test_seat_class_serde_uses_stored_names() {
        let json = serde_json::to_string(&SeatClass::PremiumEconomy).unwrap_or_default();
        assert_eq!(json, "\"PREMIUM_ECONOMY\"");
    }
}
