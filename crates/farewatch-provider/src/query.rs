//! Outbound search query.

use chrono::NaiveDate;

/// Date format the provider expects in query strings.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters for one round-trip search.
///
/// This is the wire-level view of a validated search request: airport codes
/// are already normalized and the cabin class is the provider's numeric code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// IATA code of the departure airport.
    pub departure_id: String,
    /// IATA code of the arrival airport.
    pub arrival_id: String,
    /// Outbound date.
    pub outbound_date: NaiveDate,
    /// Return date.
    pub return_date: NaiveDate,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Provider cabin class code (1 = economy .. 4 = first).
    pub cabin_class: u8,
}

impl SearchQuery {
    /// Builds the query-string pairs sent to the provider.
    ///
    /// `location` is the optional market the provider prices for.
    #[must_use]
    pub fn to_pairs(&self, location: Option<&str>) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("departureId", self.departure_id.clone()),
            ("arrivalId", self.arrival_id.clone()),
            (
                "departureDate",
                self.outbound_date.format(QUERY_DATE_FORMAT).to_string(),
            ),
            (
                "arrivalDate",
                self.return_date.format(QUERY_DATE_FORMAT).to_string(),
            ),
            ("currency", self.currency.clone()),
            ("cabinClass", self.cabin_class.to_string()),
        ];
        if let Some(location) = location {
            pairs.push(("location", location.to_string()));
        }
        pairs
    }
}
