//! Flight snapshot model and payload decoding.
//!
//! The provider answers different endpoints with different JSON shapes. Each
//! recognized shape is a [`PayloadFormat`] with its own serde model; decoding
//! picks the format from the top-level keys and maps it into the one fixed
//! [`FlightSnapshot`] shape. Unrecognized payloads are rejected here instead
//! of being passed on as "no flights".

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Payload shapes understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Itinerary search: `best_flights` / `other_flights` groups of legs.
    ItineraryGroups,
    /// Date grid: `data.prices[]` with one price per date pair.
    DateGrid,
}

/// Which list of the provider response a group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCategory {
    /// Provider's "best" results.
    Best,
    /// Remaining results.
    Other,
    /// Date-grid cells.
    DateGrid,
}

/// One bookable option: a list of legs sharing a price.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryGroup {
    /// Origin list in the provider response.
    pub category: GroupCategory,
    /// Total price of the group, if quoted.
    pub price: Option<f64>,
    /// Legs in provider order.
    pub itineraries: Vec<Itinerary>,
}

/// A single flight leg (or date-grid cell).
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Departure timestamp exactly as the provider sent it.
    pub departs_at: String,
    /// Return date, only known for date-grid cells.
    pub return_date: Option<NaiveDate>,
    /// Price of this itinerary if quoted separately from its group.
    pub price: Option<f64>,
    /// Operating airline name.
    pub airline: Option<String>,
    /// Deep link to this itinerary on the provider's site.
    pub link: Option<String>,
}

impl Itinerary {
    /// Creates an itinerary departing at the given provider timestamp.
    #[must_use]
    pub fn new(departs_at: impl Into<String>) -> Self {
        Self {
            departs_at: departs_at.into(),
            return_date: None,
            price: None,
            airline: None,
            link: None,
        }
    }

    /// Sets the deep link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Sets the price.
    #[must_use]
    pub const fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the airline.
    #[must_use]
    pub fn with_airline(mut self, airline: impl Into<String>) -> Self {
        self.airline = Some(airline.into());
        self
    }

    /// Calendar date component of the departure timestamp.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` and `YYYY-MM-DDTHH:MM..`.
    #[must_use]
    pub fn departure_date(&self) -> Option<NaiveDate> {
        let date = self
            .departs_at
            .trim()
            .split([' ', 'T'])
            .next()
            .unwrap_or_default();
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }
}

/// Normalized result of one provider query.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSnapshot {
    /// Shape the snapshot was decoded from.
    pub format: PayloadFormat,
    /// Itinerary groups in provider order.
    pub groups: Vec<ItineraryGroup>,
    /// Link to the provider's results page for the whole search.
    pub search_link: Option<String>,
}

impl FlightSnapshot {
    /// Creates an empty snapshot of the given format.
    #[must_use]
    pub const fn new(format: PayloadFormat) -> Self {
        Self {
            format,
            groups: Vec::new(),
            search_link: None,
        }
    }

    /// Returns true if no group holds any itinerary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.itineraries.is_empty())
    }

    /// Iterates over all itineraries with their group, in provider order.
    pub fn itineraries(&self) -> impl Iterator<Item = (&ItineraryGroup, &Itinerary)> {
        self.groups
            .iter()
            .flat_map(|g| g.itineraries.iter().map(move |i| (g, i)))
    }
}

/// Decodes a raw provider body.
///
/// # Errors
///
/// Returns [`Error::EmptyResponse`] for blank, non-JSON or unrecognized
/// bodies and [`Error::Provider`] when the provider reports an error.
pub fn decode_body(body: &str) -> Result<(Value, FlightSnapshot)> {
    if body.trim().is_empty() {
        return Err(Error::EmptyResponse("empty body".into()));
    }
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| Error::EmptyResponse(format!("body is not JSON: {e}")))?;
    let snapshot = decode(&raw)?;
    Ok((raw, snapshot))
}

/// Decodes an already parsed provider payload.
///
/// # Errors
///
/// Same as [`decode_body`].
pub fn decode(raw: &Value) -> Result<FlightSnapshot> {
    let Some(object) = raw.as_object() else {
        return Err(Error::EmptyResponse("payload is not a JSON object".into()));
    };

    if let Some(message) = provider_error(object) {
        return Err(Error::Provider(message));
    }

    match detect_format(object) {
        Some(PayloadFormat::ItineraryGroups) => {
            let payload = GroupsPayload::deserialize(raw)
                .map_err(|e| Error::EmptyResponse(format!("malformed itinerary groups: {e}")))?;
            Ok(payload.into_snapshot())
        }
        Some(PayloadFormat::DateGrid) => {
            let payload = DateGridPayload::deserialize(raw)
                .map_err(|e| Error::EmptyResponse(format!("malformed date grid: {e}")))?;
            Ok(payload.into_snapshot())
        }
        None => {
            let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
            keys.sort_unstable();
            Err(Error::EmptyResponse(format!(
                "unrecognized payload with keys [{}]",
                keys.join(", ")
            )))
        }
    }
}

fn detect_format(object: &serde_json::Map<String, Value>) -> Option<PayloadFormat> {
    if object.contains_key("best_flights") || object.contains_key("other_flights") {
        return Some(PayloadFormat::ItineraryGroups);
    }
    if object
        .get("data")
        .and_then(Value::as_object)
        .is_some_and(|data| data.contains_key("prices"))
    {
        return Some(PayloadFormat::DateGrid);
    }
    None
}

/// Extracts an application error reported inside a successful response.
fn provider_error(object: &serde_json::Map<String, Value>) -> Option<String> {
    if let Some(error) = object.get("error") {
        return Some(match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    }
    if object.get("status").and_then(Value::as_bool) == Some(false) {
        let message = object
            .get("message")
            .map_or_else(|| "status false".to_string(), value_text);
        return Some(message);
    }
    None
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join("; "),
        Value::Object(map) => map
            .get("message")
            .map_or_else(|| value.to_string(), value_text),
        other => other.to_string(),
    }
}

/// Accepts prices as numbers or numeric strings; anything else is "no price".
fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct GroupsPayload {
    #[serde(default)]
    best_flights: Vec<RawGroup>,
    #[serde(default)]
    other_flights: Vec<RawGroup>,
    #[serde(default)]
    search_metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    flights: Vec<RawLeg>,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Option<f64>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    #[serde(default)]
    departure_airport: Option<RawEndpoint>,
    #[serde(default)]
    airline: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    #[serde(default)]
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    google_flights_url: Option<String>,
}

impl GroupsPayload {
    fn into_snapshot(self) -> FlightSnapshot {
        let best = self
            .best_flights
            .into_iter()
            .map(|g| g.into_group(GroupCategory::Best));
        let other = self
            .other_flights
            .into_iter()
            .map(|g| g.into_group(GroupCategory::Other));

        FlightSnapshot {
            format: PayloadFormat::ItineraryGroups,
            groups: best.chain(other).collect(),
            search_link: self.search_metadata.and_then(|m| m.google_flights_url),
        }
    }
}

impl RawGroup {
    fn into_group(self, category: GroupCategory) -> ItineraryGroup {
        let group_link = self.link;
        let itineraries = self
            .flights
            .into_iter()
            .filter_map(|leg| {
                let departs_at = leg.departure_airport?.time?;
                Some(Itinerary {
                    departs_at,
                    return_date: None,
                    price: None,
                    airline: leg.airline,
                    link: leg.link.or_else(|| group_link.clone()),
                })
            })
            .collect();

        ItineraryGroup {
            category,
            price: self.price,
            itineraries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DateGridPayload {
    data: DateGridData,
}

#[derive(Debug, Deserialize)]
struct DateGridData {
    #[serde(default)]
    prices: Vec<RawPriceCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPriceCell {
    departure_date: String,
    #[serde(default)]
    return_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Option<f64>,
}

impl DateGridPayload {
    fn into_snapshot(self) -> FlightSnapshot {
        let itineraries: Vec<Itinerary> = self
            .data
            .prices
            .into_iter()
            .map(|cell| Itinerary {
                departs_at: cell.departure_date,
                return_date: cell
                    .return_date
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                price: cell.price,
                airline: None,
                link: None,
            })
            .collect();

        let groups = if itineraries.is_empty() {
            Vec::new()
        } else {
            vec![ItineraryGroup {
                category: GroupCategory::DateGrid,
                price: None,
                itineraries,
            }]
        };

        FlightSnapshot {
            format: PayloadFormat::DateGrid,
            groups,
            search_link: None,
        }
    }
}
