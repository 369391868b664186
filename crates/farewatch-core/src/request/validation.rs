//! Search request validation.

use chrono::NaiveDate;

use super::model::{RawSearchRequest, SearchRequest, SeatClass};
use crate::airport::AirportLookup;

/// Calendar format accepted for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation error for user-entered trip parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Airport code is malformed or not in the reference directory.
    UnknownAirport {
        /// Form field.
        field: &'static str,
        /// Normalized code as entered.
        code: String,
    },
    /// Departure and arrival airports are the same.
    SameAirport {
        /// The shared code.
        code: String,
    },
    /// A date does not follow `YYYY-MM-DD`.
    BadDateFormat {
        /// Form field.
        field: &'static str,
        /// Value as entered.
        value: String,
    },
    /// Return date precedes the departure date.
    DateOrderViolation {
        /// Departure date.
        departure: NaiveDate,
        /// Return date.
        return_date: NaiveDate,
    },
    /// Departure date is before the validation date.
    PastDeparture {
        /// Departure date.
        departure: NaiveDate,
        /// Date the request was validated on.
        today: NaiveDate,
    },
    /// Seat class code is not one of `1`..`4`.
    InvalidSeatClass {
        /// Value as entered.
        value: String,
    },
    /// Currency is not a three-letter code.
    InvalidCurrency {
        /// Value as entered.
        value: String,
    },
    /// Neither an email address nor a chat handle was given.
    MissingContact,
    /// Email address format is invalid.
    InvalidEmail {
        /// Value as entered.
        value: String,
    },
    /// Maximum price is not a positive number.
    InvalidMaxPrice,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnknownAirport { code, .. } => format!("Unknown airport code: {code}"),
            Self::SameAirport { code } => {
                format!("Departure and arrival airports must differ (both {code})")
            }
            Self::BadDateFormat { value, .. } => {
                format!("Invalid date '{value}', use the YYYY-MM-DD format")
            }
            Self::DateOrderViolation {
                departure,
                return_date,
            } => format!("Return date {return_date} is before departure date {departure}"),
            Self::PastDeparture { departure, today } => {
                format!("Departure date {departure} is in the past (today is {today})")
            }
            Self::InvalidSeatClass { value } => {
                format!("Invalid seat class '{value}', choose a value from 1 to 4")
            }
            Self::InvalidCurrency { value } => {
                format!("Invalid currency '{value}', use a three-letter code")
            }
            Self::MissingContact => "An email address or chat handle is required".to_string(),
            Self::InvalidEmail { value } => format!("Invalid email address: {value}"),
            Self::InvalidMaxPrice => "Maximum price must be a positive number".to_string(),
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UnknownAirport { field, .. } | Self::BadDateFormat { field, .. } => field,
            Self::SameAirport { .. } => "arrival_airport",
            Self::DateOrderViolation { .. } => "return_date",
            Self::PastDeparture { .. } => "target_departure",
            Self::InvalidSeatClass { .. } => "seat_class",
            Self::InvalidCurrency { .. } => "currency",
            Self::MissingContact => "contact",
            Self::InvalidEmail { .. } => "email",
            Self::InvalidMaxPrice => "max_price",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Validate raw trip parameters into a [`SearchRequest`].
///
/// `today` is the validation date: a departure on or after it is accepted
/// even if the scheduler only looks at the request on a later day.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, checking airports, then
/// dates, then currency and seat class.
pub fn validate<L>(
    raw: &RawSearchRequest,
    airports: &L,
    today: NaiveDate,
) -> Result<SearchRequest, ValidationError>
where
    L: AirportLookup + ?Sized,
{
    let departure_airport =
        normalize_airport("departure_airport", &raw.departure_airport, airports)?;
    let arrival_airport = normalize_airport("arrival_airport", &raw.arrival_airport, airports)?;
    if departure_airport == arrival_airport {
        return Err(ValidationError::SameAirport {
            code: departure_airport,
        });
    }

    let target_departure = parse_date("target_departure", &raw.target_departure)?;
    let return_date = parse_date("return_date", &raw.return_date)?;
    if return_date < target_departure {
        return Err(ValidationError::DateOrderViolation {
            departure: target_departure,
            return_date,
        });
    }
    if target_departure < today {
        return Err(ValidationError::PastDeparture {
            departure: target_departure,
            today,
        });
    }

    let currency = normalize_currency(&raw.currency)?;
    let seat_class =
        SeatClass::from_code(&raw.seat_class).ok_or_else(|| ValidationError::InvalidSeatClass {
            value: raw.seat_class.clone(),
        })?;

    Ok(SearchRequest::from_parts(
        departure_airport,
        arrival_airport,
        target_departure,
        return_date,
        currency,
        seat_class,
    ))
}

fn normalize_airport<L>(
    field: &'static str,
    raw: &str,
    airports: &L,
) -> Result<String, ValidationError>
where
    L: AirportLookup + ?Sized,
{
    let code = raw.trim().to_uppercase();
    let well_formed = code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic());
    if !well_formed || airports.resolve(&code).is_none() {
        return Err(ValidationError::UnknownAirport { field, code });
    }
    Ok(code)
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ValidationError::BadDateFormat {
        field,
        value: raw.to_string(),
    })
}

fn normalize_currency(raw: &str) -> Result<String, ValidationError> {
    let currency = raw.trim().to_uppercase();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(currency)
    } else {
        Err(ValidationError::InvalidCurrency {
            value: raw.to_string(),
        })
    }
}

/// Basic email validation.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    // Must contain exactly one @
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') || local.is_empty() {
        return false;
    }

    // Domain must contain at least one dot and no empty labels
    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    !domain.split('.').any(str::is_empty)
}
