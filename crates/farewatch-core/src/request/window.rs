//! Month-based trip windows.

use std::str::FromStr;

use chrono::{Days, Month, NaiveDate};

use super::model::RawSearchRequest;
use super::validation::{DATE_FORMAT, ValidationError};

/// A departure/return date pair derived from a month name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripWindow {
    departure: NaiveDate,
    return_date: NaiveDate,
}

impl TripWindow {
    /// Departs on the first day of `month_name` in `year` and returns
    /// `trip_length_days` later.
    ///
    /// Month names are English, full or abbreviated (`Sep` or `Sept`), in
    /// any case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BadDateFormat`] if the month is unknown or
    /// the resulting dates are out of range.
    pub fn from_month(
        month_name: &str,
        year: i32,
        trip_length_days: u32,
    ) -> Result<Self, ValidationError> {
        let bad_month = || ValidationError::BadDateFormat {
            field: "target_departure",
            value: format!("{month_name} {year}"),
        };

        let name = match month_name.trim() {
            name if name.eq_ignore_ascii_case("sept") => "sep",
            name => name,
        };
        let month = Month::from_str(name).map_err(|_| bad_month())?;
        let departure =
            NaiveDate::from_ymd_opt(year, month.number_from_month(), 1).ok_or_else(bad_month)?;
        let return_date = departure
            .checked_add_days(Days::new(u64::from(trip_length_days)))
            .ok_or_else(|| ValidationError::BadDateFormat {
                field: "return_date",
                value: format!("{departure} + {trip_length_days} days"),
            })?;

        Ok(Self {
            departure,
            return_date,
        })
    }

    /// Departure date.
    #[must_use]
    pub const fn departure(&self) -> NaiveDate {
        self.departure
    }

    /// Return date.
    #[must_use]
    pub const fn return_date(&self) -> NaiveDate {
        self.return_date
    }

    /// Writes both dates into a raw request in the accepted format.
    pub fn apply_to(&self, raw: &mut RawSearchRequest) {
        raw.target_departure = self.departure.format(DATE_FORMAT).to_string();
        raw.return_date = self.return_date.format(DATE_FORMAT).to_string();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_month_plus_length() {
        let window = TripWindow::from_month("August", 2025, 8).unwrap();
        assert_eq!(window.departure(), NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(window.return_date(), NaiveDate::from_ymd_opt(2025, 8, 9).unwrap());
    }

    #[test]
    fn test_month_names_ignore_case() {
        let window = TripWindow::from_month("  december ", 2024, 1).unwrap();
        assert_eq!(window.return_date(), NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
        assert!(TripWindow::from_month("JAN", 2026, 0).is_ok());
    }

    #[test]
    fn test_return_date_rolls_into_next_year() {
        let window = TripWindow::from_month("December", 2024, 31).unwrap();
        assert_eq!(window.departure(), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(window.return_date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_september_abbreviations() {
        let september = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        for name in ["Sept", "SEPT", "sep", "September"] {
            let window = TripWindow::from_month(name, 2025, 7).unwrap();
            assert_eq!(window.departure(), september, "{name}");
        }
        assert!(TripWindow::from_month("Septe", 2025, 7).is_err());
    }

    #[test]
    fn test_unknown_month_is_bad_date_format() {
        let err = TripWindow::from_month("Smarch", 2025, 3).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::BadDateFormat {
                field: "target_departure",
                ..
            }
        ));
    }

    #[test]
    fn test_apply_to_fills_raw_dates() {
        let mut raw = RawSearchRequest::default();
        TripWindow::from_month("march", 2026, 1).unwrap().apply_to(&mut raw);
        assert_eq!(raw.target_departure, "2026-03-01");
        assert_eq!(raw.return_date, "2026-03-02");
    }
}
