//! Airport model.

use serde::{Deserialize, Serialize};

/// An airport known to the reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// Three-letter IATA code, uppercase.
    pub iata: String,
    /// Airport name.
    pub name: String,
    /// City served.
    pub city: String,
    /// ISO 3166 country code.
    #[serde(default)]
    pub country: String,
}

impl Airport {
    /// Returns a display string like `Munich Airport (MUC), Munich`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} ({}), {}", self.name, self.iata, self.city)
    }

    /// Returns true if city or code equals or starts with the lowercase query.
    fn is_close_match(&self, query_lower: &str) -> bool {
        let city = self.city.to_lowercase();
        let code = self.iata.to_lowercase();
        city.starts_with(query_lower) || code.starts_with(query_lower)
    }

    /// Returns true if city or name contains the lowercase query.
    fn contains(&self, query_lower: &str) -> bool {
        self.city.to_lowercase().contains(query_lower)
            || self.name.to_lowercase().contains(query_lower)
    }

    pub(super) fn rank(&self, query_lower: &str) -> Option<u8> {
        if self.iata.eq_ignore_ascii_case(query_lower) {
            Some(0)
        } else if self.is_close_match(query_lower) {
            Some(1)
        } else if self.contains(query_lower) {
            Some(2)
        } else {
            None
        }
    }
}
