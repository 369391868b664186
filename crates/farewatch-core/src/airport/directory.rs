//! In-memory airport directory.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::model::Airport;
use crate::Result;

/// Embedded list of major airports.
const EMBEDDED_AIRPORTS: &str = include_str!("../../data/airports.json");

/// Read-only IATA code resolution used by request validation.
pub trait AirportLookup {
    /// Resolves an uppercase IATA code.
    fn resolve(&self, code: &str) -> Option<&Airport>;
}

/// Airport directory keyed by IATA code.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: BTreeMap<String, Airport>,
}

impl AirportDirectory {
    /// Creates a directory from the embedded airport list.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded data cannot be parsed.
    pub fn embedded() -> Result<Self> {
        let airports: Vec<Airport> = serde_json::from_str(EMBEDDED_AIRPORTS)?;
        Ok(Self::from_airports(airports))
    }

    /// Creates a directory from the given airports.
    #[must_use]
    pub fn from_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let mut directory = Self::default();
        directory.extend(airports);
        directory
    }

    /// Adds airports from a JSON file (an array of airport objects).
    ///
    /// Entries with a code already present replace the existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let airports: Vec<Airport> = serde_json::from_str(&content)?;
        let count = airports.len();
        self.extend(airports);
        debug!("Loaded {count} airports from {}", path.display());
        Ok(count)
    }

    /// Adds airports, skipping entries whose code is not three letters.
    pub fn extend(&mut self, airports: impl IntoIterator<Item = Airport>) {
        for mut airport in airports {
            airport.iata = airport.iata.trim().to_uppercase();
            if airport.iata.len() == 3 && airport.iata.chars().all(|c| c.is_ascii_alphabetic()) {
                self.airports.insert(airport.iata.clone(), airport);
            }
        }
    }

    /// Number of known airports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Returns true if the directory holds no airports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Autocomplete search over codes, cities and airport names.
    ///
    /// Queries of one or two characters only match IATA code prefixes.
    /// Longer queries return the exact code first, then airports whose city
    /// or code starts with the query, then city/name substring matches.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Airport> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        if query.chars().count() <= 2 {
            if !query.chars().all(char::is_alphabetic) {
                return Vec::new();
            }
            let prefix = query.to_uppercase();
            return self
                .airports
                .range(prefix.clone()..)
                .take_while(|(code, _)| code.starts_with(&prefix))
                .map(|(_, airport)| airport)
                .take(limit)
                .collect();
        }

        let query_lower = query.to_lowercase();
        let mut ranked: Vec<(u8, &Airport)> = self
            .airports
            .values()
            .filter_map(|airport| airport.rank(&query_lower).map(|rank| (rank, airport)))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().take(limit).map(|(_, a)| a).collect()
    }
}

impl AirportLookup for AirportDirectory {
    fn resolve(&self, code: &str) -> Option<&Airport> {
        self.airports.get(code)
    }
}
