//! Matching fetched snapshots against preferences.

use chrono::NaiveDate;
use farewatch_provider::{FlightSnapshot, GroupCategory, Itinerary, ItineraryGroup};

use crate::preference::FlightPreference;

/// What an itinerary must satisfy to trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCriteria<'a> {
    /// Exact departure date.
    pub target_departure: NaiveDate,
    /// Highest acceptable price. An itinerary without a price never passes.
    pub max_price: Option<f64>,
    /// Required airline, compared case-insensitively.
    pub preferred_airline: Option<&'a str>,
}

impl<'a> MatchCriteria<'a> {
    /// Matches on departure date only.
    #[must_use]
    pub const fn on(target_departure: NaiveDate) -> Self {
        Self {
            target_departure,
            max_price: None,
            preferred_airline: None,
        }
    }

    /// Criteria for a stored preference, including its price and airline filters.
    #[must_use]
    pub fn for_preference(preference: &'a FlightPreference) -> Self {
        Self {
            target_departure: preference.request.target_departure(),
            max_price: preference.max_price,
            preferred_airline: preference
                .preferred_airline
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty()),
        }
    }

    fn accepts(&self, group: &ItineraryGroup, itinerary: &Itinerary) -> bool {
        if itinerary.departure_date() != Some(self.target_departure) {
            return false;
        }

        if let Some(max_price) = self.max_price {
            match itinerary.price.or(group.price) {
                Some(price) if price <= max_price => {}
                _ => return false,
            }
        }

        if let Some(wanted) = self.preferred_airline {
            let operated = itinerary
                .airline
                .as_deref()
                .is_some_and(|airline| airline.trim().eq_ignore_ascii_case(wanted));
            if !operated {
                return false;
            }
        }

        true
    }
}

/// A matching itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightMatch {
    /// List the itinerary came from.
    pub category: GroupCategory,
    /// The itinerary.
    pub itinerary: Itinerary,
    /// Itinerary price, falling back to its group's price.
    pub price: Option<f64>,
}

impl FlightMatch {
    /// Departure date of the match.
    #[must_use]
    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.itinerary.departure_date()
    }
}

/// Result of matching a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// The first acceptable itinerary in provider order.
    Found(FlightMatch),
    /// No itinerary was acceptable.
    NoMatch,
}

impl MatchResult {
    /// Returns true if an itinerary matched.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Finds the first itinerary satisfying `criteria`.
///
/// Groups are scanned in provider order ("best" before "other"), without
/// ranking by price.
#[must_use]
pub fn find_match(snapshot: &FlightSnapshot, criteria: &MatchCriteria<'_>) -> MatchResult {
    snapshot
        .itineraries()
        .find(|(group, itinerary)| criteria.accepts(group, itinerary))
        .map_or(MatchResult::NoMatch, |(group, itinerary)| {
            MatchResult::Found(FlightMatch {
                category: group.category,
                itinerary: itinerary.clone(),
                price: itinerary.price.or(group.price),
            })
        })
}

/// All itineraries satisfying `criteria`, in provider order.
#[must_use]
pub fn matching_itineraries<'s>(
    snapshot: &'s FlightSnapshot,
    criteria: &MatchCriteria<'_>,
) -> Vec<&'s Itinerary> {
    snapshot
        .itineraries()
        .filter(|(group, itinerary)| criteria.accepts(group, itinerary))
        .map(|(_, itinerary)| itinerary)
        .collect()
}

/// Deep link to the provider's results page, if the snapshot carries one.
///
/// Falls back to the first itinerary link when the search itself has none.
#[must_use]
pub fn extract_link(snapshot: &FlightSnapshot) -> Option<&str> {
    snapshot.search_link.as_deref().or_else(|| {
        snapshot
            .itineraries()
            .find_map(|(_, itinerary)| itinerary.link.as_deref())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farewatch_provider::PayloadFormat;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn group(
        category: GroupCategory,
        price: Option<f64>,
        itineraries: Vec<Itinerary>,
    ) -> ItineraryGroup {
        ItineraryGroup {
            category,
            price,
            itineraries,
        }
    }

    fn snapshot(groups: Vec<ItineraryGroup>) -> FlightSnapshot {
        FlightSnapshot {
            format: PayloadFormat::ItineraryGroups,
            groups,
            search_link: None,
        }
    }

    #[test]
    fn test_matches_exact_date_only() {
        let snap = snapshot(vec![group(
            GroupCategory::Best,
            None,
            vec![
                Itinerary::new("2025-08-01 09:00").with_link("d1"),
                Itinerary::new("2025-08-02 10:00").with_link("d2"),
                Itinerary::new("2025-08-03 11:00").with_link("d3"),
            ],
        )]);

        let criteria = MatchCriteria::on(date(2025, 8, 2));
        let all = matching_itineraries(&snap, &criteria);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].link.as_deref(), Some("d2"));

        let MatchResult::Found(found) = find_match(&snap, &criteria) else {
            panic!("expected a match");
        };
        assert_eq!(found.departure_date(), Some(date(2025, 8, 2)));
    }

    #[test]
    fn test_empty_snapshot_is_no_match() {
        let criteria = MatchCriteria::on(date(2025, 8, 2));
        assert_eq!(
            find_match(&FlightSnapshot::new(PayloadFormat::ItineraryGroups), &criteria),
            MatchResult::NoMatch
        );
    }

    #[test]
    fn test_other_dates_are_no_match() {
        let snap = snapshot(vec![group(
            GroupCategory::Other,
            None,
            vec![Itinerary::new("2025-08-05 10:00")],
        )]);
        assert!(!find_match(&snap, &MatchCriteria::on(date(2025, 8, 2))).is_found());
    }

    #[test]
    fn test_first_match_in_provider_order() {
        let snap = snapshot(vec![
            group(
                GroupCategory::Best,
                Some(900.0),
                vec![Itinerary::new("2025-08-02 18:00").with_link("best")],
            ),
            group(
                GroupCategory::Other,
                Some(400.0),
                vec![Itinerary::new("2025-08-02 06:00").with_link("other")],
            ),
        ]);

        let MatchResult::Found(found) = find_match(&snap, &MatchCriteria::on(date(2025, 8, 2)))
        else {
            panic!("expected a match");
        };
        assert_eq!(found.category, GroupCategory::Best);
        assert_eq!(found.itinerary.link.as_deref(), Some("best"));
        assert_eq!(found.price, Some(900.0));
    }

    #[test]
    fn test_max_price_filters_and_unknown_price_fails() {
        let snap = snapshot(vec![
            group(GroupCategory::Best, Some(900.0), vec![Itinerary::new("2025-08-02 18:00")]),
            group(GroupCategory::Other, None, vec![Itinerary::new("2025-08-02 12:00")]),
            group(
                GroupCategory::Other,
                Some(950.0),
                vec![Itinerary::new("2025-08-02 06:00").with_price(450.0).with_link("cheap")],
            ),
        ]);

        let criteria = MatchCriteria {
            max_price: Some(500.0),
            ..MatchCriteria::on(date(2025, 8, 2))
        };
        let MatchResult::Found(found) = find_match(&snap, &criteria) else {
            panic!("expected a match");
        };
        assert_eq!(found.itinerary.link.as_deref(), Some("cheap"));
        assert_eq!(found.price, Some(450.0));
    }

    #[test]
    fn test_preferred_airline_ignores_case() {
        let snap = snapshot(vec![group(
            GroupCategory::Best,
            None,
            vec![
                Itinerary::new("2025-08-02 08:00").with_airline("Lufthansa"),
                Itinerary::new("2025-08-02 09:00"),
                Itinerary::new("2025-08-02 10:00").with_airline("ANA").with_link("ana"),
            ],
        )]);

        let criteria = MatchCriteria {
            preferred_airline: Some("ana"),
            ..MatchCriteria::on(date(2025, 8, 2))
        };
        let MatchResult::Found(found) = find_match(&snap, &criteria) else {
            panic!("expected a match");
        };
        assert_eq!(found.itinerary.link.as_deref(), Some("ana"));
    }

    #[test]
    fn test_extract_link_prefers_search_link() {
        let mut snap = snapshot(vec![group(
            GroupCategory::Best,
            None,
            vec![
                Itinerary::new("2025-08-02 08:00"),
                Itinerary::new("2025-08-02 09:00").with_link("https://provider/x"),
            ],
        )]);
        assert_eq!(extract_link(&snap), Some("https://provider/x"));

        snap.search_link = Some("https://provider/search".into());
        assert_eq!(extract_link(&snap), Some("https://provider/search"));

        assert_eq!(
            extract_link(&FlightSnapshot::new(PayloadFormat::DateGrid)),
            None
        );
    }
}
