//! Message templates and composition.

use serde::{Deserialize, Serialize};

use crate::matcher::FlightMatch;
use crate::preference::FlightPreference;
use crate::request::DATE_FORMAT;

/// Subject and body templates with `{placeholder}` fields.
///
/// Known placeholders: `{from}`, `{to}`, `{date}`, `{return_date}`,
/// `{seat_class}`, `{currency}`, `{price}`, `{airline}`, `{departs_at}`,
/// `{link}`. Unknown placeholders are left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Subject template.
    pub subject: String,
    /// Body template.
    pub body: String,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            subject: "We found your flight: {from} -> {to} on {date}".to_string(),
            body: "A flight matching your search is available.\n\
                   \n\
                   Route: {from} -> {to}\n\
                   Departure: {departs_at}\n\
                   Return: {return_date}\n\
                   Class: {seat_class}\n\
                   Price: {price}\n\
                   Airline: {airline}\n\
                   \n\
                   Book here: {link}\n"
                .to_string(),
        }
    }
}

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl Message {
    /// Subject and body as one block of text, for channels without subjects.
    #[must_use]
    pub fn as_text(&self) -> String {
        format!("{}\n\n{}", self.subject, self.body)
    }
}

/// Renders a notification for a matched preference.
#[must_use]
pub fn compose(
    template: &Template,
    preference: &FlightPreference,
    found: &FlightMatch,
    link: Option<&str>,
) -> Message {
    let request = &preference.request;
    let price = found.price.map_or_else(
        || "not quoted".to_string(),
        |p| format!("{p:.2} {}", request.currency()),
    );
    let date = found
        .departure_date()
        .unwrap_or_else(|| request.target_departure())
        .format(DATE_FORMAT)
        .to_string();

    let fields = [
        ("from", request.departure_airport().to_string()),
        ("to", request.arrival_airport().to_string()),
        ("date", date),
        (
            "return_date",
            request.return_date().format(DATE_FORMAT).to_string(),
        ),
        ("seat_class", request.seat_class().display_name().to_string()),
        ("currency", request.currency().to_string()),
        ("price", price),
        (
            "airline",
            found
                .itinerary
                .airline
                .clone()
                .unwrap_or_else(|| "any".to_string()),
        ),
        ("departs_at", found.itinerary.departs_at.clone()),
        (
            "link",
            link.unwrap_or("no link available").to_string(),
        ),
    ];

    Message {
        subject: render(&template.subject, &fields),
        body: render(&template.body, &fields),
    }
}

fn render(template: &str, fields: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let name = &after[..end];
            fields
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, end))
        });

        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::preference::{PreferenceId, UserId};
    use crate::request::{SearchRequest, SeatClass};
    use chrono::NaiveDate;
    use farewatch_provider::{GroupCategory, Itinerary};

    fn preference() -> FlightPreference {
        FlightPreference {
            id: PreferenceId::new(1),
            user_id: UserId::new(1),
            request: SearchRequest::from_parts(
                "MUC".into(),
                "HND".into(),
                NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 8, 10).unwrap(),
                "EUR".into(),
                SeatClass::Economy,
            ),
            max_price: None,
            preferred_airline: None,
        }
    }

    fn found(price: Option<f64>) -> FlightMatch {
        FlightMatch {
            category: GroupCategory::Best,
            itinerary: Itinerary::new("2025-08-02 10:00").with_link("https://provider/x"),
            price,
        }
    }

    #[test]
    fn test_default_template_mentions_route_date_and_link() {
        let message = compose(
            &Template::default(),
            &preference(),
            &found(Some(812.5)),
            Some("https://provider/x"),
        );
        assert_eq!(message.subject, "We found your flight: MUC -> HND on 2025-08-02");
        assert!(message.body.contains("Route: MUC -> HND"));
        assert!(message.body.contains("Return: 2025-08-10"));
        assert!(message.body.contains("Price: 812.50 EUR"));
        assert!(message.body.contains("Book here: https://provider/x"));
    }

    #[test]
    fn test_missing_link_and_price() {
        let message = compose(&Template::default(), &preference(), &found(None), None);
        assert!(message.body.contains("Price: not quoted"));
        assert!(message.body.contains("no link available"));
    }

    #[test]
    fn test_unknown_placeholders_are_kept() {
        let template = Template {
            subject: "{from}{to} {nope} {".into(),
            body: "{{date}}".into(),
        };
        let message = compose(&template, &preference(), &found(None), None);
        assert_eq!(message.subject, "MUCHND {nope} {");
        assert_eq!(message.body, "{2025-08-02}");
    }

    #[test]
    fn test_as_text_joins_subject_and_body() {
        let message = Message {
            subject: "s".into(),
            body: "b".into(),
        };
        assert_eq!(message.as_text(), "s\n\nb");
    }
}
