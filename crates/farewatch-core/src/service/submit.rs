//! Preference submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::airport::AirportLookup;
use crate::error::StoreError;
use crate::preference::{ChannelMethod, PreferenceExtras, PreferenceId, UserStore};
use crate::request::{RawSearchRequest, ValidationError, is_valid_email, validate};

/// How the submitter wants to be notified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Email address.
    pub email: Option<String>,
    /// Telegram chat ID or handle.
    pub telegram_handle: Option<String>,
}

impl Contact {
    /// Trims both fields, lowercases the email and rejects unusable input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingContact`] if both are blank and
    /// [`ValidationError::InvalidEmail`] for a malformed address.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let clean = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let email = clean(&self.email).map(|e| e.to_lowercase());
        let telegram_handle = clean(&self.telegram_handle);

        if email.is_none() && telegram_handle.is_none() {
            return Err(ValidationError::MissingContact);
        }
        if let Some(email) = &email
            && !is_valid_email(email)
        {
            return Err(ValidationError::InvalidEmail {
                value: email.clone(),
            });
        }

        Ok(Self {
            email,
            telegram_handle,
        })
    }
}

/// Errors from submitting a preference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The submitted fields were rejected.
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// Storage rejected or failed the write.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Validates a submission and stores it as a standing preference.
///
/// Finds or creates the user, enables a channel for each given contact and
/// saves the preference in a single transaction.
///
/// # Errors
///
/// Returns [`SubmitError::Invalid`] for bad input (nothing is written) and
/// [`SubmitError::Store`] if storage fails.
pub async fn submit_preference<S, L>(
    store: &S,
    airports: &L,
    raw: &RawSearchRequest,
    contact: &Contact,
    extras: &PreferenceExtras,
    today: NaiveDate,
) -> Result<PreferenceId, SubmitError>
where
    S: UserStore + ?Sized,
    L: AirportLookup + ?Sized,
{
    let request = validate(raw, airports, today)?;
    let contact = contact.normalized()?;
    let extras = normalize_extras(extras)?;

    let mut channels = Vec::new();
    if contact.email.is_some() {
        channels.push(ChannelMethod::Email);
    }
    if contact.telegram_handle.is_some() {
        channels.push(ChannelMethod::Telegram);
    }

    let (user_id, id) = store
        .save_submission(
            contact.email.as_deref(),
            contact.telegram_handle.as_deref(),
            &channels,
            &request,
            &extras,
        )
        .await?;
    info!(
        preference_id = %id,
        user_id = %user_id,
        "Saved preference {} -> {} on {}",
        request.departure_airport(),
        request.arrival_airport(),
        request.target_departure()
    );
    Ok(id)
}

fn normalize_extras(extras: &PreferenceExtras) -> Result<PreferenceExtras, ValidationError> {
    if let Some(price) = extras.max_price
        && !(price.is_finite() && price > 0.0)
    {
        return Err(ValidationError::InvalidMaxPrice);
    }

    Ok(PreferenceExtras {
        max_price: extras.max_price,
        preferred_airline: extras
            .preferred_airline
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::airport::AirportDirectory;
    use crate::preference::{PreferenceStore, SqliteStore};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn raw() -> RawSearchRequest {
        RawSearchRequest {
            target_departure: "2025-08-02".into(),
            return_date: "2025-08-10".into(),
            departure_airport: "muc".into(),
            arrival_airport: "hnd".into(),
            currency: "eur".into(),
            seat_class: "1".into(),
        }
    }

    fn email_contact(email: &str) -> Contact {
        Contact {
            email: Some(email.to_string()),
            telegram_handle: None,
        }
    }

    #[tokio::test]
    async fn test_submit_creates_user_channel_and_preference() {
        let store = SqliteStore::in_memory().await.unwrap();
        let directory = AirportDirectory::embedded().unwrap();
        let contact = Contact {
            email: Some(" Ola@Example.com ".into()),
            telegram_handle: Some("4242".into()),
        };

        let extras = PreferenceExtras::default();
        let id = submit_preference(&store, &directory, &raw(), &contact, &extras, today())
            .await
            .unwrap();

        let pending = store.list_pending(today()).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].preference.id, id);
        assert_eq!(pending[0].owner.email.as_deref(), Some("ola@example.com"));
        assert_eq!(
            pending[0].owner.channels,
            vec![ChannelMethod::Email, ChannelMethod::Telegram]
        );
    }

    #[tokio::test]
    async fn test_same_contact_reuses_user() {
        let store = SqliteStore::in_memory().await.unwrap();
        let directory = AirportDirectory::embedded().unwrap();
        let contact = email_contact("ola@example.com");
        let extras = PreferenceExtras::default();

        for _ in 0..2 {
            submit_preference(&store, &directory, &raw(), &contact, &extras, today())
                .await
                .unwrap();
        }

        let pending = store.list_pending(today()).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].preference.user_id, pending[1].preference.user_id);
    }

    #[tokio::test]
    async fn test_invalid_submission_writes_nothing() {
        let store = SqliteStore::in_memory().await.unwrap();
        let directory = AirportDirectory::embedded().unwrap();
        let contact = email_contact("a@example.com");
        let no_extras = PreferenceExtras::default();

        let mut same = raw();
        same.arrival_airport = "MUC".into();
        let err = submit_preference(&store, &directory, &same, &contact, &no_extras, today())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Invalid(ValidationError::SameAirport { .. })
        ));

        let err = submit_preference(
            &store,
            &directory,
            &raw(),
            &Contact::default(),
            &no_extras,
            today(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, SubmitError::Invalid(ValidationError::MissingContact));

        let extras = PreferenceExtras {
            max_price: Some(-1.0),
            preferred_airline: None,
        };
        let err = submit_preference(&store, &directory, &raw(), &contact, &extras, today())
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::Invalid(ValidationError::InvalidMaxPrice));

        assert!(store.list_pending(today()).await.unwrap().is_empty());
    }

    #[test]
    fn test_contact_normalization() {
        let contact = Contact {
            email: Some("   ".into()),
            telegram_handle: Some(" @farewatch ".into()),
        }
        .normalized()
        .unwrap();
        assert_eq!(contact.email, None);
        assert_eq!(contact.telegram_handle.as_deref(), Some("@farewatch"));

        assert!(matches!(
            email_contact("nope").normalized(),
            Err(ValidationError::InvalidEmail { .. })
        ));
    }
}
