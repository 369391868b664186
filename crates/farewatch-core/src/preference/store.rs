//! Storage traits consumed by the scheduler and the submission flow.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::{ChannelMethod, PendingPreference, PreferenceExtras, PreferenceId, UserId};
use crate::error::StoreError;
use crate::request::SearchRequest;

/// Flight preference storage.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preferences departing on or after `as_of`, with owner contact info.
    async fn list_pending(&self, as_of: NaiveDate) -> Result<Vec<PendingPreference>, StoreError>;

    /// Deletes a preference. Returns [`StoreError::NotFound`] if it is gone.
    async fn delete(&self, id: PreferenceId) -> Result<(), StoreError>;

    /// Saves a validated search on behalf of a user.
    async fn create(
        &self,
        user_id: UserId,
        request: &SearchRequest,
        extras: &PreferenceExtras,
    ) -> Result<PreferenceId, StoreError>;

    /// Deletes preferences departing before `cutoff`, returning how many.
    async fn purge_stale(&self, cutoff: NaiveDate) -> Result<u64, StoreError>;
}

/// User and notification channel storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by email or chat handle, creating one if neither matches.
    ///
    /// A contact missing on an existing user is filled in.
    async fn find_or_create_user(
        &self,
        email: Option<&str>,
        telegram_handle: Option<&str>,
    ) -> Result<UserId, StoreError>;

    /// Enables a notification method for a user.
    async fn set_channel_enabled(
        &self,
        user_id: UserId,
        method: ChannelMethod,
    ) -> Result<(), StoreError>;

    /// Finds or creates the user, enables `channels` and saves the search
    /// as one atomic write. Nothing is kept if any step fails.
    async fn save_submission(
        &self,
        email: Option<&str>,
        telegram_handle: Option<&str>,
        channels: &[ChannelMethod],
        request: &SearchRequest,
        extras: &PreferenceExtras,
    ) -> Result<(UserId, PreferenceId), StoreError>;
}
