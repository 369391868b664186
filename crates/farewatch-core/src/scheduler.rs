//! The recurring preference run.
//!
//! One run loads every pending preference and, strictly one at a time,
//! fetches a snapshot, matches it, notifies the owner and retires the
//! preference once at least one notification went out. Failures are
//! contained per preference; only a lost store connection ends a run early.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::matcher::{MatchCriteria, MatchResult, extract_link, find_match};
use crate::notify::{Dispatcher, Template, compose};
use crate::preference::{PendingPreference, PreferenceStore};
use crate::service::FlightSource;

/// Scheduler tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    /// Pause after each dispatch, in seconds.
    pub dispatch_pacing_secs: u64,
    /// Days a passed preference is kept before it is purged. `None` keeps
    /// it forever.
    pub retention_days: Option<u32>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            dispatch_pacing_secs: 2,
            retention_days: Some(7),
        }
    }
}

impl SchedulerOptions {
    /// Pause after each dispatch.
    #[must_use]
    pub const fn dispatch_pacing(&self) -> Duration {
        Duration::from_secs(self.dispatch_pacing_secs)
    }
}

/// Errors that end a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Another run holds the run lock.
    #[error("A run is already in progress")]
    AlreadyRunning,

    /// The preference store could not be used.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Pending preferences loaded.
    pub loaded: usize,
    /// Preferences with a matching itinerary.
    pub matched: usize,
    /// Messages delivered.
    pub notified: usize,
    /// Preferences retired after delivery.
    pub retired: usize,
    /// Preferences without a match.
    pub no_match: usize,
    /// Preferences whose fetch failed.
    pub fetch_failures: usize,
    /// Failed or impossible deliveries.
    pub dispatch_failures: usize,
    /// Stale preferences purged at the start of the run.
    pub purged: u64,
}

/// Drives preference runs. Runs never overlap.
pub struct Scheduler {
    store: Arc<dyn PreferenceStore>,
    source: Arc<dyn FlightSource>,
    dispatcher: Dispatcher,
    template: Template,
    options: SchedulerOptions,
    run_lock: Mutex<()>,
}

impl Scheduler {
    /// Creates a scheduler from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        source: Arc<dyn FlightSource>,
        dispatcher: Dispatcher,
        template: Template,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            store,
            source,
            dispatcher,
            template,
            options,
            run_lock: Mutex::new(()),
        }
    }

    /// Runs one pass for the local calendar date.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::run_once_on`].
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        self.run_once_on(Local::now().date_naive()).await
    }

    /// Runs one pass as of `today`.
    ///
    /// # Errors
    ///
    /// - [`RunError::AlreadyRunning`] if another run is in progress
    /// - [`RunError::Store`] if pending preferences cannot be loaded or the
    ///   store connection is lost mid-run
    pub async fn run_once_on(&self, today: NaiveDate) -> Result<RunReport, RunError> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            warn!("Skipping run: previous run still in progress");
            return Err(RunError::AlreadyRunning);
        };

        info!(%today, "Starting preference run");
        let mut report = RunReport::default();

        if let Some(days) = self.options.retention_days {
            report.purged = self.purge(today, days).await?;
        }

        let pending = self.store.list_pending(today).await.inspect_err(|e| {
            error!(stage = "load", error = %e, "Failed to load pending preferences");
        })?;
        report.loaded = pending.len();
        info!("Loaded {} pending preferences", pending.len());

        for item in &pending {
            self.process(item, &mut report).await?;
        }

        info!(
            loaded = report.loaded,
            matched = report.matched,
            notified = report.notified,
            retired = report.retired,
            no_match = report.no_match,
            fetch_failures = report.fetch_failures,
            dispatch_failures = report.dispatch_failures,
            purged = report.purged,
            "Preference run finished"
        );
        Ok(report)
    }

    async fn purge(&self, today: NaiveDate, retention_days: u32) -> Result<u64, RunError> {
        let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(retention_days))) else {
            return Ok(0);
        };

        match self.store.purge_stale(cutoff).await {
            Ok(0) => Ok(0),
            Ok(purged) => {
                info!(%cutoff, "Purged {purged} stale preferences");
                Ok(purged)
            }
            Err(e) if e.is_connection_failure() => {
                error!(stage = "purge", error = %e, "Store unreachable");
                Err(e.into())
            }
            Err(e) => {
                warn!(stage = "purge", error = %e, "Failed to purge stale preferences");
                Ok(0)
            }
        }
    }

    /// Processes one preference. Only a lost store connection is returned.
    async fn process(
        &self,
        item: &PendingPreference,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let preference = &item.preference;
        let id = preference.id;

        let snapshot = match self.source.fetch(&preference.request).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                report.fetch_failures += 1;
                warn!(
                    preference_id = %id,
                    stage = "fetch",
                    error = %e,
                    "Fetch failed, keeping preference"
                );
                return Ok(());
            }
        };

        let criteria = MatchCriteria::for_preference(preference);
        let MatchResult::Found(found) = find_match(&snapshot, &criteria) else {
            report.no_match += 1;
            debug!(preference_id = %id, "No matching flight");
            return Ok(());
        };
        report.matched += 1;

        let link = found
            .itinerary
            .link
            .as_deref()
            .or_else(|| extract_link(&snapshot));
        let message = compose(&self.template, preference, &found, link);

        let targets: Vec<_> = item.owner.deliverable().collect();
        if targets.is_empty() {
            report.dispatch_failures += 1;
            warn!(
                preference_id = %id,
                stage = "dispatch",
                "No enabled channel with an address, keeping preference"
            );
            return Ok(());
        }

        let mut delivered = 0;
        for (method, address) in targets {
            match self.dispatcher.dispatch(method, address, &message).await {
                Ok(()) => {
                    delivered += 1;
                    info!(preference_id = %id, channel = %method, "Notification sent");
                }
                Err(e) => {
                    report.dispatch_failures += 1;
                    warn!(
                        preference_id = %id,
                        stage = "dispatch",
                        channel = %method,
                        error = %e,
                        "Dispatch failed"
                    );
                }
            }
            self.pace().await;
        }
        report.notified += delivered;

        if delivered == 0 {
            return Ok(());
        }

        match self.store.delete(id).await {
            Ok(()) => {
                report.retired += 1;
                info!(preference_id = %id, "Preference retired");
            }
            Err(StoreError::NotFound(_)) => {
                report.retired += 1;
                debug!(preference_id = %id, "Preference already retired");
            }
            Err(e) if e.is_connection_failure() => {
                error!(preference_id = %id, stage = "retire", error = %e, "Store unreachable");
                return Err(e.into());
            }
            Err(e) => {
                error!(
                    preference_id = %id,
                    stage = "retire",
                    error = %e,
                    "Failed to retire preference"
                );
            }
        }

        Ok(())
    }

    async fn pace(&self) {
        let pacing = self.options.dispatch_pacing();
        if !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }
}
