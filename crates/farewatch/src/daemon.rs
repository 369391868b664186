//! Daily cadence for scheduler runs.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use farewatch_core::{RunError, Scheduler};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Runs once immediately, then on every `cron` tick until Ctrl-C.
pub async fn run(scheduler: Arc<Scheduler>, cron: &str) -> Result<()> {
    run_logged(&scheduler).await;

    let mut jobs = JobScheduler::new()
        .await
        .context("Failed to create job scheduler")?;

    let job_scheduler = scheduler.clone();
    let job = Job::new_async_tz(cron, Local, move |_uuid, _lock| {
        let scheduler = job_scheduler.clone();
        Box::pin(async move {
            run_logged(&scheduler).await;
        })
    })
    .with_context(|| format!("Invalid cron expression '{cron}'"))?;

    jobs.add(job).await.context("Failed to add scheduled run")?;
    jobs.start().await.context("Failed to start job scheduler")?;
    info!("Daemon started, runs scheduled at '{cron}' local time");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");
    jobs
        .shutdown()
        .await
        .context("Failed to stop job scheduler")?;
    Ok(())
}

async fn run_logged(scheduler: &Scheduler) {
    match scheduler.run_once().await {
        Ok(report) => info!(
            matched = report.matched,
            retired = report.retired,
            "Scheduled run completed"
        ),
        Err(RunError::AlreadyRunning) => warn!("Scheduled run skipped, previous run still active"),
        Err(e) => error!("Scheduled run failed: {e}"),
    }
}
