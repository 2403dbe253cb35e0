use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

pub type SweepCallback = Arc<dyn Fn() + Send + Sync>;

/// Registers the retention sweep on every configured cron spec and starts
/// the scheduler. The callback prunes expired monitor history and dead
/// usage-limiter windows.
pub async fn configure_sweep_jobs(
    cron_specs: &[String],
    callback: SweepCallback,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    for spec in cron_specs {
        let label = spec.clone();
        let cb = callback.clone();
        let job = Job::new_async(spec.as_str(), move |_id, _l| {
            let cb = cb.clone();
            let cron_label = label.clone();
            Box::pin(async move {
                tracing::debug!(target: "scheduler", cron = %cron_label, "sweep job triggered");
                cb();
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(target: "scheduler", cron = %spec, "sweep job registered");
    }
    scheduler.start().await?;
    Ok(scheduler)
}
