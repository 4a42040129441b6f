use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::pipeline::{Pipeline, RunReport};
use crate::utils::logging::log_system_event;

/// Result of the most recent pipeline run, shown by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    pub report: Option<RunReport>,
    pub error: Option<String>,
}

/// State shared between scheduled runs and the health endpoint.
#[derive(Clone, Default)]
pub struct RunState {
    last: Arc<RwLock<Option<LastRun>>>,
    running: Arc<Mutex<()>>,
}

impl RunState {
    pub async fn last_run(&self) -> Option<LastRun> {
        self.last.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }
}

pub struct NewsScheduler {
    pipeline: Arc<Pipeline>,
    state: RunState,
    interval: Duration,
    scheduler: JobScheduler,
}

impl NewsScheduler {
    pub async fn new(
        pipeline: Arc<Pipeline>,
        state: RunState,
        interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            pipeline,
            state,
            interval,
            scheduler,
        })
    }

    /// Runs the pipeline once right away, then every `interval`.
    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pipeline = self.pipeline.clone();
        let state = self.state.clone();

        let check_job = Job::new_repeated_async(self.interval, move |_uuid, _l| {
            let pipeline = pipeline.clone();
            let state = state.clone();
            Box::pin(async move {
                run_once(&pipeline, &state).await;
            })
        })?;

        self.scheduler.add(check_job).await?;
        self.scheduler.start().await?;

        let pipeline = self.pipeline.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            run_once(&pipeline, &state).await;
        });

        log_system_event(
            "SCHEDULER_STARTED",
            Some(&format!("checking every {} seconds", self.interval.as_secs())),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        log_system_event("SCHEDULER_STOPPED", None);
        Ok(())
    }
}

/// Runs the pipeline unless a run is already in progress.
pub async fn run_once(pipeline: &Pipeline, state: &RunState) -> Option<LastRun> {
    let Ok(_guard) = state.running.try_lock() else {
        tracing::warn!("Previous run still in progress, skipping this tick");
        return None;
    };

    let last = match pipeline.run().await {
        Ok(report) => {
            if report.failed_sources() > 0 {
                tracing::warn!(
                    "{} of {} source(s) failed this run",
                    report.failed_sources(),
                    report.sources.len()
                );
            }
            LastRun {
                finished_at: report.finished_at,
                report: Some(report),
                error: None,
            }
        }
        Err(e) => {
            tracing::error!("Pipeline run failed: {}", e);
            LastRun {
                finished_at: Utc::now(),
                report: None,
                error: Some(e.to_string()),
            }
        }
    };

    *state.last.write().await = Some(last.clone());
    Some(last)
}
