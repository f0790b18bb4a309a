//! Job completion poller
//!
//! Submits a job and polls it until the worker reports a terminal status, the
//! local wait budget runs out or the caller cancels.

use std::sync::Arc;
use std::time::Duration;

use slipway_core::domain::job::{GenerationRequest, Job, JobStatus};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WaitSpec;

/// Shortest accepted delay between two status checks
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);
use crate::error::WaitError;
use crate::repository::JobRepository;

/// Polls job status on a fixed interval
#[derive(Clone)]
pub struct JobPoller {
    jobs: Arc<dyn JobRepository>,
}

/// Progress of one wait, carried into local timeout and cancellation errors
struct WaitProgress {
    job_id: Uuid,
    started: Instant,
    last_status: Option<JobStatus>,
}

impl WaitProgress {
    fn timed_out(&self) -> WaitError {
        WaitError::WaitTimeout {
            job_id: self.job_id,
            elapsed: self.started.elapsed(),
            last_status: self.last_status,
        }
    }

    fn cancelled(&self) -> WaitError {
        WaitError::Cancelled {
            job_id: self.job_id,
            elapsed: self.started.elapsed(),
            last_status: self.last_status,
        }
    }
}

impl JobPoller {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    /// Submit `request`, then wait for the job it creates
    ///
    /// A submission failure is returned as [`WaitError::Submit`] without polling.
    pub async fn submit_and_wait(
        &self,
        request: &GenerationRequest,
        wait: &WaitSpec,
        cancel: &CancellationToken,
    ) -> Result<Job, WaitError> {
        let job = self
            .jobs
            .submit_job(request)
            .await
            .map_err(WaitError::Submit)?;
        info!(job_id = %job.id, status = %job.status, "Job submitted");

        self.wait_for_completion(job.id, wait, cancel).await
    }

    /// Poll `job_id` until it reaches a terminal status
    ///
    /// The first check runs immediately, later ones every `wait.interval`
    /// (at least [`MIN_INTERVAL`]).
    /// `wait.timeout` counts from the start of polling but only applies once a
    /// first check has completed. Cancellation wins over every other event,
    /// including an in-flight status request.
    pub async fn wait_for_completion(
        &self,
        job_id: Uuid,
        wait: &WaitSpec,
        cancel: &CancellationToken,
    ) -> Result<Job, WaitError> {
        let mut progress = WaitProgress {
            job_id,
            started: Instant::now(),
            last_status: None,
        };
        let deadline = progress.started + wait.timeout;

        let interval = wait.interval.max(MIN_INTERVAL);
        if interval != wait.interval {
            warn!(requested = ?wait.interval, interval = ?interval, "Poll interval too short, raised");
        }

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut checked = false;
        let mut attempt = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(progress.cancelled()),
                _ = time::sleep_until(deadline), if checked => return Err(progress.timed_out()),
                _ = ticker.tick() => {}
            }

            attempt += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(progress.cancelled()),
                _ = time::sleep_until(deadline), if checked => return Err(progress.timed_out()),
                fetched = self.jobs.get_job(job_id) => fetched,
            };
            checked = true;

            match fetched {
                Ok(job) => {
                    progress.last_status = Some(job.status);
                    debug!(job_id = %job_id, status = %job.status, attempt, "Polled job status");

                    match job.status {
                        JobStatus::Completed => {
                            info!(
                                job_id = %job_id,
                                elapsed = ?progress.started.elapsed(),
                                attempts = attempt,
                                "Job completed"
                            );
                            return Ok(job);
                        }
                        JobStatus::Failed | JobStatus::Timeout => {
                            return Err(WaitError::JobFailed {
                                job_id,
                                status: job.status,
                                message: job.error_message().to_string(),
                            });
                        }
                        JobStatus::Pending | JobStatus::Processing => {}
                    }
                }
                Err(e) if e.is_not_found() => return Err(WaitError::JobNotFound { job_id }),
                Err(e) if e.is_transient() => {
                    warn!(job_id = %job_id, error = %e, attempt, "Status check failed, retrying");
                }
                Err(e) => return Err(WaitError::Status(e)),
            }
        }
    }
}
