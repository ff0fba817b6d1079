//! Caller-driven polling of generation status.
//!
//! The server never polls on its own. Clients repeat the idempotent status
//! lookup at a fixed interval and stop when the job completes, when a lookup
//! fails, when they run out of attempts, or when they cancel.

use crate::models::{ImageJob, JobStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 40;

/// Anything that can report a generation's current status.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, generation_id: &str) -> Result<JobStatus>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Total status checks, including the first. Zero is treated as one.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

enum Attempt {
    Pending,
    Failed(Error),
}

#[derive(Debug, Clone, Default)]
pub struct JobPoller {
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Poll `source` until the job completes.
    ///
    /// The first check runs immediately. Lookup errors end polling at once:
    /// the provider never reports a terminal failure state, so a failing
    /// lookup is the only failure signal there is.
    pub async fn wait_for_completion(
        &self,
        source: &dyn JobStatusSource,
        generation_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageJob> {
        let attempts = self.policy.max_attempts.max(1);
        let strategy = FixedInterval::new(self.policy.interval).take(attempts as usize - 1);

        let polling = RetryIf::spawn(
            strategy,
            || async move {
                match source.job_status(generation_id).await {
                    Ok(JobStatus::Complete { url }) => Ok(url),
                    Ok(JobStatus::Pending) => {
                        debug!("Generation {} still pending", generation_id);
                        Err(Attempt::Pending)
                    }
                    Err(e) => Err(Attempt::Failed(e)),
                }
            },
            |attempt: &Attempt| matches!(attempt, Attempt::Pending),
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Polling for generation {} cancelled", generation_id);
                Err(Error::Cancelled)
            }
            outcome = polling => match outcome {
                Ok(url) => {
                    info!("Generation {} complete: {}", generation_id, url);
                    Ok(ImageJob {
                        id: generation_id.to_string(),
                        status: JobStatus::Complete { url },
                    })
                }
                Err(Attempt::Pending) => {
                    warn!(
                        "Giving up on generation {} after {} status checks",
                        generation_id, attempts
                    );
                    Err(Error::PollExhausted {
                        id: generation_id.to_string(),
                        attempts,
                    })
                }
                Err(Attempt::Failed(e)) => {
                    warn!("Status check for generation {} failed: {}", generation_id, e);
                    Err(e)
                }
            },
        }
    }
}
