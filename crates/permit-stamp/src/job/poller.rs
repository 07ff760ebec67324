//! Polls the progress of a submitted stamping job and merges the partial
//! per-attachment results into the selection.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tracing::{info_span, Instrument};

use crate::error::PollError;
use crate::model::{JobPhase, StampingJob};
use crate::selection::SelectionState;

use super::schedule::PollSchedule;
use super::transport::StampTransport;
use super::wire::{JobUpdate, PollRequest, PollResponse};

/// Result of a single successful poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job is still running. `applied` attachments were updated.
    Continue { applied: usize },
    /// The job finished; `stamped` attachments were marked stamped.
    Done { applied: usize, stamped: usize },
}

pub struct JobPoller {
    job: StampingJob,
    transport: Arc<dyn StampTransport>,
    schedule: Arc<dyn PollSchedule>,
    max_consecutive_failures: u32,
    consecutive_failures: u32,
}

impl JobPoller {
    /// Takes over a submitted job; the job counts as running from here on.
    pub fn new(
        mut job: StampingJob,
        transport: Arc<dyn StampTransport>,
        schedule: Arc<dyn PollSchedule>,
        max_consecutive_failures: u32,
    ) -> Self {
        if job.phase == JobPhase::Starting {
            job.phase = JobPhase::Running;
        }
        Self {
            job,
            transport,
            schedule,
            max_consecutive_failures: max_consecutive_failures.max(1),
            consecutive_failures: 0,
        }
    }

    pub fn job(&self) -> &StampingJob {
        &self.job
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Delay before the next poll according to the schedule.
    pub fn next_delay(&self) -> Duration {
        self.schedule.next_delay(self.consecutive_failures)
    }

    /// Clears the failure count so polling can continue after an interruption.
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Issues one poll with the held `(jobId, version)` and applies the
    /// response to `selection`.
    ///
    /// A failed poll is returned as an error and counted; once the
    /// configured number of consecutive failures is reached the error is
    /// [`PollError::Exhausted`].
    pub async fn poll_once(
        &mut self,
        selection: &mut SelectionState,
    ) -> Result<PollOutcome, PollError> {
        let request = PollRequest {
            job_id: self.job.job_id.clone(),
            version: self.job.version,
        };
        let span = info_span!(
            "poll_stamp_job",
            job_id = %request.job_id,
            version = request.version,
        );

        let response = self
            .transport
            .poll(&request)
            .instrument(span)
            .await
            .map_err(PollError::Transport)
            .and_then(|response| {
                if response.ok {
                    Ok(response)
                } else {
                    Err(PollError::Rejected(
                        response.text.unwrap_or_else(|| "unknown error".to_string()),
                    ))
                }
            });

        match response {
            Ok(response) => {
                self.consecutive_failures = 0;
                Ok(self.apply(response, selection))
            }
            Err(e) => Err(self.record_failure(e)),
        }
    }

    fn record_failure(&mut self, error: PollError) -> PollError {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.max_consecutive_failures {
            warn!(
                "Giving up polling job {} after {} consecutive failures: {}",
                self.job.job_id, self.consecutive_failures, error
            );
            return PollError::Exhausted {
                attempts: self.consecutive_failures,
                last: error.to_string(),
            };
        }
        debug!(
            "Poll of job {} failed ({}/{}): {}",
            self.job.job_id, self.consecutive_failures, self.max_consecutive_failures, error
        );
        error
    }

    fn apply(&mut self, response: PollResponse, selection: &mut SelectionState) -> PollOutcome {
        let Some(update) = response.update() else {
            debug!(
                "Job {} poll returned '{}', polling again at version {}",
                self.job.job_id,
                response.result.as_deref().unwrap_or("nothing"),
                self.job.version
            );
            return PollOutcome::Continue { applied: 0 };
        };

        if update.version < self.job.version {
            warn!(
                "Discarding stale update for job {}: version {} is older than {}",
                self.job.job_id, update.version, self.job.version
            );
            return PollOutcome::Continue { applied: 0 };
        }

        let applied = self.merge(update, selection);
        self.job.version = update.version;
        self.job.phase = update.status;

        if self.job.phase == JobPhase::Done {
            let stamped = selection.mark_selected_stamped();
            info!(
                "Stamping job {} done at version {}, {} attachments stamped",
                self.job.job_id, self.job.version, stamped
            );
            PollOutcome::Done { applied, stamped }
        } else {
            PollOutcome::Continue { applied }
        }
    }

    fn merge(&self, update: &JobUpdate, selection: &mut SelectionState) -> usize {
        let mut applied = 0;
        for (id, result) in &update.value {
            if selection.apply_job_result(id, result.status, result.file_id.clone()) {
                applied += 1;
            } else {
                debug!(
                    "Job {} reported {} for attachment {} outside the selection",
                    self.job.job_id, result.status, id
                );
            }
        }
        applied
    }
}
