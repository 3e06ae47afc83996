//! Media job polling.
//!
//! A spawned task asks for the job status once per interval until the job
//! reaches a terminal state, the ceiling elapses, or the owner stops it.
//! Dropping the [`PollHandle`] aborts the task, so a poll never outlives
//! the view that started it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use super::{JobState, JobStatus, MediaGateway};
use crate::core::config::MediaConfig;

/// Shortest interval the poller will honour.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between status requests; the first request waits one interval
    pub interval: Duration,
    /// Total time after which polling gives up
    pub ceiling: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(10), ceiling: Duration::from_secs(300) }
    }
}

impl From<&MediaConfig> for PollConfig {
    fn from(config: &MediaConfig) -> Self {
        Self { interval: config.poll_interval(), ceiling: config.poll_ceiling() }
    }
}

/// How a poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(JobStatus),
    Failed(JobStatus),
    /// The ceiling elapsed before the job settled
    TimedOut,
    /// The owner stopped polling
    Stopped,
}

/// Owner side of a running poll.
#[derive(Debug)]
pub struct PollHandle {
    job_id: String,
    stop_tx: Option<oneshot::Sender<()>>,
    latest: watch::Receiver<Option<JobStatus>>,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Most recent status seen, if any request has completed yet.
    pub fn latest(&self) -> Option<JobStatus> {
        self.latest.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Ask the task to stop. No further requests are issued.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the poll to end.
    pub async fn wait(mut self) -> PollOutcome {
        let Some(task) = self.task.take() else {
            return PollOutcome::Stopped;
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(job_id = %self.job_id, error = %e, "Poll task ended abnormally");
                PollOutcome::Stopped
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts polling tasks.
pub struct MediaPoller;

impl MediaPoller {
    /// Spawn a polling task for a job. Must be called within a tokio runtime.
    pub fn start(
        gateway: Arc<dyn MediaGateway>,
        job_id: impl Into<String>,
        config: PollConfig,
    ) -> PollHandle {
        let job_id = job_id.into();
        let (stop_tx, stop_rx) = oneshot::channel();
        let (status_tx, latest) = watch::channel(None);

        tracing::info!(%job_id, interval = ?config.interval, "Polling media job");
        let task = tokio::spawn(poll_loop(gateway, job_id.clone(), config, stop_rx, status_tx));

        PollHandle { job_id, stop_tx: Some(stop_tx), latest, task: Some(task) }
    }
}

async fn poll_loop(
    gateway: Arc<dyn MediaGateway>,
    job_id: String,
    config: PollConfig,
    mut stop_rx: oneshot::Receiver<()>,
    status_tx: watch::Sender<Option<JobStatus>>,
) -> PollOutcome {
    let interval = config.interval.max(MIN_INTERVAL);
    let start = Instant::now();
    let deadline = start + config.ceiling;
    let mut ticker = interval_at(start + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => return PollOutcome::Stopped,
            _ = ticker.tick() => {}
            () = sleep_until(deadline) => {
                tracing::debug!(%job_id, "Media job did not settle before the ceiling");
                return PollOutcome::TimedOut;
            }
        }

        let result = tokio::select! {
            biased;
            _ = &mut stop_rx => return PollOutcome::Stopped,
            result = gateway.job_status(&job_id) => result,
            () = sleep_until(deadline) => return PollOutcome::TimedOut,
        };

        match result {
            Ok(status) => {
                status_tx.send_replace(Some(status.clone()));
                match status.state {
                    JobState::Completed => {
                        tracing::info!(%job_id, "Media job completed");
                        return PollOutcome::Completed(status);
                    }
                    JobState::Failed => {
                        tracing::warn!(%job_id, error = ?status.error, "Media job failed");
                        return PollOutcome::Failed(status);
                    }
                    JobState::Pending | JobState::Processing => {
                        tracing::debug!(%job_id, state = ?status.state, "Media job still running");
                    }
                }
            }
            Err(e) => tracing::warn!(%job_id, error = %e, "Media status request failed"),
        }
    }
}
