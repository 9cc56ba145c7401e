//! Fixed-interval status polling for one analysis job.
//!
//! A [`PollSession`] owns a spawned task that reads the job status, reports
//! it, sleeps, and repeats until the job completes, fails, or the session is
//! cancelled. Requests are strictly sequential: the next read is issued only
//! after the previous outcome was classified.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::AnalysisClient;
use crate::error::{ClientError, DEFAULT_JOB_ERROR};
use crate::types::{JobHandle, JobStatus, JobStatusRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Give up after this many status reads. `None` polls until a terminal state.
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

impl PollSettings {
    #[must_use]
    pub fn from_app_config(config: &ytsent_core::AppConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.poll_max_attempts,
        }
    }
}

/// Receives the progress of a [`PollSession`].
///
/// `on_update` may fire any number of times; after it, exactly one of
/// `on_complete` / `on_error` fires, unless the session is cancelled first.
/// A cancel racing an update in delivery may let that single update arrive;
/// no terminal callback ever follows a cancel.
pub trait PollObserver: Send + 'static {
    fn on_update(&mut self, record: &JobStatusRecord);
    fn on_complete(&mut self, record: JobStatusRecord);
    fn on_error(&mut self, error: ClientError);
}

/// Poll progress as a message, for observers that live in another task.
#[derive(Debug)]
pub enum PollEvent {
    Update(JobStatusRecord),
    Complete(JobStatusRecord),
    Failed(ClientError),
}

impl PollEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Update(_))
    }
}

// A closed receiver means whoever watched the job is gone; the events are dropped.
impl PollObserver for mpsc::UnboundedSender<PollEvent> {
    fn on_update(&mut self, record: &JobStatusRecord) {
        let _ = self.send(PollEvent::Update(record.clone()));
    }

    fn on_complete(&mut self, record: JobStatusRecord) {
        let _ = self.send(PollEvent::Complete(record));
    }

    fn on_error(&mut self, error: ClientError) {
        let _ = self.send(PollEvent::Failed(error));
    }
}

/// What the loop does with one poll outcome.
#[derive(Debug)]
pub enum PollStep {
    Continue(JobStatusRecord),
    Complete(JobStatusRecord),
    Fail(ClientError),
}

/// Classifies one status read.
///
/// `queued`, `fetching` and `analyzing` continue; `complete` completes; an
/// `error` record, an unknown tag, or any request failure fails. Nothing here
/// is ever retried.
#[must_use]
pub fn classify(outcome: Result<JobStatusRecord, ClientError>) -> PollStep {
    match outcome {
        Ok(record) => match record.status {
            JobStatus::Complete { .. } => PollStep::Complete(record),
            JobStatus::Error { .. } => {
                let message = record
                    .status
                    .error_message()
                    .unwrap_or_else(|| DEFAULT_JOB_ERROR.to_owned());
                PollStep::Fail(ClientError::JobFailed(message))
            }
            JobStatus::Queued | JobStatus::Fetching { .. } | JobStatus::Analyzing { .. } => {
                PollStep::Continue(record)
            }
        },
        Err(error) => PollStep::Fail(error),
    }
}

/// One-way flag shared by the session handle and its task. Whoever trips it
/// first owns the session's ending.
#[derive(Debug, Clone, Default)]
struct TerminalLatch(Arc<AtomicBool>);

impl TerminalLatch {
    fn trip(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_tripped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A running poll loop bound to one job handle.
///
/// Dropping the session cancels it: a pending sleep or in-flight request is
/// abandoned and no observer callback fires afterwards.
#[derive(Debug)]
pub struct PollSession {
    job: JobHandle,
    latch: TerminalLatch,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollSession {
    /// Spawns the poll loop on the current tokio runtime and returns at once.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start<O: PollObserver>(
        client: AnalysisClient,
        job: JobHandle,
        settings: PollSettings,
        observer: O,
    ) -> Self {
        let latch = TerminalLatch::default();
        let cancel = CancellationToken::new();
        tracing::debug!(job_id = %job, interval = ?settings.interval, "starting poll session");
        let task = tokio::spawn(run_poll_loop(
            client,
            job.clone(),
            settings,
            observer,
            latch.clone(),
            cancel.clone(),
        ));
        Self {
            job,
            latch,
            cancel,
            task: Some(task),
        }
    }

    /// Starts a session whose events arrive on the returned receiver.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_channel(
        client: AnalysisClient,
        job: JobHandle,
        settings: PollSettings,
    ) -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::start(client, job, settings, tx), rx)
    }

    #[must_use]
    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    /// `true` once the session completed, failed, or was cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.latch.is_tripped()
    }

    /// Stops polling. Idempotent; a no-op on a session that already ended.
    pub fn cancel(&self) {
        if self.latch.trip() {
            tracing::debug!(job_id = %self.job, "poll session cancelled");
        }
        self.cancel.cancel();
    }

    /// Waits for the poll task to exit.
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(job_id = %self.job, error = %e, "poll task panicked");
            }
        }
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_poll_loop<O: PollObserver>(
    client: AnalysisClient,
    job: JobHandle,
    settings: PollSettings,
    mut observer: O,
    latch: TerminalLatch,
    cancel: CancellationToken,
) {
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            outcome = client.job_status(&job) => outcome,
        };

        match classify(outcome) {
            PollStep::Continue(record) => {
                if !report_progress(&latch, &cancel, &mut observer, &record) {
                    return;
                }

                if settings.max_attempts.is_some_and(|max| attempts >= max) {
                    if latch.trip() {
                        tracing::warn!(job_id = %job, attempts, "poll attempt limit reached");
                        observer.on_error(ClientError::PollLimitReached { attempts });
                    }
                    return;
                }
            }
            PollStep::Complete(record) => {
                if latch.trip() {
                    tracing::info!(job_id = %job, attempts, "analysis job complete");
                    observer.on_complete(record);
                }
                return;
            }
            PollStep::Fail(error) => {
                if latch.trip() {
                    tracing::warn!(job_id = %job, attempts, error = %error, "poll session failed");
                    observer.on_error(error);
                }
                return;
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(settings.interval) => {}
        }
    }
}

/// Delivers one update unless the session already ended. Both flags are read
/// immediately before the callback; a `cancel()` landing after that read lets
/// this one update through and nothing after it.
fn report_progress<O: PollObserver>(
    latch: &TerminalLatch,
    cancel: &CancellationToken,
    observer: &mut O,
    record: &JobStatusRecord,
) -> bool {
    if latch.is_tripped() || cancel.is_cancelled() {
        return false;
    }
    observer.on_update(record);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentCounts;

    fn record(status: JobStatus) -> JobStatusRecord {
        JobStatusRecord {
            job_id: Some("job-1".to_owned()),
            message: None,
            status,
        }
    }

    #[test]
    fn intermediate_statuses_continue() {
        for status in [
            JobStatus::Queued,
            JobStatus::Fetching { fetched: 3 },
            JobStatus::Analyzing {
                processed: 2,
                total: 10,
            },
        ] {
            assert!(
                matches!(classify(Ok(record(status.clone()))), PollStep::Continue(_)),
                "{status:?} must not be terminal"
            );
        }
    }

    #[test]
    fn complete_status_completes() {
        let step = classify(Ok(record(JobStatus::Complete {
            results: SentimentCounts::default(),
            warning: None,
        })));
        assert!(matches!(step, PollStep::Complete(_)));
    }

    #[test]
    fn error_status_carries_service_message() {
        let step = classify(Ok(record(JobStatus::Error {
            error: Some("quota exceeded".to_owned()),
        })));
        let PollStep::Fail(err) = step else {
            panic!("expected Fail");
        };
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn error_status_without_message_uses_default() {
        let step = classify(Ok(record(JobStatus::Error { error: None })));
        let PollStep::Fail(err) = step else {
            panic!("expected Fail");
        };
        assert_eq!(err.to_string(), DEFAULT_JOB_ERROR);
    }

    #[test]
    fn request_failure_fails() {
        let step = classify(Err(ClientError::UnrecognizedStatus("paused".to_owned())));
        assert!(matches!(
            step,
            PollStep::Fail(ClientError::UnrecognizedStatus(_))
        ));
    }

    #[test]
    fn latch_trips_once() {
        let latch = TerminalLatch::default();
        let shared = latch.clone();
        assert!(!latch.is_tripped());
        assert!(latch.trip());
        assert!(!shared.trip());
        assert!(shared.is_tripped());
    }

    #[test]
    fn channel_observer_forwards_events() {
        let (mut tx, mut rx) = mpsc::unbounded_channel::<PollEvent>();
        tx.on_update(&record(JobStatus::Queued));
        tx.on_error(ClientError::JobFailed("boom".to_owned()));

        let first = rx.try_recv().unwrap();
        assert!(matches!(first, PollEvent::Update(_)));
        assert!(!first.is_terminal());
        let second = rx.try_recv().unwrap();
        assert!(second.is_terminal());
    }

    #[test]
    fn channel_observer_tolerates_closed_receiver() {
        let (mut tx, rx) = mpsc::unbounded_channel::<PollEvent>();
        drop(rx);
        tx.on_complete(record(JobStatus::Queued));
    }

    #[test]
    fn progress_is_withheld_once_session_ended() {
        let (mut tx, mut rx) = mpsc::unbounded_channel::<PollEvent>();
        let update = record(JobStatus::Fetching { fetched: 1 });

        let latch = TerminalLatch::default();
        let cancel = CancellationToken::new();
        assert!(report_progress(&latch, &cancel, &mut tx, &update));

        cancel.cancel();
        assert!(!report_progress(&latch, &cancel, &mut tx, &update));

        let tripped = TerminalLatch::default();
        tripped.trip();
        assert!(!report_progress(
            &tripped,
            &CancellationToken::new(),
            &mut tx,
            &update
        ));

        assert!(matches!(rx.try_recv(), Ok(PollEvent::Update(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn default_settings_poll_every_second_without_cap() {
        let settings = PollSettings::default();
        assert_eq!(settings.interval, Duration::from_secs(1));
        assert!(settings.max_attempts.is_none());
    }
}
