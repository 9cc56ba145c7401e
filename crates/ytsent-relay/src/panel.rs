//! The panel: drives one analysis from page lookup to final counts.
//!
//! Flow: ask the page for its video id, ask the coordinator to start a job,
//! then poll the service directly until the job ends. Each step is reported
//! to the [`Presenter`]; the first failure ends the attempt.

use ytsent_client::{
    AnalysisClient, ClientError, JobHandle, JobStatus, PollEvent, PollSession, PollSettings,
    SentimentCounts, VideoId,
};

use crate::error::{ExtractionFailure, FlowError, RelayError};
use crate::message::{RelayEndpoint, RelayRequest, RelayResponse};
use crate::page::is_video_page;
use crate::presenter::{PanelState, Presenter};

/// Outcome of a finished analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub video_id: VideoId,
    pub job: JobHandle,
    pub results: SentimentCounts,
    pub warning: Option<String>,
}

pub struct Panel<P> {
    page: RelayEndpoint,
    coordinator: RelayEndpoint,
    client: AnalysisClient,
    poll: PollSettings,
    presenter: P,
}

impl<P: Presenter> Panel<P> {
    pub fn new(
        page: RelayEndpoint,
        coordinator: RelayEndpoint,
        client: AnalysisClient,
        poll: PollSettings,
        presenter: P,
    ) -> Self {
        Self {
            page,
            coordinator,
            client,
            poll,
            presenter,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Runs one analysis of the page at `page_url`.
    ///
    /// The poll session lives inside this future: dropping the future (the
    /// panel closing) cancels polling. Calling `analyze` again starts a fresh
    /// submission.
    ///
    /// # Errors
    ///
    /// Returns the [`FlowError`] that ended the attempt, after presenting it
    /// as [`PanelState::Failed`].
    pub async fn analyze(&mut self, page_url: &str) -> Result<AnalysisReport, FlowError> {
        let result = self.run(page_url).await;
        match &result {
            Ok(report) => self.presenter.present(&PanelState::Complete {
                results: report.results,
                warning: report.warning.clone(),
            }),
            Err(e) => {
                tracing::warn!(url = page_url, error = %e, "analysis attempt failed");
                self.presenter.present(&PanelState::Failed(e.to_string()));
            }
        }
        result
    }

    async fn run(&mut self, page_url: &str) -> Result<AnalysisReport, FlowError> {
        if !is_video_page(page_url) {
            return Err(ExtractionFailure::NotAVideoPage {
                url: page_url.to_owned(),
            }
            .into());
        }

        let video_id = self.request_video_id().await?;
        let job = self.request_job(&video_id).await?;
        tracing::info!(video_id = %video_id, job_id = %job, "polling analysis job");
        self.presenter.present(&PanelState::Starting);

        let (_session, mut events) =
            PollSession::with_channel(self.client.clone(), job.clone(), self.poll);

        while let Some(event) = events.recv().await {
            match event {
                PollEvent::Update(record) => {
                    if let Some(state) = PanelState::from_progress(&record.status) {
                        self.presenter.present(&state);
                    }
                }
                PollEvent::Complete(record) => {
                    return match record.status {
                        JobStatus::Complete { results, warning } => Ok(AnalysisReport {
                            video_id,
                            job,
                            results,
                            warning,
                        }),
                        other => Err(ClientError::UnrecognizedStatus(other.tag().to_owned()).into()),
                    };
                }
                PollEvent::Failed(error) => return Err(error.into()),
            }
        }

        Err(FlowError::Interrupted)
    }

    async fn request_video_id(&self) -> Result<VideoId, FlowError> {
        match self.page.request(RelayRequest::GetVideoId).await? {
            RelayResponse::Identifier {
                video_id: Some(raw),
            } => VideoId::new(raw).map_err(|_| ExtractionFailure::NoIdentifier.into()),
            RelayResponse::Identifier { video_id: None } => {
                Err(ExtractionFailure::NoIdentifier.into())
            }
            response => Err(RelayError::UnexpectedResponse {
                context: self.page.context(),
                response,
            }
            .into()),
        }
    }

    async fn request_job(&self, video_id: &VideoId) -> Result<JobHandle, FlowError> {
        let request = RelayRequest::Analyze {
            video_id: video_id.to_string(),
        };
        match self.coordinator.request(request).await? {
            RelayResponse::JobStarted { job_id } => Ok(JobHandle::new(job_id)),
            RelayResponse::Failed { error, kind } => Err(FlowError::Submission {
                kind,
                message: error,
            }),
            response => Err(RelayError::UnexpectedResponse {
                context: self.coordinator.context(),
                response,
            }
            .into()),
        }
    }
}
