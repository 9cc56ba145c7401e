//! Coordinator context: submits analysis jobs on the panel's behalf.
//!
//! Submission is asynchronous, so each `analyze` request's reply slot moves
//! into its own task and stays open until the service answers. The
//! coordinator never polls; the panel does that directly.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use ytsent_client::{AnalysisClient, ClientError, VideoId};

use crate::message::{RelayEndpoint, RelayEnvelope, RelayRequest, RelayResponse, SubmitFailure};

const INBOX_CAPACITY: usize = 16;

pub struct Coordinator;

impl Coordinator {
    /// Starts the coordinator. The task ends when every endpoint clone is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(client: AnalysisClient) -> (RelayEndpoint, JoinHandle<()>) {
        let (endpoint, inbox) = RelayEndpoint::channel("coordinator", INBOX_CAPACITY);
        let task = tokio::spawn(serve(client, inbox));
        (endpoint, task)
    }
}

async fn serve(client: AnalysisClient, mut inbox: mpsc::Receiver<RelayEnvelope>) {
    while let Some(RelayEnvelope { request, reply }) = inbox.recv().await {
        match request {
            RelayRequest::Analyze { video_id } => {
                let client = client.clone();
                tokio::spawn(async move {
                    let response = start_analysis(&client, video_id).await;
                    if reply.send(response).is_err() {
                        tracing::debug!("panel closed before the submission finished");
                    }
                });
            }
            other => {
                tracing::debug!(action = other.action(), "coordinator ignored message");
            }
        }
    }
}

/// Submits one job and turns the outcome into the relay reply.
pub async fn start_analysis(client: &AnalysisClient, video_id: String) -> RelayResponse {
    let video_id = match VideoId::new(video_id) {
        Ok(id) => id,
        Err(e) => {
            return RelayResponse::Failed {
                error: e.to_string(),
                kind: Some(SubmitFailure::Invalid),
            }
        }
    };

    match client.submit(&video_id).await {
        Ok(job) => RelayResponse::JobStarted {
            job_id: job.to_string(),
        },
        Err(e) => {
            tracing::warn!(video_id = %video_id, error = %e, "submission failed");
            RelayResponse::Failed {
                kind: Some(failure_kind(&e)),
                error: e.to_string(),
            }
        }
    }
}

fn failure_kind(error: &ClientError) -> SubmitFailure {
    match error {
        ClientError::Transport(_) => SubmitFailure::Transport,
        ClientError::InvalidVideoId | ClientError::InvalidBaseUrl { .. } => SubmitFailure::Invalid,
        _ => SubmitFailure::Service,
    }
}
