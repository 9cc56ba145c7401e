use thiserror::Error;
use ytsent_client::ClientError;

use crate::message::{RelayResponse, SubmitFailure};

/// No video id could be taken from the open page.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("Please open a YouTube video page.")]
    NotAVideoPage { url: String },

    #[error("Could not extract video ID from URL.")]
    NoIdentifier,
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// The context is gone, or it closed the exchange without answering.
    #[error("Cannot communicate with the {0}. Try refreshing the video page.")]
    ContextUnavailable(&'static str),

    #[error("unexpected response from the {context}: {response:?}")]
    UnexpectedResponse {
        context: &'static str,
        response: RelayResponse,
    },
}

/// Everything that can end one analysis attempt. None of these is retried;
/// the user starts a fresh attempt instead.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error(transparent)]
    Relay(#[from] RelayError),

    /// The coordinator could not start a job.
    #[error("API Error: {message}")]
    Submission {
        kind: Option<SubmitFailure>,
        message: String,
    },

    /// The poll session ended in failure: the job failed, or a status read did.
    #[error(transparent)]
    Poll(#[from] ClientError),

    #[error("analysis was interrupted before the job finished")]
    Interrupted,
}
