use thiserror::Error;

/// Default text used when the service reports a failed job without a reason.
pub const DEFAULT_JOB_ERROR: &str = "Unknown error";

/// Errors returned by the analysis service client and poll loop.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service could not be reached, or the exchange broke off mid-way.
    #[error("could not reach the analysis service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered but rejected or failed the request.
    #[error("analysis service error (HTTP {status}): {body}")]
    Service { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service reports the job itself failed. Displays the service's text as-is.
    #[error("{0}")]
    JobFailed(String),

    #[error("unrecognized job status '{0}'")]
    UnrecognizedStatus(String),

    #[error("job still running after {attempts} status checks")]
    PollLimitReached { attempts: u32 },

    #[error("invalid service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("video id must not be empty")]
    InvalidVideoId,
}

impl ClientError {
    /// `true` when the failure came from the network rather than from an answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
