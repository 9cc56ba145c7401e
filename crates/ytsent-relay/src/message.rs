//! Relay messages and the request/reply channel that carries them.
//!
//! Wire shapes (JSON):
//!
//! | Request | Response |
//! |---|---|
//! | `{"action":"getVideoId"}` | `{"videoId":"..."}` or `{"videoId":null}` |
//! | `{"action":"analyze","videoId":"..."}` | `{"jobId":"..."}` or `{"error":"..."}` |

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::RelayError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RelayRequest {
    /// Panel to page: which video is open?
    GetVideoId,
    /// Panel to coordinator: start a job for this video.
    Analyze {
        #[serde(rename = "videoId")]
        video_id: String,
    },
}

impl RelayRequest {
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetVideoId => "getVideoId",
            Self::Analyze { .. } => "analyze",
        }
    }
}

/// Why the coordinator could not start a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitFailure {
    /// The service was unreachable.
    Transport,
    /// The service answered with a failure.
    Service,
    /// The request never left the coordinator (e.g. an empty video id).
    Invalid,
}

/// Replies are told apart by which key is present. Parsing goes through
/// `RawResponse` so an object matching none of the three shapes is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawResponse")]
pub enum RelayResponse {
    JobStarted {
        #[serde(rename = "jobId")]
        job_id: String,
    },
    Failed {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<SubmitFailure>,
    },
    Identifier {
        #[serde(rename = "videoId")]
        video_id: Option<String>,
    },
}

/// Every key any reply may carry. `video_id` is `Some(None)` for an explicit
/// `"videoId": null` and `None` when the key is absent.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResponse {
    #[serde(rename = "jobId")]
    job_id: Option<String>,
    error: Option<String>,
    kind: Option<SubmitFailure>,
    #[serde(rename = "videoId", default, deserialize_with = "present")]
    video_id: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TryFrom<RawResponse> for RelayResponse {
    type Error = String;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        match raw {
            RawResponse {
                job_id: Some(job_id),
                error: None,
                kind: None,
                video_id: None,
            } => Ok(Self::JobStarted { job_id }),
            RawResponse {
                job_id: None,
                error: Some(error),
                kind,
                video_id: None,
            } => Ok(Self::Failed { error, kind }),
            RawResponse {
                job_id: None,
                error: None,
                kind: None,
                video_id: Some(video_id),
            } => Ok(Self::Identifier { video_id }),
            other => Err(format!("unrecognized relay response: {other:?}")),
        }
    }
}

/// A request plus the slot its answer goes into.
///
/// Dropping `reply` without sending closes the exchange; the requester then
/// sees [`RelayError::ContextUnavailable`].
#[derive(Debug)]
pub struct RelayEnvelope {
    pub request: RelayRequest,
    pub reply: oneshot::Sender<RelayResponse>,
}

/// Sending side of one context's inbox.
#[derive(Debug, Clone)]
pub struct RelayEndpoint {
    context: &'static str,
    tx: mpsc::Sender<RelayEnvelope>,
}

impl RelayEndpoint {
    /// Creates an inbox for the context named `context`.
    #[must_use]
    pub fn channel(
        context: &'static str,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<RelayEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { context, tx }, rx)
    }

    #[must_use]
    pub fn context(&self) -> &'static str {
        self.context
    }

    /// Sends `request` and waits for the answer.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ContextUnavailable`] if the context's inbox is
    /// closed, or if the context dropped the reply slot without answering.
    pub async fn request(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let action = request.action();
        let (reply, response) = oneshot::channel();
        self.tx
            .send(RelayEnvelope { request, reply })
            .await
            .map_err(|_| RelayError::ContextUnavailable(self.context))?;

        response.await.map_err(|_| {
            tracing::debug!(context = self.context, action, "reply slot closed without a response");
            RelayError::ContextUnavailable(self.context)
        })
    }
}
