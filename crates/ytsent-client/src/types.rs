use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, DEFAULT_JOB_ERROR};

/// Opaque identifier of the video whose comments are analyzed.
///
/// Only emptiness is checked; the shape of the id belongs to whoever extracted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidVideoId`] if `raw` is empty or whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, ClientError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ClientError::InvalidVideoId);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VideoId> for String {
    fn from(value: VideoId) -> Self {
        value.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle the service hands out for one analysis job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-category comment counts of a finished job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub total: u64,
}

/// One status read of a job, as returned by `GET /job/{job_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Human-readable status line written by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub status: JobStatus,
}

/// Job state tagged by the wire field `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Fetching {
        #[serde(default)]
        fetched: u64,
    },
    Analyzing {
        #[serde(default)]
        processed: u64,
        #[serde(default)]
        total: u64,
    },
    Complete {
        #[serde(default)]
        results: SentimentCounts,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl JobStatus {
    /// Wire tags this client understands. Anything else fails the session.
    pub const KNOWN_TAGS: [&'static str; 5] = ["queued", "fetching", "analyzing", "complete", "error"];

    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching { .. } => "fetching",
            Self::Analyzing { .. } => "analyzing",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// The failure text of an `error` record, falling back to a default
    /// when the service left it out or sent an empty string.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Error { error } => Some(
                error
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or(DEFAULT_JOB_ERROR)
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl JobStatusRecord {
    /// Parse a status body, checking the `status` tag before the payload so an
    /// unknown tag is reported by name instead of as a generic parse failure.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Deserialize`] if `body` is not JSON or a known status
    ///   carries a malformed payload.
    /// - [`ClientError::UnrecognizedStatus`] if `status` is missing or unknown.
    pub fn from_json(body: &str, context: &str) -> Result<Self, ClientError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;

        let tag = value
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if !JobStatus::KNOWN_TAGS.iter().any(|known| *known == tag) {
            return Err(ClientError::UnrecognizedStatus(tag.to_owned()));
        }

        serde_json::from_value(value).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_rejects_blank() {
        assert!(matches!(VideoId::new(""), Err(ClientError::InvalidVideoId)));
        assert!(matches!(VideoId::new("  "), Err(ClientError::InvalidVideoId)));
        assert_eq!(VideoId::new("dQw4w9WgXcQ").unwrap().as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn video_id_deserialize_validates() {
        let err = serde_json::from_str::<VideoId>(r#""""#);
        assert!(err.is_err(), "empty id must not deserialize");
        let id: VideoId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn parses_fetching_record() {
        let record = JobStatusRecord::from_json(
            r#"{"job_id":"j1","status":"fetching","message":"Fetching comments...","fetched":3}"#,
            "test",
        )
        .unwrap();
        assert_eq!(record.job_id.as_deref(), Some("j1"));
        assert_eq!(record.message.as_deref(), Some("Fetching comments..."));
        assert_eq!(record.status, JobStatus::Fetching { fetched: 3 });
        assert!(!record.status.is_terminal());
    }

    #[test]
    fn parses_complete_record_with_warning() {
        let record = JobStatusRecord::from_json(
            r#"{"status":"complete","results":{"positive":5,"neutral":3,"negative":2,"total":10},"warning":"API quota exceeded. Showing partial results."}"#,
            "test",
        )
        .unwrap();
        assert_eq!(
            record.status,
            JobStatus::Complete {
                results: SentimentCounts {
                    positive: 5,
                    neutral: 3,
                    negative: 2,
                    total: 10
                },
                warning: Some("API quota exceeded. Showing partial results.".to_owned()),
            }
        );
        assert!(record.status.is_terminal());
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let record =
            JobStatusRecord::from_json(r#"{"status":"complete","results":{"positive":1}}"#, "t")
                .unwrap();
        let JobStatus::Complete { results, warning } = record.status else {
            panic!("expected complete");
        };
        assert_eq!(results.positive, 1);
        assert_eq!(results.total, 0);
        assert!(warning.is_none());
    }

    #[test]
    fn queued_record_is_intermediate() {
        let record =
            JobStatusRecord::from_json(r#"{"status":"queued","message":"Queued..."}"#, "t").unwrap();
        assert_eq!(record.status, JobStatus::Queued);
        assert!(!record.status.is_terminal());
    }

    #[test]
    fn unknown_tag_is_reported_by_name() {
        let err = JobStatusRecord::from_json(r#"{"status":"paused"}"#, "t").unwrap_err();
        assert!(matches!(err, ClientError::UnrecognizedStatus(ref tag) if tag == "paused"));
    }

    #[test]
    fn missing_tag_is_unrecognized() {
        let err = JobStatusRecord::from_json(r#"{"fetched":3}"#, "t").unwrap_err();
        assert!(matches!(err, ClientError::UnrecognizedStatus(ref tag) if tag.is_empty()));
    }

    #[test]
    fn invalid_json_is_deserialize_error() {
        let err = JobStatusRecord::from_json("<html>", "job/x").unwrap_err();
        assert!(matches!(err, ClientError::Deserialize { ref context, .. } if context == "job/x"));
    }

    #[test]
    fn error_message_falls_back_to_default() {
        let with = JobStatus::Error {
            error: Some("quota exceeded".to_owned()),
        };
        let without = JobStatus::Error { error: None };
        let blank = JobStatus::Error {
            error: Some(String::new()),
        };
        assert_eq!(with.error_message().as_deref(), Some("quota exceeded"));
        assert_eq!(without.error_message().as_deref(), Some("Unknown error"));
        assert_eq!(blank.error_message().as_deref(), Some("Unknown error"));
        assert!(JobStatus::Queued.error_message().is_none());
    }
}
