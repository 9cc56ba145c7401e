//! HTTP client for the comment-sentiment analysis service.
//!
//! Two endpoints: `POST /analyze_video` starts a job and returns its handle,
//! `GET /job/{job_id}` reads the job's current status. Every call issues
//! exactly one request; retrying is left to the user.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::types::{JobHandle, JobStatusRecord, VideoId};

/// Characters escaped when a job id is placed in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Connection parameters for [`AnalysisClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &ytsent_core::AppConfig) -> Self {
        Self {
            base_url: config.service_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    video_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

/// Client for the analysis service.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted, so
/// the coordinator and the panel can each hold one.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: Url,
}

impl AnalysisClient {
    /// # Errors
    ///
    /// See [`AnalysisClient::with_base_url`].
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Self::with_base_url(
            &settings.base_url,
            settings.timeout_secs,
            &settings.user_agent,
        )
    }

    /// Creates a client against an explicit service origin (a wiremock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment of a base like `https://host/api`.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: normalised,
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submits a video for analysis and returns the handle of the new job.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] if the request cannot complete.
    /// - [`ClientError::Service`] on a non-2xx status (body kept verbatim), or
    ///   on a 2xx whose body carries no usable `job_id`.
    pub async fn submit(&self, video_id: &VideoId) -> Result<JobHandle, ClientError> {
        let url = self.endpoint("analyze_video")?;
        tracing::debug!(video_id = %video_id, %url, "submitting analysis job");

        let response = self
            .client
            .post(url)
            .json(&SubmitRequest {
                video_id: video_id.as_str(),
            })
            .send()
            .await
            .inspect_err(|e| tracing::warn!(video_id = %video_id, error = %e, "submit request failed"))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(video_id = %video_id, status = status.as_u16(), "analysis service rejected submission");
            return Err(ClientError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = serde_json::from_str::<SubmitResponse>(&body)
            .ok()
            .filter(|r| !r.job_id.trim().is_empty())
            .ok_or_else(|| ClientError::Service {
                status: status.as_u16(),
                body: format!("response carried no job_id: {body}"),
            })?;

        let job = JobHandle::new(parsed.job_id);
        tracing::info!(video_id = %video_id, job_id = %job, "analysis job submitted");
        Ok(job)
    }

    /// Reads the current status of a job. A pure read; the job is unaffected.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] on network failure.
    /// - [`ClientError::Service`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a status record.
    /// - [`ClientError::UnrecognizedStatus`] if the `status` tag is unknown.
    pub async fn job_status(&self, job: &JobHandle) -> Result<JobStatusRecord, ClientError> {
        let url = self.job_url(job)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let record = JobStatusRecord::from_json(&body, url.as_str())?;
        tracing::debug!(job_id = %job, status = record.status.tag(), "job status read");
        Ok(record)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn job_url(&self, job: &JobHandle) -> Result<Url, ClientError> {
        let segment = utf8_percent_encode(job.as_str(), PATH_SEGMENT).to_string();
        self.endpoint(&format!("job/{segment}"))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
