use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";
pub const DEFAULT_USER_AGENT: &str = "ytsent/0.1 (comment-sentiment)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Origin of the remote analysis service, e.g. `http://localhost:5000`.
    pub service_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub poll_interval_ms: u64,
    /// `None` polls until the job reaches a terminal state.
    pub poll_max_attempts: Option<u32>,
}

impl AppConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
