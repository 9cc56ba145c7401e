use std::fmt;

use ytsent_client::{JobStatus, SentimentCounts};

/// What the panel shows at one moment of an analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Starting,
    Queued,
    Fetching {
        fetched: u64,
    },
    Analyzing {
        processed: u64,
        total: u64,
    },
    Complete {
        results: SentimentCounts,
        warning: Option<String>,
    },
    Failed(String),
}

impl PanelState {
    /// The progress state for an intermediate status; `None` for terminal ones.
    #[must_use]
    pub fn from_progress(status: &JobStatus) -> Option<Self> {
        match status {
            JobStatus::Queued => Some(Self::Queued),
            JobStatus::Fetching { fetched } => Some(Self::Fetching { fetched: *fetched }),
            JobStatus::Analyzing { processed, total } => Some(Self::Analyzing {
                processed: *processed,
                total: *total,
            }),
            JobStatus::Complete { .. } | JobStatus::Error { .. } => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed(_))
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("Starting analysis..."),
            Self::Queued => f.write_str("Waiting for the analysis to start..."),
            Self::Fetching { fetched } => write!(f, "Fetching comments... ({fetched} so far)"),
            Self::Analyzing { processed, total } => {
                write!(f, "Analyzing comments... ({processed}/{total})")
            }
            Self::Complete { results, warning } => {
                write!(
                    f,
                    "Positive: {} | Neutral: {} | Negative: {} | Total Comments: {}",
                    results.positive, results.neutral, results.negative, results.total
                )?;
                if let Some(warning) = warning {
                    write!(f, " ({warning})")?;
                }
                Ok(())
            }
            Self::Failed(message) => f.write_str(message),
        }
    }
}

/// Renders panel states. Drawing them is up to the implementation.
pub trait Presenter: Send {
    fn present(&mut self, state: &PanelState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_text() {
        assert_eq!(
            PanelState::Fetching { fetched: 3 }.to_string(),
            "Fetching comments... (3 so far)"
        );
        assert_eq!(
            PanelState::Analyzing {
                processed: 2,
                total: 10
            }
            .to_string(),
            "Analyzing comments... (2/10)"
        );
    }

    #[test]
    fn complete_text_includes_warning() {
        let state = PanelState::Complete {
            results: SentimentCounts {
                positive: 5,
                neutral: 3,
                negative: 2,
                total: 10,
            },
            warning: Some("Comments are disabled for this video.".to_owned()),
        };
        assert_eq!(
            state.to_string(),
            "Positive: 5 | Neutral: 3 | Negative: 2 | Total Comments: 10 (Comments are disabled for this video.)"
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn terminal_statuses_have_no_progress_state() {
        assert!(PanelState::from_progress(&JobStatus::Error { error: None }).is_none());
        assert_eq!(
            PanelState::from_progress(&JobStatus::Fetching { fetched: 1 }),
            Some(PanelState::Fetching { fetched: 1 })
        );
        assert!(!PanelState::Queued.is_terminal());
    }
}
