//! Client side of the comment-sentiment job protocol.
//!
//! [`AnalysisClient`] submits a video for analysis and reads job status;
//! [`PollSession`] drives a job to a terminal state on a fixed interval and
//! reports every step to a [`PollObserver`].

pub mod client;
pub mod error;
pub mod poll;
pub mod types;

pub use client::{AnalysisClient, ClientSettings};
pub use error::ClientError;
pub use poll::{classify, PollEvent, PollObserver, PollSession, PollSettings, PollStep};
pub use types::{JobHandle, JobStatus, JobStatusRecord, SentimentCounts, VideoId};
