//! Page context: answers `getVideoId` for the document it is attached to.

use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use ytsent_client::VideoId;

use crate::message::{RelayEndpoint, RelayEnvelope, RelayRequest, RelayResponse};

const INBOX_CAPACITY: usize = 8;

static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|watch\?v=|embed/)([a-zA-Z0-9_-]{11})").expect("valid video id regex")
});

/// Produces the video id of a document, if it has one.
pub trait IdentifierExtractor: Send + Sync + 'static {
    fn extract(&self, document_url: &str) -> Option<VideoId>;
}

impl<F> IdentifierExtractor for F
where
    F: Fn(&str) -> Option<VideoId> + Send + Sync + 'static,
{
    fn extract(&self, document_url: &str) -> Option<VideoId> {
        self(document_url)
    }
}

/// Reads the 11-character id from watch, short-link and embed URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlPatternExtractor;

impl IdentifierExtractor for UrlPatternExtractor {
    fn extract(&self, document_url: &str) -> Option<VideoId> {
        VIDEO_ID_PATTERN
            .captures(document_url)
            .and_then(|caps| caps.get(1))
            .and_then(|m| VideoId::new(m.as_str()).ok())
    }
}

/// `true` for URLs of a single video page, where the panel can run.
#[must_use]
pub fn is_video_page(url: &str) -> bool {
    url.contains("youtube.com/watch") || url.contains("youtu.be/")
}

/// The page-scoped context.
pub struct PageContext;

impl PageContext {
    /// Attaches a context to `document_url` and starts answering requests.
    ///
    /// The task ends when every [`RelayEndpoint`] clone is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<E: IdentifierExtractor>(
        document_url: impl Into<String>,
        extractor: E,
    ) -> (RelayEndpoint, JoinHandle<()>) {
        let (endpoint, inbox) = RelayEndpoint::channel("page", INBOX_CAPACITY);
        let task = tokio::spawn(serve(document_url.into(), extractor, inbox));
        (endpoint, task)
    }
}

async fn serve<E: IdentifierExtractor>(
    document_url: String,
    extractor: E,
    mut inbox: mpsc::Receiver<RelayEnvelope>,
) {
    while let Some(RelayEnvelope { request, reply }) = inbox.recv().await {
        match request {
            RelayRequest::GetVideoId => {
                let video_id = extractor.extract(&document_url);
                tracing::debug!(url = %document_url, found = video_id.is_some(), "page answered getVideoId");
                let response = RelayResponse::Identifier {
                    video_id: video_id.map(String::from),
                };
                if reply.send(response).is_err() {
                    tracing::debug!("panel closed before getVideoId was answered");
                }
            }
            // Not ours to answer; dropping `reply` closes the exchange.
            other => {
                tracing::debug!(action = other.action(), "page context ignored message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    fn extract(url: &str) -> Option<String> {
        UrlPatternExtractor.extract(url).map(String::from)
    }

    #[test]
    fn extracts_from_watch_url() {
        assert_eq!(
            extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_from_short_and_embed_urls() {
        assert_eq!(
            extract("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract("https://www.youtube.com/embed/a_b-C1d2E3f").as_deref(),
            Some("a_b-C1d2E3f")
        );
    }

    #[test]
    fn rejects_short_ids_and_other_pages() {
        assert!(extract("https://www.youtube.com/watch?v=short").is_none());
        assert!(extract("https://www.youtube.com/feed/subscriptions").is_none());
    }

    #[test]
    fn video_page_detection() {
        assert!(is_video_page("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_video_page("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_video_page("https://www.youtube.com/"));
        assert!(!is_video_page("https://example.com/watch?v=dQw4w9WgXcQ"));
    }

    #[tokio::test]
    async fn answers_get_video_id() {
        let (page, _task) = PageContext::spawn(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            UrlPatternExtractor,
        );
        let response = page.request(RelayRequest::GetVideoId).await.unwrap();
        assert_eq!(
            response,
            RelayResponse::Identifier {
                video_id: Some("dQw4w9WgXcQ".to_owned())
            }
        );
    }

    #[tokio::test]
    async fn answers_null_when_extraction_fails() {
        let (page, _task) = PageContext::spawn("https://www.youtube.com/watch", |_: &str| -> Option<VideoId> { None });
        let response = page.request(RelayRequest::GetVideoId).await.unwrap();
        assert_eq!(response, RelayResponse::Identifier { video_id: None });
    }

    #[tokio::test]
    async fn ignores_analyze() {
        let (page, _task) = PageContext::spawn("https://youtu.be/dQw4w9WgXcQ", UrlPatternExtractor);
        let err = page
            .request(RelayRequest::Analyze {
                video_id: "dQw4w9WgXcQ".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::ContextUnavailable("page")));
    }

    #[tokio::test]
    async fn task_ends_when_endpoints_drop() {
        let (page, task) = PageContext::spawn("https://youtu.be/dQw4w9WgXcQ", UrlPatternExtractor);
        drop(page);
        task.await.expect("page task exits cleanly");
    }
}
