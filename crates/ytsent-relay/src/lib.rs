//! Message relay between the three execution contexts of an analysis.
//!
//! The page context extracts the video id, the coordinator submits the job,
//! and the panel drives the whole exchange and then polls the service
//! directly. Contexts share no state; every exchange is a typed
//! [`RelayRequest`] answered through a one-shot reply slot.

pub mod coordinator;
pub mod error;
pub mod message;
pub mod page;
pub mod panel;
pub mod presenter;

pub use coordinator::Coordinator;
pub use error::{ExtractionFailure, FlowError, RelayError};
pub use message::{RelayEndpoint, RelayEnvelope, RelayRequest, RelayResponse, SubmitFailure};
pub use page::{is_video_page, IdentifierExtractor, PageContext, UrlPatternExtractor};
pub use panel::{AnalysisReport, Panel};
pub use presenter::{PanelState, Presenter};
