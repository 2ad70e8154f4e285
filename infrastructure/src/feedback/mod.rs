//! Feedback collaborator adapters.

mod http;

pub use http::HttpFeedbackSink;
