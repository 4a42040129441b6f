//! Error taxonomy for the scraping pipeline.
//!
//! Only [`StoreError`] is fatal to a run. Fetch, extraction and dispatch
//! failures are recovered by the orchestrator and show up in the run report.

use thiserror::Error;

/// Failure to retrieve a page from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
    /// The server answered with a non-success status code.
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// Connection, TLS or body read failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// Classifies a `reqwest` error for the given URL.
    pub fn from_reqwest(url: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Failure that prevents a whole page from being extracted.
///
/// Individual items with missing fields are not errors, see
/// [`crate::scrapers::SkipReason`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid CSS selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
    #[error("invalid source URL `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure to hand an article to the messaging surface.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Network or transport level failure talking to Telegram.
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    /// Telegram refused the message (bad markup, chat not found, ...).
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Failure to read or write the dedup store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors that abort an entire pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dedup store unavailable, run aborted: {0}")]
    Store(#[from] StoreError),
}

/// Per-source failure recorded in the run report.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
