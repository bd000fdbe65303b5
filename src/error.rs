//! Startup and configuration errors.
//!
//! Request-time failures never surface as these: the proxy and auth routes
//! answer with an [`Envelope`](crate::envelope::Envelope) instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
