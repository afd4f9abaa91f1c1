//! Error types for the ORCID metrics pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Three layers: [`ClientError`] for a single upstream HTTP call, [`MetricsError`] for a
//! whole pipeline operation, and [`ToolError`] for the MCP tool surface.

use std::time::Duration;

use reqwest_retry::Retryable;

use crate::client::classify_status;
use crate::models::IdType;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error (includes transport failures after retries)
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// No answer within the per-request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if the retry middleware treats this failure as transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            _ => self
                .status()
                .is_some_and(|status| matches!(classify_status(status), Some(Retryable::Transient))),
        }
    }

    /// HTTP status behind this error, if the upstream answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::BadRequest { .. } => Some(400),
            Self::Server { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single work summary that could not be turned into a [`crate::models::WorkRecord`].
///
/// Never surfaced to callers: the extractor logs it and skips the work.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed work record: {reason}")]
pub struct MalformedRecord {
    /// Why the summary was rejected.
    pub reason: String,
}

impl MalformedRecord {
    /// Create a malformed record error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Errors from a whole pipeline operation.
///
/// Callers receive either a complete result or one of these; never partial metrics.
#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    /// The work registry was unreachable or answered with a non-success status.
    #[error("Work registry unavailable for {orcid}: {source}")]
    RegistryUnavailable {
        /// Researcher whose works were requested
        orcid: String,
        /// Underlying client failure
        #[source]
        source: ClientError,
    },

    /// The citation index kept failing after the retry budget was spent.
    #[error("Citation service unavailable for {id_type} batch: {source}")]
    CitationServiceUnavailable {
        /// Identifier type of the failing batch
        id_type: IdType,
        /// Underlying client failure
        #[source]
        source: ClientError,
    },

    /// The whole aggregation exceeded its time budget.
    #[error("Aggregation timed out after {0:?}")]
    Timeout(Duration),

    /// Caller input rejected before any network call.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },
}

impl MetricsError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Wrap a registry failure.
    #[must_use]
    pub fn registry(orcid: impl Into<String>, source: ClientError) -> Self {
        Self::RegistryUnavailable { orcid: orcid.into(), source }
    }

    /// Wrap a citation index failure.
    #[must_use]
    pub const fn citations(id_type: IdType, source: ClientError) -> Self {
        Self::CitationServiceUnavailable { id_type, source }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the metrics pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] MetricsError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Pipeline(MetricsError::RegistryUnavailable { orcid, .. }) => {
                format!("Could not read the ORCID record for {orcid}. Please try again later.")
            }
            Self::Pipeline(MetricsError::CitationServiceUnavailable { .. }) => {
                "Citation counts are temporarily unavailable from OpenAlex. \
                 No metrics were computed."
                    .to_string()
            }
            Self::Pipeline(MetricsError::Timeout(limit)) => {
                format!("The request took longer than {limit:?} and was abandoned.")
            }
            Self::Pipeline(MetricsError::Validation { field, message })
            | Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            Self::Serialization(_) => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, MetricsError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
