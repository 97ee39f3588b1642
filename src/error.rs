//! Error types for build-router
//!
//! Domain-specific error types using thiserror.

use thiserror::Error;

/// Remote build API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Build slug was empty, no request was made
    #[error("Build slug must not be empty")]
    EmptyBuildSlug,

    /// Build parameters are not a JSON object
    #[error("Invalid build parameters: {reason}")]
    InvalidBuildParams { reason: String },

    /// Network failure or request timeout
    #[error("Request to '{url}' failed: {error}")]
    Transport { url: String, error: String },

    /// Non-2xx response
    #[error("Failed to get response, status code: {status}, body: {body}")]
    Remote { status: u16, body: String },

    /// 2xx response with a body that could not be decoded
    #[error("Failed to decode response, status code: {status}, body: {body}, error: {error}")]
    MalformedResponse {
        status: u16,
        body: String,
        error: String,
    },
}

impl ApiError {
    /// Whether another attempt of the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Remote { status, .. } => (500..600).contains(status),
            Self::EmptyBuildSlug
            | Self::InvalidBuildParams { .. }
            | Self::MalformedResponse { .. } => false,
        }
    }

    /// HTTP status code of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } | Self::MalformedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Step configuration errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Required input not provided
    #[error("Required input '{name}' is not set")]
    Missing { name: String },

    /// Input provided with an unusable value
    #[error("Input '{name}' has invalid value '{value}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Top-level build-router error type
#[derive(Error, Debug)]
pub enum RouterError {
    /// Configuration error
    #[error("Invalid step configuration")]
    Config(#[from] ConfigError),

    /// The router's own build could not be fetched
    #[error("Failed to get build '{slug}'")]
    OriginBuild {
        slug: String,
        #[source]
        source: ApiError,
    },

    /// A child build could not be started
    #[error("Failed to start build for workflow '{workflow}'")]
    StartBuild {
        workflow: String,
        #[source]
        source: ApiError,
    },

    /// A started build could not be polled
    #[error("Failed to get build info for '{slug}'")]
    PollBuild {
        slug: String,
        #[source]
        source: ApiError,
    },

    /// The overall wait deadline passed with builds still running
    #[error("Timed out waiting for builds: {}", pending.join(", "))]
    WaitTimeout { pending: Vec<String> },

    /// At least one child build finished unsuccessfully
    #[error("At least one build failed or aborted: {}", failed.join(", "))]
    BuildsFailed { failed: Vec<String> },

    /// Exporting a value for later steps failed
    #[error("Failed to export '{key}': {error}")]
    Export { key: String, error: String },
}
