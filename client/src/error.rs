//! Error types for the LoginLlama client.

use thiserror::Error;

/// Result type alias for LoginLlama operations.
pub type Result<T> = std::result::Result<T, LoginLlamaError>;

/// Errors that can occur when checking a login attempt.
///
/// Validation errors are raised synchronously before any network call and
/// are never retried. Transport errors surface the underlying failure
/// unmodified; the client performs no retry or backoff of its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginLlamaError {
    /// No API key was supplied and `LOGINLLAMA_API_KEY` is not set.
    #[error("Missing LOGINLLAMA_API_KEY environment variable")]
    MissingApiKey,

    /// The identity key argument was empty.
    #[error("identity_key is required")]
    MissingIdentityKey,

    /// No IP address could be resolved from any source.
    #[error("ip_address could not be detected; pass `ip_address` or `request` in the check options")]
    MissingIpAddress,

    /// No user agent could be resolved from any source.
    #[error("user_agent could not be detected; pass `user_agent` or `request` in the check options")]
    MissingUserAgent,

    /// HTTP request failed before a response was received.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The API replied with an error status (>= 400).
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body returned by the API
        message: String,
    },
}

impl LoginLlamaError {
    /// Returns `true` if this error was raised by input validation, before
    /// any network call was made.
    ///
    /// # Examples
    ///
    /// ```
    /// # use loginllama_client::LoginLlamaError;
    /// assert!(LoginLlamaError::MissingIdentityKey.is_validation());
    /// assert!(!LoginLlamaError::RequestFailed("timeout".into()).is_validation());
    /// ```
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey
                | Self::MissingIdentityKey
                | Self::MissingIpAddress
                | Self::MissingUserAgent
        )
    }
}
