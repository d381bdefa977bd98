//! Error types for the webphone client core
//!
//! Action-level failures are returned to the caller as [`ClientError`].
//! Failures reported asynchronously by the SDK never surface here; they only
//! update the `error` field of the published
//! [`ConnectionState`](crate::state::ConnectionState).

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while driving the telephony SDK
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The SDK handle has not been created (or its construction failed)
    #[error("Client is not initialized")]
    ClientNotInitialized,

    /// The token endpoint answered without a `token` field
    #[error("Token response is missing the token field")]
    MissingToken,

    /// The call-preparation endpoint answered without a `callId` field
    #[error("Prepare-call response is missing the callId field")]
    MissingCallId,

    /// The SDK refused to place the outbound call
    #[error("Call placement failed")]
    CallPlacementFailed,

    /// A call is already being dialed or is in progress
    #[error("A call is already in progress")]
    AlreadyInCall,

    /// An endpoint answered with a non-success HTTP status
    #[error("Request failed: {status}")]
    RequestFailed {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// The request never produced an HTTP response
    #[error("Network error: {message}")]
    Network { message: String },

    /// The endpoint body could not be decoded
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Creating the SDK handle failed
    #[error("SDK initialization failed: {reason}")]
    InitializationFailed { reason: String },

    /// An SDK primitive reported a failure
    #[error("SDK {operation} failed: {reason}")]
    Sdk { operation: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ClientError {
    /// Create an SDK operation error
    pub fn sdk(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Sdk {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
