//! # Client Error Types
//!
//! Error types for catalog/cart API calls and session driving.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  RequestFailed  │  │  InvalidResponse        │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  SerializationFailed    │ │
//! │  │  ConfigLoad/Save│  │  Http { .. }    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Booking      │  │    Session      │  │      Local files        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ServiceNotFound│  │  SessionClosed  │  │  ImageRead              │ │
//! │  │  UploadFailed   │  │  Core(..)       │  │                         │ │
//! │  │  UpdateRejected │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use seeb_core::{CoreError, ServiceId};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure of the booking client.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (DNS, connect, reset).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with an unexpected status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Booking Errors
    // =========================================================================
    #[error("Service {0} not found")]
    ServiceNotFound(ServiceId),

    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    /// The cart service refused the line-item update.
    #[error("Cart update rejected (HTTP {status}): {message}")]
    UpdateRejected { status: u16, message: String },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// The session was closed while a call was in flight.
    #[error("Edit session was closed")]
    SessionClosed,

    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Local File Errors
    // =========================================================================
    #[error("Failed to read image {path}: {reason}")]
    ImageRead { path: String, reason: String },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::SerializationFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the same call may succeed when repeated.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 5xx responses
    /// - Upload failures
    ///
    /// Nothing retries automatically; the user resubmits.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RequestFailed(_)
            | ClientError::Timeout(_)
            | ClientError::UploadFailed(_) => true,
            ClientError::Http { status, .. } | ClientError::UpdateRejected { status, .. } => {
                *status >= 500
            }
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the message is meant to be shown to the user as is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClientError::Core(CoreError::Validation(_))
                | ClientError::ServiceNotFound(_)
                | ClientError::UploadFailed(_)
                | ClientError::UpdateRejected { .. }
        )
    }

    /// Message for the session notice.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Core(CoreError::Validation(err)) => err.to_string(),
            ClientError::ServiceNotFound(_) => "This service is no longer available".to_string(),
            ClientError::UploadFailed(_) => "Could not upload reference images".to_string(),
            _ if self.is_retryable() => "Could not update cart. Please try again".to_string(),
            _ => "Something went wrong while updating the cart".to_string(),
        }
    }
}
