//! # Error Types
//!
//! Domain-specific error types for seeb-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  seeb-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule / session errors                 │
//! │  └── ValidationError  - User input failures (shown inline)             │
//! │                                                                         │
//! │  seeb-client errors (separate crate)                                   │
//! │  └── ClientError      - Network, config and session lifetime failures  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → front end toast     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (add-on ID, state names)
//! 3. Errors are enum variants, never String
//! 4. Validation variants render as the exact message the user sees

use thiserror::Error;

use crate::types::{AddonId, RateType, ServiceId};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation needs the service catalog but none is loaded yet.
    #[error("Service has not been loaded")]
    ServiceNotLoaded,

    /// The add-on is neither in the catalog nor in the persisted line item.
    #[error("Add-on not found: {0}")]
    AddonNotFound(AddonId),

    /// The add-on's quantity cannot be changed by the user.
    ///
    /// ## When This Occurs
    /// - Stepping a percentage-of-area add-on (its qty follows the area)
    /// - Stepping a required add-on
    #[error("Add-on {addon_id} quantity cannot be adjusted: {reason}")]
    AddonNotAdjustable { addon_id: AddonId, reason: String },

    /// The persisted line item belongs to another service.
    #[error("Cart item is for service {expected}, but service {actual} was loaded")]
    ServiceMismatch {
        expected: ServiceId,
        actual: ServiceId,
    },

    /// Operation not allowed in the session's current state.
    ///
    /// ## When This Occurs
    /// - Editing before the service has loaded
    /// - Submitting while a submission is already in flight
    /// - Any operation after the session has closed
    #[error("Session is {actual}, expected {expected}")]
    InvalidSessionState { expected: String, actual: String },

    /// A payload field could not be encoded.
    #[error("Failed to encode {field}: {reason}")]
    Encoding { field: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are recoverable: the edit session stays open and the message is
/// shown next to the offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The dimension(s) for this rate type were not entered.
    ///
    /// ## User Workflow
    /// ```text
    /// Rate type: square_feet
    /// Width: 12   Height: (empty)
    ///      │
    ///      ▼
    /// MissingMeasurement { rate_type: SquareFeet }
    ///      │
    ///      ▼
    /// UI shows: "Please enter both width and height"
    /// ```
    #[error("{}", .rate_type.missing_input_message())]
    MissingMeasurement { rate_type: RateType },

    /// A dimension was entered as a negative number.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g. a persisted "WxH" value that is not two numbers).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
