//! # Validation Module
//!
//! Submit-time validation of a line item's user input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  └── Numeric keyboards, disabled steppers                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Edit session (Rust)                                          │
//! │  └── THIS MODULE: checked on submit, blocks the cart update            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart API                                                     │
//! │  └── Server-side checks, surfaced as a submission failure              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Live pricing never fails: an empty field simply counts as zero. Only an
//! explicit submit runs these checks.
//!
//! ## Usage
//! ```rust
//! use seeb_core::pricing::DimensionInput;
//! use seeb_core::types::RateType;
//! use seeb_core::validation::validate_dimensions;
//!
//! assert!(validate_dimensions(RateType::SquareFeet, &DimensionInput::area("12", "8")).is_ok());
//! assert!(validate_dimensions(RateType::SquareFeet, &DimensionInput::area("12", "")).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::pricing::{parse_measure, DimensionInput};
use crate::types::RateType;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Dimension Validators
// =============================================================================

/// Validates the dimension fields for a rate type.
///
/// ## Rules
/// - square_feet: both width and height must be entered
/// - other rate types: the value must be entered
/// - entered numbers must not be negative (zero is accepted)
///
/// Text without a leading number counts as not entered.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Configure Service: False Ceiling (square_feet)                         │
/// │                                                                         │
/// │  Width: 12    Height: (empty)    [Add to cart]                         │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_dimensions ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── missing? → "Please enter both width and height"              │
/// │       │                                                                 │
/// │       ├── negative? → "height cannot be negative"                      │
/// │       │                                                                 │
/// │       └── OK → upload images, assemble payload, submit                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_dimensions(rate_type: RateType, input: &DimensionInput) -> ValidationResult<()> {
    let fields: Vec<(&str, &str)> = if rate_type.is_area() {
        vec![("width", input.width.as_str()), ("height", input.height.as_str())]
    } else {
        vec![("value", input.value.as_str())]
    };

    let mut parsed = Vec::with_capacity(fields.len());
    for (name, text) in fields {
        match parse_measure(text) {
            Some(number) => parsed.push((name, number)),
            None => return Err(ValidationError::MissingMeasurement { rate_type }),
        }
    }

    for (name, number) in parsed {
        validate_non_negative(name, number)?;
    }

    Ok(())
}

/// Validates that a measured number is not negative.
pub fn validate_non_negative(field: &str, number: Decimal) -> ValidationResult<()> {
    if number.is_sign_negative() && !number.is_zero() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Reference Image Validators
// =============================================================================

/// Validates the reference image list.
///
/// ## Rules
/// - Every entry must be a non-blank URI
///
/// ## Returns
/// The trimmed URIs in their original order.
pub fn validate_reference_images(uris: &[String]) -> ValidationResult<Vec<String>> {
    uris.iter()
        .map(|uri| {
            let uri = uri.trim();
            if uri.is_empty() {
                Err(ValidationError::Required {
                    field: "reference_image".to_string(),
                })
            } else {
                Ok(uri.to_string())
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
