//! # seeb-core: Pure Booking Logic for Seeb
//!
//! This crate is the **heart** of the Seeb booking flow. It contains the
//! pricing and add-on configuration engine as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Seeb Booking Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile front end                             │   │
//! │  │    Service screen ──► Dimensions ──► Add-ons ──► Cart           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SessionView                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    seeb-client (async driver)                   │   │
//! │  │    fetch service, upload images, update cart item               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ seeb-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  addons   │  │  pricing  │  │  session  │  │   │
//! │  │   │  Service  │  │ Selection │  │ LineQuote │  │ EditSess. │  │   │
//! │  │   │   Addon   │  │  Groups   │  │   Area    │  │  payload  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Service, Addon, CartLineItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`addons`] - Add-on grouping, quantity resolution and selection
//! - [`pricing`] - Area and line totals
//! - [`validation`] - Submit-time input checks
//! - [`payload`] - Cart update body
//! - [`session`] - Edit-session state machine
//! - [`error`] - Domain error types
//! - [`wire`] - Serde helpers for the loosely typed backend JSON
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: network and file system access belong in seeb-client
//! 3. **Integer Money**: all monetary values are in paise (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use seeb_core::money::Money;
//! use seeb_core::pricing::{DimensionInput, LineQuote};
//! use seeb_core::addons::AddonSelection;
//! use seeb_core::types::RateType;
//!
//! let quote = LineQuote::compute(
//!     RateType::SquareFeet,
//!     Money::from_major_minor(50, 0),
//!     &DimensionInput::area("12", "8"),
//!     &AddonSelection::default(),
//! );
//!
//! assert_eq!(quote.grand_total_display(), "4800.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod addons;
pub mod error;
pub mod money;
pub mod payload;
pub mod pricing;
pub mod session;
pub mod types;
pub mod validation;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use addons::{AddonGroup, AddonSelection, AddonView, SelectedAddon};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payload::{CartUpdatePayload, LineItemContext};
pub use pricing::{DimensionInput, LineQuote};
pub use session::{EditSession, SessionState, SessionView};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minor units (paise) per major unit (rupee).
pub const MINOR_PER_MAJOR: i64 = 100;
