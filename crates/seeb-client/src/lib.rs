//! # seeb-client: Booking Client for Seeb
//!
//! Network side of the booking flow: catalog fetch, reference image upload,
//! cart line-item update, and the cancellable driver that runs an
//! [`seeb_core::EditSession`] against them.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Booking Client Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 SessionEditor (one per open editor)              │  │
//! │  │                                                                  │  │
//! │  │  Owns the EditSession and a CancellationToken                   │  │
//! │  │  Closing the editor drops the result of any in-flight call      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ BookingApi                              │
//! │                               ▼                                         │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │ HttpBookingApi                                                 │    │
//! │  │   GET  services/{id}                                           │    │
//! │  │   POST seeb-cart/uploadImages        (multipart, images[])     │    │
//! │  │   PUT  seeb-cart/update/{cartItemId} (JSON)                    │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  EVENTS (to the front end via SessionEventEmitter):                    │
//! │  • view   - render state after every change                            │
//! │  • notice - transient error message, with a retry hint                 │
//! │  • saved  - line item saved; refresh cart and line-item lists          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `BookingApi` trait, response envelope, image uploads
//! - [`config`] - Client configuration (API URL, token, upload policy)
//! - [`editor`] - `SessionEditor` driving one edit session
//! - [`error`] - Client error types
//! - [`http`] - reqwest implementation of `BookingApi`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use seeb_client::{ClientConfig, HttpBookingApi, SessionEditor};
//!
//! let config = Arc::new(ClientConfig::load_or_default(None));
//! let api = Arc::new(HttpBookingApi::new(&config)?);
//!
//! let mut editor = SessionEditor::for_item(api, config, cart_item);
//! editor.open().await?;
//! editor.apply(|s| s.set_width("12"))?;
//! editor.apply(|s| s.set_height("8"))?;
//! editor.submit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod http;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{BookingApi, Envelope, ImageUpload, UploadedImages};
pub use config::{ApiSettings, ClientConfig, SessionSettings, UploadFailurePolicy};
pub use editor::{NoOpEmitter, SessionEditor, SessionEventEmitter};
pub use error::{ClientError, ClientResult};
pub use http::HttpBookingApi;
