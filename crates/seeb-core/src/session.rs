//! # Edit Session
//!
//! State machine for configuring one cart line item.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Edit Session States                                │
//! │                                                                         │
//! │   ┌─────────┐ service_loaded ┌────────┐ begin_editing ┌─────────┐      │
//! │   │ Loading │───────────────►│ Loaded │──────────────►│ Editing │◄──┐  │
//! │   └────┬────┘                └────────┘               └────┬────┘   │  │
//! │        │ service_missing                      begin_submit │        │  │
//! │        ▼                                     (validated)   ▼        │  │
//! │   ┌─────────┐                                        ┌────────────┐ │  │
//! │   │ Failed  │  terminal                              │ Submitting │─┘  │
//! │   └─────────┘                                        └─────┬──────┘    │
//! │                                          submit_succeeded  │ submit_   │
//! │                                                            ▼ failed    │
//! │                                                      ┌─────────┐       │
//! │                                                      │ Success │       │
//! │                                                      └─────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session owns no I/O. The async driver in `seeb-client` performs the
//! fetch, upload and update calls and feeds their outcomes back in.
//!
//! ## Seeding
//! When editing an existing line item, its persisted value, reference images
//! and add-on charges are restored on `begin_editing`. Persisted state wins
//! over catalog defaults, and required add-ons are always selected.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::addons::{AddonGroup, AddonSelection};
use crate::error::{CoreError, CoreResult};
use crate::payload::{CartUpdatePayload, LineItemContext};
use crate::pricing::{DimensionInput, LineQuote};
use crate::types::{AddonId, CartLineItem, Service, ServiceId};
use crate::validation::{validate_dimensions, validate_reference_images};

// =============================================================================
// Session State
// =============================================================================

/// Where an edit session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the service catalog.
    Loading,
    /// Catalog fetched; selection not seeded yet.
    Loaded,
    /// Accepting user input.
    Editing,
    /// Upload and cart update in flight.
    Submitting,
    /// Line item saved. Terminal.
    Success,
    /// Catalog could not be loaded. Terminal.
    Failed,
}

impl SessionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Loaded => "loaded",
            SessionState::Editing => "editing",
            SessionState::Submitting => "submitting",
            SessionState::Success => "success",
            SessionState::Failed => "failed",
        }
    }

    /// Returns true once no further transition is possible.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Success | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Session View
// =============================================================================

/// Everything a front end needs to render the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionView {
    pub state: SessionState,
    pub input: DimensionInput,
    pub reference_images: Vec<String>,
    pub addon_groups: Vec<AddonGroup>,
    pub quote: Option<LineQuote>,
    pub notice: Option<String>,
}

// =============================================================================
// Edit Session
// =============================================================================

/// One line item being configured.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: SessionState,
    service_id: ServiceId,
    context: LineItemContext,
    existing: Option<CartLineItem>,
    service: Option<Service>,
    input: DimensionInput,
    images: Vec<String>,
    selection: AddonSelection,
    /// Area the percentage quantities were last computed for.
    last_area: Decimal,
    notice: Option<String>,
}

impl EditSession {
    /// Starts a session for a line item that has no persisted configuration.
    pub fn new(service_id: ServiceId, context: LineItemContext) -> Self {
        EditSession {
            state: SessionState::Loading,
            service_id,
            context,
            existing: None,
            service: None,
            input: DimensionInput::default(),
            images: Vec::new(),
            selection: AddonSelection::default(),
            last_area: Decimal::ZERO,
            notice: None,
        }
    }

    /// Starts a session that edits a persisted line item.
    pub fn for_item(item: CartLineItem) -> Self {
        let mut session = Self::new(item.service_id, LineItemContext::from(&item));
        session.existing = Some(item);
        session
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    #[inline]
    pub fn context(&self) -> &LineItemContext {
        &self.context
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn input(&self) -> &DimensionInput {
        &self.input
    }

    pub fn reference_images(&self) -> &[String] {
        &self.images
    }

    pub fn selection(&self) -> &AddonSelection {
        &self.selection
    }

    /// Last user-facing message, cleared by the next successful edit.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn require(&self, expected: SessionState) -> CoreResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidSessionState {
                expected: expected.to_string(),
                actual: self.state.to_string(),
            })
        }
    }

    fn loaded_service(&self) -> CoreResult<&Service> {
        self.service.as_ref().ok_or(CoreError::ServiceNotLoaded)
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Loading → Loaded.
    pub fn service_loaded(&mut self, service: Service) -> CoreResult<()> {
        self.require(SessionState::Loading)?;

        if service.id != self.service_id {
            return Err(CoreError::ServiceMismatch {
                expected: self.service_id,
                actual: service.id,
            });
        }

        self.service = Some(service);
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Loading → Failed. The session cannot be used afterwards.
    pub fn service_missing(&mut self, message: impl Into<String>) -> CoreResult<()> {
        self.require(SessionState::Loading)?;
        self.notice = Some(message.into());
        self.state = SessionState::Failed;
        Ok(())
    }

    /// Loaded → Editing, seeding from the persisted line item if any.
    pub fn begin_editing(&mut self) -> CoreResult<()> {
        self.require(SessionState::Loaded)?;
        let service = self.loaded_service()?;
        let rate_type = service.rate_type;

        let (input, images, persisted) = match &self.existing {
            Some(item) => (
                item.value
                    .as_deref()
                    .map(|v| DimensionInput::from_persisted(rate_type, v))
                    .unwrap_or_default(),
                item.reference_image.clone(),
                item.addons.as_slice(),
            ),
            None => (DimensionInput::default(), Vec::new(), &[][..]),
        };

        let area = input.total_area(rate_type);
        let selection = AddonSelection::from_persisted(&service.addons, persisted, area);

        self.input = input;
        self.images = images;
        self.selection = selection;
        self.last_area = area;
        self.state = SessionState::Editing;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Current billable quantity.
    pub fn total_area(&self) -> Decimal {
        self.service
            .as_ref()
            .map(|s| self.input.total_area(s.rate_type))
            .unwrap_or(Decimal::ZERO)
    }

    fn edit_input(&mut self, apply: impl FnOnce(&mut DimensionInput)) -> CoreResult<()> {
        self.require(SessionState::Editing)?;
        apply(&mut self.input);

        let area = self.total_area();
        if area != self.last_area {
            self.selection.recompute_for_area(area);
            self.last_area = area;
        }
        self.notice = None;
        Ok(())
    }

    pub fn set_width(&mut self, text: impl Into<String>) -> CoreResult<()> {
        let text = text.into();
        self.edit_input(|input| input.width = text)
    }

    pub fn set_height(&mut self, text: impl Into<String>) -> CoreResult<()> {
        let text = text.into();
        self.edit_input(|input| input.height = text)
    }

    pub fn set_value(&mut self, text: impl Into<String>) -> CoreResult<()> {
        let text = text.into();
        self.edit_input(|input| input.value = text)
    }

    /// Flips a non-required add-on. Returns its selected state afterwards.
    pub fn toggle_addon(&mut self, id: AddonId) -> CoreResult<bool> {
        self.require(SessionState::Editing)?;
        let area = self.total_area();
        let selected = self.selection.toggle(id, area)?;
        self.notice = None;
        Ok(selected)
    }

    pub fn increment_addon(&mut self, id: AddonId) -> CoreResult<i64> {
        self.require(SessionState::Editing)?;
        let qty = self.selection.increment(id)?;
        self.notice = None;
        Ok(qty)
    }

    pub fn decrement_addon(&mut self, id: AddonId) -> CoreResult<i64> {
        self.require(SessionState::Editing)?;
        let qty = self.selection.decrement(id)?;
        self.notice = None;
        Ok(qty)
    }

    /// Appends picked images, skipping duplicates.
    pub fn add_images<I, S>(&mut self, uris: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require(SessionState::Editing)?;
        for uri in uris {
            let uri = uri.into();
            if !uri.trim().is_empty() && !self.images.contains(&uri) {
                self.images.push(uri);
            }
        }
        Ok(())
    }

    /// Removes the image at `index`. Out-of-range indexes are ignored.
    pub fn remove_image(&mut self, index: usize) -> CoreResult<Option<String>> {
        self.require(SessionState::Editing)?;
        Ok((index < self.images.len()).then(|| self.images.remove(index)))
    }

    /// Prices the line as currently configured.
    pub fn quote(&self) -> CoreResult<LineQuote> {
        let service = self.loaded_service()?;
        Ok(LineQuote::compute(
            service.rate_type,
            service.rate(),
            &self.input,
            &self.selection,
        ))
    }

    /// Grouped add-on rows for rendering.
    pub fn addon_groups(&self) -> Vec<AddonGroup> {
        self.selection.groups()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            input: self.input.clone(),
            reference_images: self.images.clone(),
            addon_groups: self.addon_groups(),
            quote: self.quote().ok(),
            notice: self.notice.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Editing → Submitting after validation.
    ///
    /// On a validation failure the session stays in `Editing` and the message
    /// is kept as the notice.
    pub fn begin_submit(&mut self) -> CoreResult<()> {
        self.require(SessionState::Editing)?;
        let rate_type = self.loaded_service()?.rate_type;

        let checked = validate_dimensions(rate_type, &self.input)
            .and_then(|_| validate_reference_images(&self.images));
        match checked {
            Ok(images) => {
                self.images = images;
                self.notice = None;
                self.state = SessionState::Submitting;
                Ok(())
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                Err(CoreError::Validation(err))
            }
        }
    }

    /// Images picked on the device that still need uploading.
    pub fn pending_uploads(&self) -> Vec<String> {
        self.images
            .iter()
            .filter(|uri| !is_remote_uri(uri))
            .cloned()
            .collect()
    }

    /// Final image references: remote URIs kept, local ones replaced in order
    /// by `uploaded`. Local URIs without an uploaded counterpart are kept.
    pub fn resolve_images(&self, uploaded: &[String]) -> Vec<String> {
        let mut uploaded = uploaded.iter();
        self.images
            .iter()
            .map(|uri| {
                if is_remote_uri(uri) {
                    uri.clone()
                } else {
                    uploaded.next().cloned().unwrap_or_else(|| uri.clone())
                }
            })
            .collect()
    }

    /// Assembles the cart update from the current configuration.
    pub fn build_payload(&self, image_uris: &[String]) -> CoreResult<CartUpdatePayload> {
        self.require(SessionState::Submitting)?;
        let service = self.loaded_service()?;
        CartUpdatePayload::assemble(&self.context, service, &self.input, &self.selection, image_uris)
    }

    /// Submitting → Success.
    pub fn submit_succeeded(&mut self) -> CoreResult<()> {
        self.require(SessionState::Submitting)?;
        self.notice = None;
        self.state = SessionState::Success;
        Ok(())
    }

    /// Submitting → Editing with a transient message; retry is allowed.
    pub fn submit_failed(&mut self, message: impl Into<String>) -> CoreResult<()> {
        self.require(SessionState::Submitting)?;
        self.notice = Some(message.into());
        self.state = SessionState::Editing;
        Ok(())
    }
}

/// Returns true for references already hosted by the backend.
pub fn is_remote_uri(uri: &str) -> bool {
    let uri = uri.trim_start();
    uri.starts_with("http://") || uri.starts_with("https://")
}

// =============================================================================
// Unit Tests
// =============================================================================
