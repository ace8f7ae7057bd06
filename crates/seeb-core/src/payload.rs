//! # Cart Payload Assembly
//!
//! Builds the body of `PUT seeb-cart/update/{cartItemId}` from a priced edit
//! session.
//!
//! ## Payload Shape
//! ```text
//! {
//!   "cart_id": 3, "user_id": 9, "service_id": 12,
//!   "service_type_id": 2, "room_id": null,
//!   "rate_type": "square_feet",
//!   "value": "12X8",
//!   "rate": "50.00",
//!   "amount": "4800.00",                 ← base amount, before add-ons
//!   "reference_image": "[\"https://…\"]", ← JSON-encoded string
//!   "addons": "[{\"id\":5,…}]"            ← JSON-encoded string
//! }
//! ```
//!
//! The two list fields are sent as strings holding JSON because that is how
//! the cart service stores them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::addons::AddonSelection;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{DimensionInput, LineQuote};
use crate::types::{
    AddonCharge, CartId, CartItemId, CartLineItem, RateType, RoomId, Service, ServiceId,
    ServiceTypeId, UserId,
};
use crate::wire;

// =============================================================================
// Line Item Context
// =============================================================================

/// The parts of a persisted line item that the edit session never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemContext {
    pub cart_item_id: CartItemId,
    pub cart_id: CartId,
    pub user_id: UserId,
    pub service_type_id: Option<ServiceTypeId>,
    pub room_id: Option<RoomId>,
}

impl From<&CartLineItem> for LineItemContext {
    fn from(item: &CartLineItem) -> Self {
        LineItemContext {
            cart_item_id: item.id,
            cart_id: item.cart_id,
            user_id: item.user_id,
            service_type_id: item.service_type_id,
            room_id: item.room_id,
        }
    }
}

// =============================================================================
// Cart Update Payload
// =============================================================================

/// Request body for a cart line-item update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartUpdatePayload {
    pub cart_id: CartId,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub service_type_id: Option<ServiceTypeId>,
    pub room_id: Option<RoomId>,
    pub rate_type: RateType,

    /// "12X8" for area rates, "15" otherwise.
    pub value: String,

    #[serde(
        deserialize_with = "wire::deserialize_money",
        serialize_with = "wire::serialize_money"
    )]
    #[ts(type = "string")]
    pub rate: Money,

    /// Base amount before add-ons.
    #[serde(
        deserialize_with = "wire::deserialize_money",
        serialize_with = "wire::serialize_money"
    )]
    #[ts(type = "string")]
    pub amount: Money,

    /// JSON-encoded array of image URIs.
    pub reference_image: String,

    /// JSON-encoded array of [`AddonCharge`] records.
    pub addons: String,
}

impl CartUpdatePayload {
    /// Assembles the payload.
    ///
    /// `image_uris` are the final references (uploaded URLs, or the original
    /// local URIs when the upload was skipped).
    pub fn assemble(
        context: &LineItemContext,
        service: &Service,
        input: &DimensionInput,
        selection: &AddonSelection,
        image_uris: &[String],
    ) -> CoreResult<Self> {
        let quote = LineQuote::compute(service.rate_type, service.rate(), input, selection);

        Ok(CartUpdatePayload {
            cart_id: context.cart_id,
            user_id: context.user_id,
            service_id: service.id,
            service_type_id: context.service_type_id,
            room_id: context.room_id,
            rate_type: service.rate_type,
            value: input.persisted_value(service.rate_type),
            rate: service.rate(),
            amount: quote.base_amount,
            reference_image: encode_field("reference_image", image_uris)?,
            addons: encode_field("addons", &selection.charges())?,
        })
    }

    /// Decodes the `reference_image` field back into URIs.
    pub fn reference_images(&self) -> CoreResult<Vec<String>> {
        decode_field("reference_image", &self.reference_image)
    }

    /// Decodes the `addons` field back into charge records.
    pub fn addon_charges(&self) -> CoreResult<Vec<AddonCharge>> {
        decode_field("addons", &self.addons)
    }

    /// Base amount plus the encoded add-on totals.
    pub fn grand_total(&self) -> CoreResult<Money> {
        let addons: Money = self.addon_charges()?.iter().map(|c| c.total).sum();
        Ok(self.amount + addons)
    }
}

fn encode_field<T: Serialize + ?Sized>(field: &str, value: &T) -> CoreResult<String> {
    serde_json::to_string(value).map_err(|e| CoreError::Encoding {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

fn decode_field<T: serde::de::DeserializeOwned>(field: &str, text: &str) -> CoreResult<Vec<T>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| CoreError::Encoding {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
