//! # Domain Types
//!
//! Core domain types used throughout the Seeb booking engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │    Service      │ 1    * │     Addon       │                        │
//! │  │  ─────────────  │───────►│  ─────────────  │                        │
//! │  │  id             │        │  id             │                        │
//! │  │  rate_type      │        │  group_name     │                        │
//! │  │  rate           │        │  price_type     │                        │
//! │  └─────────────────┘        │  price, qty     │                        │
//! │                             │  is_required    │                        │
//! │                             └─────────────────┘                        │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │  CartLineItem   │ 1    * │  AddonCharge    │  (persisted, frozen)   │
//! │  │  ─────────────  │───────►│  ─────────────  │                        │
//! │  │  value "12X8"   │        │  id, qty        │                        │
//! │  │  rate, amount   │        │  price, total   │                        │
//! │  │  reference_image│        └─────────────────┘                        │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire quirks (string ids, "1"/"0" flags, string-encoded lists) are
//! absorbed by the helpers in [`crate::wire`].

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::wire;

/// Group label for add-ons that arrive without one.
pub const DEFAULT_ADDON_GROUP: &str = "Others";

// =============================================================================
// Identifiers
// =============================================================================

/// Declares a numeric identifier that accepts `5` or `"5"` on the wire.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
        #[ts(export)]
        pub struct $name(u64);

        impl $name {
            #[inline]
            pub const fn new(id: u64) -> Self {
                $name(id)
            }

            #[inline]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                $name(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                wire::deserialize_id(deserializer).map($name)
            }
        }
    };
}

numeric_id!(
    /// Catalog service identifier.
    ServiceId
);
numeric_id!(
    /// Add-on identifier, unique within a service's catalog.
    AddonId
);
numeric_id!(
    /// Identifier of a persisted cart line item.
    CartItemId
);
numeric_id!(
    /// Identifier of the cart a line item belongs to.
    CartId
);
numeric_id!(UserId);
numeric_id!(RoomId);
numeric_id!(ServiceTypeId);

// =============================================================================
// Rate Type
// =============================================================================

/// Billing unit basis for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Billed per square foot; entered as width × height.
    #[serde(alias = "sqft", alias = "sq_ft")]
    SquareFeet,
    /// Billed per running foot.
    RunningFeet,
    /// Billed per running meter.
    #[serde(alias = "running_meters")]
    RunningMeter,
    /// Billed per electrical/plumbing point.
    Points,
    /// Billed per discrete unit.
    #[serde(alias = "units")]
    Unit,
}

impl RateType {
    /// Returns true when the quantity is entered as two dimensions.
    #[inline]
    pub const fn is_area(&self) -> bool {
        matches!(self, RateType::SquareFeet)
    }

    /// Wire name of the rate type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RateType::SquareFeet => "square_feet",
            RateType::RunningFeet => "running_feet",
            RateType::RunningMeter => "running_meter",
            RateType::Points => "points",
            RateType::Unit => "unit",
        }
    }

    /// Message shown when the quantity for this rate type was not entered.
    pub const fn missing_input_message(&self) -> &'static str {
        match self {
            RateType::SquareFeet => "Please enter both width and height",
            RateType::RunningFeet => "Please enter running feet",
            RateType::RunningMeter => "Please enter running meters",
            RateType::Points => "Please enter number of points",
            RateType::Unit => "Please enter quantity",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Price Type
// =============================================================================

/// How an add-on's billable quantity is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Fixed count chosen by the user (default 1).
    Unit,
    /// A percentage of the service's total area, rounded up.
    #[serde(alias = "percent", alias = "percentage_of_area")]
    Percentage,
}

impl PriceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PriceType::Unit => "unit",
            PriceType::Percentage => "percentage",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Addon
// =============================================================================

/// A supplementary chargeable item in a service's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Addon {
    pub id: AddonId,

    pub name: String,

    /// Free-text grouping label. `None` renders under "Others".
    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub group_name: Option<String>,

    pub price_type: PriceType,

    /// Price per billable unit, in major currency units.
    #[serde(deserialize_with = "wire::deserialize_decimal")]
    #[ts(type = "string")]
    pub price: Decimal,

    /// Percent of area (percentage add-ons) or base count (unit add-ons).
    #[serde(default, deserialize_with = "wire::deserialize_decimal")]
    #[ts(type = "string")]
    pub qty: Decimal,

    /// Required add-ons are always selected.
    #[serde(
        default,
        deserialize_with = "wire::deserialize_flag",
        serialize_with = "wire::serialize_flag"
    )]
    #[ts(type = "string")]
    pub is_required: bool,

    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub description: Option<String>,
}

impl Addon {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_decimal(self.price)
    }

    /// Returns the display group, falling back to "Others".
    pub fn group_label(&self) -> &str {
        self.group_name
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_ADDON_GROUP)
    }

    /// Returns true when the quantity follows the service area.
    #[inline]
    pub fn is_percentage(&self) -> bool {
        self.price_type == PriceType::Percentage
    }

    /// Default count for unit add-ons: the catalog base qty, or 1 when unset.
    pub fn base_quantity(&self) -> i64 {
        self.qty.ceil().to_i64().filter(|q| *q >= 1).unwrap_or(1)
    }
}

// =============================================================================
// Service
// =============================================================================

/// A bookable service with its rate and add-on catalog.
///
/// Immutable once fetched for an edit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Service {
    pub id: ServiceId,

    pub name: String,

    pub rate_type: RateType,

    /// Price per unit of `rate_type`, in major currency units.
    #[serde(deserialize_with = "wire::deserialize_decimal")]
    #[ts(type = "string")]
    pub rate: Decimal,

    /// Add-on catalog in display order.
    #[serde(default, alias = "addon")]
    pub addons: Vec<Addon>,
}

impl Service {
    /// Returns the rate as a Money type.
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_decimal(self.rate)
    }

    /// Looks up a catalog add-on by id.
    pub fn addon(&self, id: AddonId) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id == id)
    }
}

// =============================================================================
// Addon Charge (persisted)
// =============================================================================

/// A finalized add-on charge as stored on a cart line item.
///
/// Uses the snapshot pattern: name, price and grouping are frozen at the
/// time the line item was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonCharge {
    pub id: AddonId,

    #[serde(deserialize_with = "wire::deserialize_quantity")]
    pub qty: i64,

    #[serde(
        deserialize_with = "wire::deserialize_money",
        serialize_with = "wire::serialize_money"
    )]
    #[ts(type = "string")]
    pub price: Money,

    /// qty × price, serialized as a two-decimal string.
    #[serde(
        default,
        deserialize_with = "wire::deserialize_money",
        serialize_with = "wire::serialize_money"
    )]
    #[ts(type = "string")]
    pub total: Money,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_price_type")]
    pub price_type: PriceType,

    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub group_name: Option<String>,

    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub description: Option<String>,
}

fn default_price_type() -> PriceType {
    PriceType::Unit
}

impl AddonCharge {
    /// Reconstructs a catalog-shaped add-on from the frozen snapshot.
    ///
    /// Used when a persisted add-on is no longer in the service catalog, so
    /// the user's earlier choice is still shown and billed.
    pub fn to_addon(&self) -> Addon {
        Addon {
            id: self.id,
            name: self.name.clone(),
            group_name: self.group_name.clone(),
            price_type: self.price_type,
            price: self.price.to_decimal(),
            qty: Decimal::from(self.qty),
            is_required: false,
            description: self.description.clone(),
        }
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One service booking as persisted in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    pub id: CartItemId,

    pub cart_id: CartId,

    pub user_id: UserId,

    pub service_id: ServiceId,

    #[serde(default, deserialize_with = "deserialize_optional_service_type")]
    pub service_type_id: Option<ServiceTypeId>,

    #[serde(default, deserialize_with = "deserialize_optional_room")]
    pub room_id: Option<RoomId>,

    pub rate_type: RateType,

    /// Raw dimension string: "12X8" for area rates, "15" otherwise.
    #[serde(default, deserialize_with = "wire::deserialize_optional_text")]
    pub value: Option<String>,

    #[serde(
        deserialize_with = "wire::deserialize_money",
        serialize_with = "wire::serialize_money"
    )]
    #[ts(type = "string")]
    pub rate: Money,

    /// Base amount before add-ons.
    #[serde(
        default,
        deserialize_with = "wire::deserialize_money",
        serialize_with = "wire::serialize_money"
    )]
    #[ts(type = "string")]
    pub amount: Money,

    /// Reference image URIs in display order.
    #[serde(default, deserialize_with = "wire::deserialize_json_list")]
    pub reference_image: Vec<String>,

    #[serde(default, deserialize_with = "wire::deserialize_json_list")]
    pub addons: Vec<AddonCharge>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn deserialize_optional_service_type<'de, D>(d: D) -> Result<Option<ServiceTypeId>, D::Error>
where
    D: Deserializer<'de>,
{
    wire::deserialize_optional_id(d).map(|id| id.map(ServiceTypeId::new))
}

fn deserialize_optional_room<'de, D>(d: D) -> Result<Option<RoomId>, D::Error>
where
    D: Deserializer<'de>,
{
    wire::deserialize_optional_id(d).map(|id| id.map(RoomId::new))
}

impl CartLineItem {
    /// Returns the persisted add-on charge for `id`, if any.
    pub fn addon(&self, id: AddonId) -> Option<&AddonCharge> {
        self.addons.iter().find(|a| a.id == id)
    }

    /// Sum of the persisted add-on totals.
    pub fn addons_total(&self) -> Money {
        self.addons.iter().map(|a| a.total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_from_catalog_json() {
        let json = r#"{
            "id": "12",
            "name": "False Ceiling",
            "rate_type": "square_feet",
            "rate": "85.50",
            "addons": [
                {"id": 1, "name": "Cove light", "group_name": "Lighting",
                 "price_type": "unit", "price": "450", "qty": "2", "is_required": "0"},
                {"id": "2", "name": "Primer", "group_name": null,
                 "price_type": "percentage", "price": 10, "qty": 20, "is_required": "1",
                 "description": "Mandatory base coat"}
            ]
        }"#;

        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.id, ServiceId::new(12));
        assert_eq!(service.rate_type, RateType::SquareFeet);
        assert_eq!(service.rate().minor(), 8550);
        assert_eq!(service.addons.len(), 2);

        let cove = &service.addons[0];
        assert_eq!(cove.group_label(), "Lighting");
        assert_eq!(cove.base_quantity(), 2);
        assert!(!cove.is_required);

        let primer = service.addon(AddonId::new(2)).unwrap();
        assert!(primer.is_percentage());
        assert!(primer.is_required);
        assert_eq!(primer.group_label(), DEFAULT_ADDON_GROUP);
    }

    #[test]
    fn test_base_quantity_defaults_to_one() {
        let mut addon = Addon {
            id: AddonId::new(1),
            name: "Handle".into(),
            group_name: None,
            price_type: PriceType::Unit,
            price: Decimal::from(100),
            qty: Decimal::ZERO,
            is_required: false,
            description: None,
        };
        assert_eq!(addon.base_quantity(), 1);

        addon.qty = Decimal::from(4);
        assert_eq!(addon.base_quantity(), 4);
    }

    #[test]
    fn test_cart_line_item_with_encoded_lists() {
        let json = r#"{
            "id": 44, "cart_id": 3, "user_id": "9", "service_id": 12,
            "service_type_id": "2", "room_id": null,
            "rate_type": "square_feet", "value": "12X8",
            "rate": "50.00", "amount": "4800.00",
            "reference_image": "[\"https://cdn.seeb.in/a.jpg\"]",
            "addons": "[{\"id\":5,\"qty\":3,\"price\":\"20.00\",\"total\":\"60.00\",\"name\":\"Paint\",\"price_type\":\"unit\",\"group_name\":null,\"description\":null}]",
            "created_at": "2024-05-01T10:00:00Z"
        }"#;

        let item: CartLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.value.as_deref(), Some("12X8"));
        assert_eq!(item.room_id, None);
        assert_eq!(item.service_type_id, Some(ServiceTypeId::new(2)));
        assert_eq!(item.reference_image.len(), 1);
        assert_eq!(item.addons[0].qty, 3);
        assert_eq!(item.addons_total().to_string(), "60.00");
        assert!(item.created_at.is_some());
    }

    #[test]
    fn test_rate_type_wire_names() {
        for rate_type in [
            RateType::SquareFeet,
            RateType::RunningFeet,
            RateType::RunningMeter,
            RateType::Points,
            RateType::Unit,
        ] {
            let json = serde_json::to_string(&rate_type).unwrap();
            assert_eq!(json, format!("\"{}\"", rate_type.as_str()));
        }
        assert!(RateType::SquareFeet.is_area());
        assert!(!RateType::Points.is_area());
    }

    #[test]
    fn test_addon_charge_to_addon_keeps_snapshot() {
        let charge = AddonCharge {
            id: AddonId::new(5),
            qty: 3,
            price: Money::from_minor(2000),
            total: Money::from_minor(6000),
            name: "Paint".into(),
            price_type: PriceType::Unit,
            group_name: Some("Finish".into()),
            description: None,
        };
        let addon = charge.to_addon();
        assert_eq!(addon.price(), Money::from_minor(2000));
        assert_eq!(addon.group_label(), "Finish");
        assert!(!addon.is_required);
    }
}
