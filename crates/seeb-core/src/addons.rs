//! # Add-on Selection Module
//!
//! Turns a flat add-on catalog into grouped view state and resolves each
//! add-on's effective quantity and charge.
//!
//! ## Quantity Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Effective Quantity Resolution                        │
//! │                                                                         │
//! │  has current qty? ──yes──► keep it                  (user's choice)     │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  price_type = unit ──────► catalog base qty, or 1                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  price_type = percentage ► ceil(percent / 100 × total_area)             │
//! │                                                                         │
//! │  Percentage quantities are NEVER stored as user state: every area      │
//! │  change recomputes them from the catalog percent.                      │
//! │                                                                         │
//! │  Required add-ons are forced selected on every pass.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge Precedence
//! When an edit session is seeded, persisted line-item state beats catalog
//! defaults, and the catalog `is_required` flag beats both for the
//! `selected` bit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Addon, AddonCharge, AddonId, PriceType};

// =============================================================================
// Grouping
// =============================================================================

/// Partitions a catalog by display group.
///
/// Groups are emitted in the order their name is first seen, and each group
/// keeps catalog order. Add-ons without a group land in "Others".
///
/// ## Example
/// ```text
/// [Primer(Paint), Cove(Lighting), Putty(Paint), Knob(—)]
///      │
///      ▼
/// Paint: [Primer, Putty]   Lighting: [Cove]   Others: [Knob]
/// ```
pub fn group_addons(addons: &[Addon]) -> Vec<(String, Vec<&Addon>)> {
    let mut groups: Vec<(String, Vec<&Addon>)> = Vec::new();

    for addon in addons {
        let label = addon.group_label();
        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, members)) => members.push(addon),
            None => groups.push((label.to_string(), vec![addon])),
        }
    }

    groups
}

// =============================================================================
// Quantity Resolution
// =============================================================================

/// `ceil(percent / 100 × total_area)`, never negative.
///
/// ## Example
/// ```rust
/// use seeb_core::addons::percentage_quantity;
/// use rust_decimal::Decimal;
///
/// // 20% of 96 sq.ft = 19.2 → 20
/// assert_eq!(percentage_quantity(Decimal::from(20), Decimal::from(96)), 20);
/// ```
pub fn percentage_quantity(percent: Decimal, total_area: Decimal) -> i64 {
    let raw = percent
        .checked_mul(total_area)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO);

    raw.ceil().to_i64().unwrap_or(i64::MAX).max(0)
}

/// Resolves the effective quantity of an add-on.
///
/// 1. A current selection with an explicit quantity wins.
/// 2. Unit add-ons default to the catalog base quantity (or 1).
/// 3. Percentage add-ons default to `ceil(percent / 100 × total_area)`.
pub fn resolve_quantity(
    addon: &Addon,
    current: Option<&SelectedAddon>,
    total_area: Decimal,
) -> i64 {
    if let Some(qty) = current.map(|c| c.qty).filter(|q| *q > 0) {
        return qty;
    }

    match addon.price_type {
        PriceType::Unit => addon.base_quantity(),
        PriceType::Percentage => percentage_quantity(addon.qty, total_area),
    }
}

// =============================================================================
// Selected Addon
// =============================================================================

/// An add-on together with its per-session selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectedAddon {
    pub addon: Addon,

    /// Whether the add-on contributes to the total.
    pub selected: bool,

    /// Effective billable quantity. Kept when deselected.
    pub qty: i64,

    /// Kept from a saved line item whose add-on left the catalog. The saved
    /// quantity is billed as is and never recomputed.
    #[serde(default)]
    pub detached: bool,
}

impl SelectedAddon {
    #[inline]
    pub fn id(&self) -> AddonId {
        self.addon.id
    }

    /// qty × price, regardless of selection.
    pub fn line_total(&self) -> Money {
        self.addon.price().multiply_quantity(self.qty)
    }

    /// What this add-on adds to the line: its line total when selected.
    pub fn charge(&self) -> Money {
        if self.selected {
            self.line_total()
        } else {
            Money::zero()
        }
    }

    /// True when the user may step the quantity.
    pub fn is_adjustable(&self) -> bool {
        !self.detached && !self.addon.is_required && !self.addon.is_percentage()
    }

    /// Frozen record for the cart payload.
    pub fn to_charge(&self) -> AddonCharge {
        AddonCharge {
            id: self.addon.id,
            qty: self.qty,
            price: self.addon.price(),
            total: self.line_total(),
            name: self.addon.name.clone(),
            price_type: self.addon.price_type,
            group_name: Some(self.addon.group_label().to_string()),
            description: self.addon.description.clone(),
        }
    }
}

// =============================================================================
// View Types
// =============================================================================

/// Render-ready state of one add-on row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonView {
    pub id: AddonId,
    pub name: String,
    pub description: Option<String>,
    pub price_type: PriceType,
    pub price: Money,
    pub selected: bool,
    pub qty: i64,
    /// What the row adds to the total (zero when not selected).
    pub charge: Money,
    /// Selection checkbox is disabled (required add-on).
    pub locked: bool,
    /// Quantity stepper is enabled.
    pub adjustable: bool,
}

/// A titled group of add-on rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonGroup {
    pub name: String,
    pub addons: Vec<AddonView>,
}

// =============================================================================
// Addon Selection
// =============================================================================

/// Explicit mapping from add-on id to its selection state.
///
/// ## Invariants
/// - Entries are unique by add-on id
/// - Catalog entries keep catalog order; persisted-only entries follow
/// - Required add-ons are always selected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonSelection {
    entries: Vec<SelectedAddon>,
}

impl AddonSelection {
    /// Builds the initial selection from the catalog alone.
    ///
    /// Required add-ons start selected; the rest start deselected with their
    /// default quantity so the stepper shows a sensible number.
    pub fn from_catalog(catalog: &[Addon], total_area: Decimal) -> Self {
        let entries = catalog
            .iter()
            .map(|addon| SelectedAddon {
                addon: addon.clone(),
                selected: addon.is_required,
                qty: resolve_quantity(addon, None, total_area),
                detached: false,
            })
            .collect();

        AddonSelection { entries }
    }

    /// Builds the selection for an existing line item.
    ///
    /// Every persisted add-on is marked selected with its persisted quantity.
    /// Persisted add-ons missing from the catalog are kept from their
    /// snapshot so the earlier choice is not silently dropped.
    pub fn from_persisted(catalog: &[Addon], persisted: &[AddonCharge], total_area: Decimal) -> Self {
        let mut selection = Self::from_catalog(catalog, total_area);

        for charge in persisted {
            match selection.entry_mut(charge.id) {
                Some(entry) => {
                    entry.selected = true;
                    if charge.qty > 0 {
                        entry.qty = charge.qty;
                    }
                }
                None => selection.entries.push(SelectedAddon {
                    addon: charge.to_addon(),
                    selected: true,
                    qty: charge.qty.max(1),
                    detached: true,
                }),
            }
        }

        selection.enforce_required();
        selection
    }

    /// Number of add-ons known to the selection.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedAddon> {
        self.entries.iter()
    }

    /// Returns the entry for `id`.
    pub fn get(&self, id: AddonId) -> Option<&SelectedAddon> {
        self.entries.iter().find(|e| e.id() == id)
    }

    fn entry_mut(&mut self, id: AddonId) -> Option<&mut SelectedAddon> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Flips the selected bit of a non-required add-on.
    ///
    /// Required add-ons are left untouched. On transition to selected the
    /// quantity is re-resolved; on deselect it is kept.
    ///
    /// ## Returns
    /// The add-on's selected state after the call.
    pub fn toggle(&mut self, id: AddonId, total_area: Decimal) -> CoreResult<bool> {
        let entry = self.entry_mut(id).ok_or(CoreError::AddonNotFound(id))?;

        if entry.addon.is_required {
            return Ok(true);
        }

        entry.selected = !entry.selected;
        if entry.selected && !entry.detached {
            // Percentage quantities re-seed from the area, unit ones keep
            // their stepped count.
            let current = match entry.addon.price_type {
                PriceType::Percentage => None,
                PriceType::Unit => Some(&*entry),
            };
            let qty = resolve_quantity(&entry.addon, current, total_area);
            entry.qty = qty;
        }

        Ok(entry.selected)
    }

    /// Adds one to a unit add-on's quantity and selects it.
    pub fn increment(&mut self, id: AddonId) -> CoreResult<i64> {
        let entry = self.adjustable_entry(id)?;
        entry.qty = entry.qty.saturating_add(1).max(1);
        entry.selected = true;
        Ok(entry.qty)
    }

    /// Removes one from a unit add-on's quantity (never below 1) and selects it.
    pub fn decrement(&mut self, id: AddonId) -> CoreResult<i64> {
        let entry = self.adjustable_entry(id)?;
        entry.qty = entry.qty.saturating_sub(1).max(1);
        entry.selected = true;
        Ok(entry.qty)
    }

    fn adjustable_entry(&mut self, id: AddonId) -> CoreResult<&mut SelectedAddon> {
        let entry = self.entry_mut(id).ok_or(CoreError::AddonNotFound(id))?;

        if entry.addon.is_required {
            return Err(CoreError::AddonNotAdjustable {
                addon_id: id,
                reason: "required add-ons have a fixed quantity".to_string(),
            });
        }
        if entry.detached {
            return Err(CoreError::AddonNotAdjustable {
                addon_id: id,
                reason: "add-on is no longer offered for this service".to_string(),
            });
        }
        if entry.addon.is_percentage() {
            return Err(CoreError::AddonNotAdjustable {
                addon_id: id,
                reason: "quantity follows the total area".to_string(),
            });
        }

        Ok(entry)
    }

    /// Recomputes every percentage quantity for a new total area.
    ///
    /// Unit and detached quantities are left alone. Required add-ons are
    /// re-selected.
    pub fn recompute_for_area(&mut self, total_area: Decimal) {
        for entry in &mut self.entries {
            if entry.addon.is_percentage() && !entry.detached {
                entry.qty = percentage_quantity(entry.addon.qty, total_area);
            }
        }
        self.enforce_required();
    }

    fn enforce_required(&mut self) {
        for entry in &mut self.entries {
            if entry.addon.is_required {
                entry.selected = true;
            }
        }
    }

    /// Σ qty × price over selected add-ons.
    pub fn total(&self) -> Money {
        self.entries.iter().map(SelectedAddon::charge).sum()
    }

    /// Frozen charges for every selected add-on, in display order.
    pub fn charges(&self) -> Vec<AddonCharge> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(SelectedAddon::to_charge)
            .collect()
    }

    /// Grouped, render-ready view of the selection.
    pub fn groups(&self) -> Vec<AddonGroup> {
        let mut groups: Vec<AddonGroup> = Vec::new();

        for entry in &self.entries {
            let view = AddonView {
                id: entry.id(),
                name: entry.addon.name.clone(),
                description: entry.addon.description.clone(),
                price_type: entry.addon.price_type,
                price: entry.addon.price(),
                selected: entry.selected,
                qty: entry.qty,
                charge: entry.charge(),
                locked: entry.addon.is_required,
                adjustable: entry.is_adjustable(),
            };

            let label = entry.addon.group_label();
            match groups.iter_mut().find(|g| g.name == label) {
                Some(group) => group.addons.push(view),
                None => groups.push(AddonGroup {
                    name: label.to_string(),
                    addons: vec![view],
                }),
            }
        }

        groups
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
