//! # Candidate Sourcing Resolver
//!
//! Finds the inventory slots that may serve an order line and ranks them.
//!
//! ## Ranking
//! Deepest stock pool first. Equal pools rank by warehouse id, then
//! supplier id.

use std::cmp::Ordering;

use crate::types::{InventorySlot, OrderLine, SourceFilter};

/// Eligibility rule shared by automatic and manual sourcing.
#[derive(Debug, Clone, Copy)]
pub struct SourceCriteria<'a> {
    pub item_id: &'a str,
    pub warehouse: &'a SourceFilter,
    pub supplier: &'a SourceFilter,
}

impl<'a> SourceCriteria<'a> {
    pub fn for_order(order: &'a OrderLine) -> Self {
        SourceCriteria {
            item_id: &order.item_id,
            warehouse: &order.warehouse,
            supplier: &order.supplier,
        }
    }

    /// True when the slot carries the item, has stock, and passes both filters.
    pub fn accepts(&self, slot: &InventorySlot) -> bool {
        slot.item_id == self.item_id
            && slot.remaining_qty > 0
            && self.warehouse.matches(&slot.warehouse_id)
            && self.supplier.matches(&slot.supplier_id)
    }
}

/// Ranking used for every candidate list.
pub fn compare_candidates(a: &InventorySlot, b: &InventorySlot) -> Ordering {
    b.remaining_qty
        .cmp(&a.remaining_qty)
        .then_with(|| a.warehouse_id.cmp(&b.warehouse_id))
        .then_with(|| a.supplier_id.cmp(&b.supplier_id))
}

/// Indices into `inventory` of the slots matching `criteria`, best first.
///
/// Returning indices lets the allocation loop deduct from the slots in
/// place while it walks the ranking.
pub fn rank_candidates(criteria: &SourceCriteria<'_>, inventory: &[InventorySlot]) -> Vec<usize> {
    let mut ranked: Vec<usize> = inventory
        .iter()
        .enumerate()
        .filter(|(_, slot)| criteria.accepts(slot))
        .map(|(i, _)| i)
        .collect();
    ranked.sort_by(|&a, &b| compare_candidates(&inventory[a], &inventory[b]));
    ranked
}

/// Candidate slots for one order line, best first. Empty when nothing fits.
pub fn resolve_candidates<'a>(order: &OrderLine, inventory: &'a [InventorySlot]) -> Vec<&'a InventorySlot> {
    rank_candidates(&SourceCriteria::for_order(order), inventory)
        .into_iter()
        .map(|i| &inventory[i])
        .collect()
}
