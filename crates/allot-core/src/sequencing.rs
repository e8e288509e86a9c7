//! # Order Sequencing Policy
//!
//! Decides who gets served first when stock and credit are scarce.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sort key (lower sorts first)                                           │
//! │                                                                         │
//! │  1. urgency    EMERGENCY < CLAIM < OVERDUE < DAILY                      │
//! │  2. createDate oldest first (first-in-first-served)                     │
//! │  3. subOrderId lexicographic (equal timestamps stay reproducible)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;

use crate::types::OrderLine;

/// Total order over order lines used by the allocation loop.
pub fn compare_orders(a: &OrderLine, b: &OrderLine) -> Ordering {
    a.order_type
        .priority()
        .cmp(&b.order_type.priority())
        .then_with(|| a.create_date.cmp(&b.create_date))
        .then_with(|| a.sub_order_id.cmp(&b.sub_order_id))
}

/// Returns the orders in allocation sequence, borrowing from the input.
///
/// The input is left untouched; callers may pass orders in any order.
pub fn sequence_orders(orders: &[OrderLine]) -> Vec<&OrderLine> {
    let mut sorted: Vec<&OrderLine> = orders.iter().collect();
    sorted.sort_by(|a, b| compare_orders(a, b));
    sorted
}
