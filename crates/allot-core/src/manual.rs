//! # Manual Override Ledger
//!
//! Lets an operator replace every committed line of one sub-order with a
//! hand-edited set while keeping stock and credit consistent.
//!
//! ## Refund-then-reapply
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   live snapshot ──clone──► undo_effect(committed) ──► effective view   │
//! │                                                          │              │
//! │                       candidates / validation read ◄─────┤              │
//! │                                                          │              │
//! │                            violations empty? ──no──► commit refused    │
//! │                                  │yes                                   │
//! │                                  ▼                                      │
//! │                        apply_effect(edited) ──► new live snapshot       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both phases work on an owned [`LedgerSnapshot`]. The caller's live
//! snapshot is only replaced once the whole commit has succeeded, so a
//! refused commit leaves nothing half-applied.

use tracing::debug;

use crate::error::{CoreError, CoreResult, EditViolation};
use crate::money::{normalize_quantity, Money};
use crate::sourcing::resolve_candidates;
use crate::types::{
    total_amount, total_qty, AllocationLine, CandidateSource, CustomerCredit, InventorySlot,
    OrderLine, SourceFilter, SourceKey,
};

// =============================================================================
// Ledger Snapshot
// =============================================================================

/// Inventory and credit balances owned as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub inventory: Vec<InventorySlot>,
    pub credits: Vec<CustomerCredit>,
}

impl LedgerSnapshot {
    pub fn new(inventory: Vec<InventorySlot>, credits: Vec<CustomerCredit>) -> Self {
        LedgerSnapshot { inventory, credits }
    }

    /// The slot for one source, if it exists.
    pub fn slot(&self, key: &SourceKey<'_>) -> Option<&InventorySlot> {
        self.inventory.iter().find(|s| s.is_source(key))
    }

    /// The credit record of one customer, if it exists.
    pub fn credit_of(&self, customer_id: &str) -> Option<&CustomerCredit> {
        self.credits.iter().find(|c| c.customer_id == customer_id)
    }

    fn credit_of_mut(&mut self, customer_id: &str) -> Option<&mut CustomerCredit> {
        self.credits.iter_mut().find(|c| c.customer_id == customer_id)
    }

    /// Returns the stock and money held by `lines` to the ledger.
    ///
    /// A line whose source no longer has a slot recreates that slot. Credit
    /// goes back to `customer_id` if the customer has a record.
    pub fn undo_effect(&mut self, customer_id: &str, lines: &[AllocationLine]) {
        for line in lines {
            let key = line.source_key();
            match self.inventory.iter_mut().find(|s| s.is_source(&key)) {
                Some(slot) => slot.remaining_qty += line.qty,
                None => self.inventory.push(InventorySlot::new(
                    line.item_id.as_str(),
                    line.warehouse_id.as_str(),
                    line.supplier_id.as_str(),
                    line.qty,
                )),
            }
        }

        let refund = total_amount(lines);
        if let Some(credit) = self.credit_of_mut(customer_id) {
            credit.remaining_credit_cents = (credit.remaining_credit() + refund).cents();
        }
    }

    /// Charges the stock and money of `lines` to the ledger, clamping at zero.
    ///
    /// Lines for sources without a slot are ignored; validation reports
    /// those before a commit ever gets here.
    pub fn apply_effect(&mut self, customer_id: &str, lines: &[AllocationLine]) {
        for line in lines {
            let key = line.source_key();
            if let Some(slot) = self.inventory.iter_mut().find(|s| s.is_source(&key)) {
                slot.remaining_qty = (slot.remaining_qty - line.qty).max(0);
            }
        }

        let charge = total_amount(lines);
        if let Some(credit) = self.credit_of_mut(customer_id) {
            credit.remaining_credit_cents =
                (credit.remaining_credit() - charge).clamp_non_negative().cents();
        }
    }
}

/// The ledger as it would be had `committed` never been allocated.
///
/// `live` is untouched; every other order's consumption stays charged.
pub fn effective_snapshot(
    live: &LedgerSnapshot,
    order: &OrderLine,
    committed: &[AllocationLine],
) -> LedgerSnapshot {
    let mut effective = live.clone();
    effective.undo_effect(&order.customer_id, committed);
    effective
}

// =============================================================================
// Manual Candidates
// =============================================================================

/// Sources the operator may pick for `order`, best first.
///
/// Eligibility is the same as automatic sourcing, checked against the
/// effective inventory, then narrowed by the operator's own warehouse and
/// supplier choice.
pub fn list_manual_candidates(
    order: &OrderLine,
    effective_inventory: &[InventorySlot],
    filter_warehouse: &SourceFilter,
    filter_supplier: &SourceFilter,
) -> Vec<CandidateSource> {
    resolve_candidates(order, effective_inventory)
        .into_iter()
        .filter(|s| filter_warehouse.matches(&s.warehouse_id))
        .filter(|s| filter_supplier.matches(&s.supplier_id))
        .map(CandidateSource::from)
        .collect()
}

// =============================================================================
// Validation
// =============================================================================

/// Every reason `edited` cannot replace the order's committed lines.
///
/// `effective` must already have the order's committed lines refunded
/// (see [`effective_snapshot`]). An empty result means the edit is valid.
pub fn validate_edits(
    order: &OrderLine,
    effective: &LedgerSnapshot,
    edited: &[AllocationLine],
) -> Vec<EditViolation> {
    let mut violations = Vec::new();

    let edited_qty = total_qty(edited);
    if edited_qty > order.requested() {
        violations.push(EditViolation::ExceedsRequest {
            requested: order.requested(),
            edited: edited_qty,
        });
    }

    let credit = effective.credit_of(&order.customer_id);
    if credit.is_none() {
        violations.push(EditViolation::MissingCredit {
            customer_id: order.customer_id.clone(),
        });
    }

    // Aggregate per source, in the order sources first appear
    let mut used: Vec<(SourceKey<'_>, i64)> = Vec::new();
    for line in edited.iter().filter(|l| l.qty > 0) {
        let key = line.source_key();
        match used.iter_mut().find(|(k, _)| *k == key) {
            Some((_, qty)) => *qty = qty.saturating_add(line.qty),
            None => used.push((key, line.qty)),
        }
    }
    for (key, requested) in used {
        match effective.slot(&key) {
            None => violations.push(EditViolation::NoInventory {
                item_id: key.item_id.to_string(),
                warehouse_id: key.warehouse_id.to_string(),
                supplier_id: key.supplier_id.to_string(),
            }),
            Some(slot) if requested > slot.remaining_qty => {
                violations.push(EditViolation::ExceedsStock {
                    item_id: key.item_id.to_string(),
                    warehouse_id: key.warehouse_id.to_string(),
                    supplier_id: key.supplier_id.to_string(),
                    stock: slot.remaining_qty,
                    requested,
                })
            }
            Some(_) => {}
        }
    }

    if let Some(credit) = credit {
        let effective_credit = credit.remaining_credit();
        let amount = total_amount(edited);
        if amount > effective_credit {
            violations.push(EditViolation::ExceedsCredit {
                effective_credit,
                amount,
            });
        }
    }

    violations
}

// =============================================================================
// Commit
// =============================================================================

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedEdit {
    /// The new live ledger.
    pub snapshot: LedgerSnapshot,
    /// The order's new committed lines, zero-quantity lines removed.
    pub lines: Vec<AllocationLine>,
}

/// Validates `edited` and, if clean, computes the ledger after swapping the
/// order's committed lines for it.
///
/// Nothing is mutated: the caller installs [`CommittedEdit`] on success.
pub fn commit_edits(
    order: &OrderLine,
    live: &LedgerSnapshot,
    committed: &[AllocationLine],
    edited: &[AllocationLine],
) -> Result<CommittedEdit, Vec<EditViolation>> {
    let mut snapshot = effective_snapshot(live, order, committed);

    let violations = validate_edits(order, &snapshot, edited);
    if !violations.is_empty() {
        debug!(
            sub_order_id = %order.sub_order_id,
            violations = violations.len(),
            "Manual commit refused"
        );
        return Err(violations);
    }

    let lines: Vec<AllocationLine> = edited.iter().filter(|l| l.qty > 0).cloned().collect();
    snapshot.apply_effect(&order.customer_id, &lines);

    debug!(
        sub_order_id = %order.sub_order_id,
        lines = lines.len(),
        qty = total_qty(&lines),
        "Manual commit applied"
    );
    Ok(CommittedEdit { snapshot, lines })
}

/// Swaps the lines of one sub-order in a committed allocation list.
///
/// Other orders' lines keep their relative order; the replacement lines go
/// at the end.
pub fn replace_order_lines(
    allocations: &mut Vec<AllocationLine>,
    sub_order_id: &str,
    lines: Vec<AllocationLine>,
) {
    allocations.retain(|l| l.sub_order_id != sub_order_id);
    allocations.extend(lines.into_iter().filter(|l| l.qty > 0));
}

// =============================================================================
// Draft Editing
// =============================================================================

/// Sets the quantity of one draft line from raw operator input.
///
/// The input is truncated to a whole, non-negative number of units and the
/// line amount is recomputed. A line that ends up at zero is removed.
pub fn update_line_qty(
    sub_order_id: &str,
    lines: &mut Vec<AllocationLine>,
    index: usize,
    raw_qty: f64,
) -> CoreResult<()> {
    let len = lines.len();
    let line = lines.get_mut(index).ok_or_else(|| CoreError::LineIndexOutOfRange {
        sub_order_id: sub_order_id.to_string(),
        index,
        len,
    })?;

    let qty = normalize_quantity(raw_qty);
    line.set_qty(qty);
    if qty == 0 {
        lines.remove(index);
    }
    Ok(())
}

/// Builds a draft line for a hand-picked source.
pub fn draft_line(
    order: &OrderLine,
    warehouse_id: &str,
    supplier_id: &str,
    qty: i64,
    unit_price: Money,
) -> AllocationLine {
    AllocationLine::new(
        order.sub_order_id.as_str(),
        order.item_id.as_str(),
        warehouse_id,
        supplier_id,
        qty,
        unit_price,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderType;
    use chrono::Utc;

    fn order(request_qty: i64) -> OrderLine {
        OrderLine {
            order_id: "O-1".into(),
            sub_order_id: "S-1".into(),
            item_id: "Item-1".into(),
            warehouse: SourceFilter::Any,
            supplier: SourceFilter::Any,
            request_qty,
            order_type: OrderType::Daily,
            create_date: Utc::now(),
            customer_id: "CT-1".into(),
            remark: None,
        }
    }

    fn line(wh: &str, sp: &str, qty: i64, price: i64) -> AllocationLine {
        AllocationLine::new("S-1", "Item-1", wh, sp, qty, Money::from_cents(price))
    }

    /// Live ledger after S-1 already took 40 from WH-001 at $10.
    fn live() -> LedgerSnapshot {
        LedgerSnapshot::new(
            vec![
                InventorySlot::new("Item-1", "WH-001", "SP-001", 60),
                InventorySlot::new("Item-1", "WH-002", "SP-001", 30),
                InventorySlot::new("Item-2", "WH-001", "SP-001", 500),
            ],
            vec![
                CustomerCredit::new("CT-1", Money::from_cents(10_000)),
                CustomerCredit::new("CT-2", Money::from_cents(99_999)),
            ],
        )
    }

    fn committed() -> Vec<AllocationLine> {
        vec![line("WH-001", "SP-001", 40, 1000)]
    }

    #[test]
    fn test_effective_snapshot_refunds_without_touching_live() {
        let live = live();
        let effective = effective_snapshot(&live, &order(50), &committed());

        assert_eq!(effective.inventory[0].remaining_qty, 100);
        assert_eq!(effective.credit_of("CT-1").unwrap().remaining_credit_cents, 50_000);
        // Other customers are untouched
        assert_eq!(effective.credit_of("CT-2").unwrap().remaining_credit_cents, 99_999);
        assert_eq!(live.inventory[0].remaining_qty, 60);
        assert_eq!(live.credits[0].remaining_credit_cents, 10_000);
    }

    #[test]
    fn test_undo_recreates_missing_slot() {
        let mut snapshot = LedgerSnapshot::new(vec![], vec![]);
        snapshot.undo_effect("CT-1", &[line("WH-009", "SP-009", 7, 100), line("WH-009", "SP-009", 3, 100)]);

        assert_eq!(snapshot.inventory.len(), 1);
        assert_eq!(snapshot.inventory[0].remaining_qty, 10);
        assert!(snapshot.credits.is_empty());
    }

    #[test]
    fn test_manual_candidates_use_effective_stock() {
        let o = order(50);
        let effective = effective_snapshot(&live(), &o, &committed());

        let all = list_manual_candidates(&o, &effective.inventory, &SourceFilter::Any, &SourceFilter::Any);
        assert_eq!(
            all,
            vec![
                CandidateSource {
                    warehouse_id: "WH-001".into(),
                    supplier_id: "SP-001".into(),
                    remaining_qty: 100,
                },
                CandidateSource {
                    warehouse_id: "WH-002".into(),
                    supplier_id: "SP-001".into(),
                    remaining_qty: 30,
                },
            ]
        );

        let narrowed = list_manual_candidates(
            &o,
            &effective.inventory,
            &SourceFilter::pinned("WH-002"),
            &SourceFilter::Any,
        );
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].warehouse_id, "WH-002");
    }

    #[test]
    fn test_manual_candidates_respect_order_pin() {
        let mut o = order(50);
        o.warehouse = SourceFilter::pinned("WH-002");
        let all = list_manual_candidates(&o, &live().inventory, &SourceFilter::Any, &SourceFilter::Any);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].warehouse_id, "WH-002");
    }

    #[test]
    fn test_validate_accepts_reshuffle_within_effective_capacity() {
        let o = order(50);
        let effective = effective_snapshot(&live(), &o, &committed());
        let edited = vec![line("WH-001", "SP-001", 20, 1000), line("WH-002", "SP-001", 30, 1000)];

        assert!(validate_edits(&o, &effective, &edited).is_empty());
    }

    #[test]
    fn test_validate_collects_every_violation() {
        let o = order(50);
        let effective = effective_snapshot(&live(), &o, &committed());
        let edited = vec![
            line("WH-002", "SP-001", 20, 1000),
            line("WH-002", "SP-001", 20, 1000),
            line("WH-404", "SP-001", 5, 1000),
            line("WH-001", "SP-001", 10, 1000),
        ];

        let violations = validate_edits(&o, &effective, &edited);
        assert_eq!(
            violations,
            vec![
                EditViolation::ExceedsRequest {
                    requested: 50,
                    edited: 55,
                },
                EditViolation::ExceedsStock {
                    item_id: "Item-1".into(),
                    warehouse_id: "WH-002".into(),
                    supplier_id: "SP-001".into(),
                    stock: 30,
                    requested: 40,
                },
                EditViolation::NoInventory {
                    item_id: "Item-1".into(),
                    warehouse_id: "WH-404".into(),
                    supplier_id: "SP-001".into(),
                },
                EditViolation::ExceedsCredit {
                    effective_credit: Money::from_cents(50_000),
                    amount: Money::from_cents(55_000),
                },
            ]
        );
    }

    #[test]
    fn test_validate_reports_missing_credit() {
        let mut o = order(10);
        o.customer_id = "CT-404".into();
        let violations = validate_edits(&o, &live(), &[line("WH-001", "SP-001", 1, 1000)]);
        assert_eq!(
            violations,
            vec![EditViolation::MissingCredit {
                customer_id: "CT-404".into()
            }]
        );
    }

    #[test]
    fn test_commit_swaps_ledger_and_drops_zero_lines() {
        let o = order(50);
        let edited = vec![line("WH-002", "SP-001", 25, 1000), line("WH-001", "SP-001", 0, 1000)];

        let outcome = commit_edits(&o, &live(), &committed(), &edited).unwrap();

        assert_eq!(outcome.lines, vec![line("WH-002", "SP-001", 25, 1000)]);
        assert_eq!(outcome.snapshot.inventory[0].remaining_qty, 100);
        assert_eq!(outcome.snapshot.inventory[1].remaining_qty, 5);
        assert_eq!(
            outcome.snapshot.credit_of("CT-1").unwrap().remaining_credit_cents,
            25_000
        );
    }

    #[test]
    fn test_commit_identical_set_is_a_no_op() {
        let live = live();
        let outcome = commit_edits(&order(50), &live, &committed(), &committed()).unwrap();
        assert_eq!(outcome.snapshot, live);
        assert_eq!(outcome.lines, committed());
    }

    #[test]
    fn test_commit_refused_returns_violations() {
        let edited = vec![line("WH-002", "SP-001", 31, 1000)];
        let err = commit_edits(&order(50), &live(), &committed(), &edited).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(matches!(err[0], EditViolation::ExceedsStock { stock: 30, .. }));
    }

    #[test]
    fn test_replace_order_lines_keeps_other_orders() {
        let mut other = line("WH-001", "SP-001", 5, 100);
        other.sub_order_id = "S-2".into();
        let mut allocations = vec![line("WH-001", "SP-001", 40, 1000), other.clone()];

        replace_order_lines(
            &mut allocations,
            "S-1",
            vec![line("WH-002", "SP-001", 3, 1000), line("WH-001", "SP-001", 0, 1000)],
        );

        assert_eq!(allocations, vec![other, line("WH-002", "SP-001", 3, 1000)]);
    }

    #[test]
    fn test_update_line_qty_truncates_and_recomputes() {
        let mut lines = committed();
        update_line_qty("S-1", &mut lines, 0, 12.9).unwrap();
        assert_eq!(lines[0].qty, 12);
        assert_eq!(lines[0].amount_cents, 12_000);

        update_line_qty("S-1", &mut lines, 0, -3.0).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_update_line_qty_rejects_bad_index() {
        let mut lines = committed();
        let err = update_line_qty("S-1", &mut lines, 3, 1.0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::LineIndexOutOfRange { index: 3, len: 1, .. }
        ));
    }
}
