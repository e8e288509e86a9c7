//! # Allocation Board
//!
//! Application state for one allocation session: the inputs, the baseline,
//! the live ledger, committed lines and the operator's open edit drafts.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   new(orders, inventory, credits, rules)                               │
//! │        │   baseline = live = inputs                                     │
//! │        ▼                                                                │
//! │   run_auto() ─────────► baseline ──► committed lines + live ledger      │
//! │        │                        │                                       │
//! │        │              begin_edit(S) ──► draft(S) = committed(S)        │
//! │        │                        │                                       │
//! │        │              update_edited_line_qty / add_edited_line         │
//! │        │                        │                                       │
//! │        │              validate_edits(S) ──► violations                  │
//! │        │                        │                                       │
//! │        │              commit_edits(S) ──► committed(S) = draft(S)       │
//! │        ▼                                                                │
//! │   reset_to_baseline() ──► live = baseline, no lines, no drafts          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The board has no interior locking. Callers hold it by `&mut` and so
//! serialize every entry point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::allocation::{allocate, unit_price_for};
use crate::error::{CoreError, CoreResult, EditViolation};
use crate::manual::{self, LedgerSnapshot};
use crate::money::{normalize_quantity, Money};
use crate::sequencing::compare_orders;
use crate::types::{
    total_amount, total_qty, AllocationLine, AllocationResult, CandidateSource, CustomerCredit,
    InventorySlot, OrderLine, OrderType, PriceRule, SourceFilter,
};

// =============================================================================
// Summary Types
// =============================================================================

/// Board-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub order_count: usize,
    pub line_count: usize,
    pub total_request: i64,
    pub total_allocated: i64,
    pub stock_remaining: i64,
    pub credit_remaining: Money,
    /// Requested units not covered by any committed line.
    pub shortage: i64,
}

/// Progress of one order against its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderProgress {
    pub sub_order_id: String,
    pub order_id: String,
    pub customer_id: String,
    pub item_id: String,
    pub order_type: OrderType,
    pub requested: i64,
    pub allocated: i64,
    pub amount: Money,
    pub shortage: i64,
}

/// Filter for listing orders.
///
/// `text` matches case-insensitively against order, sub-order, customer and
/// item ids and the remark. Empty text matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub text: String,
    pub order_type: Option<OrderType>,
}

impl OrderQuery {
    pub fn matches(&self, order: &OrderLine) -> bool {
        if let Some(order_type) = self.order_type {
            if order.order_type != order_type {
                return false;
            }
        }

        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            order.order_id.as_str(),
            order.sub_order_id.as_str(),
            order.customer_id.as_str(),
            order.item_id.as_str(),
            order.remark.as_deref().unwrap_or(""),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

// =============================================================================
// Allocation Board
// =============================================================================

/// Owns every snapshot the allocation entry points read and write.
#[derive(Debug, Clone)]
pub struct AllocationBoard {
    orders: Vec<OrderLine>,
    price_rules: Vec<PriceRule>,
    baseline: LedgerSnapshot,
    live: LedgerSnapshot,
    allocations: Vec<AllocationLine>,
    drafts: BTreeMap<String, Vec<AllocationLine>>,
}

impl AllocationBoard {
    /// Creates a board. The given inventory and credits become the baseline.
    pub fn new(
        orders: Vec<OrderLine>,
        inventory: Vec<InventorySlot>,
        credits: Vec<CustomerCredit>,
        price_rules: Vec<PriceRule>,
    ) -> Self {
        let baseline = LedgerSnapshot::new(inventory, credits);
        AllocationBoard {
            orders,
            price_rules,
            live: baseline.clone(),
            baseline,
            allocations: Vec::new(),
            drafts: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn orders(&self) -> &[OrderLine] {
        &self.orders
    }

    pub fn price_rules(&self) -> &[PriceRule] {
        &self.price_rules
    }

    pub fn inventory(&self) -> &[InventorySlot] {
        &self.live.inventory
    }

    pub fn credits(&self) -> &[CustomerCredit] {
        &self.live.credits
    }

    pub fn baseline(&self) -> &LedgerSnapshot {
        &self.baseline
    }

    /// Every committed line, across all orders.
    pub fn allocations(&self) -> &[AllocationLine] {
        &self.allocations
    }

    /// Looks up an order by sub-order id.
    pub fn order(&self, sub_order_id: &str) -> CoreResult<&OrderLine> {
        self.orders
            .iter()
            .find(|o| o.sub_order_id == sub_order_id)
            .ok_or_else(|| CoreError::SubOrderNotFound(sub_order_id.to_string()))
    }

    /// Committed lines of one order.
    pub fn committed_lines(&self, sub_order_id: &str) -> Vec<AllocationLine> {
        self.allocations
            .iter()
            .filter(|l| l.sub_order_id == sub_order_id)
            .cloned()
            .collect()
    }

    /// The open draft of one order, if any.
    pub fn edited_lines(&self, sub_order_id: &str) -> Option<&[AllocationLine]> {
        self.drafts.get(sub_order_id).map(Vec::as_slice)
    }

    // -------------------------------------------------------------------------
    // Automatic Allocation
    // -------------------------------------------------------------------------

    /// Allocates every order against the baseline ledger and commits the
    /// result.
    ///
    /// The committed line set and the live ledger are replaced wholesale,
    /// so earlier runs and manual commits are discarded and the live ledger
    /// stays the baseline minus the committed lines. Open drafts are
    /// reseeded from the new committed lines.
    pub fn run_auto(&mut self) -> AllocationResult {
        let result = allocate(
            &self.orders,
            &self.baseline.inventory,
            &self.baseline.credits,
            &self.price_rules,
        );

        self.allocations = result.allocations.clone();
        self.live = LedgerSnapshot::new(result.inventory.clone(), result.credits.clone());
        self.refresh_drafts();
        result
    }

    /// Restores the baseline ledger and clears every committed line and draft.
    pub fn reset_to_baseline(&mut self) {
        self.live = self.baseline.clone();
        self.allocations.clear();
        self.drafts.clear();
        info!("Board reset to baseline");
    }

    fn refresh_drafts(&mut self) {
        let open: Vec<String> = self.drafts.keys().cloned().collect();
        for sub_order_id in open {
            let lines = self.committed_lines(&sub_order_id);
            self.drafts.insert(sub_order_id, lines);
        }
    }

    // -------------------------------------------------------------------------
    // Manual Editing
    // -------------------------------------------------------------------------

    /// Opens a draft for one order, seeded from its committed lines.
    ///
    /// Reopening an existing draft discards its uncommitted changes.
    pub fn begin_edit(&mut self, sub_order_id: &str) -> CoreResult<&[AllocationLine]> {
        self.order(sub_order_id)?;
        let lines = self.committed_lines(sub_order_id);
        debug!(sub_order_id, lines = lines.len(), "Edit opened");
        let draft = self.drafts.entry(sub_order_id.to_string()).or_default();
        *draft = lines;
        Ok(draft.as_slice())
    }

    /// Closes a draft without committing it. Returns false if none was open.
    pub fn discard_edit(&mut self, sub_order_id: &str) -> bool {
        self.drafts.remove(sub_order_id).is_some()
    }

    /// The ledger as it would be without this order's committed lines.
    pub fn effective_snapshot(&self, sub_order_id: &str) -> CoreResult<LedgerSnapshot> {
        let order = self.order(sub_order_id)?;
        Ok(manual::effective_snapshot(
            &self.live,
            order,
            &self.committed_lines(sub_order_id),
        ))
    }

    /// Sources the operator may choose for one order, best first.
    pub fn list_manual_candidates(
        &self,
        sub_order_id: &str,
        filter_warehouse: &SourceFilter,
        filter_supplier: &SourceFilter,
    ) -> CoreResult<Vec<CandidateSource>> {
        let order = self.order(sub_order_id)?;
        let effective = self.effective_snapshot(sub_order_id)?;
        Ok(manual::list_manual_candidates(
            order,
            &effective.inventory,
            filter_warehouse,
            filter_supplier,
        ))
    }

    /// Sets a draft line's quantity from raw input; zero removes the line.
    pub fn update_edited_line_qty(
        &mut self,
        sub_order_id: &str,
        line_index: usize,
        new_qty: f64,
    ) -> CoreResult<()> {
        let draft = self.draft_mut(sub_order_id)?;
        manual::update_line_qty(sub_order_id, draft, line_index, new_qty)
    }

    /// Appends a draft line drawing from a hand-picked source.
    ///
    /// The line is priced from the price rules for the order's urgency
    /// class. Returns `Ok(false)` and leaves the draft alone when the
    /// quantity normalizes to zero.
    pub fn add_edited_line(
        &mut self,
        sub_order_id: &str,
        warehouse_id: &str,
        supplier_id: &str,
        qty: f64,
    ) -> CoreResult<bool> {
        let order = self.order(sub_order_id)?;
        if !self.drafts.contains_key(sub_order_id) {
            return Err(CoreError::NoOpenDraft(sub_order_id.to_string()));
        }

        let unit_price =
            unit_price_for(&self.price_rules, &order.item_id, supplier_id, order.order_type)
                .ok_or_else(|| CoreError::PriceRuleNotFound {
                    item_id: order.item_id.clone(),
                    supplier_id: supplier_id.to_string(),
                })?;

        let qty = normalize_quantity(qty);
        if qty == 0 {
            return Ok(false);
        }

        let line = manual::draft_line(order, warehouse_id, supplier_id, qty, unit_price);
        self.draft_mut(sub_order_id)?.push(line);
        Ok(true)
    }

    /// Every reason the open draft cannot be committed (empty = valid).
    pub fn validate_edits(&self, sub_order_id: &str) -> CoreResult<Vec<EditViolation>> {
        let order = self.order(sub_order_id)?;
        let draft = self.draft(sub_order_id)?;
        let effective = self.effective_snapshot(sub_order_id)?;
        Ok(manual::validate_edits(order, &effective, draft))
    }

    /// Commits the open draft if it is valid.
    ///
    /// Returns `Ok(true)` when the draft replaced the order's committed
    /// lines and the live ledger was updated, `Ok(false)` when validation
    /// refused it and nothing changed.
    pub fn commit_edits(&mut self, sub_order_id: &str) -> CoreResult<bool> {
        let order = self.order(sub_order_id)?;
        let draft = self.draft(sub_order_id)?;
        let committed = self.committed_lines(sub_order_id);

        let outcome = match manual::commit_edits(order, &self.live, &committed, draft) {
            Ok(outcome) => outcome,
            Err(_) => return Ok(false),
        };

        info!(
            sub_order_id,
            lines = outcome.lines.len(),
            qty = total_qty(&outcome.lines),
            amount = %total_amount(&outcome.lines),
            "Manual edit committed"
        );
        self.live = outcome.snapshot;
        manual::replace_order_lines(&mut self.allocations, sub_order_id, outcome.lines.clone());
        self.drafts.insert(sub_order_id.to_string(), outcome.lines);
        Ok(true)
    }

    fn draft(&self, sub_order_id: &str) -> CoreResult<&Vec<AllocationLine>> {
        self.drafts
            .get(sub_order_id)
            .ok_or_else(|| CoreError::NoOpenDraft(sub_order_id.to_string()))
    }

    fn draft_mut(&mut self, sub_order_id: &str) -> CoreResult<&mut Vec<AllocationLine>> {
        self.drafts
            .get_mut(sub_order_id)
            .ok_or_else(|| CoreError::NoOpenDraft(sub_order_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Reporting
    // -------------------------------------------------------------------------

    /// Board-wide totals over the live ledger and committed lines.
    pub fn summary(&self) -> BoardSummary {
        let total_request: i64 = self.orders.iter().map(OrderLine::requested).sum();
        let total_allocated = total_qty(&self.allocations);
        BoardSummary {
            order_count: self.orders.len(),
            line_count: self.allocations.len(),
            total_request,
            total_allocated,
            stock_remaining: self.live.inventory.iter().map(|s| s.remaining_qty).sum(),
            credit_remaining: self.live.credits.iter().map(CustomerCredit::remaining_credit).sum(),
            shortage: (total_request - total_allocated).max(0),
        }
    }

    /// Per-order progress for the orders matching `query`, in allocation
    /// sequence.
    pub fn order_progress(&self, query: &OrderQuery) -> Vec<OrderProgress> {
        let mut orders: Vec<&OrderLine> =
            self.orders.iter().filter(|o| query.matches(o)).collect();
        orders.sort_by(|a, b| compare_orders(a, b));

        orders
            .into_iter()
            .map(|o| {
                let lines = self.committed_lines(&o.sub_order_id);
                let allocated = total_qty(&lines);
                OrderProgress {
                    sub_order_id: o.sub_order_id.clone(),
                    order_id: o.order_id.clone(),
                    customer_id: o.customer_id.clone(),
                    item_id: o.item_id.clone(),
                    order_type: o.order_type,
                    requested: o.requested(),
                    allocated,
                    amount: total_amount(&lines),
                    shortage: (o.requested() - allocated).max(0),
                }
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
