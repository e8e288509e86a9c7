//! # Commands Module
//!
//! Every operation the `allot` binary exposes, as plain functions over the
//! session state.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── allocation.rs  ◄─── Auto run, reset
//! ├── manual.rs      ◄─── Candidates, draft edits, validate, commit
//! └── report.rs      ◄─── Board summary, order listing
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ allot --scenario demo.json edit --sub-order S-1 --set 0=5 --commit   │
//! │         │                                                               │
//! │         │ (clap parses argv in main.rs)                                 │
//! │         ▼                                                               │
//! │  commands::manual::edit_order(&mut BoardState, EditRequest)            │
//! │         │                                                               │
//! │         │ (delegates to allot-core)                                     │
//! │         ▼                                                               │
//! │  AllocationBoard::begin_edit / update_edited_line_qty / commit_edits   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Result<EditResponse, ApiError> ──► printed as text or JSON            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Types
//! Responses derive `Serialize` with camelCase fields, so `--json` output
//! uses the same names as scenario files.

pub mod allocation;
pub mod manual;
pub mod report;

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};

    use allot_core::{
        AllocationBoard, CustomerCredit, InventorySlot, Money, OrderLine, OrderType, PriceRule,
        SourceFilter, TypeMultipliers,
    };

    use crate::state::BoardState;

    /// Two orders competing for Item-1.
    ///
    /// After an auto run: S-1 (EMERGENCY, any source) takes 100 from
    /// WH-002/SP-002 at $8.00; S-2 (DAILY, WH-001) takes 30 from
    /// WH-001/SP-001 at $10.00 before CT-2's $300 runs out.
    pub(crate) fn demo_state() -> BoardState {
        let order = |sub: &str,
                     customer: &str,
                     order_type: OrderType,
                     warehouse: SourceFilter,
                     qty: i64,
                     day: u32| OrderLine {
            order_id: format!("O-{}", sub),
            sub_order_id: sub.to_string(),
            item_id: "Item-1".to_string(),
            warehouse,
            supplier: SourceFilter::Any,
            request_qty: qty,
            order_type,
            create_date: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            customer_id: customer.to_string(),
            remark: (order_type == OrderType::Emergency).then(|| "Special for VIP".to_string()),
        };
        let rule = |supplier: &str, cents: i64| PriceRule {
            item_id: "Item-1".to_string(),
            supplier_id: supplier.to_string(),
            base_unit_price_cents: cents,
            type_multiplier: TypeMultipliers::flat(),
        };

        let board = AllocationBoard::new(
            vec![
                order("S-2", "CT-2", OrderType::Daily, SourceFilter::pinned("WH-001"), 50, 1),
                order("S-1", "CT-1", OrderType::Emergency, SourceFilter::Any, 100, 2),
            ],
            vec![
                InventorySlot::new("Item-1", "WH-001", "SP-001", 80),
                InventorySlot::new("Item-1", "WH-002", "SP-002", 300),
            ],
            vec![
                CustomerCredit::new("CT-1", Money::from_cents(200_000)),
                CustomerCredit::new("CT-2", Money::from_cents(30_000)),
            ],
            vec![rule("SP-001", 1_000), rule("SP-002", 800)],
        );
        BoardState::new(board)
    }
}
