//! End-to-end allocation scenarios through the public board API.

use allot_core::{
    AllocationBoard, AllocationWarning, CustomerCredit, EditViolation, InventorySlot, Money,
    OrderLine, OrderType, PriceRule, SourceFilter, TypeMultipliers,
};
use chrono::{TimeZone, Utc};

fn order(warehouse: SourceFilter, supplier: SourceFilter, request_qty: i64) -> OrderLine {
    OrderLine {
        order_id: "ORDER-0001".into(),
        sub_order_id: "ORDER-0001-001".into(),
        item_id: "Item-1".into(),
        warehouse,
        supplier,
        request_qty,
        order_type: OrderType::Daily,
        create_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        customer_id: "CT-0001".into(),
        remark: None,
    }
}

fn rule(supplier_id: &str, cents: i64) -> PriceRule {
    PriceRule {
        item_id: "Item-1".into(),
        supplier_id: supplier_id.into(),
        base_unit_price_cents: cents,
        type_multiplier: TypeMultipliers::flat(),
    }
}

fn credit(cents: i64) -> Vec<CustomerCredit> {
    vec![CustomerCredit::new("CT-0001", Money::from_cents(cents))]
}

fn pinned_board(credit_cents: i64) -> AllocationBoard {
    AllocationBoard::new(
        vec![order(
            SourceFilter::pinned("WH-001"),
            SourceFilter::pinned("SP-001"),
            100,
        )],
        vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 150)],
        credit(credit_cents),
        vec![rule("SP-001", 1_000)],
    )
}

#[test]
fn scenario_a_full_allocation() {
    let mut board = pinned_board(200_000);
    let result = board.run_auto();

    assert_eq!(result.allocations.len(), 1);
    let line = &result.allocations[0];
    assert_eq!(line.qty, 100);
    assert_eq!(line.amount(), Money::from_cents(100_000));
    assert_eq!(result.remaining_request_by_sub_order_id["ORDER-0001-001"], 0);
    assert!(result.warnings.is_empty());

    assert_eq!(board.inventory()[0].remaining_qty, 50);
    assert_eq!(board.credits()[0].remaining_credit_cents, 100_000);
}

#[test]
fn scenario_b_credit_caps_quantity() {
    let mut board = pinned_board(50_000);
    let result = board.run_auto();

    assert_eq!(result.allocated_qty(), 50);
    assert_eq!(result.remaining_request_by_sub_order_id["ORDER-0001-001"], 50);
    assert_eq!(
        result.warnings,
        vec![AllocationWarning::NotFullyAllocated {
            sub_order_id: "ORDER-0001-001".into(),
            remaining: 50,
        }]
    );
    assert_eq!(board.credits()[0].remaining_credit_cents, 0);
}

#[test]
fn scenario_c_largest_source_first() {
    let mut board = AllocationBoard::new(
        vec![order(SourceFilter::Any, SourceFilter::Any, 350)],
        vec![
            InventorySlot::new("Item-1", "WH-001", "SP-001", 80),
            InventorySlot::new("Item-1", "WH-002", "SP-002", 300),
        ],
        credit(10_000_000),
        vec![rule("SP-001", 1_000), rule("SP-002", 1_000)],
    );
    let result = board.run_auto();

    let sources: Vec<_> = result
        .allocations
        .iter()
        .map(|l| (l.warehouse_id.as_str(), l.qty))
        .collect();
    assert_eq!(sources, vec![("WH-002", 300), ("WH-001", 50)]);
}

#[test]
fn scenario_d_missing_price_rule_skips_candidate() {
    let mut board = AllocationBoard::new(
        vec![order(SourceFilter::Any, SourceFilter::Any, 100)],
        vec![
            InventorySlot::new("Item-1", "WH-001", "SP-001", 80),
            InventorySlot::new("Item-1", "WH-002", "SP-002", 300),
        ],
        credit(10_000_000),
        vec![rule("SP-001", 1_000)],
    );
    let result = board.run_auto();

    assert_eq!(result.allocations.len(), 1);
    assert_eq!(result.allocations[0].supplier_id, "SP-001");
    assert_eq!(result.allocations[0].qty, 80);
    assert_eq!(
        result.warnings,
        vec![
            AllocationWarning::MissingPriceRule {
                item_id: "Item-1".into(),
                supplier_id: "SP-002".into(),
            },
            AllocationWarning::NotFullyAllocated {
                sub_order_id: "ORDER-0001-001".into(),
                remaining: 20,
            },
        ]
    );
    // The unpriced slot keeps its stock
    assert_eq!(board.inventory()[1].remaining_qty, 300);
}

#[test]
fn scenario_e_zeroed_line_returns_stock_and_credit() {
    let mut board = pinned_board(200_000);
    board.run_auto();

    board.begin_edit("ORDER-0001-001").unwrap();
    board
        .update_edited_line_qty("ORDER-0001-001", 0, 0.0)
        .unwrap();
    assert!(board.validate_edits("ORDER-0001-001").unwrap().is_empty());
    assert!(board.commit_edits("ORDER-0001-001").unwrap());

    assert!(board.committed_lines("ORDER-0001-001").is_empty());
    assert_eq!(board.inventory()[0].remaining_qty, 150);
    assert_eq!(board.credits()[0].remaining_credit_cents, 200_000);
}

#[test]
fn reset_then_run_is_repeatable() {
    let mut board = pinned_board(50_000);
    board.reset_to_baseline();
    let first = board.run_auto();
    board.reset_to_baseline();
    let second = board.run_auto();

    assert_eq!(first, second);
}

#[test]
fn identical_edit_leaves_ledger_unchanged() {
    let mut board = pinned_board(200_000);
    board.run_auto();
    let inventory = board.inventory().to_vec();
    let credits = board.credits().to_vec();

    board.begin_edit("ORDER-0001-001").unwrap();
    assert!(board.commit_edits("ORDER-0001-001").unwrap());

    assert_eq!(board.inventory(), inventory.as_slice());
    assert_eq!(board.credits(), credits.as_slice());
}

#[test]
fn running_auto_twice_charges_the_ledger_once() {
    let mut board = pinned_board(200_000);
    board.run_auto();
    board.run_auto();

    assert_eq!(board.committed_lines("ORDER-0001-001")[0].qty, 100);
    assert_eq!(board.inventory()[0].remaining_qty, 50);
    assert_eq!(board.credits()[0].remaining_credit_cents, 100_000);
}

#[test]
fn huge_edit_quantity_is_rejected_without_touching_the_ledger() {
    let mut board = pinned_board(200_000);
    board.run_auto();

    board.begin_edit("ORDER-0001-001").unwrap();
    board
        .update_edited_line_qty("ORDER-0001-001", 0, 1e19)
        .unwrap();

    let violations = board.validate_edits("ORDER-0001-001").unwrap();
    assert!(matches!(
        violations[0],
        EditViolation::ExceedsRequest { requested: 100, .. }
    ));
    assert!(!board.commit_edits("ORDER-0001-001").unwrap());
    assert_eq!(board.inventory()[0].remaining_qty, 50);
    assert_eq!(board.credits()[0].remaining_credit_cents, 100_000);
}
