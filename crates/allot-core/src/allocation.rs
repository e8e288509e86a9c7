//! # Greedy Allocation Loop
//!
//! Walks the orders in sequence and fills each one from its ranked candidate
//! sources, capped by request, stock and the customer's credit.
//!
//! ## Flow per Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order ──► credit record? ──no──► MissingCredit, next order             │
//! │              │yes                                                       │
//! │              ▼                                                          │
//! │          candidates? ──none──► NoCandidates, next order                 │
//! │              │                                                          │
//! │              ▼                                                          │
//! │   for slot in ranking (while request remains):                          │
//! │     price = round_half_even(base × multiplier)  (none ► MissingPrice)   │
//! │     qty   = min(remaining, stock, credit_cents / price_cents)           │
//! │     deduct stock + credit, emit AllocationLine                          │
//! │     credit == 0 ──► stop this order                                     │
//! │              │                                                          │
//! │              ▼                                                          │
//! │   remaining > 0 ──► NotFullyAllocated                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The inputs are never mutated. The loop works on owned copies and hands
//! them back inside the [`AllocationResult`].

use std::collections::BTreeMap;

use tracing::{debug, info, info_span, warn};

use crate::error::AllocationWarning;
use crate::money::Money;
use crate::sequencing::sequence_orders;
use crate::sourcing::{rank_candidates, SourceCriteria};
use crate::types::{
    AllocationLine, AllocationResult, CustomerCredit, InventorySlot, OrderLine, OrderType,
    PriceRule,
};

// =============================================================================
// Price Lookup
// =============================================================================

/// First price rule for an item/supplier pair.
pub fn find_price_rule<'a>(
    price_rules: &'a [PriceRule],
    item_id: &str,
    supplier_id: &str,
) -> Option<&'a PriceRule> {
    price_rules
        .iter()
        .find(|r| r.item_id == item_id && r.supplier_id == supplier_id)
}

/// Unit price an order of `order_type` pays for the item from `supplier_id`.
///
/// `None` when there is no rule, or the rule prices the unit at zero or less.
/// Both cases mean the source cannot be charged for.
pub fn unit_price_for(
    price_rules: &[PriceRule],
    item_id: &str,
    supplier_id: &str,
    order_type: OrderType,
) -> Option<Money> {
    find_price_rule(price_rules, item_id, supplier_id)
        .map(|rule| rule.unit_price(order_type))
        .filter(Money::is_positive)
}

// =============================================================================
// Allocation Run
// =============================================================================

/// Runs one full allocation pass.
///
/// ## Example
/// ```rust
/// use allot_core::{allocate, CustomerCredit, InventorySlot, Money, OrderLine, OrderType,
///                  PriceRule, SourceFilter, TypeMultipliers};
/// use chrono::Utc;
///
/// let orders = vec![OrderLine {
///     order_id: "O-1".into(),
///     sub_order_id: "S-1".into(),
///     item_id: "Item-1".into(),
///     warehouse: SourceFilter::Any,
///     supplier: SourceFilter::Any,
///     request_qty: 10,
///     order_type: OrderType::Daily,
///     create_date: Utc::now(),
///     customer_id: "CT-1".into(),
///     remark: None,
/// }];
/// let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 25)];
/// let credits = vec![CustomerCredit::new("CT-1", Money::from_cents(5_000))];
/// let rules = vec![PriceRule {
///     item_id: "Item-1".into(),
///     supplier_id: "SP-001".into(),
///     base_unit_price_cents: 250,
///     type_multiplier: TypeMultipliers::flat(),
/// }];
///
/// let result = allocate(&orders, &inventory, &credits, &rules);
/// assert_eq!(result.allocations[0].qty, 10);
/// assert_eq!(result.inventory[0].remaining_qty, 15);
/// assert_eq!(result.credits[0].remaining_credit_cents, 2_500);
/// ```
pub fn allocate(
    orders: &[OrderLine],
    inventory: &[InventorySlot],
    credits: &[CustomerCredit],
    price_rules: &[PriceRule],
) -> AllocationResult {
    let span = info_span!("allocate", orders = orders.len(), slots = inventory.len());
    let _enter = span.enter();

    let mut run = AllocationRun::new(inventory, credits);
    for order in sequence_orders(orders) {
        run.serve(order, price_rules);
    }
    let result = run.finish();

    info!(
        lines = result.allocations.len(),
        allocated = result.allocated_qty(),
        warnings = result.warnings.len(),
        "Allocation run complete"
    );
    result
}

/// Mutable state of one allocation pass.
struct AllocationRun {
    inventory: Vec<InventorySlot>,
    credits: Vec<CustomerCredit>,
    allocations: Vec<AllocationLine>,
    remaining: BTreeMap<String, i64>,
    warnings: Vec<AllocationWarning>,
}

impl AllocationRun {
    fn new(inventory: &[InventorySlot], credits: &[CustomerCredit]) -> Self {
        AllocationRun {
            inventory: inventory.to_vec(),
            credits: credits.to_vec(),
            allocations: Vec::new(),
            remaining: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: AllocationWarning) {
        warn!(%warning, "Allocation warning");
        self.warnings.push(warning);
    }

    fn serve(&mut self, order: &OrderLine, price_rules: &[PriceRule]) {
        let mut remaining = order.requested();
        self.remaining.insert(order.sub_order_id.clone(), remaining);

        let Some(credit_idx) = self
            .credits
            .iter()
            .position(|c| c.customer_id == order.customer_id)
        else {
            self.warn(AllocationWarning::MissingCredit {
                customer_id: order.customer_id.clone(),
                sub_order_id: order.sub_order_id.clone(),
            });
            return;
        };
        let mut credit = self.credits[credit_idx].remaining_credit();

        // Ranked once up front; deductions below only shrink these slots
        let candidates = rank_candidates(&SourceCriteria::for_order(order), &self.inventory);
        if candidates.is_empty() {
            self.warn(AllocationWarning::NoCandidates {
                sub_order_id: order.sub_order_id.clone(),
            });
            return;
        }

        for idx in candidates {
            if remaining <= 0 {
                break;
            }

            let stock = self.inventory[idx].remaining_qty.max(0);
            if stock <= 0 {
                continue;
            }

            let supplier_id = self.inventory[idx].supplier_id.clone();
            let Some(unit_price) =
                unit_price_for(price_rules, &order.item_id, &supplier_id, order.order_type)
            else {
                self.warn(AllocationWarning::MissingPriceRule {
                    item_id: order.item_id.clone(),
                    supplier_id,
                });
                continue;
            };

            let affordable = credit.units_affordable(unit_price);
            let qty = remaining.min(stock).min(affordable);
            if qty <= 0 {
                continue;
            }

            let slot = &mut self.inventory[idx];
            slot.remaining_qty = (stock - qty).max(0);
            let line = AllocationLine::new(
                order.sub_order_id.as_str(),
                order.item_id.as_str(),
                slot.warehouse_id.as_str(),
                slot.supplier_id.as_str(),
                qty,
                unit_price,
            );

            credit = (credit - line.amount()).clamp_non_negative();
            self.credits[credit_idx].remaining_credit_cents = credit.cents();
            remaining -= qty;
            self.remaining.insert(order.sub_order_id.clone(), remaining);

            debug!(
                sub_order_id = %line.sub_order_id,
                warehouse_id = %line.warehouse_id,
                supplier_id = %line.supplier_id,
                qty = line.qty,
                amount = %line.amount(),
                "Allocated"
            );
            self.allocations.push(line);

            if !credit.is_positive() {
                break;
            }
        }

        if remaining > 0 {
            self.warn(AllocationWarning::NotFullyAllocated {
                sub_order_id: order.sub_order_id.clone(),
                remaining,
            });
        }
    }

    fn finish(self) -> AllocationResult {
        AllocationResult {
            allocations: self.allocations,
            inventory: self.inventory,
            credits: self.credits,
            remaining_request_by_sub_order_id: self.remaining,
            warnings: self.warnings,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceFilter, TypeMultipliers};
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).unwrap()
    }

    fn order(sub: &str, wh: SourceFilter, sp: SourceFilter, qty: i64) -> OrderLine {
        OrderLine {
            order_id: "O-1".into(),
            sub_order_id: sub.into(),
            item_id: "Item-1".into(),
            warehouse: wh,
            supplier: sp,
            request_qty: qty,
            order_type: OrderType::Daily,
            create_date: at(0),
            customer_id: "CT-1".into(),
            remark: None,
        }
    }

    fn rule(supplier: &str, cents: i64) -> PriceRule {
        PriceRule {
            item_id: "Item-1".into(),
            supplier_id: supplier.into(),
            base_unit_price_cents: cents,
            type_multiplier: TypeMultipliers::flat(),
        }
    }

    fn credit(cents: i64) -> Vec<CustomerCredit> {
        vec![CustomerCredit::new("CT-1", Money::from_cents(cents))]
    }

    #[test]
    fn test_pinned_order_fully_allocated() {
        let orders = vec![order(
            "S-1",
            SourceFilter::pinned("WH-001"),
            SourceFilter::pinned("SP-001"),
            100,
        )];
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 150)];

        let result = allocate(&orders, &inventory, &credit(200_000), &[rule("SP-001", 1000)]);

        assert_eq!(result.allocations.len(), 1);
        let line = &result.allocations[0];
        assert_eq!(line.qty, 100);
        assert_eq!(line.amount(), Money::from_cents(100_000));
        assert_eq!(result.remaining_request_by_sub_order_id["S-1"], 0);
        assert_eq!(result.inventory[0].remaining_qty, 50);
        assert_eq!(result.credits[0].remaining_credit_cents, 100_000);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_credit_caps_quantity() {
        let orders = vec![order(
            "S-1",
            SourceFilter::pinned("WH-001"),
            SourceFilter::pinned("SP-001"),
            100,
        )];
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 150)];

        let result = allocate(&orders, &inventory, &credit(50_000), &[rule("SP-001", 1000)]);

        assert_eq!(result.allocated_qty(), 50);
        assert_eq!(result.credits[0].remaining_credit_cents, 0);
        assert_eq!(
            result.warnings,
            vec![AllocationWarning::NotFullyAllocated {
                sub_order_id: "S-1".into(),
                remaining: 50,
            }]
        );
    }

    #[test]
    fn test_any_source_draws_deepest_pool_first() {
        let orders = vec![order("S-1", SourceFilter::Any, SourceFilter::Any, 100)];
        let inventory = vec![
            InventorySlot::new("Item-1", "WH-001", "SP-001", 80),
            InventorySlot::new("Item-1", "WH-002", "SP-002", 300),
        ];
        let rules = vec![rule("SP-001", 1000), rule("SP-002", 1000)];

        let result = allocate(&orders, &inventory, &credit(1_000_000), &rules);

        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].warehouse_id, "WH-002");
        assert_eq!(result.inventory[0].remaining_qty, 80);
        assert_eq!(result.inventory[1].remaining_qty, 200);
    }

    #[test]
    fn test_missing_price_rule_skips_candidate() {
        let orders = vec![order("S-1", SourceFilter::Any, SourceFilter::Any, 100)];
        let inventory = vec![
            InventorySlot::new("Item-1", "WH-001", "SP-009", 300),
            InventorySlot::new("Item-1", "WH-001", "SP-001", 80),
        ];

        let result = allocate(&orders, &inventory, &credit(1_000_000), &[rule("SP-001", 1000)]);

        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].supplier_id, "SP-001");
        assert_eq!(result.allocations[0].qty, 80);
        assert_eq!(result.inventory[0].remaining_qty, 300);
        assert_eq!(
            result.warning_messages(),
            vec![
                "Missing price rule for item Item-1, supplier SP-009".to_string(),
                "SubOrder S-1 not fully allocated. Remaining request: 20".to_string(),
            ]
        );
    }

    #[test]
    fn test_zero_price_counts_as_missing_rule() {
        let orders = vec![order("S-1", SourceFilter::Any, SourceFilter::Any, 5)];
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];

        let result = allocate(&orders, &inventory, &credit(10_000), &[rule("SP-001", 0)]);

        assert!(result.allocations.is_empty());
        assert!(matches!(
            result.warnings[0],
            AllocationWarning::MissingPriceRule { .. }
        ));
    }

    #[test]
    fn test_missing_credit_skips_order() {
        let mut o = order("S-1", SourceFilter::Any, SourceFilter::Any, 5);
        o.customer_id = "CT-404".into();
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];

        let result = allocate(&[o], &inventory, &credit(10_000), &[rule("SP-001", 100)]);

        assert!(result.allocations.is_empty());
        assert_eq!(result.remaining_request_by_sub_order_id["S-1"], 5);
        assert_eq!(
            result.warning_messages(),
            vec!["Missing credit for customer CT-404 (subOrder S-1)".to_string()]
        );
    }

    #[test]
    fn test_no_candidates_skips_order() {
        let orders = vec![order("S-1", SourceFilter::pinned("WH-404"), SourceFilter::Any, 5)];
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];

        let result = allocate(&orders, &inventory, &credit(10_000), &[rule("SP-001", 100)]);

        assert_eq!(
            result.warnings,
            vec![AllocationWarning::NoCandidates {
                sub_order_id: "S-1".into()
            }]
        );
    }

    #[test]
    fn test_spills_over_multiple_sources() {
        let orders = vec![order("S-1", SourceFilter::Any, SourceFilter::Any, 100)];
        let inventory = vec![
            InventorySlot::new("Item-1", "WH-001", "SP-001", 60),
            InventorySlot::new("Item-1", "WH-002", "SP-001", 70),
        ];

        let result = allocate(&orders, &inventory, &credit(1_000_000), &[rule("SP-001", 100)]);

        let qtys: Vec<(String, i64)> = result
            .allocations
            .iter()
            .map(|l| (l.warehouse_id.clone(), l.qty))
            .collect();
        assert_eq!(qtys, vec![("WH-002".to_string(), 70), ("WH-001".to_string(), 30)]);
        assert_eq!(result.remaining_request_by_sub_order_id["S-1"], 0);
    }

    #[test]
    fn test_urgent_order_served_first() {
        let mut daily = order("S-daily", SourceFilter::Any, SourceFilter::Any, 10);
        daily.create_date = at(0);
        let mut urgent = order("S-urgent", SourceFilter::Any, SourceFilter::Any, 10);
        urgent.order_type = OrderType::Emergency;
        urgent.create_date = at(30);
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];

        let result = allocate(
            &[daily, urgent],
            &inventory,
            &credit(1_000_000),
            &[rule("SP-001", 100)],
        );

        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].sub_order_id, "S-urgent");
        assert_eq!(result.remaining_request_by_sub_order_id["S-daily"], 10);
        // The slot is empty by the time the daily order is served
        assert_eq!(
            result.warnings,
            vec![AllocationWarning::NoCandidates {
                sub_order_id: "S-daily".into()
            }]
        );
    }

    #[test]
    fn test_multiplier_price_is_rounded_half_even() {
        let mut o = order("S-1", SourceFilter::Any, SourceFilter::Any, 4);
        o.order_type = OrderType::Emergency;
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];
        let rules = vec![PriceRule {
            type_multiplier: TypeMultipliers {
                emergency: 1.25,
                ..TypeMultipliers::flat()
            },
            ..rule("SP-001", 17)
        }];

        let result = allocate(&[o], &inventory, &credit(10_000), &rules);

        // $0.17 × 1.25 = $0.2125 → $0.21
        assert_eq!(result.allocations[0].unit_price_cents, 21);
        assert_eq!(result.allocations[0].amount_cents, 84);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let orders = vec![order("S-1", SourceFilter::Any, SourceFilter::Any, 5)];
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];
        let credits = credit(10_000);

        let _ = allocate(&orders, &inventory, &credits, &[rule("SP-001", 100)]);

        assert_eq!(inventory[0].remaining_qty, 10);
        assert_eq!(credits[0].remaining_credit_cents, 10_000);
    }

    #[test]
    fn test_negative_request_allocates_nothing() {
        let orders = vec![order("S-1", SourceFilter::Any, SourceFilter::Any, -5)];
        let inventory = vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 10)];

        let result = allocate(&orders, &inventory, &credit(10_000), &[rule("SP-001", 100)]);

        assert!(result.allocations.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.remaining_request_by_sub_order_id["S-1"], 0);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    const WAREHOUSES: [&str; 2] = ["WH-001", "WH-002"];
    const SUPPLIERS: [&str; 2] = ["SP-001", "SP-002"];
    const CUSTOMERS: [&str; 3] = ["CT-1", "CT-2", "CT-3"];

    fn pick(choice: usize, ids: &[&str]) -> SourceFilter {
        match choice {
            0 => SourceFilter::Any,
            n => SourceFilter::pinned(ids[(n - 1) % ids.len()]),
        }
    }

    type OrderSeed = (i64, usize, u32, usize, usize, usize);

    fn build_orders(seeds: &[OrderSeed]) -> Vec<OrderLine> {
        seeds
            .iter()
            .enumerate()
            .map(|(i, &(qty, ty, minute, wh, sp, customer))| OrderLine {
                order_id: format!("O-{}", i / 2),
                sub_order_id: format!("S-{:03}", i),
                item_id: "Item-1".into(),
                warehouse: pick(wh, &WAREHOUSES),
                supplier: pick(sp, &SUPPLIERS),
                request_qty: qty,
                order_type: OrderType::ALL[ty],
                create_date: at(minute),
                // Index 3 has no credit record
                customer_id: format!("CT-{}", customer + 1),
                remark: None,
            })
            .collect()
    }

    fn build_inventory(stocks: &[i64]) -> Vec<InventorySlot> {
        let mut slots = Vec::new();
        for (w, wh) in WAREHOUSES.iter().enumerate() {
            for (s, sp) in SUPPLIERS.iter().enumerate() {
                slots.push(InventorySlot::new("Item-1", *wh, *sp, stocks[w * 2 + s]));
            }
        }
        slots
    }

    fn build_credits(cents: &[i64]) -> Vec<CustomerCredit> {
        CUSTOMERS
            .iter()
            .zip(cents)
            .map(|(c, cents)| CustomerCredit::new(*c, Money::from_cents(*cents)))
            .collect()
    }

    fn build_rules(base: &[i64], multiplier: f64) -> Vec<PriceRule> {
        SUPPLIERS
            .iter()
            .zip(base)
            // A zero base leaves that supplier unpriced
            .filter(|(_, cents)| **cents > 0)
            .map(|(sp, cents)| PriceRule {
                type_multiplier: TypeMultipliers {
                    emergency: multiplier,
                    claim: multiplier,
                    ..TypeMultipliers::flat()
                },
                ..rule(sp, *cents)
            })
            .collect()
    }

    fn order_seeds() -> impl Strategy<Value = Vec<OrderSeed>> {
        prop::collection::vec(
            (-5i64..300, 0usize..4, 0u32..60, 0usize..3, 0usize..3, 0usize..4),
            1..12,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sub-order receives more than it asked for, and no
        /// stock or credit balance ever goes negative.
        #[test]
        fn allocation_respects_request_stock_and_credit(
            seeds in order_seeds(),
            stocks in prop::collection::vec(0i64..400, 4),
            cents in prop::collection::vec(0i64..500_000, 3),
            base in prop::collection::vec(0i64..3_000, 2),
            multiplier in 0.5f64..2.0,
        ) {
            let orders = build_orders(&seeds);
            let inventory = build_inventory(&stocks);
            let credits = build_credits(&cents);
            let rules = build_rules(&base, multiplier);

            let result = allocate(&orders, &inventory, &credits, &rules);

            for o in &orders {
                let allocated: i64 = result.lines_for(&o.sub_order_id).map(|l| l.qty).sum();
                prop_assert!(allocated <= o.requested());
                prop_assert_eq!(
                    result.remaining_request_by_sub_order_id[&o.sub_order_id],
                    o.requested() - allocated
                );
            }
            for slot in &result.inventory {
                prop_assert!(slot.remaining_qty >= 0);
            }
            for c in &result.credits {
                prop_assert!(c.remaining_credit_cents >= 0);
            }
            for line in &result.allocations {
                prop_assert!(line.qty > 0);
                prop_assert_eq!(line.amount_cents, line.qty * line.unit_price_cents);
            }

            // Conservation: every unit and cent taken shows up on a line
            let stock_before: i64 = inventory.iter().map(|s| s.remaining_qty).sum();
            let stock_after: i64 = result.inventory.iter().map(|s| s.remaining_qty).sum();
            prop_assert_eq!(stock_before - stock_after, result.allocated_qty());

            let credit_before: i64 = credits.iter().map(|c| c.remaining_credit_cents).sum();
            let credit_after: i64 = result.credits.iter().map(|c| c.remaining_credit_cents).sum();
            let billed: i64 = result.allocations.iter().map(|l| l.amount_cents).sum();
            prop_assert_eq!(credit_before - credit_after, billed);
        }

        /// Property: identical inputs give byte-identical output, whatever
        /// order the caller lists the orders in.
        #[test]
        fn allocation_is_deterministic(
            seeds in order_seeds(),
            stocks in prop::collection::vec(0i64..400, 4),
            cents in prop::collection::vec(0i64..500_000, 3),
            base in prop::collection::vec(1i64..3_000, 2),
        ) {
            let orders = build_orders(&seeds);
            let inventory = build_inventory(&stocks);
            let credits = build_credits(&cents);
            let rules = build_rules(&base, 1.25);

            let first = allocate(&orders, &inventory, &credits, &rules);
            let mut reversed = orders.clone();
            reversed.reverse();
            let second = allocate(&reversed, &inventory, &credits, &rules);

            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
