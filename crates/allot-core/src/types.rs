//! # Domain Types
//!
//! Core domain types used throughout Allot.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUTS (caller-owned)                                                  │
//! │  ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐ ┌────────┐ │
//! │  │   OrderLine     │ │  InventorySlot  │ │ CustomerCredit  │ │ Price  │ │
//! │  │  sub_order_id   │ │  item/wh/sp     │ │  customer_id    │ │ Rule   │ │
//! │  │  order_type     │ │  remaining_qty  │ │  credit_cents   │ │        │ │
//! │  │  create_date    │ └─────────────────┘ └─────────────────┘ └────────┘ │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  OUTPUTS (engine-produced)                                              │
//! │  ┌─────────────────┐ ┌──────────────────────────────────────────────┐  │
//! │  │ AllocationLine  │ │ AllocationResult                             │  │
//! │  │  qty (integer)  │ │  allocations + inventory + credits           │  │
//! │  │  unit_price     │ │  remaining_request_by_sub_order + warnings   │  │
//! │  │  amount         │ └──────────────────────────────────────────────┘  │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money Fields
//! Every monetary field is stored as `*_cents: i64` and exposed through a
//! `Money` accessor, so nothing downstream compares raw floats.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{AllocationWarning, ValidationError};
use crate::money::Money;

// =============================================================================
// Order Type
// =============================================================================

/// Urgency class of an order line.
///
/// Declaration order is the allocation priority: `Emergency` is served
/// first, `Daily` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Emergency,
    Claim,
    Overdue,
    Daily,
}

impl OrderType {
    /// All urgency classes in priority order.
    pub const ALL: [OrderType; 4] = [
        OrderType::Emergency,
        OrderType::Claim,
        OrderType::Overdue,
        OrderType::Daily,
    ];

    /// Sequencing rank, lower is served first.
    #[inline]
    pub const fn priority(&self) -> u8 {
        match self {
            OrderType::Emergency => 1,
            OrderType::Claim => 2,
            OrderType::Overdue => 3,
            OrderType::Daily => 4,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Emergency => write!(f, "EMERGENCY"),
            OrderType::Claim => write!(f, "CLAIM"),
            OrderType::Overdue => write!(f, "OVERDUE"),
            OrderType::Daily => write!(f, "DAILY"),
        }
    }
}

impl FromStr for OrderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EMERGENCY" => Ok(OrderType::Emergency),
            "CLAIM" => Ok(OrderType::Claim),
            "OVERDUE" => Ok(OrderType::Overdue),
            "DAILY" => Ok(OrderType::Daily),
            other => Err(ValidationError::InvalidFormat {
                field: "orderType".to_string(),
                reason: format!(
                    "unknown order type '{}', expected EMERGENCY, CLAIM, OVERDUE or DAILY",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Source Filter
// =============================================================================

/// A warehouse or supplier constraint: either any source, or one pinned id.
///
/// ## Serialization
/// `Any` is `null`, `Pinned("WH-001")` is `"WH-001"`. Legacy sentinel ids
/// (such as `WH-000`) are mapped by the host with [`SourceFilter::from_sentinel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum SourceFilter {
    #[default]
    Any,
    Pinned(String),
}

impl SourceFilter {
    /// Creates a filter pinned to one id.
    pub fn pinned(id: impl Into<String>) -> Self {
        SourceFilter::Pinned(id.into())
    }

    /// Maps a raw id to a filter, treating `sentinel` as "any".
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::SourceFilter;
    ///
    /// assert_eq!(SourceFilter::from_sentinel("WH-000", "WH-000"), SourceFilter::Any);
    /// assert_eq!(
    ///     SourceFilter::from_sentinel("WH-001", "WH-000"),
    ///     SourceFilter::pinned("WH-001")
    /// );
    /// ```
    pub fn from_sentinel(raw: &str, sentinel: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == sentinel {
            SourceFilter::Any
        } else {
            SourceFilter::Pinned(raw.to_string())
        }
    }

    /// True when `id` satisfies this filter.
    #[inline]
    pub fn matches(&self, id: &str) -> bool {
        match self {
            SourceFilter::Any => true,
            SourceFilter::Pinned(pinned) => pinned == id,
        }
    }
}

impl From<Option<String>> for SourceFilter {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(id) => SourceFilter::Pinned(id),
            None => SourceFilter::Any,
        }
    }
}

impl From<SourceFilter> for Option<String> {
    fn from(value: SourceFilter) -> Self {
        match value {
            SourceFilter::Any => None,
            SourceFilter::Pinned(id) => Some(id),
        }
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFilter::Any => write!(f, "*"),
            SourceFilter::Pinned(id) => write!(f, "{}", id),
        }
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One schedulable unit of demand (a sub-order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub order_id: String,

    /// Unique key of the line.
    pub sub_order_id: String,

    pub item_id: String,

    /// Requested warehouse (`null` = any).
    #[ts(as = "Option<String>")]
    pub warehouse: SourceFilter,

    /// Requested supplier (`null` = any).
    #[ts(as = "Option<String>")]
    pub supplier: SourceFilter,

    /// Requested whole units. Negative values are treated as zero.
    pub request_qty: i64,

    pub order_type: OrderType,

    #[ts(as = "String")]
    pub create_date: DateTime<Utc>,

    pub customer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl OrderLine {
    /// Request quantity clamped to non-negative.
    #[inline]
    pub fn requested(&self) -> i64 {
        self.request_qty.max(0)
    }
}

// =============================================================================
// Inventory Slot
// =============================================================================

/// Stock of one item at one (warehouse, supplier) source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventorySlot {
    pub item_id: String,
    pub warehouse_id: String,
    pub supplier_id: String,
    pub remaining_qty: i64,
}

impl InventorySlot {
    pub fn new(
        item_id: impl Into<String>,
        warehouse_id: impl Into<String>,
        supplier_id: impl Into<String>,
        remaining_qty: i64,
    ) -> Self {
        InventorySlot {
            item_id: item_id.into(),
            warehouse_id: warehouse_id.into(),
            supplier_id: supplier_id.into(),
            remaining_qty,
        }
    }

    /// True when this slot is the source `key` refers to.
    #[inline]
    pub fn is_source(&self, key: &SourceKey<'_>) -> bool {
        self.item_id == key.item_id
            && self.warehouse_id == key.warehouse_id
            && self.supplier_id == key.supplier_id
    }
}

/// Borrowed `(item, warehouse, supplier)` triple identifying a stock source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey<'a> {
    pub item_id: &'a str,
    pub warehouse_id: &'a str,
    pub supplier_id: &'a str,
}

impl<'a> SourceKey<'a> {
    pub fn of_slot(slot: &'a InventorySlot) -> Self {
        SourceKey {
            item_id: &slot.item_id,
            warehouse_id: &slot.warehouse_id,
            supplier_id: &slot.supplier_id,
        }
    }

    pub fn of_line(line: &'a AllocationLine) -> Self {
        SourceKey {
            item_id: &line.item_id,
            warehouse_id: &line.warehouse_id,
            supplier_id: &line.supplier_id,
        }
    }
}

// =============================================================================
// Customer Credit
// =============================================================================

/// Remaining money credit of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCredit {
    pub customer_id: String,
    pub remaining_credit_cents: i64,
}

impl CustomerCredit {
    pub fn new(customer_id: impl Into<String>, remaining_credit: Money) -> Self {
        CustomerCredit {
            customer_id: customer_id.into(),
            remaining_credit_cents: remaining_credit.cents(),
        }
    }

    #[inline]
    pub fn remaining_credit(&self) -> Money {
        Money::from_cents(self.remaining_credit_cents)
    }
}

// =============================================================================
// Price Rule
// =============================================================================

/// Price multiplier per urgency class (1.0 = base price, 1.25 = +25%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TypeMultipliers {
    pub emergency: f64,
    pub claim: f64,
    pub overdue: f64,
    pub daily: f64,
}

impl TypeMultipliers {
    /// Every class at the base price.
    pub const fn flat() -> Self {
        TypeMultipliers {
            emergency: 1.0,
            claim: 1.0,
            overdue: 1.0,
            daily: 1.0,
        }
    }

    #[inline]
    pub fn for_type(&self, order_type: OrderType) -> f64 {
        match order_type {
            OrderType::Emergency => self.emergency,
            OrderType::Claim => self.claim,
            OrderType::Overdue => self.overdue,
            OrderType::Daily => self.daily,
        }
    }
}

impl Default for TypeMultipliers {
    fn default() -> Self {
        TypeMultipliers::flat()
    }
}

/// Base price of an item from one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceRule {
    pub item_id: String,
    pub supplier_id: String,
    pub base_unit_price_cents: i64,
    #[serde(default)]
    pub type_multiplier: TypeMultipliers,
}

impl PriceRule {
    #[inline]
    pub fn base_unit_price(&self) -> Money {
        Money::from_cents(self.base_unit_price_cents)
    }

    /// Unit price for an urgency class: base × multiplier, rounded
    /// half-to-even to whole cents.
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::{OrderType, PriceRule, TypeMultipliers};
    ///
    /// let rule = PriceRule {
    ///     item_id: "Item-1".into(),
    ///     supplier_id: "SP-001".into(),
    ///     base_unit_price_cents: 1000,
    ///     type_multiplier: TypeMultipliers { emergency: 1.25, ..TypeMultipliers::flat() },
    /// };
    /// assert_eq!(rule.unit_price(OrderType::Emergency).cents(), 1250);
    /// assert_eq!(rule.unit_price(OrderType::Daily).cents(), 1000);
    /// ```
    pub fn unit_price(&self, order_type: OrderType) -> Money {
        self.base_unit_price()
            .scale(self.type_multiplier.for_type(order_type))
    }
}

// =============================================================================
// Allocation Line
// =============================================================================

/// One committed or proposed fulfillment of a sub-order from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AllocationLine {
    pub sub_order_id: String,
    pub item_id: String,
    pub warehouse_id: String,
    pub supplier_id: String,
    pub qty: i64,
    pub unit_price_cents: i64,
    /// Always `qty × unit_price_cents`.
    pub amount_cents: i64,
}

impl AllocationLine {
    /// Creates a line, deriving the amount from quantity and unit price.
    pub fn new(
        sub_order_id: impl Into<String>,
        item_id: impl Into<String>,
        warehouse_id: impl Into<String>,
        supplier_id: impl Into<String>,
        qty: i64,
        unit_price: Money,
    ) -> Self {
        AllocationLine {
            sub_order_id: sub_order_id.into(),
            item_id: item_id.into(),
            warehouse_id: warehouse_id.into(),
            supplier_id: supplier_id.into(),
            qty,
            unit_price_cents: unit_price.cents(),
            amount_cents: unit_price.multiply_quantity(qty).cents(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Sets a new quantity and recomputes the amount.
    pub fn set_qty(&mut self, qty: i64) {
        self.qty = qty;
        self.amount_cents = self.unit_price().multiply_quantity(qty).cents();
    }

    #[inline]
    pub fn source_key(&self) -> SourceKey<'_> {
        SourceKey::of_line(self)
    }
}

/// Total quantity across lines, saturating at `i64::MAX`.
pub fn total_qty(lines: &[AllocationLine]) -> i64 {
    lines.iter().fold(0_i64, |acc, l| acc.saturating_add(l.qty))
}

/// Total amount across lines.
pub fn total_amount(lines: &[AllocationLine]) -> Money {
    lines.iter().map(AllocationLine::amount).sum()
}

// =============================================================================
// Candidate Source
// =============================================================================

/// A stock source offered to the operator for manual selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSource {
    pub warehouse_id: String,
    pub supplier_id: String,
    pub remaining_qty: i64,
}

impl From<&InventorySlot> for CandidateSource {
    fn from(slot: &InventorySlot) -> Self {
        CandidateSource {
            warehouse_id: slot.warehouse_id.clone(),
            supplier_id: slot.supplier_id.clone(),
            remaining_qty: slot.remaining_qty,
        }
    }
}

// =============================================================================
// Allocation Result
// =============================================================================

/// Full output of an allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub allocations: Vec<AllocationLine>,

    /// Inventory after allocation (same order as the input).
    pub inventory: Vec<InventorySlot>,

    /// Credits after allocation (same order as the input).
    pub credits: Vec<CustomerCredit>,

    /// Unallocated remainder per sub-order.
    pub remaining_request_by_sub_order_id: BTreeMap<String, i64>,

    pub warnings: Vec<AllocationWarning>,
}

impl AllocationResult {
    /// Human-readable warnings, in the order they were raised.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Lines allocated to one sub-order.
    pub fn lines_for<'a>(&'a self, sub_order_id: &'a str) -> impl Iterator<Item = &'a AllocationLine> {
        self.allocations
            .iter()
            .filter(move |l| l.sub_order_id == sub_order_id)
    }

    /// Total units allocated across all lines.
    pub fn allocated_qty(&self) -> i64 {
        total_qty(&self.allocations)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_priority_matches_ordering() {
        let mut types = vec![
            OrderType::Daily,
            OrderType::Emergency,
            OrderType::Overdue,
            OrderType::Claim,
        ];
        types.sort();
        assert_eq!(types, OrderType::ALL.to_vec());
        assert!(OrderType::Emergency.priority() < OrderType::Daily.priority());
    }

    #[test]
    fn test_order_type_serde() {
        let json = serde_json::to_string(&OrderType::Emergency).unwrap();
        assert_eq!(json, "\"EMERGENCY\"");
        let parsed: OrderType = serde_json::from_str("\"OVERDUE\"").unwrap();
        assert_eq!(parsed, OrderType::Overdue);
    }

    #[test]
    fn test_order_type_from_str() {
        assert_eq!("claim".parse::<OrderType>().unwrap(), OrderType::Claim);
        assert_eq!(" DAILY ".parse::<OrderType>().unwrap(), OrderType::Daily);
        assert!("urgent".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_source_filter_matching() {
        assert!(SourceFilter::Any.matches("WH-001"));
        assert!(SourceFilter::pinned("WH-001").matches("WH-001"));
        assert!(!SourceFilter::pinned("WH-001").matches("WH-002"));
    }

    #[test]
    fn test_source_filter_serde_is_nullable_string() {
        let json = serde_json::to_string(&SourceFilter::Any).unwrap();
        assert_eq!(json, "null");
        let json = serde_json::to_string(&SourceFilter::pinned("SP-003")).unwrap();
        assert_eq!(json, "\"SP-003\"");
        let parsed: SourceFilter = serde_json::from_str("\"SP-003\"").unwrap();
        assert_eq!(parsed, SourceFilter::pinned("SP-003"));
    }

    #[test]
    fn test_source_filter_from_sentinel() {
        assert_eq!(SourceFilter::from_sentinel("SP-000", "SP-000"), SourceFilter::Any);
        assert_eq!(SourceFilter::from_sentinel("  ", "SP-000"), SourceFilter::Any);
        assert_eq!(
            SourceFilter::from_sentinel("SP-002", "SP-000"),
            SourceFilter::pinned("SP-002")
        );
    }

    #[test]
    fn test_allocation_line_amount_follows_qty() {
        let mut line = AllocationLine::new("S1", "Item-1", "WH-001", "SP-001", 3, Money::from_cents(299));
        assert_eq!(line.amount_cents, 897);

        line.set_qty(10);
        assert_eq!(line.amount(), Money::from_cents(2990));
    }

    #[test]
    fn test_price_rule_unit_price_uses_multiplier() {
        let rule = PriceRule {
            item_id: "Item-1".into(),
            supplier_id: "SP-001".into(),
            base_unit_price_cents: 999,
            type_multiplier: TypeMultipliers {
                emergency: 1.25,
                ..TypeMultipliers::flat()
            },
        };
        // $9.99 × 1.25 = $12.4875 → $12.49
        assert_eq!(rule.unit_price(OrderType::Emergency).cents(), 1249);
        assert_eq!(rule.unit_price(OrderType::Claim).cents(), 999);
    }

    #[test]
    fn test_requested_clamps_negative() {
        let order = OrderLine {
            order_id: "O1".into(),
            sub_order_id: "S1".into(),
            item_id: "Item-1".into(),
            warehouse: SourceFilter::Any,
            supplier: SourceFilter::Any,
            request_qty: -4,
            order_type: OrderType::Daily,
            create_date: Utc::now(),
            customer_id: "CT-1".into(),
            remark: None,
        };
        assert_eq!(order.requested(), 0);
    }
}
