//! # Error Types
//!
//! Domain-specific error, warning and violation types for allot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  allot-core (this file)                                                │
//! │  ├── AllocationWarning - advisory, collected by the allocation loop     │
//! │  ├── EditViolation     - blocks a manual commit, collected in full      │
//! │  ├── CoreError         - caller misuse (unknown sub-order, bad index)   │
//! │  └── ValidationError   - malformed input records                        │
//! │                                                                         │
//! │  console app (separate crate)                                          │
//! │  └── ApiError          - what the operator sees (code + message)       │
//! │                                                                         │
//! │  Warnings and violations never abort a run: they travel inside the     │
//! │  result. Only CoreError/ValidationError are returned as `Err`.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in messages (sub-order, warehouse/supplier, amounts)
//! 3. Errors are enum variants, never String

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Allocation Warning
// =============================================================================

/// An anomaly recorded by the allocation loop.
///
/// ## User Workflow
/// ```text
/// runAuto()
///      │
///      ▼
/// order S-17: no credit record for CT-0042
///      │
///      ▼
/// MissingCredit { customer_id: "CT-0042", sub_order_id: "S-17" }
///      │
///      ▼
/// Order skipped, run continues with the next order
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationWarning {
    /// The order's customer has no credit record; the order is skipped.
    #[error("Missing credit for customer {customer_id} (subOrder {sub_order_id})")]
    #[serde(rename_all = "camelCase")]
    MissingCredit {
        customer_id: String,
        sub_order_id: String,
    },

    /// No inventory slot can serve the order; the order is skipped.
    #[error("No inventory candidates for subOrder {sub_order_id}")]
    #[serde(rename_all = "camelCase")]
    NoCandidates { sub_order_id: String },

    /// No usable price for an item/supplier pair; the candidate is skipped.
    #[error("Missing price rule for item {item_id}, supplier {supplier_id}")]
    #[serde(rename_all = "camelCase")]
    MissingPriceRule {
        item_id: String,
        supplier_id: String,
    },

    /// Stock or credit ran out before the request was met.
    #[error("SubOrder {sub_order_id} not fully allocated. Remaining request: {remaining}")]
    #[serde(rename_all = "camelCase")]
    NotFullyAllocated { sub_order_id: String, remaining: i64 },
}

// =============================================================================
// Edit Violation
// =============================================================================

/// A reason a manual edit cannot be committed.
///
/// Validation returns every violation found, so the operator can fix them
/// all in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditViolation {
    /// Edited quantities add up to more than the order asked for.
    #[error("Allocated qty {edited} exceeds request qty {requested}.")]
    #[serde(rename_all = "camelCase")]
    ExceedsRequest { requested: i64, edited: i64 },

    /// The order's customer has no credit record.
    #[error("Missing credit for {customer_id}")]
    #[serde(rename_all = "camelCase")]
    MissingCredit { customer_id: String },

    /// An edited line draws from a source that has no inventory record.
    #[error("No inventory for {warehouse_id}/{supplier_id}")]
    #[serde(rename_all = "camelCase")]
    NoInventory {
        item_id: String,
        warehouse_id: String,
        supplier_id: String,
    },

    /// Edited lines draw more from one source than it can give.
    #[error("Exceeds stock at {warehouse_id}/{supplier_id}. Stock: {stock}, requested: {requested}")]
    #[serde(rename_all = "camelCase")]
    ExceedsStock {
        item_id: String,
        warehouse_id: String,
        supplier_id: String,
        stock: i64,
        requested: i64,
    },

    /// Edited amounts add up to more than the customer's effective credit.
    #[error("Exceeds credit. Remaining credit: {effective_credit}, edited amount: {amount}")]
    #[serde(rename_all = "camelCase")]
    ExceedsCredit {
        effective_credit: Money,
        amount: Money,
    },
}

// =============================================================================
// Core Error
// =============================================================================

/// Caller-side misuse of the allocation board.
///
/// These never come out of the allocation loop itself; they report
/// references to things the board does not know about.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No order line with this sub-order id.
    #[error("SubOrder not found: {0}")]
    SubOrderNotFound(String),

    /// The sub-order has no open edit draft.
    ///
    /// ## When This Occurs
    /// - Editing a line before `begin_edit`
    /// - Editing after the board was reset
    #[error("No open edit for subOrder {0}")]
    NoOpenDraft(String),

    /// Draft line index is past the end of the draft.
    #[error("Line {index} out of range for subOrder {sub_order_id} ({len} lines)")]
    LineIndexOutOfRange {
        sub_order_id: String,
        index: usize,
        len: usize,
    },

    /// No price rule for a manually chosen source.
    #[error("No price rule for item {item_id}, supplier {supplier_id}")]
    PriceRuleNotFound { item_id: String, supplier_id: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when snapshot records handed to the board are malformed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. NaN multiplier, unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate sub-order id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
