//! # allot-core: Allocation & Ledger Consistency Engine
//!
//! This crate decides how scarce stock and customer credit are spread over
//! competing order lines, and keeps the ledgers consistent when an operator
//! overrides that decision by hand. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Allot Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host (allot console)                         │   │
//! │  │    scenario file ──► run / candidates / edit / summary         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &mut AllocationBoard                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ allot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐  │   │
//! │  │   │ sequencing │  │  sourcing  │  │ allocation │  │ manual  │  │   │
//! │  │   │  who first │  │ which slot │  │ greedy loop│  │ override│  │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘  └─────────┘  │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐               │   │
//! │  │   │   money    │  │   types    │  │   board    │               │   │
//! │  │   │ half-even  │  │  records   │  │ app state  │               │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • DETERMINISTIC            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (OrderLine, InventorySlot, AllocationLine, ...)
//! - [`money`] - Integer-cent Money and round-half-to-even helpers
//! - [`sequencing`] - Order priority policy
//! - [`sourcing`] - Candidate source ranking
//! - [`allocation`] - The greedy allocation loop
//! - [`manual`] - Refund-then-reapply override ledger
//! - [`board`] - Session state and the operator-facing entry points
//! - [`error`] - Warnings, violations and errors
//! - [`validation`] - Input record checks
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same inputs, byte-identical output
//! 2. **No I/O**: loading and printing belong to the host
//! 3. **Integer Money**: every balance and amount is i64 cents
//! 4. **Advisory Failures**: anomalies become warnings, never aborts
//!
//! ## Example Usage
//!
//! ```rust
//! use allot_core::{AllocationBoard, CustomerCredit, InventorySlot, Money, OrderLine,
//!                  OrderType, PriceRule, SourceFilter, TypeMultipliers};
//! use chrono::Utc;
//!
//! let order = OrderLine {
//!     order_id: "O-1".into(),
//!     sub_order_id: "S-1".into(),
//!     item_id: "Item-1".into(),
//!     warehouse: SourceFilter::pinned("WH-001"),
//!     supplier: SourceFilter::pinned("SP-001"),
//!     request_qty: 100,
//!     order_type: OrderType::Daily,
//!     create_date: Utc::now(),
//!     customer_id: "CT-1".into(),
//!     remark: None,
//! };
//! let mut board = AllocationBoard::new(
//!     vec![order],
//!     vec![InventorySlot::new("Item-1", "WH-001", "SP-001", 150)],
//!     vec![CustomerCredit::new("CT-1", Money::from_cents(50_000))],
//!     vec![PriceRule {
//!         item_id: "Item-1".into(),
//!         supplier_id: "SP-001".into(),
//!         base_unit_price_cents: 1_000,
//!         type_multiplier: TypeMultipliers::flat(),
//!     }],
//! );
//!
//! // $500 of credit at $10.00 a unit covers 50 of the 100 requested
//! let result = board.run_auto();
//! assert_eq!(result.allocated_qty(), 50);
//! assert_eq!(result.remaining_request_by_sub_order_id["S-1"], 50);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod board;
pub mod error;
pub mod manual;
pub mod money;
pub mod sequencing;
pub mod sourcing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use allot_core::Money` instead of
// `use allot_core::money::Money`

pub use allocation::allocate;
pub use board::{AllocationBoard, BoardSummary, OrderProgress, OrderQuery};
pub use error::{AllocationWarning, CoreError, CoreResult, EditViolation, ValidationError};
pub use manual::LedgerSnapshot;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Legacy warehouse id meaning "any warehouse".
///
/// Only the host maps it; inside the engine "any" is `SourceFilter::Any`.
pub const DEFAULT_ANY_WAREHOUSE: &str = "WH-000";

/// Legacy supplier id meaning "any supplier".
pub const DEFAULT_ANY_SUPPLIER: &str = "SP-000";

/// Maximum length of any identifier.
pub const MAX_ID_LENGTH: usize = 64;

/// Maximum length of an order search query.
pub const MAX_QUERY_LENGTH: usize = 100;
