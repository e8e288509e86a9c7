//! # Validation Module
//!
//! Input checks for the records handed to an [`AllocationBoard`](crate::board::AllocationBoard).
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Scenario loading (console)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Sentinel ids mapped to SourceFilter::Any                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Identifiers present and bounded                                   │
//! │  ├── Keys unique (sub-order, inventory source)                         │
//! │  └── Prices and multipliers usable                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine                                                       │
//! │  └── Missing references degrade to warnings, never errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use allot_core::validation::{validate_id, validate_search_query};
//!
//! validate_id("subOrderId", "S-0001").unwrap();
//! assert!(validate_id("itemId", "  ").is_err());
//! assert_eq!(validate_search_query("  ct-1 ").unwrap(), "ct-1");
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{CustomerCredit, InventorySlot, OrderLine, PriceRule, SourceKey};
use crate::{MAX_ID_LENGTH, MAX_QUERY_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identifier (sub-order, item, warehouse, supplier, customer).
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most `MAX_ID_LENGTH` characters
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    Ok(())
}

/// Validates an order search query.
///
/// ## Rules
/// - Can be empty (matches every order)
/// - Maximum `MAX_QUERY_LENGTH` characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed; the engine treats a zero price as unpriced
///
/// ## Example
/// ```rust
/// use allot_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "baseUnitPrice".to_string(),
        });
    }

    Ok(())
}

/// Validates one urgency multiplier.
///
/// ## Rules
/// - Must be a finite number (no NaN, no infinity)
/// - Must be non-negative
pub fn validate_multiplier(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_order(order: &OrderLine) -> ValidationResult<()> {
    validate_id("orderId", &order.order_id)?;
    validate_id("subOrderId", &order.sub_order_id)?;
    validate_id("itemId", &order.item_id)?;
    validate_id("customerId", &order.customer_id)?;
    Ok(())
}

pub fn validate_inventory_slot(slot: &InventorySlot) -> ValidationResult<()> {
    validate_id("itemId", &slot.item_id)?;
    validate_id("warehouseId", &slot.warehouse_id)?;
    validate_id("supplierId", &slot.supplier_id)?;
    if slot.remaining_qty < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "remainingQty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_credit(credit: &CustomerCredit) -> ValidationResult<()> {
    validate_id("customerId", &credit.customer_id)?;
    if credit.remaining_credit_cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "remainingCredit".to_string(),
        });
    }
    Ok(())
}

/// Validates a price rule: ids, base price and every multiplier.
pub fn validate_price_rule(rule: &PriceRule) -> ValidationResult<()> {
    validate_id("itemId", &rule.item_id)?;
    validate_id("supplierId", &rule.supplier_id)?;
    validate_price_cents(rule.base_unit_price_cents)?;

    let m = &rule.type_multiplier;
    validate_multiplier("typeMultiplier.EMERGENCY", m.emergency)?;
    validate_multiplier("typeMultiplier.CLAIM", m.claim)?;
    validate_multiplier("typeMultiplier.OVERDUE", m.overdue)?;
    validate_multiplier("typeMultiplier.DAILY", m.daily)?;
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a full input set before it is loaded into a board.
///
/// ## Rules
/// - Every record passes its own validator
/// - `subOrderId` is unique across orders
/// - `(itemId, warehouseId, supplierId)` is unique across inventory
/// - `remainingQty` and `remainingCredit` are non-negative
///
/// Stops at the first problem found.
pub fn validate_inputs(
    orders: &[OrderLine],
    inventory: &[InventorySlot],
    credits: &[CustomerCredit],
    price_rules: &[PriceRule],
) -> ValidationResult<()> {
    let mut sub_orders = HashSet::new();
    for order in orders {
        validate_order(order)?;
        if !sub_orders.insert(order.sub_order_id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "subOrderId".to_string(),
                value: order.sub_order_id.clone(),
            });
        }
    }

    let mut sources = HashSet::new();
    for slot in inventory {
        validate_inventory_slot(slot)?;
        if !sources.insert(SourceKey::of_slot(slot)) {
            return Err(ValidationError::Duplicate {
                field: "inventory source".to_string(),
                value: format!("{}/{}/{}", slot.item_id, slot.warehouse_id, slot.supplier_id),
            });
        }
    }

    for credit in credits {
        validate_credit(credit)?;
    }

    for rule in price_rules {
        validate_price_rule(rule)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
