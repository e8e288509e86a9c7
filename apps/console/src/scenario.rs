//! # Scenario Files
//!
//! Reads the JSON scenario a session starts from and turns it into engine
//! records.
//!
//! ## File Shape
//! ```json
//! {
//!   "orders": [{
//!     "orderId": "ORDER-0001", "subOrderId": "ORDER-0001-001",
//!     "itemId": "Item-1", "warehouseId": "WH-000", "supplierId": "SP-001",
//!     "requestQty": 11, "type": "DAILY",
//!     "createDate": "2025-01-01T00:00:00Z", "customerId": "CT-0001",
//!     "remark": ""
//!   }],
//!   "inventory": [{ "itemId": "Item-1", "warehouseId": "WH-001",
//!                   "supplierId": "SP-001", "remainingQty": 50 }],
//!   "credits": [{ "customerId": "CT-0001", "remainingCredit": 2000.00 }],
//!   "priceRules": [{ "itemId": "Item-1", "supplierId": "SP-001",
//!                    "baseUnitPrice": 123.49,
//!                    "typeMultiplier": { "EMERGENCY": 1.25, "CLAIM": 1.0,
//!                                        "OVERDUE": 1.0, "DAILY": 1.0 } }]
//! }
//! ```
//!
//! ## Boundary Conversions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw file field                 engine field                            │
//! │  ─────────────────────          ──────────────────────────────          │
//! │  warehouseId "WH-000"      ──►  warehouse: SourceFilter::Any            │
//! │  supplierId  "SP-002"      ──►  supplier:  SourceFilter::Pinned(..)     │
//! │  remainingCredit 2000.00   ──►  remaining_credit_cents 200000           │
//! │  baseUnitPrice   123.49    ──►  base_unit_price_cents 12349             │
//! │  remark ""                 ──►  None                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Decimal money is rounded half-to-even to whole cents exactly once, here.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use allot_core::money::to_cents;
use allot_core::validation::validate_inputs;
use allot_core::{
    AllocationBoard, CustomerCredit, InventorySlot, OrderLine, OrderType, PriceRule,
    SourceFilter, TypeMultipliers,
};

use crate::error::ApiError;
use crate::state::SentinelConfig;

// =============================================================================
// File Records
// =============================================================================

/// Order line as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    pub sub_order_id: String,
    pub item_id: String,
    /// Warehouse id, or the "any" sentinel
    pub warehouse_id: String,
    /// Supplier id, or the "any" sentinel
    pub supplier_id: String,
    pub request_qty: i64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub create_date: DateTime<Utc>,
    pub customer_id: String,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Customer credit with a decimal balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRecord {
    pub customer_id: String,
    pub remaining_credit: f64,
}

/// Price rule with a decimal base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRuleRecord {
    pub item_id: String,
    pub supplier_id: String,
    pub base_unit_price: f64,
    #[serde(default)]
    pub type_multiplier: TypeMultipliers,
}

/// The whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFile {
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default)]
    pub inventory: Vec<InventorySlot>,
    #[serde(default)]
    pub credits: Vec<CreditRecord>,
    #[serde(default, alias = "price_rules")]
    pub price_rules: Vec<PriceRuleRecord>,
}

// =============================================================================
// Scenario
// =============================================================================

/// Engine-ready records, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub orders: Vec<OrderLine>,
    pub inventory: Vec<InventorySlot>,
    pub credits: Vec<CustomerCredit>,
    pub price_rules: Vec<PriceRule>,
}

impl OrderRecord {
    fn into_order(self, sentinels: &SentinelConfig) -> OrderLine {
        OrderLine {
            warehouse: SourceFilter::from_sentinel(&self.warehouse_id, &sentinels.any_warehouse),
            supplier: SourceFilter::from_sentinel(&self.supplier_id, &sentinels.any_supplier),
            order_id: self.order_id,
            sub_order_id: self.sub_order_id,
            item_id: self.item_id,
            request_qty: self.request_qty,
            order_type: self.order_type,
            create_date: self.create_date,
            customer_id: self.customer_id,
            remark: self.remark.filter(|r| !r.trim().is_empty()),
        }
    }
}

impl ScenarioFile {
    /// Parses scenario JSON.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Maps sentinels, converts decimal money to cents and validates.
    pub fn into_scenario(self, sentinels: &SentinelConfig) -> Result<Scenario, ApiError> {
        let orders: Vec<OrderLine> = self
            .orders
            .into_iter()
            .map(|o| o.into_order(sentinels))
            .collect();

        let credits = self
            .credits
            .into_iter()
            .map(|c| CustomerCredit {
                customer_id: c.customer_id,
                remaining_credit_cents: to_cents(c.remaining_credit),
            })
            .collect::<Vec<_>>();

        let price_rules = self
            .price_rules
            .into_iter()
            .map(|r| PriceRule {
                item_id: r.item_id,
                supplier_id: r.supplier_id,
                base_unit_price_cents: to_cents(r.base_unit_price),
                type_multiplier: r.type_multiplier,
            })
            .collect::<Vec<_>>();

        validate_inputs(&orders, &self.inventory, &credits, &price_rules)?;

        Ok(Scenario {
            orders,
            inventory: self.inventory,
            credits,
            price_rules,
        })
    }
}

impl Scenario {
    /// Reads, converts and validates a scenario file.
    pub fn load(path: &Path, sentinels: &SentinelConfig) -> Result<Self, ApiError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ApiError::new(
                crate::error::ErrorCode::IoError,
                format!("Cannot read scenario {}: {}", path.display(), e),
            )
        })?;
        let scenario = ScenarioFile::from_json(&contents)?.into_scenario(sentinels)?;

        info!(
            ?path,
            orders = scenario.orders.len(),
            slots = scenario.inventory.len(),
            customers = scenario.credits.len(),
            rules = scenario.price_rules.len(),
            "Scenario loaded"
        );
        Ok(scenario)
    }

    /// Builds a fresh board; the scenario's ledger becomes the baseline.
    pub fn into_board(self) -> AllocationBoard {
        AllocationBoard::new(self.orders, self.inventory, self.credits, self.price_rules)
    }
}
