//! # Scenario Generator
//!
//! Builds large, reproducible scenario files for demos and load checks.
//! The same seed always yields the same file.
//!
//! ## Shape of a Generated Scenario
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items × suppliers               ──► one price rule each                │
//! │                                      base 50.00 - 500.00                │
//! │                                      EMERGENCY × 1.25, others × 1.0     │
//! │  items × warehouses × suppliers  ──► one inventory slot each            │
//! │                                      200 - 3199 units                   │
//! │  customers                       ──► credit 20,000.00 - 220,000.00      │
//! │  orders                          ──► two sub-orders per order id        │
//! │                                      one minute apart                   │
//! │                                      ~12% "any" warehouse/supplier      │
//! │                                      ~8% with a VIP remark              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use allot_core::{InventorySlot, OrderType, TypeMultipliers};

use crate::scenario::{CreditRecord, OrderRecord, PriceRuleRecord, ScenarioFile};
use crate::state::SentinelConfig;

/// 2025-01-01T00:00:00Z, the first order's creation time.
const FIRST_ORDER_AT: i64 = 1_735_689_600;

/// Chance an order leaves its warehouse or supplier open.
const ANY_SOURCE_RATE: f64 = 0.12;

const REMARK_RATE: f64 = 0.08;

/// Urgency mix: 10 daily, 4 overdue, 3 claim, 3 emergency out of 20.
const TYPE_BAG: [(OrderType, u32); 4] = [
    (OrderType::Daily, 10),
    (OrderType::Overdue, 4),
    (OrderType::Claim, 3),
    (OrderType::Emergency, 3),
];

/// Size and seed of a generated scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub order_count: usize,
    pub seed: u64,
    pub item_count: usize,
    pub warehouse_count: usize,
    pub supplier_count: usize,
    pub customer_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            order_count: 5000,
            seed: 99999,
            item_count: 20,
            warehouse_count: 5,
            supplier_count: 5,
            customer_count: 200,
        }
    }
}

fn ids(prefix: &str, count: usize, width: usize) -> Vec<String> {
    (1..=count)
        .map(|n| format!("{}-{:0width$}", prefix, n, width = width))
        .collect()
}

fn pick<'a>(rng: &mut ChaCha8Rng, pool: &'a [String]) -> &'a str {
    pool.choose(rng).map(String::as_str).unwrap_or_default()
}

fn pick_type(rng: &mut ChaCha8Rng) -> OrderType {
    let total: u32 = TYPE_BAG.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (order_type, weight) in TYPE_BAG {
        if roll < weight {
            return order_type;
        }
        roll -= weight;
    }
    OrderType::Daily
}

/// Generates a scenario file. Open sources use the configured sentinel ids.
pub fn generate_scenario(config: &GeneratorConfig, sentinels: &SentinelConfig) -> ScenarioFile {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let items = ids("Item", config.item_count, 3);
    let warehouses = ids("WH", config.warehouse_count, 3);
    let suppliers = ids("SP", config.supplier_count, 3);
    let customers = ids("CT", config.customer_count, 4);

    let emergency_premium = TypeMultipliers {
        emergency: 1.25,
        ..TypeMultipliers::flat()
    };

    let mut price_rules = Vec::with_capacity(items.len() * suppliers.len());
    for item_id in &items {
        for supplier_id in &suppliers {
            price_rules.push(PriceRuleRecord {
                item_id: item_id.clone(),
                supplier_id: supplier_id.clone(),
                base_unit_price: rng.gen_range(5_000..=50_000_i64) as f64 / 100.0,
                type_multiplier: emergency_premium,
            });
        }
    }

    let mut inventory = Vec::with_capacity(items.len() * warehouses.len() * suppliers.len());
    for item_id in &items {
        for warehouse_id in &warehouses {
            for supplier_id in &suppliers {
                inventory.push(InventorySlot::new(
                    item_id.as_str(),
                    warehouse_id.as_str(),
                    supplier_id.as_str(),
                    rng.gen_range(200..3_200),
                ));
            }
        }
    }

    let credits = customers
        .iter()
        .map(|customer_id| CreditRecord {
            customer_id: customer_id.clone(),
            remaining_credit: rng.gen_range(2_000_000..22_000_000_i64) as f64 / 100.0,
        })
        .collect();

    let first_order_at: DateTime<Utc> = Utc
        .timestamp_opt(FIRST_ORDER_AT, 0)
        .single()
        .unwrap_or_default();

    let mut orders = Vec::with_capacity(config.order_count);
    for i in 0..config.order_count {
        let order_id = format!("ORDER-{:04}", i / 2 + 1);
        let sub_order_id = format!("{}-{:03}", order_id, i % 2 + 1);

        let order_type = pick_type(&mut rng);
        let item_id = pick(&mut rng, &items).to_string();
        let customer_id = pick(&mut rng, &customers).to_string();

        let warehouse_id = if rng.gen_bool(ANY_SOURCE_RATE) {
            sentinels.any_warehouse.clone()
        } else {
            pick(&mut rng, &warehouses).to_string()
        };
        let supplier_id = if rng.gen_bool(ANY_SOURCE_RATE) {
            sentinels.any_supplier.clone()
        } else {
            pick(&mut rng, &suppliers).to_string()
        };

        let request_qty = match order_type {
            OrderType::Emergency => rng.gen_range(50..450),
            _ => rng.gen_range(5..125),
        };

        let remark = rng
            .gen_bool(REMARK_RATE)
            .then(|| "Special for VIP".to_string());

        orders.push(OrderRecord {
            order_id,
            sub_order_id,
            item_id,
            warehouse_id,
            supplier_id,
            request_qty,
            order_type,
            create_date: first_order_at + Duration::minutes(i as i64),
            customer_id,
            remark,
        });
    }

    info!(
        seed = config.seed,
        orders = orders.len(),
        slots = inventory.len(),
        rules = price_rules.len(),
        "Scenario generated"
    );

    ScenarioFile {
        orders,
        inventory,
        credits,
        price_rules,
    }
}
