//! Shared test harness for order store backend testing
//!
//! Provides order/item builders plus ready-made patches, and the
//! `order_store_tests!` macro that validates any `OrderStore` implementation
//! against the full contract.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

use chrono::{Duration, Utc};
use rugops::core::entity::{Condition, Item, ItemStatus, Material, Order};
use rugops::core::patch::{ItemPatch, OrderPatch};

mod order_store_tests;

/// An order with `item_count` fresh pending rugs, ids "1".."N".
pub fn sample_order(id: &str, client_name: &str, item_count: usize) -> Order {
    let items = (1..=item_count).map(|i| Item::new(i.to_string())).collect();
    Order::new(id, client_name, "c2lnbmF0dXJl", items)
}

/// An order created `hours_ago` hours in the past, for list-ordering tests.
pub fn aged_order(id: &str, client_name: &str, hours_ago: i64) -> Order {
    let mut order = sample_order(id, client_name, 1);
    order.created_at = Utc::now() - Duration::hours(hours_ago);
    order
}

/// A fully measured wool rug: 3 x 2 at the wool rate prices to 120.
pub fn measured_item(id: &str) -> Item {
    let mut item = Item::new(id);
    item.status = ItemStatus::Measured;
    item.length = Some("3".to_string());
    item.width = Some("2".to_string());
    item.material = Some(Material::Wool);
    item.condition = Some(Condition::Good);
    item.cleaning_cost = 120.0;
    item
}

/// The measurement patch staff submit from the operations dashboard.
pub fn measure_patch() -> ItemPatch {
    serde_json::from_str(r#"{"length": "3", "width": "2", "material": "Wool", "state": "Good"}"#)
        .unwrap()
}

/// A patch moving a rug to ready_for_delivery.
pub fn ready_patch() -> ItemPatch {
    serde_json::from_str(r#"{"status": "ready_for_delivery"}"#).unwrap()
}

/// An order patch updating contact details.
pub fn contact_patch() -> OrderPatch {
    serde_json::from_str(r#"{"phone": "555-0100", "email": "alice@example.com"}"#).unwrap()
}
