//! Cleaning-cost computation and order totals
//!
//! Pricing is area-based: `length × width × rate(material)`, rounded to two
//! decimals. Measurements are stored as the free text staff typed in; a rug
//! is only priced once both dimensions parse as positive numbers. Until then
//! its cost is zero, which reads as "not yet priced", not as an error.
//!
//! Order totals are always derived fresh from current item state and never
//! persisted, so they cannot drift from the items they summarize.

use crate::core::entity::{Material, Order};
use serde::Serialize;

/// Currency units per unit area for each material.
///
/// Unrecognized or missing materials fall back to the default rate.
pub fn rate(material: Option<Material>) -> f64 {
    match material {
        Some(Material::Wool) => 20.0,
        Some(Material::Silk) => 50.0,
        Some(Material::Synthetic) => 15.0,
        Some(Material::Cotton) => 20.0,
        Some(Material::Blend) => 15.0,
        Some(Material::Unknown) | None => 20.0,
    }
}

/// Compute the cleaning cost for one rug.
///
/// Returns zero whenever either dimension is absent, non-numeric or not
/// strictly positive.
pub fn cleaning_cost(length: Option<&str>, width: Option<&str>, material: Option<Material>) -> f64 {
    let Some(l) = length.and_then(parse_dimension) else {
        return 0.0;
    };
    let Some(w) = width.and_then(parse_dimension) else {
        return 0.0;
    };
    round2(l * w * rate(material))
}

fn parse_dimension(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value > 0.0).then_some(value)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derived money totals for one order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub cleaning_total: f64,
    pub repair_total: f64,
    pub grand_total: f64,
}

/// Sum an order's item costs.
///
/// Idempotent over unchanged input; absent repair costs count as zero.
pub fn order_totals(order: &Order) -> OrderTotals {
    let cleaning_total = round2(order.items.iter().map(|i| i.cleaning_cost).sum());
    let repair_total = round2(order.items.iter().filter_map(|i| i.repair_cost).sum());
    OrderTotals {
        cleaning_total,
        repair_total,
        grand_total: round2(cleaning_total + repair_total),
    }
}
