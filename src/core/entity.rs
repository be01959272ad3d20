//! Data model for orders and the rugs they contain
//!
//! An [`Order`] is one client drop-off event owning one or more [`Item`]s
//! (physical rugs). Items carry their own workflow status, measurements and
//! derived cleaning cost; the order carries the client contact details and
//! the approval gate.
//!
//! All enumerations are closed: status, material, condition and approval
//! state are tagged variants validated on every write, never free strings.
//! Wire names follow the JSON shape the dashboards already speak
//! (camelCase fields, capitalized material names, snake_case statuses).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a single rug.
///
/// The main progression is `Pending → Measured → ReadyForDelivery →
/// Delivered`. The repair states run alongside it: a rug can be `Measured`
/// and still carry a repair estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Measured,
    /// Accepted from legacy snapshots; no operation ever produces it.
    CleaningEstimated,
    RepairNeeded,
    RepairEstimated,
    ReadyForDelivery,
    Delivered,
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Pending
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Measured => "measured",
            ItemStatus::CleaningEstimated => "cleaning_estimated",
            ItemStatus::RepairNeeded => "repair_needed",
            ItemStatus::RepairEstimated => "repair_estimated",
            ItemStatus::ReadyForDelivery => "ready_for_delivery",
            ItemStatus::Delivered => "delivered",
        };
        write!(f, "{}", s)
    }
}

/// Approval state of an order.
///
/// `NotNeeded` whenever the order does not require approval. Flips to
/// `Pending` the moment approval is required (or when every item reaches a
/// measured state, see the workflow rules). `Approved`/`Rejected` are the
/// client's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    NotNeeded,
    Pending,
    Approved,
    Rejected,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        ApprovalStatus::NotNeeded
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalStatus::NotNeeded => "not_needed",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// Rug material, priced per unit area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Synthetic,
    Wool,
    Silk,
    Cotton,
    Blend,
    Unknown,
}

/// Physical condition of a rug as assessed at measurement.
///
/// `Worn` and `Damaged` rugs enter the repair sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Good,
    Stained,
    Worn,
    Damaged,
    #[serde(rename = "Heavily Soiled")]
    HeavilySoiled,
}

/// One physical rug tracked through cleaning, repair and delivery.
///
/// Identity is composite: the `id` ("1", "2", …) is unique only within the
/// parent order. Measurements are free-text as entered by staff and only
/// interpreted numerically for pricing; `cleaning_cost` is always derived,
/// never hand-entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub status: ItemStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,

    /// Condition of the rug. The wire name stays `state` for compatibility
    /// with the existing dashboards and snapshot files.
    #[serde(default, rename = "state", skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Derived from length, width and material. Zero until priced.
    #[serde(default)]
    pub cleaning_cost: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair_cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair_description: Option<String>,
}

impl Item {
    /// Create a fresh, unmeasured rug with the given per-order id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ItemStatus::Pending,
            length: None,
            width: None,
            material: None,
            condition: None,
            photo: None,
            cleaning_cost: 0.0,
            repair_cost: None,
            repair_description: None,
        }
    }

    /// True once length, width, material and condition are all supplied.
    pub fn has_measurements(&self) -> bool {
        self.length.is_some()
            && self.width.is_some()
            && self.material.is_some()
            && self.condition.is_some()
    }

    /// True when the repair estimate fields are consistent: both absent or
    /// both present.
    pub fn repair_fields_paired(&self) -> bool {
        self.repair_cost.is_some() == self.repair_description.is_some()
    }
}

/// One client drop-off event containing one or more rugs.
///
/// Orders own their items exclusively; deleting an order deletes its items.
/// An order always has at least one item after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Sequential identifier in the form `ORD-NNN`.
    pub id: String,

    pub client_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Opaque encoded signature image captured at intake.
    pub signature: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub requires_approval: bool,

    #[serde(default)]
    pub approval_status: ApprovalStatus,

    pub items: Vec<Item>,
}

impl Order {
    /// Create a new order at intake time.
    ///
    /// New orders never require approval; staff opt in later from the
    /// operations dashboard.
    pub fn new(
        id: impl Into<String>,
        client_name: impl Into<String>,
        signature: impl Into<String>,
        items: Vec<Item>,
    ) -> Self {
        Self {
            id: id.into(),
            client_name: client_name.into(),
            phone: None,
            email: None,
            address: None,
            signature: signature.into(),
            receipt: None,
            created_at: Utc::now(),
            requires_approval: false,
            approval_status: ApprovalStatus::NotNeeded,
            items,
        }
    }

    /// Find an item by its per-order id.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Find an item mutably by its per-order id.
    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_wire_format() {
        let json = serde_json::to_string(&ItemStatus::ReadyForDelivery).unwrap();
        assert_eq!(json, "\"ready_for_delivery\"");

        let parsed: ItemStatus = serde_json::from_str("\"repair_estimated\"").unwrap();
        assert_eq!(parsed, ItemStatus::RepairEstimated);
    }

    #[test]
    fn test_legacy_cleaning_estimated_accepted() {
        let parsed: ItemStatus = serde_json::from_str("\"cleaning_estimated\"").unwrap();
        assert_eq!(parsed, ItemStatus::CleaningEstimated);
    }

    #[test]
    fn test_condition_wire_format() {
        let json = serde_json::to_string(&Condition::HeavilySoiled).unwrap();
        assert_eq!(json, "\"Heavily Soiled\"");

        let parsed: Condition = serde_json::from_str("\"Worn\"").unwrap();
        assert_eq!(parsed, Condition::Worn);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let parsed = serde_json::from_str::<Material>("\"Polyester\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_new_item_defaults() {
        let item = Item::new("1");
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.cleaning_cost, 0.0);
        assert!(!item.has_measurements());
        assert!(item.repair_fields_paired());
    }

    #[test]
    fn test_has_measurements_requires_all_four() {
        let mut item = Item::new("1");
        item.length = Some("3".to_string());
        item.width = Some("2".to_string());
        item.material = Some(Material::Wool);
        assert!(!item.has_measurements());

        item.condition = Some(Condition::Good);
        assert!(item.has_measurements());
    }

    #[test]
    fn test_order_wire_shape_is_camel_case() {
        let order = Order::new("ORD-001", "Alice", "sig==", vec![Item::new("1")]);
        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("clientName").is_some());
        assert!(value.get("requiresApproval").is_some());
        assert_eq!(value["approvalStatus"], "not_needed");
        assert_eq!(value["items"][0]["status"], "pending");
    }

    #[test]
    fn test_item_condition_serializes_as_state() {
        let mut item = Item::new("1");
        item.condition = Some(Condition::Stained);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["state"], "Stained");
        assert!(value.get("condition").is_none());
    }

    #[test]
    fn test_order_item_lookup() {
        let mut order = Order::new(
            "ORD-002",
            "Bob",
            "sig==",
            vec![Item::new("1"), Item::new("2")],
        );
        assert!(order.item("2").is_some());
        assert!(order.item("3").is_none());

        order.item_mut("1").unwrap().status = ItemStatus::Measured;
        assert_eq!(order.item("1").unwrap().status, ItemStatus::Measured);
    }
}
