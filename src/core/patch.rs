//! Explicit patch structures for partial updates
//!
//! Update endpoints accept a closed field set per entity rather than an
//! arbitrary field bag: each patch lists exactly the fields the operation is
//! permitted to mutate and rejects anything else at deserialization time.
//! Absent fields leave the stored value untouched.
//!
//! `cleaningCost` is deliberately missing from [`ItemPatch`]: the cost is
//! derived and recomputed by the workflow engine whenever length, width or
//! material change.

use crate::core::entity::{ApprovalStatus, Condition, ItemStatus, Material};
use serde::Deserialize;

/// Fields of an order that staff (or the client approval page) may change
/// after intake.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderPatch {
    pub client_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub receipt: Option<String>,
    pub requires_approval: Option<bool>,
    pub approval_status: Option<ApprovalStatus>,
}

impl OrderPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.receipt.is_none()
            && self.requires_approval.is_none()
            && self.approval_status.is_none()
    }
}

/// Fields of a rug that the measurement, repair and delivery screens may
/// change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemPatch {
    pub status: Option<ItemStatus>,
    pub length: Option<String>,
    pub width: Option<String>,
    pub material: Option<Material>,
    #[serde(rename = "state")]
    pub condition: Option<Condition>,
    pub photo: Option<String>,
    pub repair_cost: Option<f64>,
    pub repair_description: Option<String>,
}

impl ItemPatch {
    /// True when the patch touches any of the fields the cleaning cost is
    /// derived from.
    pub fn touches_measurements(&self) -> bool {
        self.length.is_some() || self.width.is_some() || self.material.is_some()
    }

    /// True when the patch carries a repair estimate.
    pub fn carries_repair_estimate(&self) -> bool {
        self.repair_cost.is_some() || self.repair_description.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<ItemPatch>(r#"{"cleaningCost": 500.0}"#);
        assert!(result.is_err(), "derived fields must not be patchable");

        let result = serde_json::from_str::<OrderPatch>(r#"{"signature": "tampered"}"#);
        assert!(result.is_err(), "signature is intake-only");
    }

    #[test]
    fn test_empty_patch() {
        let patch: OrderPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_item_patch_wire_names() {
        let patch: ItemPatch = serde_json::from_str(
            r#"{"length": "3", "width": "2", "material": "Wool", "state": "Good"}"#,
        )
        .unwrap();
        assert_eq!(patch.length.as_deref(), Some("3"));
        assert!(patch.condition.is_some());
        assert!(patch.touches_measurements());
        assert!(!patch.carries_repair_estimate());
    }

    #[test]
    fn test_repair_estimate_detection() {
        let patch: ItemPatch =
            serde_json::from_str(r#"{"repairCost": 40.0, "repairDescription": "patch corner"}"#)
                .unwrap();
        assert!(patch.carries_repair_estimate());
        assert!(!patch.touches_measurements());
    }

    #[test]
    fn test_invalid_enum_value_rejected() {
        let result = serde_json::from_str::<ItemPatch>(r#"{"status": "shipped"}"#);
        assert!(result.is_err());
    }
}
