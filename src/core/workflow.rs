//! Pure workflow rules connecting intake, measurement, approval and delivery
//!
//! Everything in this module is a function of plain order/item values: the
//! handlers load an order from the store, call in here, and persist whatever
//! comes back. Keeping the rules free of storage and HTTP concerns lets the
//! same code back every store implementation and makes the transition rules
//! directly testable.
//!
//! The rules are:
//! - item patches merge field-by-field, price on measurement and promote
//!   `pending → measured` once a rug is fully measured
//! - the `ready_for_delivery` transition is blocked while the parent order
//!   still awaits client approval
//! - after any item update the order may auto-escalate into
//!   `approval_status = pending` (one-way latch, see [`escalate_approval`])
//! - toggling `requires_approval` resets the approval state machine

use crate::core::entity::{ApprovalStatus, Condition, Item, ItemStatus, Order};
use crate::core::error::{EntityError, RugOpsError, ValidationError, WorkflowError};
use crate::core::patch::{ItemPatch, OrderPatch};
use crate::core::pricing;
use regex::Regex;
use std::sync::OnceLock;

/// Compute the next sequential order id from the ids already in the store.
///
/// Scans for ids of the form `ORD-<digits>`, takes the largest numeric
/// suffix (zero when none match) and formats max+1 zero-padded to three
/// digits. Ids that do not match the pattern are ignored rather than
/// rejected. Assignment is read-then-write with no lock, so concurrent
/// creations can race; acceptable for a single-operator workshop.
pub fn next_order_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    let suffix = SUFFIX.get_or_init(|| Regex::new(r"^ORD-(\d+)$").unwrap());

    let max = existing
        .into_iter()
        .filter_map(|id| suffix.captures(id))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("ORD-{:03}", max + 1)
}

/// Apply an order-level patch in place.
///
/// Toggling `requires_approval` drives the approval state machine: switching
/// it on puts the order into `pending`, switching it off resets to
/// `not_needed`. The toggle wins over any `approval_status` carried in the
/// same patch, so a stale dashboard cannot smuggle in a decision while staff
/// flip the flag. When the flag is untouched, a patched `approval_status` is
/// taken as-is (this is how the client approval page records its decision).
pub fn apply_order_patch(order: &mut Order, patch: &OrderPatch) {
    if let Some(client_name) = &patch.client_name {
        order.client_name = client_name.clone();
    }
    if let Some(phone) = &patch.phone {
        order.phone = Some(phone.clone());
    }
    if let Some(email) = &patch.email {
        order.email = Some(email.clone());
    }
    if let Some(address) = &patch.address {
        order.address = Some(address.clone());
    }
    if let Some(receipt) = &patch.receipt {
        order.receipt = Some(receipt.clone());
    }
    if let Some(approval_status) = patch.approval_status {
        order.approval_status = approval_status;
    }
    if let Some(requires_approval) = patch.requires_approval {
        if requires_approval != order.requires_approval {
            order.requires_approval = requires_approval;
            order.approval_status = if requires_approval {
                ApprovalStatus::Pending
            } else {
                ApprovalStatus::NotNeeded
            };
        }
    }
}

/// Merge an item patch against the order's current state.
///
/// Returns the updated item without persisting anything; the caller writes
/// it back and then runs [`escalate_approval`] on the reloaded order.
///
/// Rules applied, in order:
/// 1. moving an item to `ready_for_delivery` fails with
///    [`WorkflowError::ApprovalRequired`] while the order requires approval
///    that has not been granted
/// 2. patched fields overwrite, absent fields keep their stored value
/// 3. a patch touching length, width or material reprices the rug
/// 4. a repair estimate sets the status to `repair_estimated` unless the
///    patch names a status explicitly
/// 5. a fully measured `pending` rug is promoted to `measured`
///
/// The merged item must leave the repair estimate fields paired (both set
/// or both absent), otherwise the update is rejected.
pub fn apply_item_patch(
    order: &Order,
    item_id: &str,
    patch: &ItemPatch,
) -> Result<Item, RugOpsError> {
    let item = order.item(item_id).ok_or_else(|| EntityError::ItemNotFound {
        order_id: order.id.clone(),
        item_id: item_id.to_string(),
    })?;

    if patch.status == Some(ItemStatus::ReadyForDelivery)
        && item.status != ItemStatus::ReadyForDelivery
        && order.requires_approval
        && order.approval_status != ApprovalStatus::Approved
    {
        return Err(WorkflowError::ApprovalRequired {
            order_id: order.id.clone(),
            item_id: item_id.to_string(),
        }
        .into());
    }

    let mut updated = item.clone();
    if let Some(status) = patch.status {
        updated.status = status;
    }
    if let Some(length) = &patch.length {
        updated.length = Some(length.clone());
    }
    if let Some(width) = &patch.width {
        updated.width = Some(width.clone());
    }
    if let Some(material) = patch.material {
        updated.material = Some(material);
    }
    if let Some(condition) = patch.condition {
        updated.condition = Some(condition);
    }
    if let Some(photo) = &patch.photo {
        updated.photo = Some(photo.clone());
    }
    if let Some(repair_cost) = patch.repair_cost {
        updated.repair_cost = Some(repair_cost);
    }
    if let Some(repair_description) = &patch.repair_description {
        updated.repair_description = Some(repair_description.clone());
    }

    if !updated.repair_fields_paired() {
        return Err(ValidationError::RepairFieldsUnpaired {
            item_id: item_id.to_string(),
        }
        .into());
    }

    if patch.touches_measurements() {
        updated.cleaning_cost = pricing::cleaning_cost(
            updated.length.as_deref(),
            updated.width.as_deref(),
            updated.material,
        );
    }

    if patch.status.is_none() {
        if patch.carries_repair_estimate() {
            updated.status = ItemStatus::RepairEstimated;
        } else if updated.status == ItemStatus::Pending && updated.has_measurements() {
            updated.status = ItemStatus::Measured;
        }
    }

    Ok(updated)
}

/// True for the statuses that count as "measured" for approval escalation.
///
/// `cleaning_estimated` qualifies even though no operation produces it
/// anymore; legacy snapshots still carry it.
fn qualifies_for_escalation(status: ItemStatus) -> bool {
    matches!(
        status,
        ItemStatus::Measured | ItemStatus::CleaningEstimated | ItemStatus::RepairEstimated
    )
}

/// Flip the order into `approval_status = pending` once every rug has been
/// measured or estimated.
///
/// Fires only while the status is exactly `not_needed`, so it is a one-way
/// latch per approval cycle: a client's `approved`/`rejected` decision is
/// never overwritten by a later item update. Returns whether the order
/// changed.
pub fn escalate_approval(order: &mut Order) -> bool {
    if order.requires_approval
        && order.approval_status == ApprovalStatus::NotNeeded
        && order.items.iter().all(|i| qualifies_for_escalation(i.status))
    {
        order.approval_status = ApprovalStatus::Pending;
        return true;
    }
    false
}

/// True when the order belongs in the delivery queue.
///
/// The order must have at least one item, every item must be
/// `ready_for_delivery` or `delivered`, and at least one must still be
/// `ready_for_delivery` so fully delivered orders drop off the queue.
pub fn is_delivery_ready(order: &Order) -> bool {
    !order.items.is_empty()
        && order.items.iter().all(|i| {
            matches!(
                i.status,
                ItemStatus::ReadyForDelivery | ItemStatus::Delivered
            )
        })
        && order
            .items
            .iter()
            .any(|i| i.status == ItemStatus::ReadyForDelivery)
}

/// True when the rug belongs on the repair screen.
///
/// Driven by condition (worn or damaged rugs need attention) or by already
/// being in the repair sub-flow.
pub fn needs_repair(item: &Item) -> bool {
    matches!(item.condition, Some(Condition::Worn) | Some(Condition::Damaged))
        || matches!(
            item.status,
            ItemStatus::RepairNeeded | ItemStatus::RepairEstimated
        )
}

/// Order the delivery visiting sequence for a set of order ids.
///
/// Currently sorts lexicographically, which for `ORD-NNN` ids is oldest
/// first. Callers get a stable sequence independent of request order.
pub fn plan_delivery_sequence(mut order_ids: Vec<String>) -> Vec<String> {
    order_ids.sort();
    order_ids
}
