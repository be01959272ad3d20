//! HTTP handlers for the order workflow API
//!
//! Handlers stay thin: decode the request, call the store (which runs the
//! workflow rules atomically), re-shape the result for the wire. Update
//! bodies carry the target ids alongside the patch fields, so the ids are
//! peeled off first and the remainder is checked against the closed patch
//! structs.
//!
//! Domain errors convert to HTTP responses through
//! [`RugOpsError`]'s `IntoResponse`; the match between error category and
//! status code lives there, not here.

use crate::config::AppConfig;
use crate::core::entity::{Condition, Item, ItemStatus, Material, Order};
use crate::core::error::{EntityError, RugOpsError, ValidationError};
use crate::core::patch::{ItemPatch, OrderPatch};
use crate::core::pricing::{self, OrderTotals};
use crate::core::workflow;
use crate::migrate::{self, MigrationSummary};
use crate::storage::OrderStore;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub config: Arc<AppConfig>,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// An order as the dashboards consume it: entity fields plus the derived
/// money totals, computed fresh on every read.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub totals: OrderTotals,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let totals = pricing::order_totals(&order);
        Self { order, totals }
    }
}

/// Intake payload. Item ids are assigned server-side, sequentially per
/// order; any initial measurements supplied at intake are priced right away.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub client_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub signature: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub items: Vec<NewItem>,
}

/// One rug as captured on the intake form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub material: Option<Material>,
    #[serde(default, rename = "state")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextIdResponse {
    pub next_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub order_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SequenceResponse {
    pub sequence: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MigrateRequest {
    /// Snapshot file to import; defaults to the configured path.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub deleted_orders: usize,
    pub deleted_items: usize,
}

// ---------------------------------------------------------------------------
// Body decoding helpers
// ---------------------------------------------------------------------------

/// Decode a JSON value into a request struct, surfacing serde's message as a
/// 400 instead of axum's default rejection.
fn parse_body<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, RugOpsError> {
    serde_json::from_value(value).map_err(|e| {
        ValidationError::InvalidJson {
            message: e.to_string(),
        }
        .into()
    })
}

/// Pull a required id field out of an update body, leaving the patch fields
/// behind.
fn take_id_field(body: &mut serde_json::Value, field: &str) -> Result<String, RugOpsError> {
    match body.as_object_mut().and_then(|map| map.remove(field)) {
        Some(serde_json::Value::String(id)) if !id.trim().is_empty() => Ok(id),
        _ => Err(ValidationError::MissingField {
            field: field.to_string(),
        }
        .into()),
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<OrderView>), RugOpsError> {
    let request: CreateOrderRequest = parse_body(body)?;

    if request.client_name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "clientName".to_string(),
        }
        .into());
    }
    if request.signature.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "signature".to_string(),
        }
        .into());
    }
    if request.items.is_empty() {
        return Err(ValidationError::NoItems.into());
    }

    let existing = state.store.list().await?;
    let id = workflow::next_order_id(existing.iter().map(|o| o.id.as_str()));

    let items = request
        .items
        .into_iter()
        .enumerate()
        .map(|(index, fields)| {
            let mut item = Item::new((index + 1).to_string());
            if let Some(status) = fields.status {
                item.status = status;
            }
            item.length = fields.length;
            item.width = fields.width;
            item.material = fields.material;
            item.condition = fields.condition;
            item.photo = fields.photo;
            item.cleaning_cost = pricing::cleaning_cost(
                item.length.as_deref(),
                item.width.as_deref(),
                item.material,
            );
            if item.status == ItemStatus::Pending && item.has_measurements() {
                item.status = ItemStatus::Measured;
            }
            item
        })
        .collect();

    let mut order = Order::new(id, request.client_name, request.signature, items);
    order.phone = request.phone;
    order.email = request.email;
    order.address = request.address;
    order.receipt = request.receipt;

    let created = state.store.create(order).await?;
    tracing::info!(order_id = %created.id, items = created.items.len(), "order created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>, RugOpsError> {
    let orders = state.store.list().await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// GET /api/orders/next-id
pub async fn next_order_id(
    State(state): State<AppState>,
) -> Result<Json<NextIdResponse>, RugOpsError> {
    let orders = state.store.list().await?;
    let next_id = workflow::next_order_id(orders.iter().map(|o| o.id.as_str()));
    Ok(Json(NextIdResponse { next_id }))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, RugOpsError> {
    let order = state
        .store
        .get(&id)
        .await?
        .ok_or(EntityError::OrderNotFound { id })?;
    Ok(Json(order.into()))
}

/// POST /api/orders/update
///
/// Body: `{"orderId": "...", ...order patch fields}`. Approval decisions
/// from the client page and the staff `requiresApproval` toggle both land
/// here.
pub async fn update_order(
    State(state): State<AppState>,
    Json(mut body): Json<serde_json::Value>,
) -> Result<Json<OrderView>, RugOpsError> {
    let order_id = take_id_field(&mut body, "orderId")?;
    let patch: OrderPatch = parse_body(body)?;

    let updated = state.store.update_order(&order_id, &patch).await?;
    tracing::info!(order_id = %updated.id, "order updated");

    Ok(Json(updated.into()))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// POST /api/operations/update-item
///
/// Body: `{"orderId": "...", "itemId": "...", ...item patch fields}`. Runs
/// the full workflow cycle: merge, validate repair pairing, reprice,
/// approval gate, then the escalation check on the parent order.
pub async fn update_item(
    State(state): State<AppState>,
    Json(mut body): Json<serde_json::Value>,
) -> Result<Json<Item>, RugOpsError> {
    let order_id = take_id_field(&mut body, "orderId")?;
    let item_id = take_id_field(&mut body, "itemId")?;
    let patch: ItemPatch = parse_body(body)?;

    let updated = state.store.update_item(&order_id, &item_id, &patch).await?;
    tracing::info!(order_id = %order_id, item_id = %item_id, status = %updated.status, "item updated");

    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// GET /api/delivery/ready
pub async fn delivery_ready(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderView>>, RugOpsError> {
    let orders = state.store.list().await?;
    Ok(Json(
        orders
            .into_iter()
            .filter(workflow::is_delivery_ready)
            .map(OrderView::from)
            .collect(),
    ))
}

/// POST /api/delivery/optimize
pub async fn optimize_delivery(
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SequenceResponse>, RugOpsError> {
    let request: OptimizeRequest = parse_body(body)?;
    Ok(Json(SequenceResponse {
        sequence: workflow::plan_delivery_sequence(request.order_ids),
    }))
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

/// POST /api/migrate
pub async fn run_migration(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<MigrationSummary>, RugOpsError> {
    let request: MigrateRequest = parse_body(body)?;
    let path = PathBuf::from(
        request
            .path
            .unwrap_or_else(|| state.config.snapshot_path.clone()),
    );

    let summary = migrate::import_snapshot(state.store.as_ref(), &path).await?;
    Ok(Json(summary))
}

/// POST /api/admin/purge
pub async fn purge(State(state): State<AppState>) -> Result<Json<PurgeResponse>, RugOpsError> {
    let orders = state.store.list().await?;
    let deleted_orders = orders.len();
    let deleted_items = orders.iter().map(|o| o.items.len()).sum();

    state.store.delete_all().await?;
    tracing::warn!(deleted_orders, deleted_items, "all orders purged");

    Ok(Json(PurgeResponse {
        deleted_orders,
        deleted_items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_id_field_removes_id_from_patch() {
        let mut body = serde_json::json!({"orderId": "ORD-001", "phone": "555"});
        let id = take_id_field(&mut body, "orderId").unwrap();
        assert_eq!(id, "ORD-001");
        assert!(body.get("orderId").is_none());
        assert_eq!(body["phone"], "555");
    }

    #[test]
    fn test_take_id_field_missing_or_blank() {
        let mut body = serde_json::json!({"phone": "555"});
        assert!(take_id_field(&mut body, "orderId").is_err());

        let mut body = serde_json::json!({"orderId": "  "});
        assert!(take_id_field(&mut body, "orderId").is_err());
    }

    #[test]
    fn test_order_view_embeds_totals() {
        let mut order = Order::new("ORD-001", "Alice", "sig==", vec![Item::new("1")]);
        order.items[0].cleaning_cost = 50.0;
        let view = OrderView::from(order);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["clientName"], "Alice");
        assert_eq!(value["totals"]["cleaningTotal"], 50.0);
        assert_eq!(value["totals"]["grandTotal"], 50.0);
    }

    #[test]
    fn test_unknown_patch_field_rejected_after_id_removal() {
        let mut body = serde_json::json!({"orderId": "ORD-001", "cleaningCost": 10.0});
        take_id_field(&mut body, "orderId").unwrap();
        let result: Result<OrderPatch, _> = parse_body(body);
        assert!(result.is_err());
    }
}
