//! Route table for the order workflow API

use crate::server::handlers::{
    AppState, create_order, delivery_ready, get_order, list_orders, next_order_id,
    optimize_delivery, purge, run_migration, update_item, update_order,
};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full route table:
/// - POST /api/orders - Intake a new order
/// - GET /api/orders - List all orders, newest first
/// - GET /api/orders/next-id - Preview the next order id
/// - GET /api/orders/{id} - Fetch one order
/// - POST /api/orders/update - Patch order fields / approval state
/// - POST /api/operations/update-item - Patch one rug through the workflow
/// - GET /api/delivery/ready - Orders ready for the delivery run
/// - POST /api/delivery/optimize - Order a delivery visiting sequence
/// - POST /api/migrate - Import a legacy JSON snapshot
/// - POST /api/admin/purge - Delete everything
///
/// The dashboards are served separately and call in cross-origin, hence the
/// permissive CORS layer.
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/next-id", get(next_order_id))
        .route("/api/orders/update", post(update_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/operations/update-item", post(update_item))
        .route("/api/delivery/ready", get(delivery_ready))
        .route("/api/delivery/optimize", post(optimize_delivery))
        .route("/api/migrate", post(run_migration))
        .route("/api/admin/purge", post(purge))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
