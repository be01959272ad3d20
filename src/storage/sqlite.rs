//! SQLite storage backend using sqlx.
//!
//! Provides an `OrderStore` implementation backed by a SQLite database via
//! `sqlx::SqlitePool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag:
//! ```toml
//! [dependencies]
//! rugops = { version = "0.1", features = ["sqlite"] }
//! ```
//!
//! # Schema
//!
//! Orders and items live in two tables joined by `order_id`. Enumerated
//! fields are stored as their wire strings (the same spelling the JSON API
//! uses), so a row is readable with plain sql and round-trips through the
//! serde definitions without a second name mapping.
//!
//! Updates run inside a transaction so the item write and the approval
//! escalation check cannot interleave with another request.

use crate::core::entity::{Item, Order};
use crate::core::error::EntityError;
use crate::core::patch::{ItemPatch, OrderPatch};
use crate::core::workflow;
use crate::storage::OrderStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqlitePool;
use sqlx::SqliteConnection;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id TEXT NOT NULL PRIMARY KEY,
            client_name TEXT NOT NULL,
            phone TEXT NULL,
            email TEXT NULL,
            address TEXT NULL,
            signature TEXT NOT NULL,
            receipt TEXT NULL,
            created_at TEXT NOT NULL,
            requires_approval INTEGER NOT NULL DEFAULT 0,
            approval_status TEXT NOT NULL DEFAULT 'not_needed'
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create orders table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS items (
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            length TEXT NULL,
            width TEXT NULL,
            material TEXT NULL,
            condition TEXT NULL,
            photo TEXT NULL,
            cleaning_cost REAL NOT NULL DEFAULT 0,
            repair_cost REAL NULL,
            repair_description TEXT NULL,
            PRIMARY KEY (order_id, id)
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create items table: {}", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Wire-string conversion
// ---------------------------------------------------------------------------

/// Encode an enumerated field as its wire string.
fn to_db<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value).map_err(|e| anyhow!("Failed to encode value: {}", e))? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(anyhow!("Expected string-encoded value, got {}", other)),
    }
}

/// Decode an enumerated field from its stored wire string.
fn from_db<T: DeserializeOwned>(raw: String) -> Result<T> {
    let display = raw.clone();
    serde_json::from_value(serde_json::Value::String(raw))
        .map_err(|e| anyhow!("Unrecognized stored value '{}': {}", display, e))
}

type OrderRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    DateTime<Utc>,
    bool,
    String,
);

type ItemRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    f64,
    Option<f64>,
    Option<String>,
);

fn order_from_row(row: OrderRow, items: Vec<Item>) -> Result<Order> {
    let (id, client_name, phone, email, address, signature, receipt, created_at, requires_approval, approval_status) =
        row;
    Ok(Order {
        id,
        client_name,
        phone,
        email,
        address,
        signature,
        receipt,
        created_at,
        requires_approval,
        approval_status: from_db(approval_status)?,
        items,
    })
}

fn item_from_row(row: ItemRow) -> Result<Item> {
    let (id, status, length, width, material, condition, photo, cleaning_cost, repair_cost, repair_description) =
        row;
    Ok(Item {
        id,
        status: from_db(status)?,
        length,
        width,
        material: material.map(from_db).transpose()?,
        condition: condition.map(from_db).transpose()?,
        photo,
        cleaning_cost,
        repair_cost,
        repair_description,
    })
}

// ---------------------------------------------------------------------------
// Row-level queries shared between pool and transaction paths
// ---------------------------------------------------------------------------

async fn fetch_items(conn: &mut SqliteConnection, order_id: &str) -> Result<Vec<Item>> {
    let rows = sqlx::query_as::<_, ItemRow>(
        "SELECT id, status, length, width, material, condition, photo, \
                cleaning_cost, repair_cost, repair_description \
         FROM items WHERE order_id = ? ORDER BY rowid",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await
    .map_err(|e| anyhow!("Failed to list items: {}", e))?;

    rows.into_iter().map(item_from_row).collect()
}

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> Result<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, client_name, phone, email, address, signature, receipt, \
                created_at, requires_approval, approval_status \
         FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| anyhow!("Failed to get order: {}", e))?;

    match row {
        Some(row) => {
            let items = fetch_items(conn, id).await?;
            Ok(Some(order_from_row(row, items)?))
        }
        None => Ok(None),
    }
}

async fn insert_item(conn: &mut SqliteConnection, order_id: &str, item: &Item) -> Result<()> {
    sqlx::query(
        "INSERT INTO items (order_id, id, status, length, width, material, condition, \
                            photo, cleaning_cost, repair_cost, repair_description) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(&item.id)
    .bind(to_db(&item.status)?)
    .bind(&item.length)
    .bind(&item.width)
    .bind(item.material.as_ref().map(to_db).transpose()?)
    .bind(item.condition.as_ref().map(to_db).transpose()?)
    .bind(&item.photo)
    .bind(item.cleaning_cost)
    .bind(item.repair_cost)
    .bind(&item.repair_description)
    .execute(conn)
    .await
    .map_err(|e| anyhow!("Failed to create item: {}", e))?;

    Ok(())
}

async fn write_item(conn: &mut SqliteConnection, order_id: &str, item: &Item) -> Result<()> {
    let result = sqlx::query(
        "UPDATE items SET status = ?, length = ?, width = ?, material = ?, condition = ?, \
                          photo = ?, cleaning_cost = ?, repair_cost = ?, repair_description = ? \
         WHERE order_id = ? AND id = ?",
    )
    .bind(to_db(&item.status)?)
    .bind(&item.length)
    .bind(&item.width)
    .bind(item.material.as_ref().map(to_db).transpose()?)
    .bind(item.condition.as_ref().map(to_db).transpose()?)
    .bind(&item.photo)
    .bind(item.cleaning_cost)
    .bind(item.repair_cost)
    .bind(&item.repair_description)
    .bind(order_id)
    .bind(&item.id)
    .execute(conn)
    .await
    .map_err(|e| anyhow!("Failed to update item: {}", e))?;

    if result.rows_affected() == 0 {
        return Err(anyhow!("Item not found: {}/{}", order_id, item.id));
    }

    Ok(())
}

async fn write_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
    let result = sqlx::query(
        "UPDATE orders SET client_name = ?, phone = ?, email = ?, address = ?, receipt = ?, \
                           requires_approval = ?, approval_status = ? \
         WHERE id = ?",
    )
    .bind(&order.client_name)
    .bind(&order.phone)
    .bind(&order.email)
    .bind(&order.address)
    .bind(&order.receipt)
    .bind(order.requires_approval)
    .bind(to_db(&order.approval_status)?)
    .bind(&order.id)
    .execute(conn)
    .await
    .map_err(|e| anyhow!("Failed to update order: {}", e))?;

    if result.rows_affected() == 0 {
        return Err(anyhow!("Order not found: {}", order.id));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// SqliteOrderStore
// ---------------------------------------------------------------------------

/// Order store backed by SQLite.
///
/// # Example
///
/// ```rust,ignore
/// use sqlx::sqlite::SqlitePool;
/// use rugops::storage::sqlite::{self, SqliteOrderStore};
///
/// let pool = SqlitePool::connect("sqlite://rugops.db?mode=rwc").await?;
/// sqlite::ensure_schema(&pool).await?;
/// let store = SqliteOrderStore::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Create a new `SqliteOrderStore` with the given connection pool.
    ///
    /// Call [`ensure_schema`] once before handing the pool over.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        sqlx::query(
            "INSERT INTO orders (id, client_name, phone, email, address, signature, receipt, \
                                 created_at, requires_approval, approval_status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.client_name)
        .bind(&order.phone)
        .bind(&order.email)
        .bind(&order.address)
        .bind(&order.signature)
        .bind(&order.receipt)
        .bind(order.created_at)
        .bind(order.requires_approval)
        .bind(to_db(&order.approval_status)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| anyhow!("Failed to create order: {}", e))?;

        for item in &order.items {
            insert_item(&mut tx, &order.id, item).await?;
        }

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

        Ok(order)
    }

    async fn get(&self, id: &str) -> Result<Option<Order>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| anyhow!("Failed to acquire connection: {}", e))?;

        fetch_order(&mut conn, id).await
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| anyhow!("Failed to acquire connection: {}", e))?;

        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, client_name, phone, email, address, signature, receipt, \
                    created_at, requires_approval, approval_status \
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| anyhow!("Failed to list orders: {}", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = fetch_items(&mut conn, &row.0).await?;
            orders.push(order_from_row(row, items)?);
        }

        Ok(orders)
    }

    async fn update_order(&self, id: &str, patch: &OrderPatch) -> Result<Order> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        let mut order = fetch_order(&mut tx, id)
            .await?
            .ok_or_else(|| EntityError::OrderNotFound { id: id.to_string() })?;

        workflow::apply_order_patch(&mut order, patch);
        write_order(&mut tx, &order).await?;

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

        Ok(order)
    }

    async fn update_item(&self, order_id: &str, item_id: &str, patch: &ItemPatch) -> Result<Item> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        let mut order = fetch_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| EntityError::OrderNotFound {
                id: order_id.to_string(),
            })?;

        let updated = workflow::apply_item_patch(&order, item_id, patch)?;
        write_item(&mut tx, order_id, &updated).await?;

        // apply_item_patch verified the item exists
        if let Some(item) = order.item_mut(item_id) {
            *item = updated.clone();
        }
        if workflow::escalate_approval(&mut order) {
            write_order(&mut tx, &order).await?;
        }

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

        Ok(updated)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        // items first: the FK cascade only fires when the pragma is enabled
        sqlx::query("DELETE FROM items")
            .execute(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to delete items: {}", e))?;
        sqlx::query("DELETE FROM orders")
            .execute(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to delete orders: {}", e))?;

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{ApprovalStatus, ItemStatus};

    async fn test_store() -> SqliteOrderStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteOrderStore::new(pool)
    }

    fn sample_order(id: &str, item_count: usize) -> Order {
        let items = (1..=item_count).map(|i| Item::new(i.to_string())).collect();
        Order::new(id, "Alice", "sig==", items)
    }

    #[tokio::test]
    async fn test_round_trip_preserves_wire_strings() {
        let store = test_store().await;
        let mut order = sample_order("ORD-001", 1);
        order.items[0].status = ItemStatus::ReadyForDelivery;
        store.create(order).await.unwrap();

        let fetched = store.get("ORD-001").await.unwrap().unwrap();
        assert_eq!(fetched.items[0].status, ItemStatus::ReadyForDelivery);
        assert_eq!(fetched.approval_status, ApprovalStatus::NotNeeded);
    }

    #[tokio::test]
    async fn test_update_item_escalates_in_same_transaction() {
        let store = test_store().await;
        let mut order = sample_order("ORD-001", 1);
        order.requires_approval = true;
        store.create(order).await.unwrap();

        let patch: ItemPatch = serde_json::from_str(
            r#"{"length": "3", "width": "2", "material": "Wool", "state": "Good"}"#,
        )
        .unwrap();
        let updated = store.update_item("ORD-001", "1", &patch).await.unwrap();
        assert_eq!(updated.status, ItemStatus::Measured);

        let after = store.get("ORD-001").await.unwrap().unwrap();
        assert_eq!(after.approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_delete_all_empties_both_tables() {
        let store = test_store().await;
        store.create(sample_order("ORD-001", 2)).await.unwrap();
        store.delete_all().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
