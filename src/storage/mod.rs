//! Storage backends for orders
//!
//! The store owns persistence and the read-modify-write cycle: patch
//! application and the approval-escalation cascade run inside the backend's
//! own unit of atomicity (a lock for the in-memory store, a transaction for
//! sqlite), so the workflow rules in [`crate::core::workflow`] never observe
//! a half-written order.

use crate::core::entity::{Item, Order};
use crate::core::patch::{ItemPatch, OrderPatch};
use anyhow::Result;
use async_trait::async_trait;

pub mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryOrderStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteOrderStore;

/// Persistence contract for orders and their items.
///
/// Implementations are storage-mechanism agnostic from the caller's point of
/// view. Domain failures (unknown ids, blocked transitions, unpaired repair
/// fields) travel inside the `anyhow::Error` as typed errors from
/// [`crate::core::error`] and are recovered at the HTTP boundary.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order together with its items.
    ///
    /// The caller assigns the id (see
    /// [`crate::core::workflow::next_order_id`]).
    async fn create(&self, order: Order) -> Result<Order>;

    /// Fetch one order with its items.
    async fn get(&self, id: &str) -> Result<Option<Order>>;

    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Apply an order-level patch and return the updated order.
    ///
    /// Toggle and approval-decision rules from
    /// [`crate::core::workflow::apply_order_patch`] are applied atomically.
    async fn update_order(&self, id: &str, patch: &OrderPatch) -> Result<Order>;

    /// Apply an item-level patch and return the updated item.
    ///
    /// Runs the full item update cycle atomically: merge and validate the
    /// patch, reprice, then re-check the parent order for approval
    /// escalation.
    async fn update_item(&self, order_id: &str, item_id: &str, patch: &ItemPatch) -> Result<Item>;

    /// Administrative purge: delete every order and item.
    async fn delete_all(&self) -> Result<()>;
}
