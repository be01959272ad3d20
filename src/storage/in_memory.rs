//! In-memory implementation of OrderStore for testing and development

use crate::core::entity::{Item, Order};
use crate::core::error::EntityError;
use crate::core::patch::{ItemPatch, OrderPatch};
use crate::core::workflow;
use crate::storage::OrderStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory order store.
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// each update runs under one write-lock acquisition, so patch application
/// and approval escalation are atomic with respect to other requests.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        orders.insert(order.id.clone(), order.clone());

        Ok(order)
    }

    async fn get(&self, id: &str) -> Result<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(orders.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(all)
    }

    async fn update_order(&self, id: &str, patch: &OrderPatch) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let order = orders
            .get_mut(id)
            .ok_or_else(|| EntityError::OrderNotFound { id: id.to_string() })?;

        workflow::apply_order_patch(order, patch);

        Ok(order.clone())
    }

    async fn update_item(&self, order_id: &str, item_id: &str, patch: &ItemPatch) -> Result<Item> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let order = orders.get_mut(order_id).ok_or_else(|| EntityError::OrderNotFound {
            id: order_id.to_string(),
        })?;

        let updated = workflow::apply_item_patch(order, item_id, patch)?;

        // apply_item_patch verified the item exists
        if let Some(item) = order.item_mut(item_id) {
            *item = updated.clone();
        }
        workflow::escalate_approval(order);

        Ok(updated)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        orders.clear();

        Ok(())
    }
}
