//! Macro-generated test suite for `OrderStore` contract validation.
//!
//! The `order_store_tests!` macro generates a test module that validates any
//! `OrderStore` implementation against the full contract: CRUD operations,
//! patch semantics, the approval workflow side effects, and concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use rugops::storage::InMemoryOrderStore;
//!
//! order_store_tests!(InMemoryOrderStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_create_and_get` — create then retrieve, verify all fields
//! - `test_get_nonexistent` — get with unknown id returns None
//! - `test_list_empty` — list on empty store returns empty vec
//! - `test_list_newest_first` — list is ordered by created_at descending
//! - `test_delete_all` — purge leaves an empty store
//!
//! ## Patch semantics
//! - `test_update_order_patches_supplied_fields` — only named fields change
//! - `test_update_order_nonexistent` — unknown order id is ORDER_NOT_FOUND
//! - `test_update_item_promotes_and_prices` — measurement promotes to
//!   measured and derives the cleaning cost
//! - `test_update_item_unknown_item` — unknown item id is ITEM_NOT_FOUND
//!
//! ## Workflow side effects
//! - `test_escalation_fires_on_last_measurement` — approval flips to pending
//!   only once every rug is measured
//! - `test_blocked_transition_persists_nothing` — a gated delivery attempt
//!   leaves the stored order untouched
//!
//! ## Concurrency
//! - `test_concurrent_creates` — parallel creates from spawned tasks

/// Generate a full `OrderStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to an instance
/// implementing `OrderStore`. It is re-evaluated for each test to ensure
/// isolation; `.await` inside the expression is fine. For the concurrent
/// access test, the returned store must also implement `Clone + 'static`.
#[macro_export]
macro_rules! order_store_tests {
    ($factory:expr) => {
        mod order_store_contract_tests {
            use super::*;
            use rugops::core::entity::{ApprovalStatus, ItemStatus};
            use rugops::core::error::RugOpsError;
            use rugops::core::patch::OrderPatch;
            use rugops::storage::OrderStore;

            // ==================================================================
            // CRUD — Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;
                let mut order = sample_order("ORD-001", "Alice", 2);
                order.items[1] = measured_item("2");

                let created = store.create(order).await.unwrap();
                assert_eq!(created.id, "ORD-001");

                let retrieved = store.get("ORD-001").await.unwrap();
                assert!(retrieved.is_some(), "order should exist after create");
                let retrieved = retrieved.unwrap();
                assert_eq!(retrieved.client_name, "Alice");
                assert_eq!(retrieved.signature, "c2lnbmF0dXJl");
                assert_eq!(retrieved.items.len(), 2);
                assert_eq!(retrieved.items[0].status, ItemStatus::Pending);
                assert_eq!(retrieved.items[1].status, ItemStatus::Measured);
                assert_eq!(retrieved.items[1].cleaning_cost, 120.0);
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                let result = store.get("ORD-404").await.unwrap();
                assert!(result.is_none(), "unknown id should return None");
            }

            #[tokio::test]
            async fn test_list_empty() {
                let store = $factory;
                let all = store.list().await.unwrap();
                assert!(all.is_empty(), "list on empty store should be empty");
            }

            #[tokio::test]
            async fn test_list_newest_first() {
                let store = $factory;
                store.create(aged_order("ORD-001", "Oldest", 2)).await.unwrap();
                store.create(aged_order("ORD-002", "Middle", 1)).await.unwrap();
                store.create(sample_order("ORD-003", "Newest", 1)).await.unwrap();

                let all = store.list().await.unwrap();
                let ids: Vec<&str> = all.iter().map(|o| o.id.as_str()).collect();
                assert_eq!(ids, vec!["ORD-003", "ORD-002", "ORD-001"]);
            }

            #[tokio::test]
            async fn test_delete_all() {
                let store = $factory;
                store.create(sample_order("ORD-001", "Alice", 1)).await.unwrap();
                store.create(sample_order("ORD-002", "Bob", 3)).await.unwrap();

                store.delete_all().await.unwrap();
                assert!(store.list().await.unwrap().is_empty());
                assert!(store.get("ORD-001").await.unwrap().is_none());
            }

            // ==================================================================
            // Patch semantics
            // ==================================================================

            #[tokio::test]
            async fn test_update_order_patches_supplied_fields() {
                let store = $factory;
                store.create(sample_order("ORD-001", "Alice", 1)).await.unwrap();

                let updated = store.update_order("ORD-001", &contact_patch()).await.unwrap();
                assert_eq!(updated.phone.as_deref(), Some("555-0100"));
                assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
                assert_eq!(updated.client_name, "Alice", "unnamed fields stay put");

                let persisted = store.get("ORD-001").await.unwrap().unwrap();
                assert_eq!(persisted.phone.as_deref(), Some("555-0100"));
            }

            #[tokio::test]
            async fn test_update_order_nonexistent() {
                let store = $factory;
                let err = store
                    .update_order("ORD-404", &OrderPatch::default())
                    .await
                    .unwrap_err();
                let domain: RugOpsError = err.into();
                assert_eq!(domain.error_code(), "ORDER_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_update_item_promotes_and_prices() {
                let store = $factory;
                store.create(sample_order("ORD-001", "Alice", 1)).await.unwrap();

                let updated = store
                    .update_item("ORD-001", "1", &measure_patch())
                    .await
                    .unwrap();
                assert_eq!(updated.status, ItemStatus::Measured);
                assert_eq!(updated.cleaning_cost, 120.0);

                let persisted = store.get("ORD-001").await.unwrap().unwrap();
                assert_eq!(persisted.items[0].status, ItemStatus::Measured);
                assert_eq!(persisted.items[0].cleaning_cost, 120.0);
            }

            #[tokio::test]
            async fn test_update_item_unknown_item() {
                let store = $factory;
                store.create(sample_order("ORD-001", "Alice", 1)).await.unwrap();

                let err = store
                    .update_item("ORD-001", "9", &measure_patch())
                    .await
                    .unwrap_err();
                let domain: RugOpsError = err.into();
                assert_eq!(domain.error_code(), "ITEM_NOT_FOUND");
            }

            // ==================================================================
            // Workflow side effects
            // ==================================================================

            #[tokio::test]
            async fn test_escalation_fires_on_last_measurement() {
                let store = $factory;
                let mut order = sample_order("ORD-001", "Alice", 2);
                order.requires_approval = true;
                store.create(order).await.unwrap();

                store.update_item("ORD-001", "1", &measure_patch()).await.unwrap();
                let partway = store.get("ORD-001").await.unwrap().unwrap();
                assert_eq!(
                    partway.approval_status,
                    ApprovalStatus::NotNeeded,
                    "one unmeasured rug left, no escalation yet"
                );

                store.update_item("ORD-001", "2", &measure_patch()).await.unwrap();
                let done = store.get("ORD-001").await.unwrap().unwrap();
                assert_eq!(done.approval_status, ApprovalStatus::Pending);
            }

            #[tokio::test]
            async fn test_blocked_transition_persists_nothing() {
                let store = $factory;
                let mut order = sample_order("ORD-001", "Alice", 1);
                order.requires_approval = true;
                order.approval_status = ApprovalStatus::Pending;
                order.items[0] = measured_item("1");
                store.create(order).await.unwrap();

                let err = store
                    .update_item("ORD-001", "1", &ready_patch())
                    .await
                    .unwrap_err();
                let domain: RugOpsError = err.into();
                assert_eq!(domain.error_code(), "APPROVAL_REQUIRED");

                let unchanged = store.get("ORD-001").await.unwrap().unwrap();
                assert_eq!(unchanged.items[0].status, ItemStatus::Measured);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let store = $factory;

                let mut handles = Vec::new();
                for i in 1..=10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        let order = sample_order(&format!("ORD-{:03}", i), "Client", 1);
                        store.create(order).await
                    }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let all = store.list().await.unwrap();
                assert_eq!(all.len(), 10, "all parallel creates should land");
            }
        }
    };
}
