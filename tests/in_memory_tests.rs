//! Integration tests for InMemoryOrderStore using the storage test harness.
//!
//! This file invokes `order_store_tests!` to validate that InMemoryOrderStore
//! fully conforms to the OrderStore contract.

#[macro_use]
mod storage_harness;

use rugops::storage::InMemoryOrderStore;
use storage_harness::*;

order_store_tests!(InMemoryOrderStore::new());
