//! # RugOps
//!
//! Operations tracking for a carpet-cleaning workshop, exposed as a RESTful API in Rust.
//!
//! ## Features
//!
//! - **Order Intake**: Register client orders with per-rug items and a captured signature
//! - **Workflow Engine**: Pure transition rules for measurement, pricing, repair and delivery
//! - **Approval Gate**: Orders flagged for approval block delivery until the client decides
//! - **Automatic Pricing**: Cleaning cost derived from measured area and material rates
//! - **Delivery Planning**: Readiness reporting and visit-sequence ordering
//! - **Legacy Import**: Tolerant bulk migration of old JSON order snapshots
//! - **Pluggable Storage**: In-memory store for development, SQLite behind a feature flag
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rugops::server::ServerBuilder;
//! use rugops::storage::InMemoryOrderStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ServerBuilder::new()
//!         .with_store(InMemoryOrderStore::new())
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod migrate;
pub mod server;
pub mod storage;

/// Commonly used types, re-exported for convenience
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::entity::{ApprovalStatus, Condition, Item, ItemStatus, Material, Order};
    pub use crate::core::error::{RugOpsError, RugOpsResult};
    pub use crate::core::patch::{ItemPatch, OrderPatch};
    pub use crate::server::ServerBuilder;
    pub use crate::storage::{InMemoryOrderStore, OrderStore};
}
