//! Core module: the data model and the pure workflow rules built on it

pub mod entity;
pub mod error;
pub mod patch;
pub mod pricing;
pub mod workflow;

pub use entity::{ApprovalStatus, Condition, Item, ItemStatus, Material, Order};
pub use error::{
    ConfigError, EntityError, ErrorResponse, RugOpsError, RugOpsResult, StorageError,
    ValidationError, WorkflowError,
};
pub use patch::{ItemPatch, OrderPatch};
pub use pricing::OrderTotals;
