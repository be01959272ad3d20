//! Typed error handling for rugops
//!
//! Every failure surfaced by the service falls into one of a small set of
//! categories, each with its own enum so callers can match on specific
//! cases instead of unpacking a generic `anyhow::Error`:
//!
//! - [`EntityError`]: unknown order or item ids
//! - [`ValidationError`]: rejected input, caught before any store mutation
//! - [`WorkflowError`]: legal-transition rules refusing an operation
//! - [`StorageError`]: persistence-layer failures
//! - [`ConfigError`]: configuration loading failures
//!
//! Each error knows its HTTP status code and a stable machine-readable code;
//! `IntoResponse` renders the standard JSON error body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The top-level error type for rugops operations.
#[derive(Debug)]
pub enum RugOpsError {
    /// Unknown order/item lookups
    Entity(EntityError),

    /// Input rejected before any mutation
    Validation(ValidationError),

    /// A workflow rule refused the operation
    Workflow(WorkflowError),

    /// Persistence-layer failures
    Storage(StorageError),

    /// Configuration loading failures
    Config(ConfigError),

    /// Anything that should not happen in normal operation
    Internal(String),
}

impl fmt::Display for RugOpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RugOpsError::Entity(e) => write!(f, "{}", e),
            RugOpsError::Validation(e) => write!(f, "{}", e),
            RugOpsError::Workflow(e) => write!(f, "{}", e),
            RugOpsError::Storage(e) => write!(f, "{}", e),
            RugOpsError::Config(e) => write!(f, "{}", e),
            RugOpsError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RugOpsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RugOpsError::Entity(e) => Some(e),
            RugOpsError::Validation(e) => Some(e),
            RugOpsError::Workflow(e) => Some(e),
            RugOpsError::Storage(e) => Some(e),
            RugOpsError::Config(e) => Some(e),
            RugOpsError::Internal(_) => None,
        }
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RugOpsError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RugOpsError::Entity(_) => StatusCode::NOT_FOUND,
            RugOpsError::Validation(_) => StatusCode::BAD_REQUEST,
            RugOpsError::Workflow(_) => StatusCode::CONFLICT,
            RugOpsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RugOpsError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RugOpsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            RugOpsError::Entity(e) => e.error_code(),
            RugOpsError::Validation(_) => "VALIDATION_ERROR",
            RugOpsError::Workflow(e) => e.error_code(),
            RugOpsError::Storage(_) => "STORAGE_ERROR",
            RugOpsError::Config(_) => "CONFIG_ERROR",
            RugOpsError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to the standard error body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            RugOpsError::Entity(EntityError::OrderNotFound { id }) => {
                Some(serde_json::json!({ "orderId": id }))
            }
            RugOpsError::Entity(EntityError::ItemNotFound { order_id, item_id }) => {
                Some(serde_json::json!({ "orderId": order_id, "itemId": item_id }))
            }
            RugOpsError::Workflow(WorkflowError::ApprovalRequired { order_id, item_id }) => {
                Some(serde_json::json!({ "orderId": order_id, "itemId": item_id }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for RugOpsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity errors
// =============================================================================

/// Lookups against ids that do not exist.
#[derive(Debug)]
pub enum EntityError {
    OrderNotFound { id: String },
    ItemNotFound { order_id: String, item_id: String },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::OrderNotFound { id } => {
                write!(f, "Order '{}' not found", id)
            }
            EntityError::ItemNotFound { order_id, item_id } => {
                write!(f, "Item '{}' not found in order '{}'", item_id, order_id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::OrderNotFound { .. } => "ORDER_NOT_FOUND",
            EntityError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
        }
    }
}

impl From<EntityError> for RugOpsError {
    fn from(err: EntityError) -> Self {
        RugOpsError::Entity(err)
    }
}

// =============================================================================
// Validation errors
// =============================================================================

/// Input rejected before any store mutation.
#[derive(Debug)]
pub enum ValidationError {
    /// A required field is missing or empty
    MissingField { field: String },

    /// Order intake needs at least one rug
    NoItems,

    /// Repair cost and description must be set together
    RepairFieldsUnpaired { item_id: String },

    /// Malformed JSON payload
    InvalidJson { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "Missing required field '{}'", field)
            }
            ValidationError::NoItems => {
                write!(f, "An order must contain at least one item")
            }
            ValidationError::RepairFieldsUnpaired { item_id } => {
                write!(
                    f,
                    "Item '{}': repair cost and description must be provided together",
                    item_id
                )
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for RugOpsError {
    fn from(err: ValidationError) -> Self {
        RugOpsError::Validation(err)
    }
}

// =============================================================================
// Workflow errors
// =============================================================================

/// A legal-transition rule refused the operation. Nothing was persisted.
#[derive(Debug)]
pub enum WorkflowError {
    /// The parent order requires client approval before any rug may move to
    /// ready-for-delivery.
    ApprovalRequired { order_id: String, item_id: String },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::ApprovalRequired { order_id, item_id } => {
                write!(
                    f,
                    "Order '{}' requires client approval before item '{}' can be marked ready for delivery",
                    order_id, item_id
                )
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

impl WorkflowError {
    pub fn error_code(&self) -> &'static str {
        match self {
            WorkflowError::ApprovalRequired { .. } => "APPROVAL_REQUIRED",
        }
    }
}

impl From<WorkflowError> for RugOpsError {
    fn from(err: WorkflowError) -> Self {
        RugOpsError::Workflow(err)
    }
}

// =============================================================================
// Storage errors
// =============================================================================

/// Persistence-layer failures, surfaced generically to callers.
#[derive(Debug)]
pub enum StorageError {
    ConnectionError { backend: String, message: String },
    QueryError { backend: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for RugOpsError {
    fn from(err: StorageError) -> Self {
        RugOpsError::Storage(err)
    }
}

// =============================================================================
// Config errors
// =============================================================================

/// Configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    ParseError { file: Option<String>, message: String },
    FileNotFound { path: String },
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for RugOpsError {
    fn from(err: ConfigError) -> Self {
        RugOpsError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for RugOpsError {
    fn from(err: serde_json::Error) -> Self {
        RugOpsError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for RugOpsError {
    fn from(err: std::io::Error) -> Self {
        RugOpsError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for RugOpsError {
    fn from(err: serde_yaml::Error) -> Self {
        RugOpsError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Storage backends speak `anyhow::Result`; typed errors raised inside a
/// store (not-found lookups, gated transitions, rejected patches) are
/// recovered on the way back into the request path, anything else becomes a
/// generic storage failure.
impl From<anyhow::Error> for RugOpsError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<RugOpsError>() {
            Ok(e) => return e,
            Err(err) => err,
        };
        let err = match err.downcast::<EntityError>() {
            Ok(e) => return e.into(),
            Err(err) => err,
        };
        let err = match err.downcast::<WorkflowError>() {
            Ok(e) => return e.into(),
            Err(err) => err,
        };
        let err = match err.downcast::<ValidationError>() {
            Ok(e) => return e.into(),
            Err(err) => err,
        };
        RugOpsError::Storage(StorageError::QueryError {
            backend: "store".to_string(),
            message: err.to_string(),
        })
    }
}

/// A specialized Result type for rugops operations.
pub type RugOpsResult<T> = Result<T, RugOpsError>;
