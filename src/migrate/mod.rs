//! Bulk import of legacy JSON order snapshots
//!
//! The workshop's previous tooling exported orders as a single JSON array.
//! Field spellings drifted over its lifetime, so the importer tolerates the
//! known variants: `clientName` vs `name`, a nested `repairEstimate` object
//! vs flat repair fields, empty strings standing in for absent values, and
//! missing statuses.
//!
//! Import is per-record: an already-imported id is skipped, a malformed
//! record is collected into the error list and the batch continues. There is
//! no rollback.

use crate::core::entity::{ApprovalStatus, Condition, Item, ItemStatus, Material, Order};
use crate::core::error::{ConfigError, RugOpsError};
use crate::storage::OrderStore;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Outcome of one snapshot import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub migrated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOrder {
    id: String,
    client_name: Option<String>,
    /// Oldest exports used `name` for the client.
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    signature: Option<String>,
    receipt: Option<String>,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    requires_approval: bool,
    approval_status: Option<String>,
    #[serde(default)]
    items: Vec<SnapshotItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotItem {
    id: String,
    status: Option<String>,
    length: Option<String>,
    width: Option<String>,
    material: Option<String>,
    state: Option<String>,
    photo: Option<String>,
    cleaning_cost: Option<f64>,
    repair_cost: Option<f64>,
    repair_description: Option<String>,
    repair_estimate: Option<SnapshotRepairEstimate>,
}

#[derive(Debug, Deserialize)]
struct SnapshotRepairEstimate {
    cost: Option<f64>,
    description: Option<String>,
}

/// Treat empty strings the way the old exports meant them: not there.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse an enumerated wire string (`"Wool"`, `"ready_for_delivery"`, ...).
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unrecognized value '{}'", raw))
}

fn convert_item(snapshot: SnapshotItem) -> Result<Item, String> {
    let status = match non_empty(snapshot.status) {
        Some(raw) => parse_wire::<ItemStatus>(&raw).map_err(|e| format!("status: {}", e))?,
        None => ItemStatus::Pending,
    };
    let material = non_empty(snapshot.material)
        .map(|raw| parse_wire::<Material>(&raw).map_err(|e| format!("material: {}", e)))
        .transpose()?;
    let condition = non_empty(snapshot.state)
        .map(|raw| parse_wire::<Condition>(&raw).map_err(|e| format!("state: {}", e)))
        .transpose()?;

    // Flat fields win over the nested estimate; zero cost means "none".
    let (estimate_cost, estimate_description) = match snapshot.repair_estimate {
        Some(estimate) => (estimate.cost, estimate.description),
        None => (None, None),
    };
    let repair_cost = snapshot
        .repair_cost
        .or(estimate_cost)
        .filter(|cost| *cost != 0.0);
    let repair_description = match repair_cost {
        Some(_) => Some(
            non_empty(snapshot.repair_description)
                .or(non_empty(estimate_description))
                .unwrap_or_default(),
        ),
        None => None,
    };

    Ok(Item {
        id: snapshot.id,
        status,
        length: non_empty(snapshot.length),
        width: non_empty(snapshot.width),
        material,
        condition,
        photo: non_empty(snapshot.photo),
        cleaning_cost: snapshot.cleaning_cost.unwrap_or(0.0),
        repair_cost,
        repair_description,
    })
}

fn convert_order(snapshot: SnapshotOrder) -> Result<Order, String> {
    let approval_status = match non_empty(snapshot.approval_status) {
        Some(raw) => {
            parse_wire::<ApprovalStatus>(&raw).map_err(|e| format!("approvalStatus: {}", e))?
        }
        None => ApprovalStatus::NotNeeded,
    };
    let items = snapshot
        .items
        .into_iter()
        .map(convert_item)
        .collect::<Result<Vec<Item>, String>>()?;

    Ok(Order {
        id: snapshot.id,
        client_name: non_empty(snapshot.client_name)
            .or(non_empty(snapshot.name))
            .unwrap_or_else(|| "Unknown Client".to_string()),
        phone: non_empty(snapshot.phone),
        email: non_empty(snapshot.email),
        address: non_empty(snapshot.address),
        signature: non_empty(snapshot.signature).unwrap_or_default(),
        receipt: non_empty(snapshot.receipt),
        created_at: snapshot.created_at.unwrap_or_else(Utc::now),
        requires_approval: snapshot.requires_approval,
        approval_status,
        items,
    })
}

/// Import a snapshot file into the store.
///
/// Fails outright only when the file cannot be read or is not a JSON array;
/// everything else is a per-record outcome in the summary.
pub async fn import_snapshot(
    store: &dyn OrderStore,
    path: &Path,
) -> Result<MigrationSummary, RugOpsError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        RugOpsError::from(match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })
    })?;

    let records: Vec<serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;

    tracing::info!(count = records.len(), path = %path.display(), "starting snapshot import");

    let mut summary = MigrationSummary {
        migrated: 0,
        skipped: 0,
        errors: Vec::new(),
    };

    for (index, record) in records.into_iter().enumerate() {
        let label = record
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("record {}", index));

        let snapshot: SnapshotOrder = match serde_json::from_value(record) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                summary.errors.push(format!("{}: {}", label, e));
                continue;
            }
        };

        let order = match convert_order(snapshot) {
            Ok(order) => order,
            Err(e) => {
                summary.errors.push(format!("{}: {}", label, e));
                continue;
            }
        };

        match store.get(&order.id).await {
            Ok(Some(_)) => {
                summary.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                summary.errors.push(format!("{}: {}", label, e));
                continue;
            }
        }

        match store.create(order).await {
            Ok(_) => summary.migrated += 1,
            Err(e) => summary.errors.push(format!("{}: {}", label, e)),
        }
    }

    tracing::info!(
        migrated = summary.migrated,
        skipped = summary.skipped,
        failed = summary.errors.len(),
        "snapshot import finished"
    );

    Ok(summary)
}
