//! Client-mirror command handlers: preview, simulation, mode control.

use std::sync::Arc;

use serde_json::Value;

use muse_mirror::{preview, DistributionMode};
use muse_split::{split, ShareTable};

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

fn require_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

/// Floating-point preview of a prospective distribution.
///
/// Display-only: the authoritative split is whatever
/// `distribute_revenue` commits.
pub async fn preview(state: &Arc<DaemonState>, params: &Value) -> Result {
    let project_id = require_str(params, "project_id")?;
    let total = params
        .get("amount")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| RpcError::invalid_params("amount required"))?;

    let ledger = state.ledger.lock().await;
    let project = ledger
        .get_project(project_id)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    let entries: Vec<(String, u8)> = project
        .contributors
        .into_iter()
        .zip(project.shares)
        .collect();
    let previews = preview::compute(total, &entries);

    let result: Vec<Value> = previews
        .iter()
        .map(|p| {
            serde_json::json!({
                "account": p.account,
                "percentage": p.percentage,
                "amount": p.amount,
            })
        })
        .collect();

    Ok(serde_json::json!({"project_id": project_id, "shares": result}))
}

/// Simulate a distribution in the mirror, never touching the ledger.
pub async fn simulate(state: &Arc<DaemonState>, params: &Value) -> Result {
    let project_id = require_str(params, "project_id")?;
    let amount = params
        .get("amount")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("amount required (micro-credits)"))?;

    let ledger = state.ledger.lock().await;
    let project = ledger
        .get_project(project_id)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    let table = ShareTable::new(project.contributors, project.shares)
        .map_err(|e| RpcError::internal_error(&e.to_string()))?;
    let outcome =
        split(amount, &table).map_err(|e| RpcError::invalid_params(&e.to_string()))?;

    let mut mirror = state.mirror.lock().await;
    let record = mirror.simulate_distribution(project_id, amount, &outcome.credits);
    drop(mirror);

    let receipts: Vec<Value> = record
        .receipts
        .iter()
        .map(|r| {
            serde_json::json!({
                "hash": r.hash,
                "to": r.to,
                "amount": r.amount,
                "network": r.network,
            })
        })
        .collect();

    Ok(serde_json::json!({
        "project_id": project_id,
        "mode": record.mode.as_str(),
        "total_amount": record.total_amount,
        "distributed_amount": record.distributed_amount,
        "receipts": receipts,
        "timestamp": record.timestamp,
    }))
}

/// The mirror's current distribution mode.
pub async fn get_mode(state: &Arc<DaemonState>) -> Result {
    let mirror = state.mirror.lock().await;
    Ok(serde_json::json!({"mode": mirror.mode().as_str()}))
}

/// Switch the distribution mode and persist the choice.
pub async fn set_mode(state: &Arc<DaemonState>, params: &Value) -> Result {
    let mode_str = require_str(params, "mode")?;
    let mode: DistributionMode = mode_str
        .parse()
        .map_err(|_| RpcError::unknown_mode(mode_str))?;

    let mut mirror = state.mirror.lock().await;
    mirror.set_mode(mode);
    drop(mirror);

    let mut ledger = state.ledger.lock().await;
    ledger
        .set_setting("distribution_mode", mode.as_str())
        .map_err(|e| RpcError::from_ledger(&e))?;

    Ok(serde_json::json!({"mode": mode.as_str()}))
}
