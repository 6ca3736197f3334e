//! Project registry command handlers.

use std::sync::Arc;

use serde_json::Value;

use muse_types::project::Project;

use crate::events::Event;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

fn require_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

fn share_lists(params: &Value) -> std::result::Result<(Vec<String>, Vec<u8>), RpcError> {
    let contributors = params
        .get("contributors")
        .and_then(|v| v.as_array())
        .ok_or_else(|| RpcError::invalid_params("contributors required"))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| RpcError::invalid_params("contributors must be strings"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let shares = params
        .get("shares")
        .and_then(|v| v.as_array())
        .ok_or_else(|| RpcError::invalid_params("shares required"))?
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| RpcError::invalid_params("shares must be integers 0-100"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((contributors, shares))
}

fn project_json(project: &Project) -> Value {
    serde_json::json!({
        "project_id": project.project_id,
        "name": project.name,
        "contributors": project.contributors,
        "shares": project.shares,
        "total_distributed": project.total_distributed,
        "is_active": project.is_active,
        "created_at": project.created_at,
    })
}

/// Register a new project.
pub async fn register(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = require_str(params, "caller")?;
    let project_id = require_str(params, "project_id")?;
    let name = require_str(params, "name")?;
    let (contributors, shares) = share_lists(params)?;

    let mut ledger = state.ledger.lock().await;
    let project = ledger
        .register_project(caller, project_id, name, contributors, shares)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    state.event_bus.emit(Event::now(
        "ProjectRegistered",
        serde_json::json!({"project_id": project_id}),
    ));

    Ok(project_json(&project))
}

/// Replace a project's contributor listing.
pub async fn update(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = require_str(params, "caller")?;
    let project_id = require_str(params, "project_id")?;
    let (contributors, shares) = share_lists(params)?;

    let mut ledger = state.ledger.lock().await;
    let project = ledger
        .update_project(caller, project_id, contributors, shares)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    state.event_bus.emit(Event::now(
        "ProjectUpdated",
        serde_json::json!({"project_id": project_id}),
    ));

    Ok(project_json(&project))
}

/// Deactivate a project.
pub async fn deactivate(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = require_str(params, "caller")?;
    let project_id = require_str(params, "project_id")?;

    let mut ledger = state.ledger.lock().await;
    ledger
        .deactivate_project(caller, project_id)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    state.event_bus.emit(Event::now(
        "ProjectDeactivated",
        serde_json::json!({"project_id": project_id}),
    ));

    Ok(serde_json::json!({"project_id": project_id, "is_active": false}))
}

/// Load one project.
pub async fn get(state: &Arc<DaemonState>, params: &Value) -> Result {
    let project_id = require_str(params, "project_id")?;

    let ledger = state.ledger.lock().await;
    let project = ledger
        .get_project(project_id)
        .map_err(|e| RpcError::from_ledger(&e))?;

    Ok(project_json(&project))
}

/// All registered project ids.
pub async fn ids(state: &Arc<DaemonState>) -> Result {
    let ledger = state.ledger.lock().await;
    let ids = ledger.project_ids().map_err(|e| RpcError::from_ledger(&e))?;
    Ok(serde_json::json!(ids))
}

/// Whether a project accepts distributions.
pub async fn is_active(state: &Arc<DaemonState>, params: &Value) -> Result {
    let project_id = require_str(params, "project_id")?;

    let ledger = state.ledger.lock().await;
    let active = ledger
        .is_project_active(project_id)
        .map_err(|e| RpcError::from_ledger(&e))?;

    Ok(serde_json::json!({"project_id": project_id, "is_active": active}))
}
