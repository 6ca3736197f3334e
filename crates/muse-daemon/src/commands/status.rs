//! Daemon status command handlers.

use std::sync::Arc;

use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Daemon status summary.
pub async fn get_status(state: &Arc<DaemonState>) -> Result {
    let ledger = state.ledger.lock().await;
    let project_count = ledger
        .project_ids()
        .map_err(|e| RpcError::from_ledger(&e))?
        .len();
    let escrow_held = ledger
        .total_escrow_held()
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    let mode = state.mirror.lock().await.mode();

    Ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at,
        "project_count": project_count,
        "escrow_held": escrow_held,
        "distribution_mode": mode.as_str(),
        "event_sequence": state.event_bus.sequence(),
    }))
}
