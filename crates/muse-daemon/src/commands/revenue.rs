//! Revenue distribution and escrow command handlers.

use std::sync::Arc;

use serde_json::Value;

use muse_mirror::SimulatedTreasury;

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

fn require_amount(params: &Value) -> std::result::Result<u64, RpcError> {
    params
        .get("amount")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("amount required (micro-credits)"))
}

fn limit(params: &Value) -> u32 {
    params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(20)
}

/// Split an inbound payment across a project's contributors.
pub async fn distribute(state: &Arc<DaemonState>, params: &Value) -> Result {
    let project_id = require_str(params, "project_id")?;
    let amount = require_amount(params)?;

    let mut ledger = state.ledger.lock().await;
    let distribution = ledger
        .distribute_revenue(project_id, amount)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    state.event_bus.emit(Event::now(
        "RevenueDistributed",
        serde_json::json!({
            "project_id": project_id,
            "amount": amount,
            "credited": distribution.event.credited,
        }),
    ));

    let credits: Vec<Value> = distribution
        .credits
        .iter()
        .map(|(account, cut)| serde_json::json!({"account": account, "amount": cut}))
        .collect();

    Ok(serde_json::json!({
        "seq": distribution.event.seq,
        "project_id": project_id,
        "amount": amount,
        "credited": distribution.event.credited,
        "rounding_loss": distribution.rounding_loss,
        "credits": credits,
        "timestamp": distribution.event.timestamp,
    }))
}

/// Accumulated un-withdrawn balance for an account.
pub async fn balance(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account = require_str(params, "account")?;

    let ledger = state.ledger.lock().await;
    let balance = ledger
        .contributor_balance(account)
        .map_err(|e| RpcError::from_ledger(&e))?;

    Ok(serde_json::json!({"account": account, "balance": balance}))
}

/// A contributor's percentage in a project.
pub async fn share(state: &Arc<DaemonState>, params: &Value) -> Result {
    let project_id = require_str(params, "project_id")?;
    let account = require_str(params, "account")?;

    let ledger = state.ledger.lock().await;
    let share = ledger
        .contributor_share(project_id, account)
        .map_err(|e| RpcError::from_ledger(&e))?;

    Ok(serde_json::json!({
        "project_id": project_id,
        "account": account,
        "share": share,
    }))
}

/// Pay out the caller's full escrow balance.
pub async fn withdraw(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = require_str(params, "caller")?;

    let mode = state.mirror.lock().await.mode();
    let treasury = SimulatedTreasury::new(mode);

    let mut ledger = state.ledger.lock().await;
    let withdrawal = ledger
        .withdraw(caller, &treasury)
        .map_err(|e| RpcError::from_ledger(&e))?;
    drop(ledger);

    state.event_bus.emit(Event::now(
        "ContributorPaid",
        serde_json::json!({
            "account": caller,
            "amount": withdrawal.event.amount,
        }),
    ));

    Ok(serde_json::json!({
        "account": caller,
        "amount": withdrawal.event.amount,
        "receipt": {
            "hash": withdrawal.receipt.hash,
            "network": withdrawal.receipt.network,
            "status": "confirmed",
        },
        "timestamp": withdrawal.event.timestamp,
    }))
}

/// Most recent distribution events, newest first.
pub async fn history(state: &Arc<DaemonState>, params: &Value) -> Result {
    let ledger = state.ledger.lock().await;
    let events = ledger
        .recent_distributions(limit(params))
        .map_err(|e| RpcError::from_ledger(&e))?;

    let result: Vec<Value> = events
        .iter()
        .map(|e| {
            serde_json::json!({
                "seq": e.seq,
                "project_id": e.project_id,
                "amount": e.amount,
                "credited": e.credited,
                "timestamp": e.timestamp,
            })
        })
        .collect();

    Ok(serde_json::json!(result))
}

/// Most recent withdrawal events, newest first.
pub async fn withdrawal_history(state: &Arc<DaemonState>, params: &Value) -> Result {
    let ledger = state.ledger.lock().await;
    let events = ledger
        .recent_withdrawals(limit(params))
        .map_err(|e| RpcError::from_ledger(&e))?;

    let result: Vec<Value> = events
        .iter()
        .map(|e| {
            serde_json::json!({
                "seq": e.seq,
                "account": e.account,
                "amount": e.amount,
                "receipt_hash": e.receipt_hash,
                "timestamp": e.timestamp,
            })
        })
        .collect();

    Ok(serde_json::json!(result))
}
