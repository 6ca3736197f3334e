//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC 2.0 method calls to the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use muse_ledger::LedgerError;

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC success response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self {
            code: -32600,
            message: "INVALID_REQUEST".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    // Domain errors

    /// Project not found (-32020).
    pub fn project_not_found(project_id: &str) -> Self {
        Self {
            code: -32020,
            message: "PROJECT_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"project_id": project_id})),
        }
    }

    /// Duplicate project (-32021).
    pub fn duplicate_project(project_id: &str) -> Self {
        Self {
            code: -32021,
            message: "DUPLICATE_PROJECT".to_string(),
            data: Some(serde_json::json!({"project_id": project_id})),
        }
    }

    /// Invalid shares (-32022).
    pub fn invalid_shares(detail: &str) -> Self {
        Self {
            code: -32022,
            message: "INVALID_SHARES".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Project inactive (-32023).
    pub fn project_inactive(project_id: &str) -> Self {
        Self {
            code: -32023,
            message: "PROJECT_INACTIVE".to_string(),
            data: Some(serde_json::json!({"project_id": project_id})),
        }
    }

    /// Nothing to withdraw (-32024).
    pub fn nothing_to_withdraw(account: &str) -> Self {
        Self {
            code: -32024,
            message: "NOTHING_TO_WITHDRAW".to_string(),
            data: Some(serde_json::json!({"account": account})),
        }
    }

    /// Unauthorized (-32025).
    pub fn unauthorized(account: &str) -> Self {
        Self {
            code: -32025,
            message: "UNAUTHORIZED".to_string(),
            data: Some(serde_json::json!({"account": account})),
        }
    }

    /// Zero amount (-32026).
    pub fn zero_amount() -> Self {
        Self {
            code: -32026,
            message: "ZERO_AMOUNT".to_string(),
            data: None,
        }
    }

    /// Transfer failed (-32027).
    pub fn transfer_failed(detail: &str) -> Self {
        Self {
            code: -32027,
            message: "TRANSFER_FAILED".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Unknown distribution mode (-32030).
    pub fn unknown_mode(mode: &str) -> Self {
        Self {
            code: -32030,
            message: "UNKNOWN_MODE".to_string(),
            data: Some(serde_json::json!({"mode": mode})),
        }
    }

    /// Map a ledger error onto its RPC error, carrying the reason verbatim.
    pub fn from_ledger(e: &LedgerError) -> Self {
        match e {
            LedgerError::ProjectNotFound(id) => Self::project_not_found(id),
            LedgerError::DuplicateProject(id) => Self::duplicate_project(id),
            LedgerError::InvalidShares(_) => Self::invalid_shares(&e.to_string()),
            LedgerError::ProjectInactive(id) => Self::project_inactive(id),
            LedgerError::NothingToWithdraw(account) => Self::nothing_to_withdraw(account),
            LedgerError::Unauthorized(account) => Self::unauthorized(account),
            LedgerError::ZeroAmount => Self::zero_amount(),
            LedgerError::Overflow => Self::invalid_params(&e.to_string()),
            LedgerError::Transfer(detail) => Self::transfer_failed(detail),
            LedgerError::Db(_) => Self::internal_error(&e.to_string()),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(state.clone(), request).await,
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
pub async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();

    if request.jsonrpc != "2.0" {
        return RpcResponse::error(id, RpcError::invalid_request());
    }

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Registry commands
        "register_project" => commands::projects::register(&state, &request.params).await,
        "update_project" => commands::projects::update(&state, &request.params).await,
        "deactivate_project" => commands::projects::deactivate(&state, &request.params).await,
        "get_project" => commands::projects::get(&state, &request.params).await,
        "get_project_ids" => commands::projects::ids(&state).await,
        "is_project_active" => commands::projects::is_active(&state, &request.params).await,

        // Distribution commands
        "distribute_revenue" => commands::revenue::distribute(&state, &request.params).await,
        "get_contributor_balance" => commands::revenue::balance(&state, &request.params).await,
        "get_contributor_share" => commands::revenue::share(&state, &request.params).await,
        "withdraw_balance" => commands::revenue::withdraw(&state, &request.params).await,
        "get_distribution_history" => commands::revenue::history(&state, &request.params).await,
        "get_withdrawal_history" => {
            commands::revenue::withdrawal_history(&state, &request.params).await
        }

        // Mirror commands
        "preview_distribution" => commands::preview::preview(&state, &request.params).await,
        "simulate_distribution" => commands::preview::simulate(&state, &request.params).await,
        "get_distribution_mode" => commands::preview::get_mode(&state).await,
        "set_distribution_mode" => commands::preview::set_mode(&state, &request.params).await,

        // Daemon commands
        "get_status" => commands::status::get_status(&state).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(error) => RpcResponse::error(id, error),
    }
}
