//! SQL schema definitions.

/// Complete schema for Muse v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Projects & contributor shares
-- ============================================================

CREATE TABLE IF NOT EXISTS projects (
    project_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    total_distributed INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS project_contributors (
    project_id TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    account TEXT NOT NULL,
    share_pct INTEGER NOT NULL,
    PRIMARY KEY (project_id, position),
    UNIQUE (project_id, account)
);

CREATE INDEX IF NOT EXISTS idx_contributors_account ON project_contributors(account);

-- ============================================================
-- Escrow balances
-- ============================================================

CREATE TABLE IF NOT EXISTS escrow_balances (
    account TEXT PRIMARY KEY,
    balance INTEGER NOT NULL DEFAULT 0
);

-- ============================================================
-- Append-only event feeds
-- ============================================================

CREATE TABLE IF NOT EXISTS distribution_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL REFERENCES projects(project_id),
    amount INTEGER NOT NULL,
    credited INTEGER NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_distribution_project ON distribution_events(project_id);

CREATE TABLE IF NOT EXISTS withdrawal_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    account TEXT NOT NULL,
    amount INTEGER NOT NULL,
    receipt_hash TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_withdrawal_account ON withdrawal_events(account);

-- ============================================================
-- Daemon settings
-- ============================================================

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
