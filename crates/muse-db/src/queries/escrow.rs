//! Escrow balance query functions.

use rusqlite::Connection;

use muse_types::Amount;

use crate::Result;

/// Accumulated un-withdrawn balance for an account. Zero if never credited.
pub fn balance(conn: &Connection, account: &str) -> Result<Amount> {
    let balance: i64 = conn.query_row(
        "SELECT COALESCE(
            (SELECT balance FROM escrow_balances WHERE account = ?1), 0)",
        [account],
        |row| row.get(0),
    )?;
    Ok(balance as u64)
}

/// Credit an account's escrow balance.
pub fn credit(conn: &Connection, account: &str, amount: Amount) -> Result<()> {
    conn.execute(
        "INSERT INTO escrow_balances (account, balance) VALUES (?1, ?2)
         ON CONFLICT(account) DO UPDATE SET balance = balance + ?2",
        rusqlite::params![account, amount as i64],
    )?;
    Ok(())
}

/// Zero an account's balance, returning what it held.
pub fn clear(conn: &Connection, account: &str) -> Result<Amount> {
    let held = balance(conn, account)?;
    if held > 0 {
        conn.execute(
            "UPDATE escrow_balances SET balance = 0 WHERE account = ?1",
            [account],
        )?;
    }
    Ok(held)
}

/// Sum of all escrow balances.
pub fn total_held(conn: &Connection) -> Result<Amount> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(balance), 0) FROM escrow_balances",
        [],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}
