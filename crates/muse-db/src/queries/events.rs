//! Append-only event feed query functions.

use rusqlite::Connection;

use muse_types::events::{DistributionEvent, WithdrawalEvent};
use muse_types::Amount;

use crate::Result;

/// Append a distribution event. Returns the assigned sequence number.
pub fn record_distribution(
    conn: &Connection,
    project_id: &str,
    amount: Amount,
    credited: Amount,
    timestamp: u64,
) -> Result<u64> {
    conn.execute(
        "INSERT INTO distribution_events (project_id, amount, credited, timestamp)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            project_id,
            amount as i64,
            credited as i64,
            timestamp as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid() as u64)
}

/// Append a withdrawal event. Returns the assigned sequence number.
pub fn record_withdrawal(
    conn: &Connection,
    account: &str,
    amount: Amount,
    receipt_hash: &str,
    timestamp: u64,
) -> Result<u64> {
    conn.execute(
        "INSERT INTO withdrawal_events (account, amount, receipt_hash, timestamp)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![account, amount as i64, receipt_hash, timestamp as i64],
    )?;
    Ok(conn.last_insert_rowid() as u64)
}

/// Most recent distribution events, newest first.
pub fn recent_distributions(conn: &Connection, limit: u32) -> Result<Vec<DistributionEvent>> {
    let mut stmt = conn.prepare(
        "SELECT seq, project_id, amount, credited, timestamp
         FROM distribution_events ORDER BY seq DESC LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(DistributionEvent {
                seq: row.get::<_, i64>(0)? as u64,
                project_id: row.get(1)?,
                amount: row.get::<_, i64>(2)? as u64,
                credited: row.get::<_, i64>(3)? as u64,
                timestamp: row.get::<_, i64>(4)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Distribution events for one project, newest first.
pub fn project_distributions(
    conn: &Connection,
    project_id: &str,
    limit: u32,
) -> Result<Vec<DistributionEvent>> {
    let mut stmt = conn.prepare(
        "SELECT seq, project_id, amount, credited, timestamp
         FROM distribution_events WHERE project_id = ?1
         ORDER BY seq DESC LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![project_id, limit], |row| {
            Ok(DistributionEvent {
                seq: row.get::<_, i64>(0)? as u64,
                project_id: row.get(1)?,
                amount: row.get::<_, i64>(2)? as u64,
                credited: row.get::<_, i64>(3)? as u64,
                timestamp: row.get::<_, i64>(4)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Most recent withdrawal events, newest first.
pub fn recent_withdrawals(conn: &Connection, limit: u32) -> Result<Vec<WithdrawalEvent>> {
    let mut stmt = conn.prepare(
        "SELECT seq, account, amount, receipt_hash, timestamp
         FROM withdrawal_events ORDER BY seq DESC LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(WithdrawalEvent {
                seq: row.get::<_, i64>(0)? as u64,
                account: row.get(1)?,
                amount: row.get::<_, i64>(2)? as u64,
                receipt_hash: row.get(3)?,
                timestamp: row.get::<_, i64>(4)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::projects;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        projects::insert(&conn, "p1", "First", 1000).expect("insert project");
        conn
    }

    #[test]
    fn test_record_and_read_distributions() {
        let conn = test_db();
        record_distribution(&conn, "p1", 100, 99, 2000).expect("record");
        record_distribution(&conn, "p1", 50, 50, 2001).expect("record");

        let events = recent_distributions(&conn, 10).expect("read");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].amount, 50); // Newest first
        assert_eq!(events[1].credited, 99);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let conn = test_db();
        let first = record_distribution(&conn, "p1", 100, 100, 2000).expect("record");
        let second = record_distribution(&conn, "p1", 100, 100, 2001).expect("record");
        assert!(second > first);
    }

    #[test]
    fn test_project_filter() {
        let conn = test_db();
        projects::insert(&conn, "p2", "Second", 1001).expect("insert project");
        record_distribution(&conn, "p1", 100, 100, 2000).expect("record");
        record_distribution(&conn, "p2", 200, 200, 2001).expect("record");

        let events = project_distributions(&conn, "p2", 10).expect("read");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].amount, 200);
    }

    #[test]
    fn test_withdrawals() {
        let conn = test_db();
        record_withdrawal(&conn, "alice", 70, "0xabc", 3000).expect("record");

        let events = recent_withdrawals(&conn, 10).expect("read");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].account, "alice");
        assert_eq!(events[0].receipt_hash, "0xabc");
    }
}
