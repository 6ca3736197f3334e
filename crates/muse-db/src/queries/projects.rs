//! Project and contributor-share query functions.

use rusqlite::Connection;

use muse_types::project::Project;
use muse_types::{Amount, ProjectId};

use crate::{DbError, Result};

/// Insert a new project row. Fails on duplicate id.
pub fn insert(
    conn: &Connection,
    project_id: &str,
    name: &str,
    created_at: u64,
) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO projects (project_id, name, total_distributed, is_active, created_at)
         VALUES (?1, ?2, 0, 1, ?3)",
        rusqlite::params![project_id, name, created_at as i64],
    )?;
    if inserted == 0 {
        return Err(DbError::Constraint(format!(
            "project already exists: {project_id}"
        )));
    }
    Ok(())
}

/// Whether a project row exists.
pub fn exists(conn: &Connection, project_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE project_id = ?1",
        [project_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Load a full project record including its contributor listing.
pub fn get(conn: &Connection, project_id: &str) -> Result<Project> {
    let (name, total_distributed, is_active, created_at) = conn
        .query_row(
            "SELECT name, total_distributed, is_active, created_at
             FROM projects WHERE project_id = ?1",
            [project_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as u64,
                    row.get::<_, i64>(2)? != 0,
                    row.get::<_, i64>(3)? as u64,
                ))
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("project not found: {project_id}"))
            }
            other => DbError::Sqlite(other),
        })?;

    let mut stmt = conn.prepare(
        "SELECT account, share_pct FROM project_contributors
         WHERE project_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map([project_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u8))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (contributors, shares) = rows.into_iter().unzip();

    Ok(Project {
        project_id: project_id.to_string(),
        name,
        contributors,
        shares,
        total_distributed,
        is_active,
        created_at,
    })
}

/// Replace a project's contributor listing.
///
/// The caller is expected to run this inside a transaction together with
/// the validation that produced the new listing.
pub fn replace_contributors(
    conn: &Connection,
    project_id: &str,
    entries: &[(String, u8)],
) -> Result<()> {
    conn.execute(
        "DELETE FROM project_contributors WHERE project_id = ?1",
        [project_id],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO project_contributors (project_id, position, account, share_pct)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, (account, share)) in entries.iter().enumerate() {
        stmt.execute(rusqlite::params![
            project_id,
            position as i64,
            account,
            i64::from(*share),
        ])?;
    }
    Ok(())
}

/// Whether a project is active. `NotFound` if the project is absent.
pub fn is_active(conn: &Connection, project_id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT is_active FROM projects WHERE project_id = ?1",
        [project_id],
        |row| Ok(row.get::<_, i64>(0)? != 0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            DbError::NotFound(format!("project not found: {project_id}"))
        }
        other => DbError::Sqlite(other),
    })
}

/// Mark a project inactive. No-op if already inactive.
pub fn deactivate(conn: &Connection, project_id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE projects SET is_active = 0 WHERE project_id = ?1",
        [project_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!(
            "project not found: {project_id}"
        )));
    }
    Ok(())
}

/// Add to a project's lifetime distributed total.
pub fn add_distributed(conn: &Connection, project_id: &str, amount: Amount) -> Result<()> {
    let updated = conn.execute(
        "UPDATE projects SET total_distributed = total_distributed + ?1
         WHERE project_id = ?2",
        rusqlite::params![amount as i64, project_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!(
            "project not found: {project_id}"
        )));
    }
    Ok(())
}

/// All registered project ids, oldest first.
pub fn all_ids(conn: &Connection) -> Result<Vec<ProjectId>> {
    let mut stmt =
        conn.prepare("SELECT project_id FROM projects ORDER BY created_at, project_id")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}
