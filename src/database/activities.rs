use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::ActivityId;
use crate::activity::{Activity, NewActivity};

const ACTIVITY_COLUMNS: &str = "id, type, title, description, icon, color, metadata, related_player_id, related_match_id, related_tournament_id, created_at";

pub fn insert_activity(conn: &mut DbConn, draft: &NewActivity, created_at: DateTime<Utc>) -> Result<Activity> {
    let metadata = serde_json::to_string(&draft.metadata).context("Failed to serialize activity metadata")?;
    let sql = format!(
        "INSERT INTO activities (type, title, description, icon, color, metadata, related_player_id, related_match_id, related_tournament_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) RETURNING {ACTIVITY_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            draft.activity_type.as_str(),
            draft.title,
            draft.description,
            draft.icon,
            draft.color.as_str(),
            metadata,
            draft.related_player_id,
            draft.related_match_id,
            draft.related_tournament_id,
            created_at
        ],
        parse_activity_row,
    )
    .context("Failed to insert activity")
}

fn parse_activity_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
    let activity_type: String = row.get(1)?;
    let color: String = row.get(5)?;
    let metadata: String = row.get(6)?;

    Ok(Activity {
        id: row.get(0)?,
        activity_type: activity_type.parse().map_err(|e| conversion_error(1, e))?,
        title: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
        color: color.parse().map_err(|e| conversion_error(5, e))?,
        metadata: serde_json::from_str(&metadata).map_err(|e| conversion_error(6, e.into()))?,
        related_player_id: row.get(7)?,
        related_match_id: row.get(8)?,
        related_tournament_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn conversion_error(column: usize, error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, error.into())
}

fn query_activities(conn: &mut DbConn, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Activity>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, parse_activity_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// One page of the feed, newest first.
pub fn list_page(conn: &mut DbConn, offset: usize, limit: usize) -> Result<Vec<Activity>> {
    let sql = format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
    );

    query_activities(conn, &sql, params![limit as i64, offset as i64])
        .context("Failed to list activity page")
}

/// Activities created strictly after `after`, oldest first. `None` returns everything.
pub fn list_created_after(conn: &mut DbConn, after: Option<DateTime<Utc>>) -> Result<Vec<Activity>> {
    match after {
        Some(cursor) => {
            let sql = format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE created_at > ?1 ORDER BY created_at ASC, id ASC"
            );
            query_activities(conn, &sql, params![cursor])
        }
        None => {
            let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY created_at ASC, id ASC");
            query_activities(conn, &sql, [])
        }
    }
    .context("Failed to list new activities")
}

pub fn find_by_id(conn: &mut DbConn, id: ActivityId) -> Result<Option<Activity>> {
    let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_activity_row)
        .optional()
        .context("Failed to query activity by id")
}

pub fn count(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))
        .context("Failed to count activities")
}
