use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::{Player, PlayerId};

const PLAYER_COLUMNS: &str = "id, name, created_at";

pub fn insert_player(conn: &mut DbConn, name: &str, created_at: DateTime<Utc>) -> Result<Player> {
    let sql = format!("INSERT INTO players (name, created_at) VALUES (?1, ?2) RETURNING {PLAYER_COLUMNS}");

    conn.query_row(&sql, params![name, created_at], parse_player_row)
        .context("Failed to insert new player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: PlayerId) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

/// Players ordered by name, the way pickers and profiles list them.
pub fn list_all(conn: &mut DbConn) -> Result<Vec<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY name COLLATE NOCASE, id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list players")?;

    Ok(rows)
}

pub fn count(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
        .context("Failed to count players")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection};

    #[test]
    fn test_insert_and_find_player() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        let created = insert_player(&mut conn, "Sara", Utc::now()).unwrap();
        let found = find_by_id(&mut conn, created.id).unwrap();

        assert_eq!(found, Some(created));
        assert_eq!(find_by_id(&mut conn, 999).unwrap(), None);
    }

    #[test]
    fn test_list_all_orders_by_name() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        insert_player(&mut conn, "zed", Utc::now()).unwrap();
        insert_player(&mut conn, "Amir", Utc::now()).unwrap();
        insert_player(&mut conn, "mina", Utc::now()).unwrap();

        let names: Vec<String> = list_all(&mut conn).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Amir", "mina", "zed"]);
        assert_eq!(count(&mut conn).unwrap(), 3);
    }
}
