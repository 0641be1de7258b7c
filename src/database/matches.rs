use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;

use super::connection::DbConn;
use super::models::{Match, NewMatch, PlayerId};

const MATCH_COLUMNS: &str =
    "id, player1_id, player2_id, winner_id, notes, image_url, played_at, created_at";

pub fn insert_match(conn: &mut DbConn, new_match: &NewMatch, created_at: DateTime<Utc>) -> Result<Match> {
    let sql = format!(
        "INSERT INTO matches (player1_id, player2_id, winner_id, notes, image_url, played_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {MATCH_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new_match.player1_id,
            new_match.player2_id,
            new_match.winner_id,
            new_match.notes,
            new_match.image_url,
            new_match.played_at,
            created_at
        ],
        parse_match_row,
    )
    .context("Failed to insert match")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        player1_id: row.get(1)?,
        player2_id: row.get(2)?,
        winner_id: row.get(3)?,
        notes: row.get(4)?,
        image_url: row.get(5)?,
        played_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_matches(conn: &mut DbConn, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Match>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Match>> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM matches ORDER BY played_at DESC, id DESC");
    query_matches(conn, &sql, []).context("Failed to list matches")
}

pub fn list_recent(conn: &mut DbConn, limit: usize) -> Result<Vec<Match>> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM matches ORDER BY played_at DESC, id DESC LIMIT ?1");
    query_matches(conn, &sql, params![limit as i64]).context("Failed to list recent matches")
}

/// Matches the player took part in, newest first.
pub fn list_for_player(
    conn: &mut DbConn,
    player_id: PlayerId,
    limit: Option<usize>,
) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE player1_id = ?1 OR player2_id = ?1 ORDER BY played_at DESC, id DESC LIMIT ?2"
    );
    let limit = limit.map(|l| l as i64).unwrap_or(-1);

    query_matches(conn, &sql, params![player_id, limit])
        .context("Failed to list matches for player")
}

/// Every match played between the two players, in either seat order.
pub fn list_between(conn: &mut DbConn, player1_id: PlayerId, player2_id: PlayerId) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches
         WHERE (player1_id = ?1 AND player2_id = ?2)
            OR (player1_id = ?2 AND player2_id = ?1)
         ORDER BY played_at DESC, id DESC"
    );

    query_matches(conn, &sql, params![player1_id, player2_id])
        .context("Failed to list head-to-head matches")
}

pub fn count(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("Failed to count matches")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, players};
    use chrono::Duration;

    fn seed_players(conn: &mut DbConn) -> (PlayerId, PlayerId, PlayerId) {
        let a = players::insert_player(conn, "A", Utc::now()).unwrap().id;
        let b = players::insert_player(conn, "B", Utc::now()).unwrap().id;
        let c = players::insert_player(conn, "C", Utc::now()).unwrap().id;
        (a, b, c)
    }

    fn new_match(p1: PlayerId, p2: PlayerId, winner: PlayerId, minutes_ago: i64) -> NewMatch {
        NewMatch {
            player1_id: p1,
            player2_id: p2,
            winner_id: winner,
            notes: None,
            image_url: None,
            played_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_list_for_player_is_newest_first_and_limited() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        let (a, b, c) = seed_players(&mut conn);

        let oldest = insert_match(&mut conn, &new_match(a, b, a, 30), Utc::now()).unwrap();
        let middle = insert_match(&mut conn, &new_match(c, a, c, 20), Utc::now()).unwrap();
        let newest = insert_match(&mut conn, &new_match(b, a, a, 10), Utc::now()).unwrap();
        insert_match(&mut conn, &new_match(b, c, b, 5), Utc::now()).unwrap();

        let all = list_for_player(&mut conn, a, None).unwrap();
        let ids: Vec<_> = all.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

        let limited = list_for_player(&mut conn, a, Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, newest.id);
    }

    #[test]
    fn test_list_between_covers_both_seat_orders() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        let (a, b, c) = seed_players(&mut conn);

        insert_match(&mut conn, &new_match(a, b, a, 3), Utc::now()).unwrap();
        insert_match(&mut conn, &new_match(b, a, b, 2), Utc::now()).unwrap();
        insert_match(&mut conn, &new_match(a, c, a, 1), Utc::now()).unwrap();

        let between = list_between(&mut conn, a, b).unwrap();
        assert_eq!(between.len(), 2);
        assert!(between.iter().all(|m| m.is_between(a, b)));
        assert_eq!(count(&mut conn).unwrap(), 3);
    }

    #[test]
    fn test_schema_rejects_winner_outside_match() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        let (a, b, c) = seed_players(&mut conn);

        assert!(insert_match(&mut conn, &new_match(a, b, c, 0), Utc::now()).is_err());
        assert!(insert_match(&mut conn, &new_match(a, a, a, 0), Utc::now()).is_err());
    }
}
