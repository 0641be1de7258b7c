use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;

use super::connection::DbConn;
use super::models::{
    NewPlacement, NewTournament, PlacementWithTournament, PlayerId, Tournament, TournamentId,
    TournamentPlacement, TournamentWithPlacements,
};

const TOURNAMENT_COLUMNS: &str = "id, name, game_type, image_url, tournament_date, created_at";
const PLACEMENT_COLUMNS: &str = "id, tournament_id, player_id, placement, created_at";

/// Inserts the tournament and its placements as one unit: either all rows land or none do.
pub fn insert_with_placements(
    conn: &mut DbConn,
    tournament: &NewTournament,
    placements: &[NewPlacement],
    created_at: DateTime<Utc>,
) -> Result<TournamentWithPlacements> {
    let tx = conn.transaction().context("Failed to open tournament transaction")?;

    let tournament_sql = format!(
        "INSERT INTO tournaments (name, game_type, image_url, tournament_date, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {TOURNAMENT_COLUMNS}"
    );
    let inserted = tx
        .query_row(
            &tournament_sql,
            params![
                tournament.name,
                tournament.game_type,
                tournament.image_url,
                tournament.tournament_date,
                created_at
            ],
            parse_tournament_row,
        )
        .context("Failed to insert tournament")?;

    let placement_sql = format!(
        "INSERT INTO tournament_placements (tournament_id, player_id, placement, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING {PLACEMENT_COLUMNS}"
    );
    let mut stored = Vec::with_capacity(placements.len());
    for placement in placements {
        let row = tx
            .query_row(
                &placement_sql,
                params![inserted.id, placement.player_id, placement.position, created_at],
                parse_placement_row,
            )
            .with_context(|| format!("Failed to insert placement {}", placement.position))?;
        stored.push(row);
    }

    tx.commit().context("Failed to commit tournament")?;
    stored.sort_by_key(|p| p.placement);

    Ok(TournamentWithPlacements {
        tournament: inserted,
        placements: stored,
    })
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        game_type: row.get(2)?,
        image_url: row.get(3)?,
        tournament_date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn parse_placement_row(row: &rusqlite::Row) -> rusqlite::Result<TournamentPlacement> {
    Ok(TournamentPlacement {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        player_id: row.get(2)?,
        placement: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Tournament>> {
    let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments ORDER BY tournament_date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_tournament_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list tournaments")?;

    Ok(rows)
}

/// Most recent tournaments with their placements attached, ordered by tournament date.
pub fn list_recent_with_placements(conn: &mut DbConn, limit: usize) -> Result<Vec<TournamentWithPlacements>> {
    let sql = format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments ORDER BY tournament_date DESC, id DESC LIMIT ?1"
    );
    let tournaments = {
        let mut stmt = conn.prepare(&sql)?;
        stmt.query_map(params![limit as i64], parse_tournament_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list recent tournaments")?
    };

    let mut by_tournament: HashMap<TournamentId, Vec<TournamentPlacement>> = HashMap::new();
    for placement in list_placements(conn)? {
        by_tournament.entry(placement.tournament_id).or_default().push(placement);
    }

    Ok(tournaments
        .into_iter()
        .map(|tournament| {
            let placements = by_tournament.remove(&tournament.id).unwrap_or_default();
            TournamentWithPlacements { tournament, placements }
        })
        .collect())
}

pub fn count(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM tournaments", [], |row| row.get(0))
        .context("Failed to count tournaments")
}

/// Every placement, ordered by tournament then position.
pub fn list_placements(conn: &mut DbConn) -> Result<Vec<TournamentPlacement>> {
    let sql = format!(
        "SELECT {PLACEMENT_COLUMNS} FROM tournament_placements ORDER BY tournament_id, placement"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_placement_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list placements")?;

    Ok(rows)
}

pub fn list_placements_for_player(conn: &mut DbConn, player_id: PlayerId) -> Result<Vec<PlacementWithTournament>> {
    let sql = "
        SELECT p.id, p.tournament_id, p.player_id, p.placement, p.created_at, t.name, t.tournament_date
        FROM tournament_placements p
        JOIN tournaments t ON p.tournament_id = t.id
        WHERE p.player_id = ?1
        ORDER BY t.tournament_date DESC, p.created_at DESC
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(PlacementWithTournament {
                placement: parse_placement_row(row)?,
                tournament_name: row.get(5)?,
                tournament_date: row.get(6)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list placements for player")?;

    Ok(rows)
}
