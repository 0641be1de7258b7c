use anyhow::Result;
use chrono::{DateTime, Utc};

use super::connection::{get_connection, DbConn, DbPool};
use super::models::{
    ActivityId, Match, NewMatch, NewPlacement, NewTournament, PlacementWithTournament, Player, PlayerId,
    Tournament, TournamentPlacement, TournamentWithPlacements,
};
use super::{activities, matches, players, tournaments};
use crate::activity::{Activity, NewActivity};
use crate::realtime::RealtimeHub;

/// The data service the rest of the app talks to: pooled SQLite access plus
/// insert notifications for the activities table.
#[derive(Clone)]
pub struct DataService {
    pool: DbPool,
    hub: RealtimeHub,
}

impl DataService {
    pub fn new(pool: DbPool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }

    pub fn hub(&self) -> &RealtimeHub {
        &self.hub
    }

    fn connection(&self) -> Result<DbConn> {
        get_connection(&self.pool)
    }

    // --- Players ---

    pub fn insert_player(&self, name: &str) -> Result<Player> {
        players::insert_player(&mut self.connection()?, name, Utc::now())
    }

    pub fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        players::find_by_id(&mut self.connection()?, id)
    }

    pub fn list_players(&self) -> Result<Vec<Player>> {
        players::list_all(&mut self.connection()?)
    }

    pub fn count_players(&self) -> Result<i64> {
        players::count(&mut self.connection()?)
    }

    // --- Matches ---

    pub fn insert_match(&self, new_match: &NewMatch) -> Result<Match> {
        matches::insert_match(&mut self.connection()?, new_match, Utc::now())
    }

    pub fn list_matches(&self) -> Result<Vec<Match>> {
        matches::list_all(&mut self.connection()?)
    }

    pub fn recent_matches(&self, limit: usize) -> Result<Vec<Match>> {
        matches::list_recent(&mut self.connection()?, limit)
    }

    pub fn matches_for_player(&self, player_id: PlayerId, limit: Option<usize>) -> Result<Vec<Match>> {
        matches::list_for_player(&mut self.connection()?, player_id, limit)
    }

    pub fn matches_between(&self, player1_id: PlayerId, player2_id: PlayerId) -> Result<Vec<Match>> {
        matches::list_between(&mut self.connection()?, player1_id, player2_id)
    }

    pub fn count_matches(&self) -> Result<i64> {
        matches::count(&mut self.connection()?)
    }

    // --- Tournaments ---

    pub fn insert_tournament(
        &self,
        tournament: &NewTournament,
        placements: &[NewPlacement],
    ) -> Result<TournamentWithPlacements> {
        tournaments::insert_with_placements(&mut self.connection()?, tournament, placements, Utc::now())
    }

    pub fn list_tournaments(&self) -> Result<Vec<Tournament>> {
        tournaments::list_all(&mut self.connection()?)
    }

    pub fn recent_tournaments(&self, limit: usize) -> Result<Vec<TournamentWithPlacements>> {
        tournaments::list_recent_with_placements(&mut self.connection()?, limit)
    }

    pub fn list_placements(&self) -> Result<Vec<TournamentPlacement>> {
        tournaments::list_placements(&mut self.connection()?)
    }

    pub fn placements_for_player(&self, player_id: PlayerId) -> Result<Vec<PlacementWithTournament>> {
        tournaments::list_placements_for_player(&mut self.connection()?, player_id)
    }

    pub fn count_tournaments(&self) -> Result<i64> {
        tournaments::count(&mut self.connection()?)
    }

    // --- Activities ---

    /// Writes the activity and announces the insert to realtime subscribers.
    pub fn insert_activity(&self, draft: &NewActivity) -> Result<Activity> {
        let activity = activities::insert_activity(&mut self.connection()?, draft, Utc::now())?;
        self.hub.publish(&activity);
        Ok(activity)
    }

    pub fn activity_page(&self, offset: usize, limit: usize) -> Result<Vec<Activity>> {
        activities::list_page(&mut self.connection()?, offset, limit)
    }

    pub fn activities_after(&self, cursor: Option<DateTime<Utc>>) -> Result<Vec<Activity>> {
        activities::list_created_after(&mut self.connection()?, cursor)
    }

    pub fn find_activity(&self, id: ActivityId) -> Result<Option<Activity>> {
        activities::find_by_id(&mut self.connection()?, id)
    }

    pub fn count_activities(&self) -> Result<i64> {
        activities::count(&mut self.connection()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{events, MilestoneKind};
    use crate::database::create_memory_pool;
    use crate::realtime::{Delivery, SubscribeStatus};

    #[tokio::test]
    async fn test_insert_activity_notifies_subscribers() {
        let hub = RealtimeHub::new();
        let service = DataService::new(create_memory_pool().unwrap(), hub.clone());
        let mut subscription = hub.subscribe();
        assert_eq!(subscription.handshake().await, SubscribeStatus::Subscribed);

        let stored = service.insert_activity(&events::milestone(MilestoneKind::Tournaments, 10)).unwrap();

        assert_eq!(subscription.recv().await, Delivery::Inserted(stored));
        assert_eq!(service.count_activities().unwrap(), 1);
    }

    #[test]
    fn test_connections_return_to_the_single_slot_pool() {
        let service = DataService::new(create_memory_pool().unwrap(), RealtimeHub::new());
        for name in ["A", "B", "C"] {
            service.insert_player(name).unwrap();
        }
        assert_eq!(service.count_players().unwrap(), 3);
        assert_eq!(service.list_players().unwrap().len(), 3);
    }
}
