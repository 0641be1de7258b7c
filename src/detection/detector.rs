use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use super::rules::{consecutive_wins, is_rivalry_milestone, is_streak_milestone, reached_milestones};
use crate::activity::{events, ActivityWriter, MilestoneKind};
use crate::config::DetectionSettings;
use crate::database::{DataService, Match, Player};
use crate::stats::head_to_head::tally_between;

/// What fired during one detection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub streak: Option<u32>,
    /// Head-to-head total that triggered a rivalry update.
    pub rivalry: Option<u32>,
    pub milestones: Vec<(MilestoneKind, i64)>,
}

impl DetectionReport {
    pub fn is_empty(&self) -> bool {
        self.streak.is_none() && self.rivalry.is_none() && self.milestones.is_empty()
    }
}

/// Looks at recent history after a submission and writes the activities it
/// earned. Checks run independently; reads and writes are not transactional.
#[derive(Clone)]
pub struct Detector {
    service: DataService,
    writer: ActivityWriter,
    settings: DetectionSettings,
}

impl Detector {
    pub fn new(service: DataService, writer: ActivityWriter, settings: DetectionSettings) -> Self {
        Self {
            service,
            writer,
            settings,
        }
    }

    /// Streak, rivalry and milestone checks for a freshly saved match.
    /// `player1` and `player2` are the match participants in match order.
    pub fn after_match(&self, game: &Match, player1: &Player, player2: &Player) -> DetectionReport {
        let winner = if game.winner_id == player1.id { player1 } else { player2 };

        let streak = self
            .check_streak(winner)
            .unwrap_or_else(|e| log_failed_check("streak", e));
        let rivalry = self
            .check_rivalry(player1, player2)
            .unwrap_or_else(|e| log_failed_check("rivalry", e));
        let milestones = self
            .check_milestones()
            .unwrap_or_else(|e| log_failed_check("milestone", e));

        DetectionReport {
            streak,
            rivalry,
            milestones,
        }
    }

    pub fn after_tournament(&self) -> DetectionReport {
        DetectionReport {
            milestones: self
                .check_milestones()
                .unwrap_or_else(|e| log_failed_check("milestone", e)),
            ..Default::default()
        }
    }

    fn check_streak(&self, winner: &Player) -> Result<Option<u32>> {
        // One row past the window tells a run of exactly `streak_lookback`
        // apart from a longer one.
        let lookback = self.settings.streak_lookback;
        let recent = self
            .service
            .matches_for_player(winner.id, Some(lookback + 1))
            .context("Failed to load recent matches for streak check")?;
        let streak = consecutive_wins(winner.id, &recent);

        if streak as usize > lookback {
            debug!("{} has won more than {} in a row", winner.name, lookback);
            return Ok(None);
        }
        if !is_streak_milestone(streak, &self.settings.streak_thresholds) {
            return Ok(None);
        }

        info!("{} reached a {}-match winning streak", winner.name, streak);
        self.writer
            .create_optional(events::winning_streak(winner, streak));
        Ok(Some(streak))
    }

    fn check_rivalry(&self, player1: &Player, player2: &Player) -> Result<Option<u32>> {
        let series = self
            .service
            .matches_between(player1.id, player2.id)
            .context("Failed to load head-to-head matches for rivalry check")?;
        let (player1_wins, player2_wins) = tally_between(player1.id, player2.id, &series);
        let total = player1_wins + player2_wins;

        if !is_rivalry_milestone(total, self.settings.rivalry_step) {
            return Ok(None);
        }

        info!("{} vs {} reached {} games", player1.name, player2.name, total);
        self.writer.create_optional(events::rivalry_update(
            player1,
            player2,
            player1_wins,
            player2_wins,
            total,
        ));
        Ok(Some(total))
    }

    fn check_milestones(&self) -> Result<Vec<(MilestoneKind, i64)>> {
        let match_count = self.service.count_matches()?;
        let tournament_count = self.service.count_tournaments()?;
        let reached = reached_milestones(match_count, tournament_count, &self.settings);

        for (kind, count) in &reached {
            info!("Milestone reached: {:?} = {}", kind, count);
            self.writer.create_activity(&events::milestone(*kind, *count));
        }
        Ok(reached)
    }
}

fn log_failed_check<T: Default>(check: &str, error: anyhow::Error) -> T {
    warn!("{} check failed: {:#}", check, error);
    T::default()
}
