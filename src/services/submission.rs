use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use log::info;

use crate::activity::{events, ActivityWriter};
use crate::config::AppConfig;
use crate::database::{
    DataService, Match, NewMatch, NewPlacement, NewTournament, Player, PlayerId, TournamentWithPlacements,
};
use crate::detection::{DetectionReport, Detector};
use crate::errors::ValidationError;
use crate::storage::{ImageFolder, ImageStore};

/// A photo attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:image/...;base64,...` as sent by browsers.
    DataUrl(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct MatchSubmission {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub winner_id: PlayerId,
    pub notes: Option<String>,
    pub image: Option<ImageSource>,
    /// Defaults to the submission time.
    pub played_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct TournamentSubmission {
    pub name: String,
    pub game_type: Option<String>,
    /// Defaults to today's local date.
    pub tournament_date: Option<NaiveDate>,
    pub placements: Vec<NewPlacement>,
    pub image: Option<ImageSource>,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub game: Match,
    pub activity_written: bool,
    pub detection: DetectionReport,
}

#[derive(Debug, Clone)]
pub struct TournamentOutcome {
    pub tournament: TournamentWithPlacements,
    pub activity_written: bool,
    pub detection: DetectionReport,
}

/// Records results the way a submitting client does: validate, upload the
/// photo, write rows, then write activities and run detection.
#[derive(Clone)]
pub struct SubmissionService {
    service: DataService,
    writer: ActivityWriter,
    detector: Detector,
    images: ImageStore,
}

impl SubmissionService {
    pub fn new(service: DataService, images: ImageStore, config: &AppConfig) -> Self {
        let writer = ActivityWriter::new(service.clone());
        let detector = Detector::new(service.clone(), writer.clone(), config.detection.clone());
        Self {
            service,
            writer,
            detector,
            images,
        }
    }

    pub fn add_player(&self, name: &str) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPlayerName.into());
        }

        let player = self.service.insert_player(name)?;
        info!("Added player {} ({})", player.name, player.id);
        Ok(player)
    }

    pub fn record_match(&self, submission: MatchSubmission) -> Result<MatchOutcome> {
        let (player1, player2) = self.validate_match(&submission)?;
        let image_url = self.upload(ImageFolder::Matches, submission.image.as_ref())?;

        let game = self.service.insert_match(&NewMatch {
            player1_id: player1.id,
            player2_id: player2.id,
            winner_id: submission.winner_id,
            notes: clean_text(submission.notes),
            image_url,
            played_at: submission.played_at.unwrap_or_else(Utc::now),
        })?;
        info!("Recorded match {}: {} vs {}", game.id, player1.name, player2.name);

        let (winner, loser) = if game.winner_id == player1.id {
            (&player1, &player2)
        } else {
            (&player2, &player1)
        };
        let activity_written = self.writer.create_activity(&events::match_result(
            game.id,
            winner,
            loser,
            game.image_url.as_deref(),
            game.notes.as_deref(),
        ));
        let detection = self.detector.after_match(&game, &player1, &player2);

        Ok(MatchOutcome {
            game,
            activity_written,
            detection,
        })
    }

    pub fn record_tournament(&self, submission: TournamentSubmission) -> Result<TournamentOutcome> {
        let name = submission.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyTournamentName.into());
        }
        let players = self.validate_placements(&submission.placements)?;
        let image_url = self.upload(ImageFolder::Tournaments, submission.image.as_ref())?;

        let tournament = self.service.insert_tournament(
            &NewTournament {
                name,
                game_type: clean_text(submission.game_type),
                image_url,
                tournament_date: submission
                    .tournament_date
                    .unwrap_or_else(|| Local::now().date_naive()),
            },
            &submission.placements,
        )?;
        info!(
            "Recorded tournament {} '{}' with {} placements",
            tournament.tournament.id,
            tournament.tournament.name,
            tournament.placements.len()
        );

        let activity_written = tournament.champion_id().is_some() && {
            let placed: Vec<(u32, &Player)> = tournament
                .placements
                .iter()
                .filter_map(|p| players.get(&p.player_id).map(|player| (p.placement, player)))
                .collect();
            self.writer.create_activity(&events::tournament_complete(
                tournament.tournament.id,
                &tournament.tournament.name,
                &placed,
            ))
        };
        let detection = self.detector.after_tournament();

        Ok(TournamentOutcome {
            tournament,
            activity_written,
            detection,
        })
    }

    // --- Helper Methods ---

    fn validate_match(&self, submission: &MatchSubmission) -> Result<(Player, Player)> {
        if submission.player1_id == submission.player2_id {
            return Err(ValidationError::SamePlayer.into());
        }
        if submission.winner_id != submission.player1_id && submission.winner_id != submission.player2_id {
            return Err(ValidationError::WinnerNotParticipant {
                winner_id: submission.winner_id,
            }
            .into());
        }

        let player1 = self.require_player(submission.player1_id)?;
        let player2 = self.require_player(submission.player2_id)?;
        Ok((player1, player2))
    }

    fn validate_placements(&self, placements: &[NewPlacement]) -> Result<HashMap<PlayerId, Player>> {
        if placements.is_empty() {
            return Err(ValidationError::NoPlacements.into());
        }

        let mut positions = HashSet::new();
        let mut players = HashMap::new();
        for placement in placements {
            if placement.position == 0 {
                return Err(ValidationError::InvalidPlacement(0).into());
            }
            if !positions.insert(placement.position) {
                return Err(ValidationError::DuplicatePosition(placement.position).into());
            }
            if players.contains_key(&placement.player_id) {
                return Err(ValidationError::DuplicatePlacementPlayer(placement.player_id).into());
            }
            let player = self.require_player(placement.player_id)?;
            players.insert(player.id, player);
        }
        Ok(players)
    }

    fn require_player(&self, id: PlayerId) -> Result<Player> {
        self.service
            .find_player(id)?
            .ok_or_else(|| ValidationError::UnknownPlayer(id).into())
    }

    fn upload(&self, folder: ImageFolder, image: Option<&ImageSource>) -> Result<Option<String>> {
        let url = match image {
            None => return Ok(None),
            Some(ImageSource::DataUrl(data_url)) => self.images.upload_data_url(folder, data_url)?,
            Some(ImageSource::File(path)) => self.images.upload_file(folder, path)?,
        };
        Ok(Some(url))
    }
}

fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityType, PlacementSummary};
    use crate::database::create_memory_pool;
    use crate::errors::{is_upload, is_validation};
    use crate::realtime::RealtimeHub;

    fn submissions(name: &str) -> (SubmissionService, DataService) {
        let service = DataService::new(create_memory_pool().unwrap(), RealtimeHub::new());
        let root = std::env::temp_dir().join(format!("match_tracker_submit_{}_{}", name, std::process::id()));
        let images = ImageStore::new(root, "http://localhost:3000/images");
        (
            SubmissionService::new(service.clone(), images, &AppConfig::default()),
            service,
        )
    }

    fn game(p1: &Player, p2: &Player, winner: &Player) -> MatchSubmission {
        MatchSubmission {
            player1_id: p1.id,
            player2_id: p2.id,
            winner_id: winner.id,
            notes: None,
            image: None,
            played_at: None,
        }
    }

    #[test]
    fn test_add_player_trims_and_rejects_blank() {
        let (submit, _) = submissions("players");
        assert_eq!(submit.add_player("  Sara ").unwrap().name, "Sara");
        assert!(is_validation(&submit.add_player("   ").unwrap_err()));
    }

    #[test]
    fn test_record_match_writes_result_activity() {
        let (submit, service) = submissions("match");
        let a = submit.add_player("A").unwrap();
        let b = submit.add_player("B").unwrap();

        let outcome = submit
            .record_match(MatchSubmission {
                notes: Some("  close one ".to_string()),
                ..game(&a, &b, &b)
            })
            .unwrap();

        assert!(outcome.activity_written);
        assert_eq!(outcome.game.notes.as_deref(), Some("close one"));
        let activities = service.activity_page(0, 10).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, ActivityType::MatchResult);
        assert_eq!(activities[0].metadata.winner_name.as_deref(), Some("B"));
        assert_eq!(activities[0].related_match_id, Some(outcome.game.id));
    }

    #[test]
    fn test_third_straight_win_adds_streak_activity() {
        let (submit, service) = submissions("streak");
        let p1 = submit.add_player("P1").unwrap();
        let p2 = submit.add_player("P2").unwrap();
        let p3 = submit.add_player("P3").unwrap();

        submit.record_match(game(&p1, &p3, &p1)).unwrap();
        submit.record_match(game(&p1, &p3, &p1)).unwrap();
        let outcome = submit.record_match(game(&p1, &p2, &p1)).unwrap();

        assert_eq!(outcome.detection.streak, Some(3));
        let streak = service
            .activity_page(0, 10)
            .unwrap()
            .into_iter()
            .find(|a| a.activity_type == ActivityType::WinningStreak)
            .unwrap();
        assert_eq!(streak.metadata.streak_count, Some(3));
    }

    #[test]
    fn test_invalid_matches_are_rejected_before_writing() {
        let (submit, service) = submissions("invalid");
        let a = submit.add_player("A").unwrap();
        let b = submit.add_player("B").unwrap();
        let c = submit.add_player("C").unwrap();

        for bad in [game(&a, &a, &a), game(&a, &b, &c)] {
            assert!(is_validation(&submit.record_match(bad).unwrap_err()));
        }
        let ghost = MatchSubmission {
            player2_id: 99,
            ..game(&a, &b, &a)
        };
        let err = submit.record_match(ghost).unwrap_err();
        assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::UnknownPlayer(99)));
        assert_eq!(service.count_matches().unwrap(), 0);
    }

    #[test]
    fn test_failed_upload_writes_no_match() {
        let (submit, service) = submissions("upload");
        let a = submit.add_player("A").unwrap();
        let b = submit.add_player("B").unwrap();

        let err = submit
            .record_match(MatchSubmission {
                image: Some(ImageSource::DataUrl("data:image/jpeg;base64,###".to_string())),
                ..game(&a, &b, &a)
            })
            .unwrap_err();

        assert!(is_upload(&err));
        assert_eq!(service.count_matches().unwrap(), 0);
        assert_eq!(service.count_activities().unwrap(), 0);
    }

    #[test]
    fn test_tournament_activity_lists_placements_in_order() {
        let (submit, service) = submissions("tournament");
        let a = submit.add_player("A").unwrap();
        let b = submit.add_player("B").unwrap();
        let c = submit.add_player("C").unwrap();

        let outcome = submit
            .record_tournament(TournamentSubmission {
                name: "Spring Cup".to_string(),
                game_type: Some("FIFA".to_string()),
                tournament_date: NaiveDate::from_ymd_opt(2026, 4, 1),
                placements: vec![
                    NewPlacement { position: 3, player_id: c.id },
                    NewPlacement { position: 1, player_id: a.id },
                    NewPlacement { position: 2, player_id: b.id },
                ],
                image: None,
            })
            .unwrap();

        assert!(outcome.activity_written);
        let activities = service.activity_page(0, 10).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, ActivityType::TournamentComplete);
        assert_eq!(
            activities[0].metadata.placements,
            Some(vec![
                PlacementSummary { position: 1, player_name: "A".to_string() },
                PlacementSummary { position: 2, player_name: "B".to_string() },
                PlacementSummary { position: 3, player_name: "C".to_string() },
            ])
        );
    }

    #[test]
    fn test_tournament_without_champion_writes_no_activity() {
        let (submit, service) = submissions("no_champion");
        let a = submit.add_player("A").unwrap();

        let outcome = submit
            .record_tournament(TournamentSubmission {
                name: "Cup".to_string(),
                game_type: None,
                tournament_date: None,
                placements: vec![NewPlacement { position: 2, player_id: a.id }],
                image: None,
            })
            .unwrap();

        assert!(!outcome.activity_written);
        assert_eq!(service.count_activities().unwrap(), 0);
    }

    #[test]
    fn test_invalid_placements() {
        let (submit, service) = submissions("placements");
        let a = submit.add_player("A").unwrap();
        let b = submit.add_player("B").unwrap();
        let tournament = |placements: Vec<NewPlacement>| TournamentSubmission {
            name: "Cup".to_string(),
            game_type: None,
            tournament_date: None,
            placements,
            image: None,
        };

        let cases = vec![
            (vec![], ValidationError::NoPlacements),
            (vec![NewPlacement { position: 0, player_id: a.id }], ValidationError::InvalidPlacement(0)),
            (
                vec![NewPlacement { position: 1, player_id: a.id }, NewPlacement { position: 1, player_id: b.id }],
                ValidationError::DuplicatePosition(1),
            ),
            (
                vec![NewPlacement { position: 1, player_id: a.id }, NewPlacement { position: 2, player_id: a.id }],
                ValidationError::DuplicatePlacementPlayer(a.id),
            ),
        ];
        for (placements, expected) in cases {
            let err = submit.record_tournament(tournament(placements)).unwrap_err();
            assert_eq!(err.downcast_ref::<ValidationError>(), Some(&expected));
        }
        assert_eq!(service.count_tournaments().unwrap(), 0);
    }
}
