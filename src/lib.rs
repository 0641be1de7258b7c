pub mod activity;
pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod detection;
pub mod errors;
pub mod feed;
pub mod realtime;
pub mod services;
pub mod stats;
pub mod storage;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;

use crate::cli::{Command, NotificationAction};
use crate::config::settings::AppConfig;
use crate::database::{DataService, NewPlacement, PlayerId};
use crate::feed::render::render_grouped;
use crate::feed::{ClientState, FeedController, FeedFilter};
use crate::realtime::RealtimeHub;
use crate::services::server::ServerService;
use crate::services::submission::{ImageSource, MatchSubmission, SubmissionService, TournamentSubmission};
use crate::services::watch::WatchService;
use crate::storage::ImageStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

/// CLI commands run in their own process, so realtime pushes never reach
/// other running feeds; those fall back to polling.
fn open_data_service(config: &AppConfig) -> Result<DataService> {
    let pool = database::create_pool(&config.storage.database_path)?;
    Ok(DataService::new(pool, RealtimeHub::offline()))
}

fn open_submissions(config: &AppConfig) -> Result<SubmissionService> {
    let service = open_data_service(config)?;
    Ok(SubmissionService::new(
        service,
        ImageStore::from_settings(&config.storage),
        config,
    ))
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_add_player(name: &str) -> Result<()> {
    let config = AppConfig::new();
    let player = open_submissions(&config)?.add_player(name)?;
    println!("Added {} (id {})", player.name.bold(), player.id);
    Ok(())
}

pub fn handle_record_match(
    player1: PlayerId,
    player2: PlayerId,
    winner: PlayerId,
    notes: Option<&str>,
    image: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::new();
    let outcome = open_submissions(&config)?.record_match(MatchSubmission {
        player1_id: player1,
        player2_id: player2,
        winner_id: winner,
        notes: notes.map(str::to_string),
        image: image.map(|p| ImageSource::File(p.to_path_buf())),
        played_at: None,
    })?;

    println!("Recorded match {}", outcome.game.id.to_string().bold());
    if let Some(streak) = outcome.detection.streak {
        println!("  🔥 {} wins in a row", streak);
    }
    if let Some(total) = outcome.detection.rivalry {
        println!("  ⚡ rivalry reached {} games", total);
    }
    for (kind, count) in &outcome.detection.milestones {
        println!("  🎉 {:?} milestone: {}", kind, count);
    }
    Ok(())
}

pub fn handle_record_tournament(
    name: &str,
    game_type: Option<&str>,
    date: Option<NaiveDate>,
    placements: &[PlayerId],
    image: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::new();
    let placements = placements
        .iter()
        .enumerate()
        .map(|(idx, player_id)| -> Result<NewPlacement> {
            Ok(NewPlacement {
                position: u32::try_from(idx + 1).context("Too many placements")?,
                player_id: *player_id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let outcome = open_submissions(&config)?.record_tournament(TournamentSubmission {
        name: name.to_string(),
        game_type: game_type.map(str::to_string),
        tournament_date: date,
        placements,
        image: image.map(|p| ImageSource::File(p.to_path_buf())),
    })?;

    println!(
        "Recorded tournament {} ({} placements)",
        outcome.tournament.tournament.name.bold(),
        outcome.tournament.placements.len()
    );
    for (kind, count) in &outcome.detection.milestones {
        println!("  🎉 {:?} milestone: {}", kind, count);
    }
    Ok(())
}

pub fn handle_leaderboard(limit: Option<usize>) -> Result<()> {
    let config = AppConfig::new();
    let service = open_data_service(&config)?;
    let players = service.list_players()?;
    let matches = service.list_matches()?;
    let placements = service.list_placements()?;

    let board = stats::leaderboard(&players, &matches, &placements);
    if board.is_empty() {
        println!("{}", "No players yet.".dimmed());
        return Ok(());
    }

    println!(
        "{:>4}  {:<20} {:>5} {:>6} {:>7} {:>6}",
        "#".bold(),
        "Player".bold(),
        "W".bold(),
        "L".bold(),
        "Win %".bold(),
        "🏆".bold()
    );
    for entry in board.iter().take(limit.unwrap_or(usize::MAX)) {
        let stats = &entry.stats;
        println!(
            "{:>4}  {:<20} {:>5} {:>6} {:>6.1}% {:>6}",
            entry.rank,
            stats.player.name,
            stats.total_wins,
            stats.total_losses,
            stats.win_percentage,
            stats.tournament_wins
        );
    }
    Ok(())
}

pub fn handle_player(id: PlayerId) -> Result<()> {
    let config = AppConfig::new();
    let service = open_data_service(&config)?;
    let player = service
        .find_player(id)?
        .with_context(|| format!("Player {} not found", id))?;

    let matches = service.matches_for_player(id, None)?;
    let placements = service.placements_for_player(id)?;
    let others: Vec<_> = service
        .list_players()?
        .into_iter()
        .filter(|p| p.id != id)
        .collect();
    let profile = stats::player_profile(&player, matches, placements, &others);

    let s = &profile.stats;
    println!("{}", player.name.bold().underline());
    println!(
        "{} wins, {} losses, {:.1}% over {} matches",
        s.total_wins, s.total_losses, s.win_percentage, s.total_matches
    );
    println!(
        "{} tournament wins in {} tournaments",
        s.tournament_wins, s.tournament_participations
    );

    if !profile.head_to_head.is_empty() {
        println!("\n{}", "Head to head".bold());
        for rival in &profile.head_to_head {
            let label = match rival.classification {
                stats::Classification::Nemesis => "nemesis".red().to_string(),
                stats::Classification::Dominating => "dominating".green().to_string(),
                stats::Classification::Even => String::new(),
            };
            println!(
                "  vs {:<20} {}-{} {}",
                rival.record.opponent.name, rival.record.wins, rival.record.losses, label
            );
        }
    }

    if !profile.placements.is_empty() {
        println!("\n{}", "Tournaments".bold());
        for placed in &profile.placements {
            println!(
                "  #{} {} ({})",
                placed.placement.placement, placed.tournament_name, placed.tournament_date
            );
        }
    }
    Ok(())
}

pub fn handle_feed(limit: Option<usize>, filter: FeedFilter, pages: usize, mark_read: bool) -> Result<()> {
    let mut config = AppConfig::new();
    if let Some(limit) = limit {
        config.feed.page_size = limit.max(1);
    }
    let service = open_data_service(&config)?;
    let client_state = ClientState::open(&config.storage.client_state_path)?;

    let mut feed = FeedController::new(config.feed.clone(), client_state);
    feed.set_filter(filter);
    feed.load_initial(&service)?;
    for _ in 1..pages {
        if feed.load_more(&service)? == 0 {
            break;
        }
    }

    println!("{}", render_grouped(&feed, &Local::now()));
    let unseen = feed.unseen_count();
    if unseen > 0 {
        println!("{}", format!("{} unseen", unseen).bold());
    }
    if feed.has_more() {
        println!("{}", "More available with --page".dimmed());
    }

    if mark_read {
        feed.mark_all_read()?;
        println!("Marked all as read");
    }
    Ok(())
}

pub fn handle_watch(filter: FeedFilter) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = WatchService::new(AppConfig::new(), filter);
        service.run().await
    })
}

pub fn handle_notifications(action: NotificationAction) -> Result<()> {
    let config = AppConfig::new();
    let mut state = ClientState::open(&config.storage.client_state_path)?;

    match action {
        NotificationAction::On => state.set_notifications_enabled(true)?,
        NotificationAction::Off => state.set_notifications_enabled(false)?,
        NotificationAction::Status => {}
    }

    let status = if state.notifications_enabled() { "on".green() } else { "off".red() };
    println!("Notifications are {}", status);
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
