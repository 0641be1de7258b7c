use anyhow::Result;

use match_tracker::cli::Command;
use match_tracker::{
    handle_add_player, handle_completions, handle_feed, handle_leaderboard, handle_notifications, handle_player,
    handle_record_match, handle_record_tournament, handle_serve, handle_watch, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::AddPlayer { name } => handle_add_player(name),
        Command::RecordMatch {
            player1,
            player2,
            winner,
            notes,
            image,
        } => handle_record_match(*player1, *player2, *winner, notes.as_deref(), image.as_deref()),
        Command::RecordTournament {
            name,
            game_type,
            date,
            placements,
            image,
        } => handle_record_tournament(name, game_type.as_deref(), *date, placements, image.as_deref()),
        Command::Leaderboard { limit } => handle_leaderboard(*limit),
        Command::Player { id } => handle_player(*id),
        Command::Feed {
            limit,
            filter,
            page,
            mark_read,
        } => handle_feed(*limit, *filter, *page, *mark_read),
        Command::Watch { filter } => handle_watch(*filter),
        Command::Notifications { action } => handle_notifications(*action),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
