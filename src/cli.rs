use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::database::PlayerId;
use crate::feed::FeedFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "match-tracker: 1v1 results, tournaments and a live activity feed")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Register a new player
    AddPlayer {
        name: String,
    },
    /// Record a 1v1 match result
    RecordMatch {
        #[arg(long)]
        player1: PlayerId,
        #[arg(long)]
        player2: PlayerId,
        /// Must be one of the two players
        #[arg(long)]
        winner: PlayerId,
        #[arg(long)]
        notes: Option<String>,
        /// Photo of the result
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Record a finished tournament
    RecordTournament {
        #[arg(long)]
        name: String,
        #[arg(long)]
        game_type: Option<String>,
        /// Tournament date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Player ids in finishing order, champion first
        #[arg(long = "placement", required = true, num_args = 1..)]
        placements: Vec<PlayerId>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Show the leaderboard
    Leaderboard {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a player's profile
    Player {
        id: PlayerId,
    },
    /// Print the activity feed grouped by day
    Feed {
        /// Page size (defaults to 10)
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, default_value_t = FeedFilter::All)]
        filter: FeedFilter,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Mark everything shown as read
        #[arg(long)]
        mark_read: bool,
    },
    /// Follow the activity feed until interrupted
    Watch {
        #[arg(short, long, default_value_t = FeedFilter::All)]
        filter: FeedFilter,
    },
    /// Turn feed notifications on or off
    Notifications {
        #[arg(value_enum)]
        action: NotificationAction,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    On,
    Off,
    Status,
}
