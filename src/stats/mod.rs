pub mod aggregator;
pub mod head_to_head;
pub mod summary;

pub use aggregator::{compute_player_stats, leaderboard, rank_players, PlayerStats, RankedPlayer};
pub use head_to_head::{head_to_head, head_to_head_between, Classification, HeadToHead, Rivalry};
pub use summary::{dashboard, player_profile, DashboardSummary, PlayerProfile, RecentResult};
