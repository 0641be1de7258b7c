use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityType;
use crate::errors::ValidationError;

/// Feed category picked by the user; applied before grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFilter {
    #[default]
    All,
    Matches,
    Tournaments,
}

impl FeedFilter {
    pub fn matches(&self, activity_type: ActivityType) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::Matches => matches!(
                activity_type,
                ActivityType::MatchResult | ActivityType::WinningStreak | ActivityType::RivalryUpdate
            ),
            FeedFilter::Tournaments => activity_type == ActivityType::TournamentComplete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFilter::All => "all",
            FeedFilter::Matches => "matches",
            FeedFilter::Tournaments => "tournaments",
        }
    }
}

impl FromStr for FeedFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FeedFilter::All),
            "matches" => Ok(FeedFilter::Matches),
            "tournaments" => Ok(FeedFilter::Tournaments),
            _ => Err(ValidationError::UnknownFilter(s.to_string())),
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_filter_covers_match_derived_types() {
        let filter = FeedFilter::Matches;
        assert!(filter.matches(ActivityType::MatchResult));
        assert!(filter.matches(ActivityType::WinningStreak));
        assert!(filter.matches(ActivityType::RivalryUpdate));
        assert!(!filter.matches(ActivityType::TournamentComplete));
        assert!(!filter.matches(ActivityType::Milestone));
    }

    #[test]
    fn test_tournaments_filter_and_all() {
        assert!(FeedFilter::Tournaments.matches(ActivityType::TournamentComplete));
        assert!(!FeedFilter::Tournaments.matches(ActivityType::NewPlayer));
        assert!(FeedFilter::All.matches(ActivityType::RankChange));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Matches".parse::<FeedFilter>().unwrap(), FeedFilter::Matches);
        assert_eq!(
            "streaks".parse::<FeedFilter>(),
            Err(ValidationError::UnknownFilter("streaks".to_string()))
        );
    }
}
