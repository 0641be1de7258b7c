pub mod detector;
pub mod rules;

pub use detector::{DetectionReport, Detector};
pub use rules::{consecutive_wins, is_rivalry_milestone, is_streak_milestone, reached_milestones};
