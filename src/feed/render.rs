//! Terminal rendering of feed entries for the CLI.

use chrono::{DateTime, Local};
use colored::Colorize;

use super::controller::{FeedController, FeedEntry};
use super::notifier::terminal_color;

pub fn render_entry(entry: &FeedEntry, unseen: bool) -> String {
    let activity = &entry.activity;
    let marker = if entry.is_new || unseen { "●".bold().to_string() } else { " ".to_string() };
    let title = activity.title.color(terminal_color(activity.color)).bold();
    let time = activity.created_at.with_timezone(&Local).format("%H:%M");

    let mut line = format!("{} {} {}  {}", marker, activity.icon, title, time.to_string().dimmed());
    if let Some(description) = &activity.description {
        line.push_str(&format!("\n     {}", description));
    }
    line
}

/// The visible feed grouped into recency sections.
pub fn render_grouped(feed: &FeedController, now: &DateTime<Local>) -> String {
    let groups = feed.grouped(now);
    if groups.is_empty() {
        return "No activity yet.".dimmed().to_string();
    }

    let mut out = Vec::new();
    for (bucket, entries) in groups {
        out.push(bucket.label().underline().to_string());
        for entry in entries {
            out.push(render_entry(entry, feed.is_unseen(&entry.activity)));
        }
        out.push(String::new());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityType;
    use crate::config::FeedSettings;
    use crate::feed::controller::fixtures::activity_at;
    use crate::feed::ClientState;

    #[test]
    fn test_render_groups_contain_labels_and_titles() {
        colored::control::set_override(false);
        let now = Local::now();
        let mut feed = FeedController::new(FeedSettings::default(), ClientState::ephemeral());
        feed.apply_initial_page(vec![activity_at(
            1,
            ActivityType::MatchResult,
            now.with_timezone(&chrono::Utc),
        )]);

        let text = render_grouped(&feed, &now);
        assert!(text.starts_with("Today"));
        assert!(text.contains("activity 1"));
        assert!(text.contains("details 1"));
    }

    #[test]
    fn test_empty_feed_message() {
        colored::control::set_override(false);
        let feed = FeedController::new(FeedSettings::default(), ClientState::ephemeral());
        assert_eq!(render_grouped(&feed, &Local::now()), "No activity yet.");
    }
}
