use std::collections::HashSet;

use colored::{Color, Colorize};
use log::info;
use serde::Serialize;

use crate::activity::{Activity, ActivityColor};

/// A desktop-style notification; notifications sharing a `tag` replace each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopNotification {
    pub tag: String,
    pub title: String,
    pub body: String,
}

impl DesktopNotification {
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            tag: activity.id.to_string(),
            title: format!("{} {}", activity.icon, activity.title),
            body: activity.description.clone().unwrap_or_default(),
        }
    }
}

pub trait Notifier: Send {
    fn notify(&mut self, notification: &DesktopNotification);
}

/// Prints notifications to the terminal, once per tag.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    shown: HashSet<String>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: &DesktopNotification) {
        if !self.shown.insert(notification.tag.clone()) {
            return;
        }
        println!("{} {}", "🔔".bold(), notification.title.bold());
        if !notification.body.is_empty() {
            println!("   {}", notification.body.dimmed());
        }
    }
}

/// Routes notifications to the log; used where no terminal is attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: &DesktopNotification) {
        info!("Notification [{}]: {} {}", notification.tag, notification.title, notification.body);
    }
}

pub fn terminal_color(color: ActivityColor) -> Color {
    match color {
        ActivityColor::Blue => Color::Blue,
        ActivityColor::Gold => Color::Yellow,
        ActivityColor::Orange => Color::BrightYellow,
        ActivityColor::Green => Color::Green,
        ActivityColor::Red => Color::Red,
        ActivityColor::Teal => Color::Cyan,
        ActivityColor::Purple => Color::Magenta,
    }
}
