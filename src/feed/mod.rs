pub mod client_state;
pub mod controller;
pub mod filter;
pub mod grouping;
pub mod notifier;
pub mod render;
pub mod runner;
pub mod source;

pub use client_state::ClientState;
pub use controller::{ChannelState, FeedController, FeedEntry, LoadState};
pub use filter::FeedFilter;
pub use grouping::{bucket_for, group_by_recency, TimeBucket};
pub use notifier::{ConsoleNotifier, DesktopNotification, LogNotifier, Notifier};
pub use runner::{FeedHandle, SharedFeed};
pub use source::ActivitySource;
