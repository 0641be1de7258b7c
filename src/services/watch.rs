use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use log::info;

use crate::config::AppConfig;
use crate::database::{self, ActivityId, DataService};
use crate::feed::render::{render_entry, render_grouped};
use crate::feed::{runner, ChannelState, ClientState, ConsoleNotifier, FeedController, FeedFilter, SharedFeed};
use crate::realtime::RealtimeHub;

const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Follows the activity feed in the terminal until interrupted.
pub struct WatchService {
    config: AppConfig,
    filter: FeedFilter,
}

impl WatchService {
    pub fn new(config: AppConfig, filter: FeedFilter) -> Self {
        Self { config, filter }
    }

    pub async fn run(&self) -> Result<()> {
        let pool = database::create_pool(&self.config.storage.database_path)?;
        // Writers run in other processes, so no pushes reach this hub and the
        // feed falls back to polling the database.
        let hub = RealtimeHub::offline();
        let service = DataService::new(pool, hub.clone());

        let mut controller = FeedController::new(
            self.config.feed.clone(),
            ClientState::open(&self.config.storage.client_state_path)?,
        );
        controller.set_filter(self.filter);

        let handle = runner::spawn(
            controller,
            service,
            &hub,
            Box::new(ConsoleNotifier::new()),
            self.config.feed.clone(),
        );
        let feed = handle.controller();

        let mut printed = self.print_initial(&feed).await;
        info!("Watching activity feed ({}), press Ctrl-C to stop", self.filter);

        let mut refresh = tokio::time::interval(REFRESH_INTERVAL);
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = refresh.tick() => self.print_new(&feed, &mut printed).await,
            }
        }

        handle.shutdown().await;
        Ok(())
    }

    async fn print_initial(&self, feed: &SharedFeed) -> HashSet<ActivityId> {
        // The runner loads the first page before taking part in the channel handshake.
        loop {
            let controller = feed.lock().await;
            if controller.channel_state() != ChannelState::Disconnected {
                println!("{}", render_grouped(&controller, &Local::now()));
                return controller.entries().iter().map(|e| e.activity.id).collect();
            }
            drop(controller);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    async fn print_new(&self, feed: &SharedFeed, printed: &mut HashSet<ActivityId>) {
        let controller = feed.lock().await;
        let fresh: Vec<_> = controller
            .visible()
            .into_iter()
            .filter(|e| e.is_new && !printed.contains(&e.activity.id))
            .collect();

        // Oldest first so the terminal reads top to bottom.
        for entry in fresh.into_iter().rev() {
            printed.insert(entry.activity.id);
            println!("{} {}", "new".green().bold(), render_entry(entry, true));
        }
    }
}
