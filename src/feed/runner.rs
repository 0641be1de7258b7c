use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::controller::FeedController;
use super::notifier::{DesktopNotification, Notifier};
use super::source::ActivitySource;
use crate::config::FeedSettings;
use crate::realtime::{Delivery, RealtimeHub, SubscribeStatus};

pub type SharedFeed = Arc<Mutex<FeedController>>;

/// Owns a running feed task. Dropping the handle aborts the task, which
/// releases its subscription and poll timer.
pub struct FeedHandle {
    controller: SharedFeed,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub fn controller(&self) -> SharedFeed {
        Arc::clone(&self.controller)
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Feed task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts a task that loads the first page, follows `hub` and falls back to
/// polling `source` when the channel is unavailable.
pub fn spawn<S>(
    controller: FeedController,
    source: S,
    hub: &RealtimeHub,
    notifier: Box<dyn Notifier>,
    settings: FeedSettings,
) -> FeedHandle
where
    S: ActivitySource + Send + Sync + 'static,
{
    let controller = Arc::new(Mutex::new(controller));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let runner = FeedRunner {
        controller: Arc::clone(&controller),
        source,
        hub: hub.clone(),
        notifier,
        settings,
    };
    let task = tokio::spawn(runner.run(shutdown_rx));

    FeedHandle {
        controller,
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}

struct FeedRunner<S> {
    controller: SharedFeed,
    source: S,
    hub: RealtimeHub,
    notifier: Box<dyn Notifier>,
    settings: FeedSettings,
}

impl<S: ActivitySource + Send + Sync + 'static> FeedRunner<S> {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        // Subscribe before loading so inserts made during the load are buffered.
        let mut subscription = self.hub.subscribe();

        {
            let mut feed = self.controller.lock().await;
            if let Err(e) = feed.load_initial(&self.source) {
                error!("Failed to load activity feed: {:#}", e);
            }
            feed.connect();
        }

        let status = match time::timeout(self.settings.subscribe_timeout, subscription.handshake()).await {
            Ok(status) => status,
            Err(_) => SubscribeStatus::TimedOut,
        };
        info!("Subscription to {}: {:?}", subscription.channel(), status);
        self.controller.lock().await.on_channel_status(status);
        let mut live = status == SubscribeStatus::Subscribed;

        let period = self.settings.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Feed runner shutting down");
                    break;
                }
                delivery = subscription.recv(), if live => match delivery {
                    Delivery::Inserted(activity) => {
                        let notification = self.controller.lock().await.on_live_insert(activity);
                        self.deliver(notification);
                    }
                    Delivery::Lagged(skipped) => {
                        warn!("Feed lagged behind by {} activities, catching up", skipped);
                        self.poll().await;
                    }
                    Delivery::Closed => {
                        self.controller.lock().await.on_channel_status(SubscribeStatus::Closed);
                        live = false;
                    }
                },
                _ = ticker.tick(), if !live => {
                    self.poll().await;
                }
            }
        }
    }

    async fn poll(&mut self) {
        let result = self.controller.lock().await.poll(&self.source);
        match result {
            Ok(notifications) => self.deliver(notifications),
            Err(e) => error!("Failed to poll activities: {:#}", e),
        }
    }

    fn deliver(&mut self, notifications: impl IntoIterator<Item = DesktopNotification>) {
        for notification in notifications {
            self.notifier.notify(&notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use crate::activity::{events, MilestoneKind};
    use crate::database::{create_memory_pool, ActivityId, DataService};
    use crate::feed::{ChannelState, ClientState};
    use crate::realtime::HubMode;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        seen: Arc<StdMutex<Vec<DesktopNotification>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notification: &DesktopNotification) {
            self.seen.lock().unwrap().push(notification.clone());
        }
    }

    fn fast_settings() -> FeedSettings {
        FeedSettings {
            page_size: 10,
            poll_interval: Duration::from_millis(20),
            subscribe_timeout: Duration::from_millis(50),
        }
    }

    fn opted_in_feed() -> FeedController {
        let mut state = ClientState::ephemeral();
        state.set_notifications_enabled(true).unwrap();
        FeedController::new(fast_settings(), state)
    }

    async fn wait_for<F>(feed: &SharedFeed, check: F)
    where
        F: Fn(&FeedController) -> bool,
    {
        time::timeout(Duration::from_secs(5), async {
            loop {
                if check(&*feed.lock().await) {
                    return;
                }
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("feed did not reach the expected state");
    }

    fn ids(feed: &FeedController) -> Vec<ActivityId> {
        feed.entries().iter().map(|e| e.activity.id).collect()
    }

    #[tokio::test]
    async fn test_live_insert_reaches_feed_and_notifier() {
        let hub = RealtimeHub::new();
        let service = DataService::new(create_memory_pool().unwrap(), hub.clone());
        service.insert_activity(&events::milestone(MilestoneKind::Matches, 50)).unwrap();

        let notifier = RecordingNotifier::default();
        let handle = spawn(opted_in_feed(), service.clone(), &hub, Box::new(notifier.clone()), fast_settings());
        let feed = handle.controller();
        wait_for(&feed, |f| f.channel_state() == ChannelState::Live && f.entries().len() == 1).await;

        let stored = service.insert_activity(&events::milestone(MilestoneKind::Tournaments, 10)).unwrap();
        wait_for(&feed, |f| f.contains(stored.id)).await;

        assert_eq!(ids(&*feed.lock().await), vec![stored.id, 1]);
        let seen = notifier.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tag, stored.id.to_string());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_channel_error_falls_back_to_polling() {
        let hub = RealtimeHub::offline();
        let service = DataService::new(create_memory_pool().unwrap(), hub.clone());

        let handle = spawn(opted_in_feed(), service.clone(), &hub, Box::new(RecordingNotifier::default()), fast_settings());
        let feed = handle.controller();
        wait_for(&feed, |f| f.channel_state() == ChannelState::Polling).await;

        let stored = service.insert_activity(&events::milestone(MilestoneKind::Matches, 100)).unwrap();
        wait_for(&feed, |f| f.contains(stored.id)).await;
        assert!(feed.lock().await.entries()[0].is_new);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_unanswered_handshake_times_out_into_polling() {
        let hub = RealtimeHub::with_mode(HubMode::Unresponsive);
        let service = DataService::new(create_memory_pool().unwrap(), hub.clone());

        let handle = spawn(opted_in_feed(), service, &hub, Box::new(RecordingNotifier::default()), fast_settings());
        let feed = handle.controller();
        wait_for(&feed, |f| f.channel_state() == ChannelState::Polling).await;
    }

    #[tokio::test]
    async fn test_dropping_handle_releases_subscription() {
        let hub = RealtimeHub::new();
        let service = DataService::new(create_memory_pool().unwrap(), hub.clone());

        let handle = spawn(opted_in_feed(), service, &hub, Box::new(RecordingNotifier::default()), fast_settings());
        let feed = handle.controller();
        wait_for(&feed, |f| f.channel_state() == ChannelState::Live).await;
        assert_eq!(hub.subscriber_count(), 1);

        drop(handle);
        time::timeout(Duration::from_secs(5), async {
            while hub.subscriber_count() > 0 {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("subscription was not released");
    }
}
