use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use super::client_state::ClientState;
use super::filter::FeedFilter;
use super::grouping::{group_by_recency, TimeBucket};
use super::notifier::DesktopNotification;
use super::source::ActivitySource;
use crate::activity::Activity;
use crate::config::FeedSettings;
use crate::database::ActivityId;
use crate::realtime::SubscribeStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadState {
    Loading,
    Ready,
}

/// How new activities reach the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Live,
    Polling,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub activity: Activity,
    /// Arrived during this session and not yet marked read.
    pub is_new: bool,
}

/// The activity feed as a synchronous state machine. IO-free apart from the
/// [`ActivitySource`] reads and [`ClientState`] writes it is handed; timers
/// and the push channel are driven from outside (see `feed::runner`).
pub struct FeedController {
    settings: FeedSettings,
    client_state: ClientState,
    entries: Vec<FeedEntry>,
    ids: HashSet<ActivityId>,
    load_state: LoadState,
    channel_state: ChannelState,
    has_more: bool,
    filter: FeedFilter,
    poll_cursor: Option<DateTime<Utc>>,
}

impl FeedController {
    pub fn new(settings: FeedSettings, client_state: ClientState) -> Self {
        Self {
            settings,
            client_state,
            entries: Vec::new(),
            ids: HashSet::new(),
            load_state: LoadState::Loading,
            channel_state: ChannelState::Disconnected,
            has_more: false,
            filter: FeedFilter::All,
            poll_cursor: None,
        }
    }

    // --- Loading ---

    pub fn load_initial<S: ActivitySource + ?Sized>(&mut self, source: &S) -> Result<()> {
        self.load_state = LoadState::Loading;
        let page = source.fetch_page(0, self.settings.page_size)?;
        self.apply_initial_page(page);
        Ok(())
    }

    /// Replaces whatever was loaded with the first page.
    pub fn apply_initial_page(&mut self, page: Vec<Activity>) {
        self.has_more = page.len() == self.settings.page_size;
        self.entries.clear();
        self.ids.clear();
        for activity in page {
            self.advance_cursor(activity.created_at);
            self.push_back(activity);
        }

        if self.client_state.last_seen_activity().is_none() {
            if let Some(newest) = self.entries.first().map(|e| e.activity.id) {
                self.persist_watermark(newest);
            }
        }

        self.load_state = LoadState::Ready;
        info!("Loaded {} activities (more available: {})", self.entries.len(), self.has_more);
    }

    /// Appends the next page; returns how many activities were added.
    pub fn load_more<S: ActivitySource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        if !self.has_more {
            return Ok(0);
        }

        let page = source.fetch_page(self.entries.len(), self.settings.page_size)?;
        self.has_more = page.len() == self.settings.page_size;

        let before = self.entries.len();
        for activity in page {
            self.push_back(activity);
        }
        Ok(self.entries.len() - before)
    }

    // --- Live channel ---

    pub fn connect(&mut self) {
        self.channel_state = ChannelState::Connecting;
    }

    pub fn on_channel_status(&mut self, status: SubscribeStatus) {
        let next = match (self.channel_state, status) {
            (_, SubscribeStatus::Subscribed) => ChannelState::Live,
            (ChannelState::Connecting | ChannelState::Live, _) => ChannelState::Polling,
            (state, _) => state,
        };

        if next != self.channel_state {
            match next {
                ChannelState::Polling => warn!("Live updates unavailable ({:?}), polling instead", status),
                _ => info!("Feed channel {:?} -> {:?}", self.channel_state, next),
            }
            self.channel_state = next;
        }
    }

    /// A pushed insert. Returns a notification when the row was new to the feed
    /// and the user opted in.
    pub fn on_live_insert(&mut self, activity: Activity) -> Option<DesktopNotification> {
        self.prepend_new(activity)
    }

    // --- Polling ---

    pub fn poll<S: ActivitySource + ?Sized>(&mut self, source: &S) -> Result<Vec<DesktopNotification>> {
        let batch = source.fetch_since(self.poll_cursor)?;
        Ok(self.on_poll_batch(batch))
    }

    /// `batch` is oldest first; each row not yet present is prepended so the
    /// newest ends up at the front.
    pub fn on_poll_batch(&mut self, batch: Vec<Activity>) -> Vec<DesktopNotification> {
        let mut notifications = Vec::new();
        for activity in batch {
            self.advance_cursor(activity.created_at);
            notifications.extend(self.prepend_new(activity));
        }
        notifications
    }

    // --- Read tracking ---

    pub fn mark_all_read(&mut self) -> Result<()> {
        if let Some(newest) = self.entries.first().map(|e| e.activity.id) {
            self.client_state.set_last_seen_activity(newest)?;
        }
        for entry in &mut self.entries {
            entry.is_new = false;
        }
        Ok(())
    }

    pub fn is_unseen(&self, activity: &Activity) -> bool {
        self.client_state
            .last_seen_activity()
            .is_none_or(|watermark| activity.id > watermark)
    }

    pub fn unseen_count(&self) -> usize {
        self.entries.iter().filter(|e| self.is_unseen(&e.activity)).count()
    }

    // --- Views ---

    pub fn set_filter(&mut self, filter: FeedFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> FeedFilter {
        self.filter
    }

    /// Loaded entries that pass the current filter, newest first.
    pub fn visible(&self) -> Vec<&FeedEntry> {
        self.entries
            .iter()
            .filter(|e| self.filter.matches(e.activity.activity_type))
            .collect()
    }

    pub fn grouped<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<(TimeBucket, Vec<&FeedEntry>)> {
        group_by_recency(self.visible(), |e| e.activity.created_at, now)
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn contains(&self, id: ActivityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel_state
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn poll_cursor(&self) -> Option<DateTime<Utc>> {
        self.poll_cursor
    }

    pub fn client_state(&self) -> &ClientState {
        &self.client_state
    }

    // --- Helper Methods ---

    fn push_back(&mut self, activity: Activity) {
        if self.ids.insert(activity.id) {
            self.entries.push(FeedEntry {
                activity,
                is_new: false,
            });
        }
    }

    fn prepend_new(&mut self, activity: Activity) -> Option<DesktopNotification> {
        if !self.ids.insert(activity.id) {
            debug!("Activity {} already in feed, skipping", activity.id);
            return None;
        }

        let notification = self
            .opted_in()
            .then(|| DesktopNotification::from_activity(&activity));
        self.entries.insert(
            0,
            FeedEntry {
                activity,
                is_new: true,
            },
        );
        notification
    }

    /// Reads the opt-in from disk so `notifications on|off` in another
    /// process applies to the next arrival.
    fn opted_in(&mut self) -> bool {
        if let Err(e) = self.client_state.reload() {
            warn!("Failed to reload client state: {:#}", e);
        }
        self.client_state.notifications_enabled()
    }

    fn advance_cursor(&mut self, created_at: DateTime<Utc>) {
        if self.poll_cursor.is_none_or(|cursor| created_at > cursor) {
            self.poll_cursor = Some(created_at);
        }
    }

    fn persist_watermark(&mut self, id: ActivityId) {
        if let Err(e) = self.client_state.set_last_seen_activity(id) {
            warn!("Failed to store last seen activity {}: {:#}", id, e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{activity, activity_at, base};
    use super::*;
    use crate::activity::ActivityType::{MatchResult, Milestone, TournamentComplete, WinningStreak};
    use chrono::Duration;
    use std::cell::RefCell;

    /// In-memory history, stored newest first.
    struct FakeSource {
        rows: RefCell<Vec<Activity>>,
    }

    impl FakeSource {
        fn with_ids(ids: std::ops::RangeInclusive<i64>) -> Self {
            let mut rows: Vec<Activity> = ids.map(|id| activity(id, MatchResult)).collect();
            rows.reverse();
            Self { rows: RefCell::new(rows) }
        }

        fn insert(&self, activity: Activity) {
            self.rows.borrow_mut().insert(0, activity);
        }
    }

    impl ActivitySource for FakeSource {
        fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Activity>> {
            Ok(self.rows.borrow().iter().skip(offset).take(limit).cloned().collect())
        }

        fn fetch_since(&self, cursor: Option<DateTime<Utc>>) -> Result<Vec<Activity>> {
            let mut rows: Vec<Activity> = self
                .rows
                .borrow()
                .iter()
                .filter(|a| cursor.is_none_or(|c| a.created_at > c))
                .cloned()
                .collect();
            rows.reverse();
            Ok(rows)
        }
    }

    fn controller() -> FeedController {
        FeedController::new(FeedSettings::default(), ClientState::ephemeral())
    }

    fn ids(controller: &FeedController) -> Vec<ActivityId> {
        controller.entries().iter().map(|e| e.activity.id).collect()
    }

    #[test]
    fn test_initial_load_sets_watermark_and_pagination() {
        let source = FakeSource::with_ids(1..=25);
        let mut feed = controller();
        assert_eq!(feed.load_state(), LoadState::Loading);

        feed.load_initial(&source).unwrap();

        assert_eq!(feed.load_state(), LoadState::Ready);
        assert_eq!(feed.entries().len(), 10);
        assert_eq!(ids(&feed)[0], 25);
        assert!(feed.has_more());
        assert_eq!(feed.client_state().last_seen_activity(), Some(25));
        assert_eq!(feed.poll_cursor(), Some(activity(25, MatchResult).created_at));
        assert_eq!(feed.unseen_count(), 0);
    }

    #[test]
    fn test_initial_load_keeps_existing_watermark() {
        let source = FakeSource::with_ids(1..=5);
        let mut state = ClientState::ephemeral();
        state.set_last_seen_activity(3).unwrap();
        let mut feed = FeedController::new(FeedSettings::default(), state);

        feed.load_initial(&source).unwrap();

        assert_eq!(feed.client_state().last_seen_activity(), Some(3));
        assert!(!feed.has_more());
        assert_eq!(feed.unseen_count(), 2);
    }

    #[test]
    fn test_load_more_until_short_page() {
        let source = FakeSource::with_ids(1..=25);
        let mut feed = controller();
        feed.load_initial(&source).unwrap();

        assert_eq!(feed.load_more(&source).unwrap(), 10);
        assert!(feed.has_more());
        assert_eq!(feed.load_more(&source).unwrap(), 5);
        assert!(!feed.has_more());
        assert_eq!(feed.load_more(&source).unwrap(), 0);
        assert_eq!(ids(&feed), (1..=25).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_load_more_skips_rows_shifted_by_unseen_inserts() {
        let source = FakeSource::with_ids(1..=20);
        let mut feed = controller();
        feed.load_initial(&source).unwrap();

        // Stored but not yet delivered, so the next page starts one row early.
        source.insert(activity(21, MatchResult));

        assert_eq!(feed.load_more(&source).unwrap(), 9);
        assert_eq!(ids(&feed), (2..=20).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_channel_transitions() {
        let mut feed = controller();
        assert_eq!(feed.channel_state(), ChannelState::Disconnected);

        feed.connect();
        assert_eq!(feed.channel_state(), ChannelState::Connecting);
        feed.on_channel_status(SubscribeStatus::Subscribed);
        assert_eq!(feed.channel_state(), ChannelState::Live);
        feed.on_channel_status(SubscribeStatus::Closed);
        assert_eq!(feed.channel_state(), ChannelState::Polling);

        for status in [SubscribeStatus::ChannelError, SubscribeStatus::TimedOut] {
            let mut feed = controller();
            feed.connect();
            feed.on_channel_status(status);
            assert_eq!(feed.channel_state(), ChannelState::Polling);
        }
    }

    #[test]
    fn test_same_row_from_push_and_poll_appears_once() {
        let source = FakeSource::with_ids(1..=3);
        let mut feed = controller();
        feed.load_initial(&source).unwrap();

        let fresh = activity(4, MatchResult);
        source.insert(fresh.clone());
        feed.on_live_insert(fresh);
        feed.poll(&source).unwrap();

        assert_eq!(ids(&feed), vec![4, 3, 2, 1]);
        assert!(feed.entries()[0].is_new);
    }

    #[test]
    fn test_poll_batch_prepends_oldest_first() {
        let mut feed = controller();
        feed.apply_initial_page(vec![activity(1, MatchResult)]);

        feed.on_poll_batch(vec![activity(2, MatchResult), activity(3, WinningStreak)]);

        assert_eq!(ids(&feed), vec![3, 2, 1]);
        assert_eq!(feed.poll_cursor(), Some(activity(3, MatchResult).created_at));
        assert_eq!(feed.unseen_count(), 2);
    }

    #[test]
    fn test_notifications_only_when_enabled() {
        let mut feed = controller();
        feed.apply_initial_page(vec![]);
        assert_eq!(feed.on_live_insert(activity(1, MatchResult)), None);

        let mut state = ClientState::ephemeral();
        state.set_notifications_enabled(true).unwrap();
        let mut feed = FeedController::new(FeedSettings::default(), state);
        feed.apply_initial_page(vec![]);

        let notification = feed.on_live_insert(activity(2, MatchResult)).unwrap();
        assert_eq!(notification.tag, "2");
        assert_eq!(notification.title, "⚔️ activity 2");
        assert_eq!(notification.body, "details 2");
        assert_eq!(feed.on_live_insert(activity(2, MatchResult)), None);
        assert_eq!(feed.on_poll_batch(vec![activity(2, MatchResult)]), vec![]);
    }

    #[test]
    fn test_opt_in_changed_elsewhere_applies_to_next_arrival() {
        let path = std::env::temp_dir()
            .join(format!("match_tracker_feed_opt_in_{}", std::process::id()))
            .join("client.json");
        let _ = std::fs::remove_file(&path);

        let mut feed = FeedController::new(FeedSettings::default(), ClientState::open(&path).unwrap());
        feed.apply_initial_page(vec![]);
        assert_eq!(feed.on_live_insert(activity(1, MatchResult)), None);

        ClientState::open(&path).unwrap().set_notifications_enabled(true).unwrap();
        assert_eq!(feed.on_live_insert(activity(2, MatchResult)).unwrap().tag, "2");

        ClientState::open(&path).unwrap().set_notifications_enabled(false).unwrap();
        assert_eq!(feed.on_poll_batch(vec![activity(3, MatchResult)]), vec![]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_mark_all_read_moves_watermark_to_front() {
        let mut feed = controller();
        feed.apply_initial_page(vec![activity(1, MatchResult)]);
        feed.on_live_insert(activity(2, MatchResult));
        feed.on_live_insert(activity(3, MatchResult));
        assert_eq!(feed.unseen_count(), 2);

        feed.mark_all_read().unwrap();

        assert_eq!(feed.client_state().last_seen_activity(), Some(3));
        assert_eq!(feed.unseen_count(), 0);
        assert!(feed.entries().iter().all(|e| !e.is_new));
    }

    #[test]
    fn test_filter_applies_before_grouping() {
        let mut feed = controller();
        let now = base() + Duration::days(3);
        feed.apply_initial_page(vec![
            activity_at(4, TournamentComplete, now - Duration::hours(1)),
            activity_at(3, MatchResult, now - Duration::hours(2)),
            activity_at(2, Milestone, now - Duration::days(1)),
            activity_at(1, WinningStreak, now - Duration::days(30)),
        ]);

        feed.set_filter(FeedFilter::Matches);
        let groups = feed.grouped(&now);
        let shape: Vec<(TimeBucket, Vec<ActivityId>)> = groups
            .into_iter()
            .map(|(bucket, entries)| (bucket, entries.iter().map(|e| e.activity.id).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![(TimeBucket::Today, vec![3]), (TimeBucket::Earlier, vec![1])]
        );

        feed.set_filter(FeedFilter::Tournaments);
        assert_eq!(feed.visible().len(), 1);
    }
}
