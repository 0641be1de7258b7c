use log::debug;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::activity::Activity;

const CHANNEL_CAPACITY: usize = 256;

/// Outcome of the subscribe handshake, mirroring the statuses a hosted
/// realtime service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeStatus {
    Subscribed,
    ChannelError,
    TimedOut,
    Closed,
}

/// How the hub answers subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubMode {
    /// Handshakes succeed and inserts are delivered.
    Online,
    /// Handshakes fail straight away, e.g. when writers live in another process.
    Offline,
    /// Handshakes never answer; subscribers must time out on their own.
    Unresponsive,
}

/// What a subscription yields after the handshake.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Inserted(Activity),
    Lagged(u64),
    Closed,
}

/// Broadcasts insert events of one table to every live subscription.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    table: &'static str,
    sender: broadcast::Sender<Activity>,
    mode: HubMode,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::with_mode(HubMode::Online)
    }

    pub fn offline() -> Self {
        Self::with_mode(HubMode::Offline)
    }

    pub fn with_mode(mode: HubMode) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            table: "activities",
            sender,
            mode,
        }
    }

    /// Sends an insert event; returns how many subscriptions received it.
    pub fn publish(&self, activity: &Activity) -> usize {
        match self.sender.send(activity.clone()) {
            Ok(receivers) => {
                debug!("Published {} insert {} to {} subscribers", self.table, activity.id, receivers);
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            channel: format!("{}-realtime", self.table),
            receiver: self.sender.subscribe(),
            mode: self.mode,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One subscriber's view of the insert stream. Events published after
/// [`RealtimeHub::subscribe`] are buffered until read.
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    receiver: broadcast::Receiver<Activity>,
    mode: HubMode,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub async fn handshake(&mut self) -> SubscribeStatus {
        match self.mode {
            HubMode::Online => SubscribeStatus::Subscribed,
            HubMode::Offline => SubscribeStatus::ChannelError,
            HubMode::Unresponsive => std::future::pending().await,
        }
    }

    pub async fn recv(&mut self) -> Delivery {
        match self.receiver.recv().await {
            Ok(activity) => Delivery::Inserted(activity),
            Err(RecvError::Lagged(skipped)) => Delivery::Lagged(skipped),
            Err(RecvError::Closed) => Delivery::Closed,
        }
    }
}
