pub mod hub;

pub use hub::{Delivery, HubMode, RealtimeHub, SubscribeStatus, Subscription};
