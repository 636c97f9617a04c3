pub mod fanout;
pub mod models;

pub use fanout::{FanoutReport, Notifier};
pub use models::{ChannelKeys, NotificationPayload, Subscription, SubscriptionKind};
