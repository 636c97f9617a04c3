pub mod notification;
pub mod subscription;

pub use notification::NotificationPayload;
pub use subscription::{ChannelKeys, Subscription, SubscriptionKind};
