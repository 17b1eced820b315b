//! Push subscriptions and notification jobs

pub mod jobs;
pub mod payload;
pub mod relay;
pub mod store;

pub use jobs::{BroadcastReport, DeadlineReport, DeliveryStats, NotifyReport, NotifyService};
pub use payload::NotificationPayload;
pub use relay::{DeliveryError, LogNotifier, Notifier, RelayNotifier};
pub use store::{MemorySubscriptionStore, PushSubscription, SubscriptionStore};
