pub mod builder;
pub mod interface;
pub mod notification;
pub mod subscription;
pub mod types;

pub use builder::{ActiveSynchronizer, SynchronizerBuilder};
pub use interface::{FailureSource, LifecycleHandlers, SyncError, SyncFailure, SyncStats};
pub use notification::Notification;
pub use types::{EventType, SubscriptionId, SyncConfig};
