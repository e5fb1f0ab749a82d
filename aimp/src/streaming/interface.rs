use std::collections::HashMap;

use super::types::{EventType, SubscriptionId};
use crate::error::AimpError;

/// Error type for the public synchronizer interface
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("No tokio runtime available to run subscription loops")]
    NoRuntime,

    #[error("Subscription loop for {event} failed: {message}")]
    LoopFailed { event: EventType, message: String },

    #[error(transparent)]
    Player(#[from] AimpError),
}

/// Where a surfaced failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSource {
    /// The one-shot control panel fetch done at start
    InitialSync,
    /// A `subscribe` call of the loop for this event
    Subscription(EventType),
}

/// A failure reported to error handlers; loops carry on afterwards.
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub source: FailureSource,
    pub error: AimpError,
    /// Localized text ready for display
    pub message: String,
}

/// Lifecycle event handlers for subscription loops
#[derive(Default)]
pub struct LifecycleHandlers {
    /// Called when a loop starts waiting on its first notification
    pub on_loop_started: Option<Box<dyn Fn(EventType, SubscriptionId) + Send + Sync>>,

    /// Called when a loop exits after cancellation
    pub on_loop_stopped: Option<Box<dyn Fn(EventType, SubscriptionId) + Send + Sync>>,

    /// Called once every loop has been spawned
    pub on_sync_started: Option<Box<dyn Fn() + Send + Sync>>,
}

impl LifecycleHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loop_started<F>(mut self, handler: F) -> Self
    where
        F: Fn(EventType, SubscriptionId) + Send + Sync + 'static,
    {
        self.on_loop_started = Some(Box::new(handler));
        self
    }

    pub fn with_loop_stopped<F>(mut self, handler: F) -> Self
    where
        F: Fn(EventType, SubscriptionId) + Send + Sync + 'static,
    {
        self.on_loop_stopped = Some(Box::new(handler));
        self
    }

    pub fn with_sync_started<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_sync_started = Some(Box::new(handler));
        self
    }
}

/// Statistics about the current synchronizer session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Loops currently running
    pub active_loops: usize,

    /// Notifications received, per event
    pub notifications: HashMap<EventType, u64>,

    /// Failed subscribe calls, per event
    pub failures: HashMap<EventType, u64>,

    /// Whether the initial control panel fetch succeeded
    pub initial_sync_succeeded: bool,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active_loops > 0
    }

    pub fn total_notifications(&self) -> u64 {
        self.notifications.values().sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn notifications_for(&self, event: EventType) -> u64 {
        self.notifications.get(&event).copied().unwrap_or(0)
    }

    pub fn failures_for(&self, event: EventType) -> u64 {
        self.failures.get(&event).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_totals() {
        let mut stats = SyncStats::new();
        assert!(!stats.is_active());

        stats.notifications.insert(EventType::PlayStateChange, 3);
        stats.notifications.insert(EventType::ControlPanelStateChange, 2);
        stats.failures.insert(EventType::PlayStateChange, 1);
        stats.active_loops = 2;

        assert!(stats.is_active());
        assert_eq!(stats.total_notifications(), 5);
        assert_eq!(stats.total_failures(), 1);
        assert_eq!(stats.failures_for(EventType::CurrentTrackChange), 0);
    }

    #[test]
    fn test_error_conversion() {
        let err: SyncError = AimpError::Cancelled.into();
        assert!(matches!(err, SyncError::Player(AimpError::Cancelled)));
    }
}
