use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::interface::{FailureSource, LifecycleHandlers, SyncFailure, SyncStats};
use super::notification::Notification;
use super::types::{EventType, SubscriptionId};
use crate::error::{AimpError, Result};
use crate::proxy::AimpProxy;
use crate::state::StateCache;

pub(crate) type NotificationHandler = Box<dyn Fn(&Notification) + Send + Sync>;
pub(crate) type ErrorHandler = Box<dyn Fn(&SyncFailure) + Send + Sync>;

/// Handlers shared by every loop of one synchronizer.
#[derive(Default)]
pub(crate) struct Handlers {
    pub(crate) notification: Vec<NotificationHandler>,
    pub(crate) error: Vec<ErrorHandler>,
    pub(crate) lifecycle: LifecycleHandlers,
}

impl Handlers {
    pub(crate) fn notify(&self, notification: &Notification) {
        for (index, handler) in self.notification.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(notification);
            }));
            if result.is_err() {
                log::error!(
                    "Notification handler #{} panicked on {}",
                    index + 1,
                    notification.event_type()
                );
            }
        }
    }

    pub(crate) fn fail(&self, failure: &SyncFailure) {
        for (index, handler) in self.error.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(failure);
            }));
            if result.is_err() {
                log::error!("Error handler #{} panicked", index + 1);
            }
        }
    }

    fn loop_started(&self, event: EventType, id: SubscriptionId) {
        if let Some(ref handler) = self.lifecycle.on_loop_started {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(event, id);
            }));
            if result.is_err() {
                log::error!("Loop started handler panicked for {}", event);
            }
        }
    }

    fn loop_stopped(&self, event: EventType, id: SubscriptionId) {
        if let Some(ref handler) = self.lifecycle.on_loop_stopped {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(event, id);
            }));
            if result.is_err() {
                log::error!("Loop stopped handler panicked for {}", event);
            }
        }
    }
}

pub(crate) fn record<F>(stats: &Mutex<SyncStats>, update: F)
where
    F: FnOnce(&mut SyncStats),
{
    if let Ok(mut stats) = stats.lock() {
        update(&mut stats);
    }
}

/// Perpetual `subscribe(event)` cycle for one event.
///
/// The next subscription is issued only after the previous one completed
/// and its handlers returned, so at most one call per event is outstanding.
/// Failures are surfaced and never end the loop; only cancellation does.
pub(crate) struct SubscriptionLoop {
    pub(crate) id: SubscriptionId,
    pub(crate) event: EventType,
    pub(crate) proxy: AimpProxy,
    pub(crate) state: StateCache,
    pub(crate) handlers: Arc<Handlers>,
    pub(crate) stats: Arc<Mutex<SyncStats>>,
    pub(crate) retry_delay: Duration,
    pub(crate) cancel: CancellationToken,
}

impl SubscriptionLoop {
    pub(crate) async fn run(self) {
        log::info!("Subscription loop {} started for {}", self.id, self.event);
        record(&self.stats, |stats| stats.active_loops += 1);
        self.handlers.loop_started(self.event, self.id);

        loop {
            match self.next_notification().await {
                Ok(notification) => self.deliver(notification),
                Err(AimpError::Cancelled) => break,
                Err(err) => {
                    self.report(err);
                    if !self.pause_before_retry().await {
                        break;
                    }
                }
            }
        }

        record(&self.stats, |stats| {
            stats.active_loops = stats.active_loops.saturating_sub(1)
        });
        self.handlers.loop_stopped(self.event, self.id);
        log::info!("Subscription loop {} for {} stopped", self.id, self.event);
    }

    async fn next_notification(&self) -> Result<Notification> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AimpError::Cancelled),
            result = self.proxy.subscribe(self.event) => result,
        }
    }

    fn deliver(&self, notification: Notification) {
        log::debug!("{} notification: {:?}", self.event, notification);
        record(&self.stats, |stats| {
            *stats.notifications.entry(self.event).or_insert(0) += 1
        });

        if self.state.apply(&notification) {
            log::debug!("State updated to revision {}", self.state.revision());
        }
        self.handlers.notify(&notification);
    }

    fn report(&self, error: AimpError) {
        let message = error.localized_message(self.proxy.catalog());
        log::warn!("Subscription to {} failed: {}", self.event, message);
        record(&self.stats, |stats| {
            *stats.failures.entry(self.event).or_insert(0) += 1
        });

        self.handlers.fail(&SyncFailure {
            source: FailureSource::Subscription(self.event),
            error,
            message,
        });
    }

    /// Returns `false` when cancelled while waiting.
    async fn pause_before_retry(&self) -> bool {
        if self.retry_delay.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.retry_delay) => true,
        }
    }
}
