use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::interface::{FailureSource, LifecycleHandlers, SyncError, SyncFailure, SyncStats};
use super::notification::Notification;
use super::subscription::{record, Handlers, SubscriptionLoop};
use super::types::{EventType, SubscriptionId, SyncConfig};
use crate::proxy::AimpProxy;
use crate::state::StateCache;

/// Builder for the state synchronizer.
///
/// The synchronizer keeps one long-poll `subscribe` loop running per event,
/// folds every notification into a shared [`StateCache`] and then calls the
/// registered handlers.
///
/// # Example
///
/// ```rust,no_run
/// use aimp::{AimpProxy, ClientConfig, EventType, Notification, SynchronizerBuilder};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let proxy = AimpProxy::connect(&ClientConfig::from_env()?)?;
///
/// let sync = SynchronizerBuilder::new(proxy)
///     .with_events(&[EventType::ControlPanelStateChange, EventType::PlayStateChange])
///     .with_event_handler(|notification| {
///         if let Notification::ControlPanel(panel) = notification {
///             println!("volume {}", panel.volume);
///         }
///     })
///     .with_error_handler(|failure| eprintln!("{}", failure.message))
///     .start()
///     .await?;
///
/// // ... later
/// sync.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct SynchronizerBuilder {
    proxy: AimpProxy,
    config: SyncConfig,
    state_cache: Option<StateCache>,
    handlers: Handlers,
    parent_token: Option<CancellationToken>,
}

impl std::fmt::Debug for SynchronizerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynchronizerBuilder")
            .field("events", &self.config.events)
            .field("retry_delay", &self.config.retry_delay)
            .field("initial_sync", &self.config.initial_sync)
            .field("has_state_cache", &self.state_cache.is_some())
            .field("event_handlers_count", &self.handlers.notification.len())
            .field("error_handlers_count", &self.handlers.error.len())
            .finish()
    }
}

impl SynchronizerBuilder {
    /// Create a builder for the player behind `proxy`.
    ///
    /// Defaults:
    /// - the control panel, play state and playlists content events
    /// - a one second pause before re-subscribing after a failure
    /// - initial sync enabled
    /// - a fresh [`StateCache`] and no handlers
    ///
    /// # Arguments
    ///
    /// * `proxy` - Proxy used for the initial sync and every `subscribe` call
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aimp::{AimpProxy, ClientConfig, SynchronizerBuilder};
    ///
    /// let proxy = AimpProxy::connect(&ClientConfig::new("http://localhost:3333"))?;
    /// let builder = SynchronizerBuilder::new(proxy);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(proxy: AimpProxy) -> Self {
        Self {
            proxy,
            config: SyncConfig::default(),
            state_cache: None,
            handlers: Handlers::default(),
            parent_token: None,
        }
    }

    /// Replace the whole configuration, e.g. with [`SyncConfig::comprehensive`].
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose the events to subscribe to
    ///
    /// Duplicates are dropped so each event gets exactly one loop.
    ///
    /// # Arguments
    ///
    /// * `events` - Events to keep a long-poll open for
    ///
    /// # Returns
    ///
    /// Returns the builder instance for method chaining.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aimp::{AimpProxy, ClientConfig, EventType, SynchronizerBuilder};
    ///
    /// let proxy = AimpProxy::connect(&ClientConfig::new("http://localhost:3333"))?;
    /// let builder = SynchronizerBuilder::new(proxy).with_events(&[
    ///     EventType::CurrentTrackChange,
    ///     EventType::PlaylistsContentChange,
    /// ]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_events(mut self, events: &[EventType]) -> Self {
        self.config = self.config.with_events(events);
        self
    }

    /// Pause before re-subscribing after a failure. Zero re-subscribes at once.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Fetch the control panel state once before the loops start.
    pub fn with_initial_sync(mut self, enabled: bool) -> Self {
        self.config.initial_sync = enabled;
        self
    }

    /// Share an existing cache instead of creating a new one
    ///
    /// Every notification is applied to the cache before the event handlers
    /// run, so a handler reading the cache sees the state including that
    /// notification.
    ///
    /// # Arguments
    ///
    /// * `cache` - Cache to keep current; clones share the same state
    ///
    /// # Returns
    ///
    /// Returns the builder instance for method chaining.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aimp::{AimpProxy, ClientConfig, StateCache, SynchronizerBuilder};
    ///
    /// let proxy = AimpProxy::connect(&ClientConfig::new("http://localhost:3333"))?;
    /// let cache = StateCache::new();
    /// let reader = cache.clone();
    ///
    /// let builder = SynchronizerBuilder::new(proxy)
    ///     .with_state_cache(cache)
    ///     .with_event_handler(move |_| println!("progress {:?}", reader.snapshot().progress()));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_state_cache(mut self, cache: StateCache) -> Self {
        self.state_cache = Some(cache);
        self
    }

    /// Add a handler called after each notification has been applied to the state
    ///
    /// Handlers run in registration order on the loop's task; the loop
    /// re-subscribes only after they return. A panicking handler is logged and
    /// does not stop the loop.
    ///
    /// # Arguments
    ///
    /// * `handler` - Function receiving each decoded [`Notification`]
    ///
    /// # Returns
    ///
    /// Returns the builder instance for method chaining.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aimp::{AimpProxy, ClientConfig, Notification, SynchronizerBuilder};
    ///
    /// let proxy = AimpProxy::connect(&ClientConfig::new("http://localhost:3333"))?;
    /// let builder = SynchronizerBuilder::new(proxy).with_event_handler(|notification| {
    ///     if let Notification::CurrentTrack(source) = notification {
    ///         println!("now playing track {}", source.track_id);
    ///     }
    /// });
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.handlers.notification.push(Box::new(handler));
        self
    }

    /// Add a handler for every failed subscription and for a failed initial sync
    ///
    /// The failed loop keeps running: it waits for the retry delay and
    /// subscribes again.
    ///
    /// # Arguments
    ///
    /// * `handler` - Function receiving the [`SyncFailure`] with its localized message
    ///
    /// # Returns
    ///
    /// Returns the builder instance for method chaining.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aimp::{AimpProxy, ClientConfig, FailureSource, SynchronizerBuilder};
    ///
    /// let proxy = AimpProxy::connect(&ClientConfig::new("http://localhost:3333"))?;
    /// let builder = SynchronizerBuilder::new(proxy).with_error_handler(|failure| {
    ///     match failure.source {
    ///         FailureSource::InitialSync => eprintln!("initial sync: {}", failure.message),
    ///         FailureSource::Subscription(event) => eprintln!("{}: {}", event, failure.message),
    ///     }
    /// });
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SyncFailure) + Send + Sync + 'static,
    {
        self.handlers.error.push(Box::new(handler));
        self
    }

    /// Hooks called when a loop starts and stops.
    pub fn with_lifecycle_handlers(mut self, handlers: LifecycleHandlers) -> Self {
        self.handlers.lifecycle = handlers;
        self
    }

    /// Stop the loops when `token` is cancelled, in addition to [`ActiveSynchronizer::stop`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.parent_token = Some(token);
        self
    }

    /// Start synchronizing
    ///
    /// Runs the initial sync if enabled, then spawns one loop per event on the
    /// current tokio runtime. A failed initial sync is reported to the error
    /// handlers and does not prevent the loops from starting.
    ///
    /// # Returns
    ///
    /// Returns an [`ActiveSynchronizer`] handle, or an error if the
    /// configuration is invalid or no tokio runtime is running.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aimp::{AimpProxy, ClientConfig, SyncConfig, SynchronizerBuilder};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let proxy = AimpProxy::connect(&ClientConfig::new("http://localhost:3333"))?;
    /// let sync = SynchronizerBuilder::new(proxy)
    ///     .with_config(SyncConfig::comprehensive())
    ///     .start()
    ///     .await?;
    ///
    /// println!("subscribed to {:?}", sync.events());
    /// sync.stop().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(self) -> Result<ActiveSynchronizer, SyncError> {
        self.config
            .validate()
            .map_err(SyncError::ConfigurationError)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        let Self {
            proxy,
            config,
            state_cache,
            handlers,
            parent_token,
        } = self;

        let state = state_cache.unwrap_or_default();
        let handlers = Arc::new(handlers);
        let stats = Arc::new(Mutex::new(SyncStats::new()));
        let cancel = match parent_token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        if config.initial_sync {
            initial_sync(&proxy, &state, &handlers, &stats).await;
        }

        let mut loops = Vec::with_capacity(config.events.len());
        for event in &config.events {
            let id = SubscriptionId::new();
            let subscription = SubscriptionLoop {
                id,
                event: *event,
                proxy: proxy.clone(),
                state: state.clone(),
                handlers: handlers.clone(),
                stats: stats.clone(),
                retry_delay: config.retry_delay,
                cancel: cancel.clone(),
            };
            log::debug!("Spawning subscription loop {} for {}", id, event);
            loops.push(LoopHandle {
                event: *event,
                id,
                task: runtime.spawn(subscription.run()),
            });
        }

        if let Some(ref handler) = handlers.lifecycle.on_sync_started {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler();
            }));
            if result.is_err() {
                log::error!("Sync started handler panicked");
            }
        }
        log::info!("Synchronizer started with {} subscription loops", loops.len());

        Ok(ActiveSynchronizer {
            state,
            stats,
            cancel,
            loops,
        })
    }
}

async fn initial_sync(
    proxy: &AimpProxy,
    state: &StateCache,
    handlers: &Handlers,
    stats: &Mutex<SyncStats>,
) {
    match proxy.get_control_panel_state().await {
        Ok(panel) => {
            let notification = Notification::ControlPanel(panel);
            state.apply(&notification);
            record(stats, |stats| stats.initial_sync_succeeded = true);
            handlers.notify(&notification);
        }
        Err(error) => {
            let message = error.localized_message(proxy.catalog());
            log::warn!("Initial control panel fetch failed: {}", message);
            handlers.fail(&SyncFailure {
                source: FailureSource::InitialSync,
                error,
                message,
            });
        }
    }
}

struct LoopHandle {
    event: EventType,
    id: SubscriptionId,
    task: JoinHandle<()>,
}

/// Handle to running subscription loops.
///
/// Dropping it cancels the loops without waiting for them; call
/// [`stop`](Self::stop) to wait until every loop has exited.
pub struct ActiveSynchronizer {
    state: StateCache,
    stats: Arc<Mutex<SyncStats>>,
    cancel: CancellationToken,
    loops: Vec<LoopHandle>,
}

impl std::fmt::Debug for ActiveSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSynchronizer")
            .field("events", &self.events())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ActiveSynchronizer {
    pub fn state(&self) -> &StateCache {
        &self.state
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<EventType> {
        self.loops.iter().map(|handle| handle.event).collect()
    }

    pub fn subscription_ids(&self) -> Vec<(EventType, SubscriptionId)> {
        self.loops
            .iter()
            .map(|handle| (handle.event, handle.id))
            .collect()
    }

    /// `true` while at least one loop is still running.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.loops.iter().any(|handle| !handle.task.is_finished())
    }

    /// Token cancelled when the synchronizer stops.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel every loop, including ones blocked on an outstanding
    /// subscription, and wait for them to exit.
    pub async fn stop(mut self) -> Result<(), SyncError> {
        self.cancel.cancel();
        let mut outcome = Ok(());

        for handle in std::mem::take(&mut self.loops) {
            if let Err(err) = handle.task.await {
                log::error!("Subscription loop {} for {} failed: {}", handle.id, handle.event, err);
                if outcome.is_ok() {
                    outcome = Err(SyncError::LoopFailed {
                        event: handle.event,
                        message: err.to_string(),
                    });
                }
            }
        }

        log::info!("Synchronizer stopped");
        outcome
    }
}

impl Drop for ActiveSynchronizer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
