use std::time::Duration;
use uuid::Uuid;

/// Player events the plugin lets a client subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    /// Player switched to playing, paused or stopped
    PlayStateChange,
    /// Player switched track
    CurrentTrackChange,
    /// Playback state, mute, shuffle, repeat or volume changed
    ControlPanelStateChange,
    /// Content of one or more playlists changed
    PlaylistsContentChange,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::PlayStateChange,
        EventType::CurrentTrackChange,
        EventType::ControlPanelStateChange,
        EventType::PlaylistsContentChange,
    ];

    /// Event name sent as the `event` parameter of `subscribe`
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PlayStateChange => "play_state_change",
            EventType::CurrentTrackChange => "current_track_change",
            EventType::ControlPanelStateChange => "control_panel_state_change",
            EventType::PlaylistsContentChange => "playlists_content_change",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one subscription loop in logs and lifecycle callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for the state synchronizer
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Events to keep a subscription loop running for
    pub events: Vec<EventType>,
    /// Pause before re-subscribing after a failed subscription
    pub retry_delay: Duration,
    /// Fetch the control panel state once before the loops start
    pub initial_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            events: vec![
                EventType::ControlPanelStateChange,
                EventType::PlayStateChange,
                EventType::PlaylistsContentChange,
            ],
            retry_delay: Duration::from_secs(1),
            initial_sync: true,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Control panel updates only, no initial fetch and no retry pause
    pub fn minimal() -> Self {
        Self {
            events: vec![EventType::ControlPanelStateChange],
            retry_delay: Duration::ZERO,
            initial_sync: false,
        }
    }

    /// Every event the plugin supports
    pub fn comprehensive() -> Self {
        Self {
            events: EventType::ALL.to_vec(),
            ..Self::default()
        }
    }

    /// Set the subscribed events; duplicates are dropped
    pub fn with_events(mut self, events: &[EventType]) -> Self {
        self.events.clear();
        for event in events {
            if !self.events.contains(event) {
                self.events.push(*event);
            }
        }
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Result<Self, String> {
        if delay > Duration::from_secs(300) {
            return Err("Retry delay too long (max 5 minutes)".to_string());
        }
        self.retry_delay = delay;
        Ok(self)
    }

    pub fn with_initial_sync(mut self, enabled: bool) -> Self {
        self.initial_sync = enabled;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.events.is_empty() {
            return Err("At least one event must be subscribed".to_string());
        }
        for (i, event) in self.events.iter().enumerate() {
            if self.events[..i].contains(event) {
                return Err(format!("Event {} is listed more than once", event));
            }
        }
        if self.retry_delay > Duration::from_secs(300) {
            return Err("Retry delay too long (max 5 minutes)".to_string());
        }
        Ok(())
    }
}
