use std::sync::{Arc, RwLock};

use crate::models::{
    ControlPanelState, PlayStateChange, PlaybackState, PlayingSource, TrackDescription,
};
use crate::streaming::Notification;

/// Everything the client knows about the player.
///
/// `play_state` and `playing` hold reports newer than `control_panel`; a new
/// control panel snapshot supersedes and clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub control_panel: Option<ControlPanelState>,
    pub play_state: Option<PlayStateChange>,
    pub playing: Option<PlayingSource>,
    /// Bumped whenever the plugin reports changed playlist content.
    pub playlists_revision: u64,
    /// Bumped on every change of this state.
    pub revision: u64,
}

impl PlayerState {
    pub fn playback_state(&self) -> Option<PlaybackState> {
        match (&self.play_state, &self.control_panel) {
            (Some(change), _) => Some(change.playback_state),
            (None, Some(panel)) => Some(panel.playback_state),
            (None, None) => None,
        }
    }

    pub fn is_playback_active(&self) -> bool {
        matches!(
            self.playback_state(),
            Some(PlaybackState::Playing | PlaybackState::Paused)
        )
    }

    /// Position and length in seconds, from the freshest report.
    pub fn progress(&self) -> Option<(u32, u32)> {
        match (&self.play_state, &self.control_panel) {
            (Some(change), _) => change.track_position.zip(change.track_length),
            (None, Some(panel)) => panel.progress(),
            (None, None) => None,
        }
    }

    pub fn current_track(&self) -> Option<TrackDescription> {
        self.playing
            .map(|source| TrackDescription {
                track_id: source.track_id,
                playlist_id: source.playlist_id,
            })
            .or_else(|| self.control_panel.as_ref().map(|panel| panel.current_track()))
    }

    /// Folds a notification in; returns whether anything changed.
    pub fn apply(&mut self, notification: &Notification) -> bool {
        match notification {
            Notification::ControlPanel(panel) => {
                let changed = self.control_panel.as_ref() != Some(panel)
                    || self.play_state.is_some()
                    || self.playing.is_some();
                self.control_panel = Some(panel.clone());
                self.play_state = None;
                self.playing = None;
                changed
            }
            Notification::PlayState(change) => {
                if self.play_state.as_ref() == Some(change) {
                    return false;
                }
                self.play_state = Some(change.clone());
                true
            }
            Notification::CurrentTrack(source) => {
                if self.playing == Some(*source) {
                    return false;
                }
                self.playing = Some(*source);
                true
            }
            Notification::PlaylistsContent(change) => {
                if change.playlists_changed {
                    self.playlists_revision += 1;
                }
                change.playlists_changed
            }
        }
    }
}

/// Shared, thread-safe player state kept current by the synchronizer.
///
/// Every update replaces the affected part as a whole, so applying the same
/// notification twice leaves the same state.
#[derive(Debug, Clone, Default)]
pub struct StateCache {
    state: Arc<RwLock<PlayerState>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state
            .read()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    pub fn control_panel(&self) -> Option<ControlPanelState> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.control_panel.clone())
    }

    pub fn current_track(&self) -> Option<TrackDescription> {
        self.state.read().ok()?.current_track()
    }

    pub fn playlists_revision(&self) -> u64 {
        self.state
            .read()
            .map(|state| state.playlists_revision)
            .unwrap_or(0)
    }

    pub fn revision(&self) -> u64 {
        self.state.read().map(|state| state.revision).unwrap_or(0)
    }

    /// Replace the control panel snapshot; returns whether the state changed.
    pub fn replace_control_panel(&self, panel: ControlPanelState) -> bool {
        self.apply(&Notification::ControlPanel(panel))
    }

    /// Mark playlists as changed so views reload them.
    pub fn mark_playlists_dirty(&self) {
        self.update(|state| {
            state.playlists_revision += 1;
            true
        });
    }

    /// Fold a notification into the state; returns whether anything changed.
    pub fn apply(&self, notification: &Notification) -> bool {
        self.update(|state| state.apply(notification))
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.write() {
            *state = PlayerState::default();
        }
    }

    fn update<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut PlayerState) -> bool,
    {
        if let Ok(mut state) = self.state.write() {
            if change(&mut state) {
                state.revision += 1;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlaybackState, PlaylistId, PlaylistsContentChange, TrackId};

    fn panel(volume: u8) -> ControlPanelState {
        ControlPanelState {
            playback_state: PlaybackState::Playing,
            track_position: Some(10),
            track_length: Some(200),
            playlist_id: PlaylistId(1),
            track_id: TrackId(3),
            volume,
            mute_mode_on: false,
            repeat_mode_on: false,
            shuffle_mode_on: true,
        }
    }

    #[test]
    fn test_control_panel_is_replaced_wholesale() {
        let cache = StateCache::new();
        cache.apply(&Notification::ControlPanel(panel(40)));

        let mut next = panel(60);
        next.track_position = None;
        next.shuffle_mode_on = false;
        cache.apply(&Notification::ControlPanel(next.clone()));

        assert_eq!(cache.control_panel(), Some(next));
    }

    #[test]
    fn test_applying_same_notification_twice_is_idempotent() {
        let cache = StateCache::new();
        let notification = Notification::ControlPanel(panel(40));

        assert!(cache.apply(&notification));
        let once = cache.snapshot();
        assert!(!cache.apply(&notification));

        assert_eq!(cache.snapshot(), once);
    }

    #[test]
    fn test_playlists_change_bumps_revision() {
        let cache = StateCache::new();
        let changed = Notification::PlaylistsContent(PlaylistsContentChange {
            playlists_changed: true,
        });
        let unchanged = Notification::PlaylistsContent(PlaylistsContentChange {
            playlists_changed: false,
        });

        assert!(cache.apply(&changed));
        assert!(!cache.apply(&unchanged));
        assert_eq!(cache.playlists_revision(), 1);
    }

    #[test]
    fn test_current_track_prefers_latest_change() {
        let cache = StateCache::new();
        cache.apply(&Notification::ControlPanel(panel(40)));
        assert_eq!(cache.current_track().map(|s| s.track_id), Some(TrackId(3)));

        cache.apply(&Notification::CurrentTrack(PlayingSource {
            playlist_id: PlaylistId(2),
            track_id: TrackId(8),
        }));
        assert_eq!(cache.current_track(), Some(TrackDescription::new(8, 2)));

        cache.apply(&Notification::ControlPanel(panel(40)));
        assert_eq!(cache.current_track(), Some(TrackDescription::new(3, 1)));
    }

    #[test]
    fn test_progress_prefers_play_state() {
        let cache = StateCache::new();
        cache.apply(&Notification::ControlPanel(panel(40)));
        assert_eq!(cache.snapshot().progress(), Some((10, 200)));

        cache.apply(&Notification::PlayState(PlayStateChange {
            playback_state: PlaybackState::Playing,
            track_position: Some(11),
            track_length: Some(200),
        }));
        assert_eq!(cache.snapshot().progress(), Some((11, 200)));
    }

    #[test]
    fn test_control_panel_supersedes_earlier_play_state() {
        let cache = StateCache::new();
        cache.apply(&Notification::PlayState(PlayStateChange {
            playback_state: PlaybackState::Playing,
            track_position: Some(150),
            track_length: Some(200),
        }));

        let mut next = panel(40);
        next.playback_state = PlaybackState::Paused;
        next.track_position = Some(0);
        next.track_length = Some(300);
        assert!(cache.apply(&Notification::ControlPanel(next.clone())));

        let state = cache.snapshot();
        assert_eq!(state.progress(), Some((0, 300)));
        assert_eq!(state.playback_state(), Some(PlaybackState::Paused));
        assert_eq!(state.play_state, None);
        assert_eq!(state.control_panel, Some(next));
    }

    #[test]
    fn test_same_panel_after_play_state_still_supersedes_it() {
        let cache = StateCache::new();
        cache.apply(&Notification::ControlPanel(panel(40)));
        cache.apply(&Notification::PlayState(PlayStateChange {
            playback_state: PlaybackState::Stopped,
            track_position: None,
            track_length: None,
        }));
        assert!(!cache.snapshot().is_playback_active());

        assert!(cache.apply(&Notification::ControlPanel(panel(40))));
        assert!(!cache.apply(&Notification::ControlPanel(panel(40))));
        assert!(cache.snapshot().is_playback_active());
        assert_eq!(cache.snapshot().progress(), Some((10, 200)));
    }

    #[test]
    fn test_clones_share_state() {
        let cache = StateCache::new();
        let other = cache.clone();
        cache.apply(&Notification::ControlPanel(panel(40)));
        assert_eq!(other.control_panel().map(|p| p.volume), Some(40));

        other.clear();
        assert!(cache.control_panel().is_none());
    }
}
