use aimp::{PlayerState, Playlist, PlaylistEntry, PlaylistId, TrackDescription};

use super::store::{AppState, ViewType};

#[derive(Debug)]
pub enum AppAction {
    /// Snapshot of the synchronizer's state cache, taken after a notification was applied.
    PlayerStateChanged(PlayerState),
    SetPlaylists {
        revision: u64,
        playlists: Vec<Playlist>,
    },
    SelectNextPlaylist,
    SetEntries(PlaylistId, Vec<PlaylistEntry>),
    SetTrackTitle(TrackDescription, String),
    SetStatusMessage(String),
}

pub fn app_reducer(state: &mut AppState, action: AppAction) {
    match action {
        AppAction::PlayerStateChanged(player) => {
            // Loops deliver concurrently; an older snapshot may arrive last.
            if player.revision < state.player.revision {
                log::debug!(
                    "Dropping player state at revision {}, already at {}",
                    player.revision,
                    state.player.revision
                );
                return;
            }
            if state.view == ViewType::Startup && player.control_panel.is_some() {
                log::debug!("First control panel state received, switching to Control view");
                state.view = ViewType::Control;
            }
            state.player = player;
        }
        AppAction::SetPlaylists {
            revision,
            playlists,
        } => {
            log::debug!(
                "SetPlaylists action received: {} playlists at revision {}",
                playlists.len(),
                revision
            );
            let previous = state.selected_playlist_id();
            state.selected_playlist = previous
                .and_then(|id| playlists.iter().position(|p| p.id == Some(id)))
                .or(if playlists.is_empty() { None } else { Some(0) });
            state.playlists = playlists;
            state.loaded_revision = Some(revision);
        }
        AppAction::SelectNextPlaylist => {
            if !state.playlists.is_empty() {
                let next = state
                    .selected_playlist
                    .map_or(0, |index| (index + 1) % state.playlists.len());
                state.selected_playlist = Some(next);
            }
        }
        AppAction::SetEntries(playlist_id, entries) => {
            // Late answers for a playlist that is no longer selected are dropped.
            if state.selected_playlist_id() == Some(playlist_id) {
                state.entries = Some((playlist_id, entries));
                state.entries_version += 1;
            }
        }
        AppAction::SetTrackTitle(track, title) => {
            state.track_title = Some((track, title));
        }
        AppAction::SetStatusMessage(message) => {
            state.status_message = message;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimp::models::{PlayStateChange, PlaylistsContentChange};
    use aimp::{
        ControlPanelState, Notification, PlaybackState, PlayingSource, StateCache, TrackId,
    };

    fn panel(state: PlaybackState) -> ControlPanelState {
        ControlPanelState {
            playback_state: state,
            track_position: Some(10),
            track_length: Some(200),
            playlist_id: PlaylistId(1),
            track_id: TrackId(3),
            volume: 40,
            ..ControlPanelState::default()
        }
    }

    fn playlist(id: i64, title: &str) -> Playlist {
        Playlist {
            id: Some(PlaylistId(id)),
            title: Some(title.to_string()),
            ..Playlist::default()
        }
    }

    /// Applies `notification` to `cache` and hands the snapshot to the reducer,
    /// the way the synchronizer's event handler does.
    fn notify(state: &mut AppState, cache: &StateCache, notification: Notification) {
        cache.apply(&notification);
        app_reducer(state, AppAction::PlayerStateChanged(cache.snapshot()));
    }

    fn playlists_content(changed: bool) -> Notification {
        Notification::PlaylistsContent(PlaylistsContentChange {
            playlists_changed: changed,
        })
    }

    #[test]
    fn test_first_control_panel_switches_view() {
        let mut state = AppState::default();
        let cache = StateCache::new();
        assert_eq!(state.view, ViewType::Startup);

        notify(&mut state, &cache, playlists_content(true));
        assert_eq!(state.view, ViewType::Startup);

        notify(&mut state, &cache, Notification::ControlPanel(panel(PlaybackState::Paused)));

        assert_eq!(state.view, ViewType::Control);
        assert_eq!(state.control_panel().map(|p| p.volume), Some(40));
    }

    #[test]
    fn test_play_state_change_leaves_panel_untouched() {
        let mut state = AppState::default();
        let cache = StateCache::new();
        let paused = panel(PlaybackState::Paused);
        notify(&mut state, &cache, Notification::ControlPanel(paused.clone()));

        notify(
            &mut state,
            &cache,
            Notification::PlayState(PlayStateChange {
                playback_state: PlaybackState::Stopped,
                track_position: None,
                track_length: None,
            }),
        );

        assert_eq!(state.control_panel(), Some(&paused));
        assert_eq!(state.player.playback_state(), Some(PlaybackState::Stopped));
        assert_eq!(state.player.progress(), None);
        assert_eq!(state.current_track(), None);
    }

    #[test]
    fn test_later_panel_wins_over_earlier_play_state() {
        let mut state = AppState::default();
        let cache = StateCache::new();
        notify(
            &mut state,
            &cache,
            Notification::PlayState(PlayStateChange {
                playback_state: PlaybackState::Playing,
                track_position: Some(150),
                track_length: Some(200),
            }),
        );

        let mut next = panel(PlaybackState::Playing);
        next.track_position = Some(0);
        next.track_length = Some(300);
        notify(&mut state, &cache, Notification::ControlPanel(next));

        assert_eq!(state.player.progress(), Some((0, 300)));
    }

    #[test]
    fn test_current_track_change() {
        let mut state = AppState::default();
        let cache = StateCache::new();
        notify(&mut state, &cache, Notification::ControlPanel(panel(PlaybackState::Playing)));

        notify(
            &mut state,
            &cache,
            Notification::CurrentTrack(PlayingSource {
                playlist_id: PlaylistId(2),
                track_id: TrackId(9),
            }),
        );

        assert_eq!(state.current_track(), Some(TrackDescription::new(9, 2)));
        assert_eq!(state.control_panel().map(|p| p.track_id), Some(TrackId(3)));
    }

    #[test]
    fn test_only_changed_playlists_bump_revision() {
        let mut state = AppState::default();
        let cache = StateCache::new();

        notify(&mut state, &cache, playlists_content(false));
        assert_eq!(state.playlists_revision(), 0);

        notify(&mut state, &cache, playlists_content(true));
        notify(&mut state, &cache, playlists_content(false));
        assert_eq!(state.playlists_revision(), 1);
    }

    #[test]
    fn test_older_snapshot_is_dropped() {
        let mut state = AppState::default();
        let cache = StateCache::new();
        cache.apply(&Notification::ControlPanel(panel(PlaybackState::Paused)));
        let older = cache.snapshot();
        notify(&mut state, &cache, Notification::ControlPanel(panel(PlaybackState::Playing)));

        app_reducer(&mut state, AppAction::PlayerStateChanged(older));

        assert_eq!(state.player.playback_state(), Some(PlaybackState::Playing));
    }

    #[test]
    fn test_reloaded_playlists_keep_selection() {
        let mut state = AppState::default();
        app_reducer(
            &mut state,
            AppAction::SetPlaylists {
                revision: 0,
                playlists: vec![playlist(1, "Rock"), playlist(2, "Jazz")],
            },
        );
        assert_eq!(state.selected_playlist, Some(0));

        app_reducer(&mut state, AppAction::SelectNextPlaylist);
        assert_eq!(state.selected_playlist_id(), Some(PlaylistId(2)));

        app_reducer(
            &mut state,
            AppAction::SetPlaylists {
                revision: 1,
                playlists: vec![playlist(3, "New"), playlist(1, "Rock"), playlist(2, "Jazz")],
            },
        );
        assert_eq!(state.selected_playlist, Some(2));
        assert_eq!(state.loaded_revision, Some(1));

        app_reducer(&mut state, AppAction::SelectNextPlaylist);
        assert_eq!(state.selected_playlist, Some(0));
    }

    #[test]
    fn test_stale_entries_are_dropped() {
        let mut state = AppState::default();
        app_reducer(
            &mut state,
            AppAction::SetPlaylists {
                revision: 0,
                playlists: vec![playlist(1, "Rock"), playlist(2, "Jazz")],
            },
        );

        app_reducer(&mut state, AppAction::SetEntries(PlaylistId(2), vec![PlaylistEntry::default()]));
        assert!(state.entries.is_none());
        assert_eq!(state.entries_version, 0);

        app_reducer(&mut state, AppAction::SetEntries(PlaylistId(1), vec![PlaylistEntry::default()]));
        assert_eq!(state.entries_of(PlaylistId(1)).map(|e| e.len()), Some(1));
        assert_eq!(state.entries_version, 1);
    }

    #[test]
    fn test_track_title_is_bound_to_its_track() {
        let mut state = AppState::default();
        let track = TrackDescription::new(3, 1);
        app_reducer(&mut state, AppAction::SetTrackTitle(track, "Artist - Song".to_string()));

        assert_eq!(state.title_for(track), Some("Artist - Song"));
        assert_eq!(state.title_for(TrackDescription::new(4, 1)), None);
    }
}
