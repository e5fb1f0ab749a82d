use std::sync::{ Arc, Mutex, MutexGuard };
use aimp::{ ControlPanelState, MessageCatalog, PlayerState, Playlist, PlaylistEntry, PlaylistId, TrackDescription };

use super::reducers::{ self, AppAction };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewType {
  #[default]
  Startup,
  Control,
}

#[derive(Debug, Default)]
pub struct AppState {
  pub view: ViewType,
  pub endpoint: String,
  /// Latest snapshot of the synchronizer's state cache.
  pub player: PlayerState,
  /// Formatted title and the track it was rendered for.
  pub track_title: Option<(TrackDescription, String)>,
  pub playlists: Vec<Playlist>,
  pub selected_playlist: Option<usize>,
  /// Entries and the playlist they belong to.
  pub entries: Option<(PlaylistId, Vec<PlaylistEntry>)>,
  /// Bumped every time `entries` is replaced.
  pub entries_version: u64,
  /// Revision the current `playlists` were loaded at.
  pub loaded_revision: Option<u64>,
  pub status_message: String,
}

impl AppState {
  pub fn selected_playlist_id(&self) -> Option<PlaylistId> {
    self.selected_playlist
      .and_then(|index| self.playlists.get(index))
      .and_then(|playlist| playlist.id)
  }

  pub fn control_panel(&self) -> Option<&ControlPanelState> {
    self.player.control_panel.as_ref()
  }

  /// Bumped by the synchronizer whenever playlists content changed.
  pub fn playlists_revision(&self) -> u64 {
    self.player.playlists_revision
  }

  pub fn current_track(&self) -> Option<TrackDescription> {
    if self.player.is_playback_active() {
      self.player.current_track()
    } else {
      None
    }
  }

  pub fn title_for(&self, track: TrackDescription) -> Option<&str> {
    match &self.track_title {
      Some((titled, title)) if *titled == track => Some(title.as_str()),
      _ => None,
    }
  }

  pub fn entries_of(&self, playlist_id: PlaylistId) -> Option<&[PlaylistEntry]> {
    match &self.entries {
      Some((id, entries)) if *id == playlist_id => Some(entries.as_slice()),
      _ => None,
    }
  }
}

pub struct Store {
  state: Arc<Mutex<AppState>>,
  catalog: Arc<MessageCatalog>,
}

impl Store {
  pub fn new(endpoint: impl Into<String>, catalog: MessageCatalog) -> Self {
    let state = AppState {
      endpoint: endpoint.into(),
      ..AppState::default()
    };
    Self {
      state: Arc::new(Mutex::new(state)),
      catalog: Arc::new(catalog),
    }
  }

  pub fn dispatch(&self, action: AppAction) {
    let mut state = self.lock();
    reducers::app_reducer(&mut state, action);
  }

  pub fn with_state<F, T>(&self, f: F) -> T
  where
    F: FnOnce(&AppState) -> T
  {
    let state = self.lock();
    f(&state)
  }

  pub fn catalog(&self) -> &MessageCatalog {
    &self.catalog
  }

  /// A panic inside a reducer must not take the UI down with it.
  fn lock(&self) -> MutexGuard<'_, AppState> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}
