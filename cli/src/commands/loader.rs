use std::sync::Arc;

use aimp::{
    AimpProxy, EntriesQuery, EntryField, PlaylistField, PlaylistId, TrackDescription,
};
use tokio::runtime::Handle;

use crate::commands::failure_message;
use crate::state::reducers::AppAction;
use crate::state::store::Store;

pub const TITLE_FORMAT: &str = "%a - %T";

const PLAYLIST_FIELDS: [PlaylistField; 3] =
    [PlaylistField::Id, PlaylistField::Title, PlaylistField::EntriesCount];
const ENTRY_FIELDS: [EntryField; 4] =
    [EntryField::Id, EntryField::Title, EntryField::Artist, EntryField::Duration];
const ENTRIES_PAGE: usize = 1000;

/// Data the screen needs but the store does not hold yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Missing {
    /// Playlists revision to load.
    pub playlists: Option<u64>,
    /// Playlist to load entries of, keyed by the playlists revision they belong to.
    pub entries: Option<(PlaylistId, u64)>,
    pub title: Option<TrackDescription>,
}

impl Missing {
    pub fn of(store: &Store) -> Self {
        store.with_state(|state| Missing {
            playlists: (state.loaded_revision != Some(state.playlists_revision()))
                .then_some(state.playlists_revision()),
            entries: state
                .selected_playlist_id()
                .zip(state.loaded_revision),
            title: state
                .current_track()
                .filter(|track| state.title_for(*track).is_none()),
        })
    }
}

/// Fetches playlists, entries and track titles in the background.
///
/// Each piece is requested once per key; a failed load is retried only
/// when its key changes.
pub struct Loader {
    runtime: Handle,
    proxy: Arc<AimpProxy>,
    store: Arc<Store>,
    requested: Missing,
}

impl Loader {
    pub fn new(runtime: Handle, proxy: Arc<AimpProxy>, store: Arc<Store>) -> Self {
        Self {
            runtime,
            proxy,
            store,
            requested: Missing::default(),
        }
    }

    /// Starts loads for whatever changed since the last poll.
    pub fn poll(&mut self) {
        let missing = Missing::of(&self.store);

        if let Some(revision) = missing.playlists {
            if self.requested.playlists != Some(revision) {
                self.requested.playlists = Some(revision);
                let (proxy, store) = (self.proxy.clone(), self.store.clone());
                self.runtime
                    .spawn(async move { load_playlists(&proxy, &store, revision).await });
            }
        }

        if let Some(key) = missing.entries {
            if self.requested.entries != Some(key) {
                self.requested.entries = Some(key);
                let (proxy, store) = (self.proxy.clone(), self.store.clone());
                self.runtime
                    .spawn(async move { load_entries(&proxy, &store, key.0).await });
            }
        }

        if let Some(track) = missing.title {
            if self.requested.title != Some(track) {
                self.requested.title = Some(track);
                let (proxy, store) = (self.proxy.clone(), self.store.clone());
                self.runtime
                    .spawn(async move { load_title(&proxy, &store, track).await });
            }
        }
    }
}

pub async fn load_playlists(proxy: &AimpProxy, store: &Store, revision: u64) {
    match proxy.get_playlists(&PLAYLIST_FIELDS).await {
        Ok(playlists) => store.dispatch(AppAction::SetPlaylists {
            revision,
            playlists,
        }),
        Err(error) => {
            let reason = error.localized_message(proxy.catalog());
            log::warn!("Loading playlists failed: {}", reason);
            store.dispatch(AppAction::SetStatusMessage(failure_message(
                store.catalog(),
                "error_playlists_loading",
                &reason,
            )));
        }
    }
}

pub async fn load_entries(proxy: &AimpProxy, store: &Store, playlist_id: PlaylistId) {
    let query = EntriesQuery::new(playlist_id, &ENTRY_FIELDS).page(0, ENTRIES_PAGE);
    match proxy.get_playlist_entries(&query).await {
        Ok(page) => {
            log::debug!(
                "Loaded {} of {} entries of playlist {}",
                page.entries.len(),
                page.total_entries_count,
                playlist_id
            );
            store.dispatch(AppAction::SetEntries(playlist_id, page.entries));
        }
        Err(error) => {
            let reason = error.localized_message(proxy.catalog());
            log::warn!("Loading entries of playlist {} failed: {}", playlist_id, reason);
            store.dispatch(AppAction::SetStatusMessage(failure_message(
                store.catalog(),
                "error_playlist_entries_loading",
                &reason,
            )));
        }
    }
}

pub async fn load_title(proxy: &AimpProxy, store: &Store, track: TrackDescription) {
    match proxy.get_formatted_track_title(track, TITLE_FORMAT).await {
        Ok(title) => store.dispatch(AppAction::SetTrackTitle(track, title)),
        Err(error) => log::warn!(
            "Formatting title of track {} failed: {}",
            track.track_id,
            error.localized_message(proxy.catalog())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimp::{
        ControlPanelState, MessageCatalog, PlaybackState, PlayerState, ScriptedTransport, TrackId,
    };
    use serde_json::json;

    fn store() -> Store {
        Store::new("http://localhost:3333", MessageCatalog::english())
    }

    #[tokio::test]
    async fn test_load_playlists_decodes_positional_rows() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .with_reply("get_playlists", json!([[1, "Rock", 10], [2, "Jazz", 3]])),
        );
        let proxy = AimpProxy::new(transport.clone());
        let store = store();

        load_playlists(&proxy, &store, 0).await;

        store.with_state(|state| {
            assert_eq!(state.playlists.len(), 2);
            assert_eq!(state.playlists[1].title.as_deref(), Some("Jazz"));
            assert_eq!(state.playlists[0].entries_count, Some(10));
            assert_eq!(state.selected_playlist_id(), Some(PlaylistId(1)));
            assert_eq!(state.loaded_revision, Some(0));
        });
        assert_eq!(
            transport.calls()[0].params,
            json!({ "fields": ["id", "title", "entries_count"] })
        );
    }

    #[tokio::test]
    async fn test_failed_playlists_load_reports_status() {
        let transport = Arc::new(ScriptedTransport::new().with_fault("get_playlists", 7, "boom"));
        let proxy = AimpProxy::new(transport);
        let store = store();

        load_playlists(&proxy, &store, 0).await;

        store.with_state(|state| {
            assert!(state.loaded_revision.is_none());
            assert_eq!(
                state.status_message,
                "Can't get list of playlists. Reason: Internal plugin error"
            );
        });
    }

    #[tokio::test]
    async fn test_load_entries_of_selected_playlist() {
        let transport = Arc::new(ScriptedTransport::new().with_reply(
            "get_playlist_entries",
            json!({
                "total_entries_count": 2,
                "entries": [[5, "Song", "Band", 181000], [6, "Other", "Band", 62000]]
            }),
        ));
        let proxy = AimpProxy::new(transport.clone());
        let store = store();
        store.dispatch(AppAction::SetPlaylists {
            revision: 0,
            playlists: vec![aimp::Playlist {
                id: Some(PlaylistId(4)),
                ..Default::default()
            }],
        });

        load_entries(&proxy, &store, PlaylistId(4)).await;

        store.with_state(|state| {
            let entries = state.entries_of(PlaylistId(4)).unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].id, Some(TrackId(5)));
            assert_eq!(entries[1].duration, Some(62000));
        });
        let params = &transport.calls()[0].params;
        assert_eq!(params["playlist_id"], 4);
        assert_eq!(params["fields"], json!(["id", "title", "artist", "duration"]));
    }

    #[tokio::test]
    async fn test_load_title_uses_default_format() {
        let transport = Arc::new(ScriptedTransport::new().with_reply(
            "get_formatted_entry_title",
            json!({ "formatted_string": "Band - Song" }),
        ));
        let proxy = AimpProxy::new(transport.clone());
        let store = store();
        let track = TrackDescription::new(5, 4);

        load_title(&proxy, &store, track).await;

        assert_eq!(store.with_state(|s| s.title_for(track).map(str::to_string)), Some("Band - Song".to_string()));
        assert_eq!(transport.calls()[0].params["format_string"], "%a - %T");
    }

    #[test]
    fn test_missing_tracks_what_the_store_lacks() {
        let store = store();
        assert_eq!(
            Missing::of(&store),
            Missing {
                playlists: Some(0),
                entries: None,
                title: None,
            }
        );

        store.dispatch(AppAction::SetPlaylists {
            revision: 0,
            playlists: vec![aimp::Playlist {
                id: Some(PlaylistId(1)),
                ..Default::default()
            }],
        });
        store.dispatch(AppAction::PlayerStateChanged(PlayerState {
            control_panel: Some(ControlPanelState {
                playback_state: PlaybackState::Playing,
                playlist_id: PlaylistId(1),
                track_id: TrackId(2),
                ..Default::default()
            }),
            playlists_revision: 1,
            revision: 2,
            ..PlayerState::default()
        }));

        assert_eq!(
            Missing::of(&store),
            Missing {
                playlists: Some(1),
                entries: Some((PlaylistId(1), 0)),
                title: Some(TrackDescription::new(2, 1)),
            }
        );
    }
}
