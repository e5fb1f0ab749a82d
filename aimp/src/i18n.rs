use std::collections::HashMap;

use crate::error::{AimpError, Result};

const ENGLISH: &[(&str, &str)] = &[
    ("error_unknown", "Unknown error"),
    ("error_request_parsing", "Request parsing failed"),
    ("error_method_not_found", "Method not found"),
    ("error_type", "Type error"),
    ("error_index_range", "Index out of bounds"),
    ("error_object_access", "Object's member does not exist"),
    ("error_value_range", "Value out of range"),
    ("error_internal", "Internal plugin error"),
    ("error_wrong_argument", "Wrong argument"),
    ("error_playback_failed", "Playback failed"),
    ("error_shuffle_mode_set_failed", "Shuffle mode set failed"),
    ("error_repeat_mode_set_failed", "Repeat track mode set failed"),
    ("error_volume_out_of_range", "Volume level is out of range"),
    ("error_volume_set_failed", "Volume level set failed"),
    ("error_mute_set_failed", "Mute mode set failed"),
    ("error_enqueue_track_failed", "Enqueue track failed"),
    ("error_dequeue_track_failed", "Dequeue track failed"),
    ("error_playlist_not_found", "Playlist not found"),
    ("error_track_not_found", "Track not found"),
    ("error_album_cover_load_failed", "Album cover loading failed"),
    ("error_rating_set_failed", "Rating set failed"),
    ("error_status_set_failed", "Status set failed"),
    ("error_playlists_loading", "Can't get list of playlists"),
    ("error_playlist_entries_loading", "Can't get list of tracks"),
    ("error_play_playback", "Can't start playback"),
    ("error_stop_playback", "Can't stop playback"),
    ("error_pause_playback", "Can't pause playback"),
    ("error_play_previous_track", "Can't play previous track"),
    ("error_play_next_track", "Can't play next track"),
    ("error_volume_get", "Can't get volume level"),
    ("error_volume_set", "Can't set volume level"),
    ("error_mute_set", "Can't set mute mode"),
    ("error_shuffle_set", "Can't set shuffle mode"),
    ("error_repeat_set", "Can't set repeat mode"),
    ("error_get_control_panel_state", "Can't get info about state of AIMP control panel"),
    ("reason", "Reason"),
    ("reason_unknown", "Reason unknown"),
    ("playback_state_playing", "Playing"),
    ("playback_state_stopped", "Stopped"),
    ("playback_state_paused", "Paused"),
];

/// Table of user-facing strings for one language.
///
/// The English table is built in; other languages are overlays loaded from a
/// flat JSON object of `key -> text`, falling back to English for keys the
/// overlay does not define.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    language: String,
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn english() -> Self {
        Self {
            language: "en".to_string(),
            messages: ENGLISH
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect(),
        }
    }

    /// Builds a catalog for `language` from a JSON object layered over English.
    pub fn from_json(language: &str, json: &str) -> Result<Self> {
        let overlay: HashMap<String, String> = serde_json::from_str(json).map_err(|e| {
            AimpError::Configuration(format!("invalid message catalog for '{}': {}", language, e))
        })?;

        let mut catalog = Self::english();
        catalog.language = language.to_string();
        catalog.messages.extend(overlay);
        Ok(catalog)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Text for `key`, or an empty string when the key is missing.
    pub fn text(&self, key: &str) -> String {
        self.messages.get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::english()
    }
}
