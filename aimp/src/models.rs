use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A track addressed by its playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackDescription {
    pub track_id: TrackId,
    pub playlist_id: PlaylistId,
}

impl TrackDescription {
    pub fn new(track_id: i64, playlist_id: i64) -> Self {
        Self {
            track_id: TrackId(track_id),
            playlist_id: PlaylistId(playlist_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
    #[serde(other)]
    Unknown,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Unknown => "unknown",
        }
    }
}

/// Snapshot of the player's control panel.
///
/// Always replaced as a whole when a new snapshot arrives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlPanelState {
    pub playback_state: PlaybackState,
    /// Seconds from the track start, present only while it makes sense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_position: Option<u32>,
    /// Track length in seconds, present only while it makes sense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_length: Option<u32>,
    pub playlist_id: PlaylistId,
    pub track_id: TrackId,
    pub volume: u8,
    pub mute_mode_on: bool,
    pub repeat_mode_on: bool,
    pub shuffle_mode_on: bool,
}

impl ControlPanelState {
    pub fn is_playback_active(&self) -> bool {
        matches!(
            self.playback_state,
            PlaybackState::Playing | PlaybackState::Paused
        )
    }

    pub fn current_track(&self) -> TrackDescription {
        TrackDescription {
            track_id: self.track_id,
            playlist_id: self.playlist_id,
        }
    }

    /// `(position, length)` in seconds when both are known.
    pub fn progress(&self) -> Option<(u32, u32)> {
        self.track_position.zip(self.track_length)
    }
}

/// Payload of the `play_state_change` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStateChange {
    pub playback_state: PlaybackState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_length: Option<u32>,
}

/// Playlist and track the player is on; returned by `play`, `play_next`,
/// `play_previous` and the `current_track_change` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingSource {
    pub playlist_id: PlaylistId,
    pub track_id: TrackId,
}

/// Payload of the `playlists_content_change` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaylistsContentChange {
    #[serde(default)]
    pub playlists_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistField {
    Id,
    Title,
    Duration,
    EntriesCount,
    SizeOfEntries,
}

impl PlaylistField {
    pub const ALL: [PlaylistField; 5] = [
        PlaylistField::Id,
        PlaylistField::Title,
        PlaylistField::Duration,
        PlaylistField::EntriesCount,
        PlaylistField::SizeOfEntries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistField::Id => "id",
            PlaylistField::Title => "title",
            PlaylistField::Duration => "duration",
            PlaylistField::EntriesCount => "entries_count",
            PlaylistField::SizeOfEntries => "size_of_entries",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub id: Option<PlaylistId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub entries_count: Option<u64>,
    #[serde(default)]
    pub size_of_entries: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryField {
    Id,
    Title,
    Artist,
    Album,
    Date,
    Genre,
    Bitrate,
    Duration,
    Filesize,
    Rating,
}

impl EntryField {
    pub const ALL: [EntryField; 10] = [
        EntryField::Id,
        EntryField::Title,
        EntryField::Artist,
        EntryField::Album,
        EntryField::Date,
        EntryField::Genre,
        EntryField::Bitrate,
        EntryField::Duration,
        EntryField::Filesize,
        EntryField::Rating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryField::Id => "id",
            EntryField::Title => "title",
            EntryField::Artist => "artist",
            EntryField::Album => "album",
            EntryField::Date => "date",
            EntryField::Genre => "genre",
            EntryField::Bitrate => "bitrate",
            EntryField::Duration => "duration",
            EntryField::Filesize => "filesize",
            EntryField::Rating => "rating",
        }
    }
}

/// A playlist entry; only the requested fields are filled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: Option<TrackId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub date: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// kbit/s
    #[serde(default)]
    pub bitrate: Option<u32>,
    /// Milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    /// Bytes
    #[serde(default)]
    pub filesize: Option<u64>,
    /// 0 (not rated) to 5
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Full description of a single track, as returned by `get_playlist_entry_info`.
pub type TrackInfo = PlaylistEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// Sort key: index into the requested field list plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderField {
    pub field_index: usize,
    pub dir: OrderDirection,
}

/// Parameters of `get_playlist_entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntriesQuery {
    pub playlist_id: PlaylistId,
    pub fields: Vec<EntryField>,
    pub start_index: Option<usize>,
    pub entries_count: Option<usize>,
    pub order_fields: Vec<OrderField>,
    pub search_string: Option<String>,
}

impl EntriesQuery {
    pub fn new(playlist_id: PlaylistId, fields: &[EntryField]) -> Self {
        Self {
            playlist_id,
            fields: fields.to_vec(),
            start_index: None,
            entries_count: None,
            order_fields: Vec::new(),
            search_string: None,
        }
    }

    pub fn page(mut self, start_index: usize, entries_count: usize) -> Self {
        self.start_index = Some(start_index);
        self.entries_count = Some(entries_count);
        self
    }

    pub fn order_by(mut self, field: EntryField, dir: OrderDirection) -> Self {
        let field_index = match self.fields.iter().position(|f| *f == field) {
            Some(index) => index,
            None => {
                self.fields.push(field);
                self.fields.len() - 1
            }
        };
        self.order_fields.push(OrderField { field_index, dir });
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search_string = if text.is_empty() { None } else { Some(text) };
        self
    }

    pub fn to_params(&self) -> Value {
        let mut params = Map::new();
        params.insert("playlist_id".into(), Value::from(self.playlist_id.0));
        params.insert(
            "fields".into(),
            Value::from(self.fields.iter().map(|f| f.as_str()).collect::<Vec<_>>()),
        );
        if let Some(start) = self.start_index {
            params.insert("start_index".into(), Value::from(start));
        }
        if let Some(count) = self.entries_count {
            params.insert("entries_count".into(), Value::from(count));
        }
        if !self.order_fields.is_empty() {
            // Serializing plain derive structs cannot fail.
            params.insert(
                "order_fields".into(),
                serde_json::to_value(&self.order_fields).unwrap_or(Value::Null),
            );
        }
        if let Some(search) = &self.search_string {
            params.insert("search_string".into(), Value::from(search.clone()));
        }
        Value::Object(params)
    }
}

/// One page of playlist entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaylistEntries {
    pub total_entries_count: u64,
    pub entries: Vec<PlaylistEntry>,
    /// Set only when the query carried a search string.
    pub count_of_found_entries: Option<u64>,
}

impl PlaylistEntries {
    pub fn from_result(fields: &[EntryField], result: &Value) -> Result<Self, String> {
        let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();

        let total_entries_count = result
            .get("total_entries_count")
            .and_then(Value::as_u64)
            .ok_or_else(|| "missing total_entries_count".to_string())?;

        let entries = match result.get("entries") {
            Some(Value::Array(rows)) => rows
                .iter()
                .map(|row| decode_row(&names, row))
                .collect::<Result<Vec<PlaylistEntry>, String>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => return Err(format!("entries must be an array, got {}", other)),
        };

        Ok(Self {
            total_entries_count,
            entries,
            count_of_found_entries: result.get("count_of_found_entries").and_then(Value::as_u64),
        })
    }
}

/// Decode a playlist or entry row.
///
/// The plugin sends rows as positional arrays ordered like the requested
/// field list; keyed objects are accepted as well.
pub fn decode_row<T: DeserializeOwned>(field_names: &[&str], row: &Value) -> Result<T, String> {
    let object = match row {
        Value::Array(values) => {
            if values.len() != field_names.len() {
                return Err(format!(
                    "row has {} values but {} fields were requested",
                    values.len(),
                    field_names.len()
                ));
            }
            Value::Object(
                field_names
                    .iter()
                    .zip(values)
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            )
        }
        Value::Object(_) => row.clone(),
        other => return Err(format!("unexpected row {}", other)),
    };

    serde_json::from_value(object).map_err(|e| e.to_string())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Player status identifiers accepted by the `status` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusId {
    Volume,
    Balance,
    Speed,
    Player,
    Mute,
    Reverb,
    Echo,
    Chorus,
    Flanger,
    EqualizerState,
    /// Equalizer slider 1 to 18.
    EqualizerSlider(u8),
    Repeat,
    OnStop,
    Position,
    Length,
    RepeatPlaylist,
    RepeatSinglePlaylist,
    Kbps,
    Khz,
    Mode,
    Radio,
    StreamType,
    Timer,
    Shuffle,
}

impl StatusId {
    pub fn id(&self) -> i32 {
        match self {
            StatusId::Volume => 1,
            StatusId::Balance => 2,
            StatusId::Speed => 3,
            StatusId::Player => 4,
            StatusId::Mute => 5,
            StatusId::Reverb => 6,
            StatusId::Echo => 7,
            StatusId::Chorus => 8,
            StatusId::Flanger => 9,
            StatusId::EqualizerState => 10,
            StatusId::EqualizerSlider(n) => 10 + i32::from((*n).clamp(1, 18)),
            StatusId::Repeat => 29,
            StatusId::OnStop => 30,
            StatusId::Position => 31,
            StatusId::Length => 32,
            StatusId::RepeatPlaylist => 33,
            StatusId::RepeatSinglePlaylist => 34,
            StatusId::Kbps => 35,
            StatusId::Khz => 36,
            StatusId::Mode => 37,
            StatusId::Radio => 38,
            StatusId::StreamType => 39,
            StatusId::Timer => 40,
            StatusId::Shuffle => 41,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_panel_state_from_wire() {
        let state: ControlPanelState = serde_json::from_value(json!({
            "playback_state": "playing",
            "track_position": 42,
            "track_length": 215,
            "playlist_id": 2,
            "track_id": 5,
            "volume": 70,
            "mute_mode_on": false,
            "repeat_mode_on": true,
            "shuffle_mode_on": false
        }))
        .unwrap();

        assert_eq!(state.playback_state, PlaybackState::Playing);
        assert_eq!(state.progress(), Some((42, 215)));
        assert_eq!(state.current_track(), TrackDescription::new(5, 2));
        assert!(state.is_playback_active());
        assert!(state.repeat_mode_on);
    }

    #[test]
    fn test_control_panel_state_without_progress() {
        let state: ControlPanelState = serde_json::from_value(json!({
            "playback_state": "stopped",
            "playlist_id": 1,
            "track_id": 0,
            "volume": 100,
            "mute_mode_on": true,
            "repeat_mode_on": false,
            "shuffle_mode_on": true
        }))
        .unwrap();

        assert_eq!(state.progress(), None);
        assert!(!state.is_playback_active());
    }

    #[test]
    fn test_unknown_playback_state() {
        let change: PlayStateChange =
            serde_json::from_value(json!({ "playback_state": "unknown" })).unwrap();
        assert_eq!(change.playback_state, PlaybackState::Unknown);

        let change: PlayStateChange =
            serde_json::from_value(json!({ "playback_state": "buffering" })).unwrap();
        assert_eq!(change.playback_state, PlaybackState::Unknown);
    }

    #[test]
    fn test_decode_positional_row() {
        let playlist: Playlist =
            decode_row(&["id", "title", "entries_count"], &json!([3, "Rock", 120])).unwrap();

        assert_eq!(playlist.id, Some(PlaylistId(3)));
        assert_eq!(playlist.title.as_deref(), Some("Rock"));
        assert_eq!(playlist.entries_count, Some(120));
        assert_eq!(playlist.duration, None);
    }

    #[test]
    fn test_decode_row_length_mismatch() {
        let result: Result<Playlist, String> = decode_row(&["id", "title"], &json!([3]));
        assert!(result.is_err());
    }

    #[test]
    fn test_entries_from_result() {
        let fields = [EntryField::Id, EntryField::Title, EntryField::Date, EntryField::Duration];
        let result = json!({
            "total_entries_count": 2,
            "count_of_found_entries": 1,
            "entries": [[17, "Song", 1999, 215000]]
        });

        let page = PlaylistEntries::from_result(&fields, &result).unwrap();

        assert_eq!(page.total_entries_count, 2);
        assert_eq!(page.count_of_found_entries, Some(1));
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].id, Some(TrackId(17)));
        assert_eq!(page.entries[0].date.as_deref(), Some("1999"));
        assert_eq!(page.entries[0].duration, Some(215000));
    }

    #[test]
    fn test_entries_query_params() {
        let query = EntriesQuery::new(PlaylistId(4), &[EntryField::Id, EntryField::Title])
            .page(20, 10)
            .order_by(EntryField::Artist, OrderDirection::Desc)
            .search("love");

        assert_eq!(
            query.to_params(),
            json!({
                "playlist_id": 4,
                "fields": ["id", "title", "artist"],
                "start_index": 20,
                "entries_count": 10,
                "order_fields": [{ "field_index": 2, "dir": "desc" }],
                "search_string": "love"
            })
        );
    }

    #[test]
    fn test_status_ids() {
        assert_eq!(StatusId::Volume.id(), 1);
        assert_eq!(StatusId::EqualizerSlider(1).id(), 11);
        assert_eq!(StatusId::EqualizerSlider(18).id(), 28);
        assert_eq!(StatusId::Position.id(), 31);
        assert_eq!(StatusId::Shuffle.id(), 41);
    }
}
