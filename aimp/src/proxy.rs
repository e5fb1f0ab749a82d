//! Typed operations over the plugin's JSON-RPC interface.
//!
//! [`AimpProxy`] turns calls like `volume(Some(40))` into transport calls and
//! normalizes failures into [`AimpError`], resolving server error codes into
//! localized messages on the way.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::{ClientConfig, MethodNaming};
use crate::error::{AimpError, Result};
use crate::i18n::MessageCatalog;
use crate::models::{
    decode_row, ControlPanelState, EntriesQuery, EntryField, PlaybackState, Playlist,
    PlaylistEntries, PlaylistField, PlaylistId, PlayingSource, StatusId, TrackDescription,
    TrackInfo,
};
use crate::streaming::{EventType, Notification};
use crate::transport::{HttpTransport, RpcCall, RpcTransport};

/// Highest rating the plugin stores.
pub const MAX_TRACK_RATING: i32 = 5;

/// Methods exposed by the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Play,
    Pause,
    Stop,
    PlayPrevious,
    PlayNext,
    Status,
    ShufflePlaybackMode,
    RepeatPlaybackMode,
    Volume,
    Mute,
    GetControlPanelState,
    GetPlaylists,
    GetPlaylistEntries,
    GetPlaylistEntriesCount,
    GetFormattedEntryTitle,
    GetPlaylistEntryInfo,
    SetTrackRating,
    EnqueueTrack,
    RemoveTrackFromPlayQueue,
    GetCover,
    Subscribe,
}

impl Method {
    /// Client-side operation name, used in logs.
    pub fn local_name(&self) -> &'static str {
        match self {
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Stop => "stop",
            Method::PlayPrevious => "playPrevious",
            Method::PlayNext => "playNext",
            Method::Status => "status",
            Method::ShufflePlaybackMode => "shufflePlaybackMode",
            Method::RepeatPlaybackMode => "repeatPlaybackMode",
            Method::Volume => "volume",
            Method::Mute => "mute",
            Method::GetControlPanelState => "getControlPanelState",
            Method::GetPlaylists => "getPlaylists",
            Method::GetPlaylistEntries => "getPlaylistEntries",
            Method::GetPlaylistEntriesCount => "getPlaylistEntriesCount",
            Method::GetFormattedEntryTitle => "getFormattedTrackTitle",
            Method::GetPlaylistEntryInfo => "getTrackInfo",
            Method::SetTrackRating => "setTrackRating",
            Method::EnqueueTrack => "enqueueTrack",
            Method::RemoveTrackFromPlayQueue => "removeTrackFromPlayQueue",
            Method::GetCover => "getCover",
            Method::Subscribe => "subscribe",
        }
    }

    fn snake_name(&self) -> &'static str {
        match self {
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Stop => "stop",
            Method::PlayPrevious => "play_previous",
            Method::PlayNext => "play_next",
            Method::Status => "status",
            Method::ShufflePlaybackMode => "shuffle_playback_mode",
            Method::RepeatPlaybackMode => "repeat_playback_mode",
            Method::Volume => "volume",
            Method::Mute => "mute",
            Method::GetControlPanelState => "get_control_panel_state",
            Method::GetPlaylists => "get_playlists",
            Method::GetPlaylistEntries => "get_playlist_entries",
            Method::GetPlaylistEntriesCount => "get_playlist_entries_count",
            Method::GetFormattedEntryTitle => "get_formatted_entry_title",
            Method::GetPlaylistEntryInfo => "get_playlist_entry_info",
            Method::SetTrackRating => "set_track_rating",
            Method::EnqueueTrack => "enqueue_track",
            Method::RemoveTrackFromPlayQueue => "remove_track_from_play_queue",
            Method::GetCover => "get_cover",
            Method::Subscribe => "subscribe",
        }
    }

    /// Method name as the server registers it.
    pub fn wire_name(&self, naming: MethodNaming) -> String {
        match naming {
            MethodNaming::SnakeCase => self.snake_name().to_string(),
            MethodNaming::PascalCase => self
                .snake_name()
                .split('_')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.local_name())
    }
}

#[derive(Deserialize)]
struct PlaybackStateReply {
    playback_state: PlaybackState,
}

#[derive(Deserialize)]
struct StatusReply {
    value: i64,
}

#[derive(Deserialize)]
struct VolumeReply {
    volume: i64,
}

#[derive(Deserialize)]
struct ShuffleReply {
    shuffle_mode_on: bool,
}

#[derive(Deserialize)]
struct RepeatReply {
    repeat_mode_on: bool,
}

#[derive(Deserialize)]
struct MuteReply {
    mute_mode_on: bool,
}

#[derive(Deserialize)]
struct FormattedTitleReply {
    formatted_string: String,
}

#[derive(Deserialize)]
struct CoverReply {
    album_cover_uri: String,
}

fn track_params(track: TrackDescription) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("track_id".into(), Value::from(track.track_id.0));
    params.insert("playlist_id".into(), Value::from(track.playlist_id.0));
    params
}

/// Client-side proxy for the player.
///
/// Cloning is cheap; clones share the transport and message catalog.
///
/// # Example
///
/// ```rust,no_run
/// use aimp::{AimpProxy, ClientConfig};
///
/// # async fn example() -> aimp::Result<()> {
/// let proxy = AimpProxy::connect(&ClientConfig::new("http://192.168.1.20:3333"))?;
/// let state = proxy.get_control_panel_state().await?;
/// println!("volume is {}", state.volume);
/// proxy.volume(Some(40)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AimpProxy {
    transport: Arc<dyn RpcTransport>,
    catalog: Arc<MessageCatalog>,
    naming: MethodNaming,
}

impl std::fmt::Debug for AimpProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AimpProxy")
            .field("language", &self.catalog.language())
            .field("naming", &self.naming)
            .finish()
    }
}

impl AimpProxy {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            catalog: Arc::new(MessageCatalog::english()),
            naming: MethodNaming::default(),
        }
    }

    /// Proxy talking HTTP to the plugin described by `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate().map_err(AimpError::Configuration)?;
        let transport = HttpTransport::new(config)
            .map_err(|e| AimpError::from_transport(e, &MessageCatalog::english()))?;
        Ok(Self::new(Arc::new(transport)).with_naming(config.naming))
    }

    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_naming(mut self, naming: MethodNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn naming(&self) -> MethodNaming {
        self.naming
    }

    /// Invoke `method` and return its raw `result`.
    pub async fn call_raw(&self, method: Method, params: Value) -> Result<Value> {
        self.invoke(RpcCall::new(method.wire_name(self.naming), params), method)
            .await
    }

    /// Invoke `method` and decode its `result` into `T`.
    pub async fn call<T: DeserializeOwned>(&self, method: Method, params: Value) -> Result<T> {
        let value = self.call_raw(method, params).await?;
        decode(method, value)
    }

    async fn invoke(&self, call: RpcCall, method: Method) -> Result<Value> {
        self.transport.call(call).await.map_err(|err| {
            let err = AimpError::from_transport(err, &self.catalog);
            log::debug!("{} failed: {}", method, err);
            err
        })
    }

    /// Start playback of `track`, or of the current track when `None`.
    pub async fn play(&self, track: Option<TrackDescription>) -> Result<PlayingSource> {
        let params = match track {
            Some(track) => Value::Object(track_params(track)),
            None => json!({}),
        };
        self.call(Method::Play, params).await
    }

    pub async fn pause(&self) -> Result<PlaybackState> {
        let reply: PlaybackStateReply = self.call(Method::Pause, json!({})).await?;
        Ok(reply.playback_state)
    }

    pub async fn stop(&self) -> Result<PlaybackState> {
        let reply: PlaybackStateReply = self.call(Method::Stop, json!({})).await?;
        Ok(reply.playback_state)
    }

    pub async fn play_previous(&self) -> Result<PlayingSource> {
        self.call(Method::PlayPrevious, json!({})).await
    }

    pub async fn play_next(&self) -> Result<PlayingSource> {
        self.call(Method::PlayNext, json!({})).await
    }

    /// Get a player status, or set it first when `value` is given.
    ///
    /// Returns the status value after the call.
    pub async fn status(&self, status: StatusId, value: Option<i64>) -> Result<i64> {
        let params = match value {
            Some(value) => json!({ "status_id": status.id(), "value": value }),
            None => json!({ "status_id": status.id() }),
        };
        let reply: StatusReply = self.call(Method::Status, params).await?;
        Ok(reply.value)
    }

    /// Track position in seconds; seeks first when `position` is given.
    pub async fn track_position(&self, position: Option<u32>) -> Result<i64> {
        self.status(StatusId::Position, position.map(i64::from)).await
    }

    pub async fn shuffle_playback_mode(&self, shuffle_on: Option<bool>) -> Result<bool> {
        let params = match shuffle_on {
            Some(on) => json!({ "shuffle_on": on }),
            None => json!({}),
        };
        let reply: ShuffleReply = self.call(Method::ShufflePlaybackMode, params).await?;
        Ok(reply.shuffle_mode_on)
    }

    pub async fn repeat_playback_mode(&self, repeat_on: Option<bool>) -> Result<bool> {
        let params = match repeat_on {
            Some(on) => json!({ "repeat_on": on }),
            None => json!({}),
        };
        let reply: RepeatReply = self.call(Method::RepeatPlaybackMode, params).await?;
        Ok(reply.repeat_mode_on)
    }

    /// Get the volume, or set it first when `level` is given.
    ///
    /// The level is forwarded as is; the plugin rejects values outside
    /// `[0, 100]` with [`RpcErrorCode::VolumeOutOfRange`](crate::RpcErrorCode::VolumeOutOfRange).
    pub async fn volume(&self, level: Option<i32>) -> Result<i64> {
        let params = match level {
            Some(level) => json!({ "level": level }),
            None => json!({}),
        };
        let reply: VolumeReply = self.call(Method::Volume, params).await?;
        Ok(reply.volume)
    }

    pub async fn mute(&self, mute_on: Option<bool>) -> Result<bool> {
        let params = match mute_on {
            Some(on) => json!({ "mute_on": on }),
            None => json!({}),
        };
        let reply: MuteReply = self.call(Method::Mute, params).await?;
        Ok(reply.mute_mode_on)
    }

    pub async fn get_control_panel_state(&self) -> Result<ControlPanelState> {
        self.call(Method::GetControlPanelState, json!({})).await
    }

    pub async fn get_playlists(&self, fields: &[PlaylistField]) -> Result<Vec<Playlist>> {
        let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
        let value = self
            .call_raw(Method::GetPlaylists, json!({ "fields": names }))
            .await?;

        let rows = match value {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => {
                return Err(AimpError::InvalidResponse(format!(
                    "{}: expected an array of playlists, got {}",
                    Method::GetPlaylists,
                    other
                )))
            }
        };

        rows.iter()
            .map(|row| {
                decode_row(&names, row).map_err(|e| {
                    AimpError::InvalidResponse(format!("{}: {}", Method::GetPlaylists, e))
                })
            })
            .collect()
    }

    pub async fn get_playlist_entries(&self, query: &EntriesQuery) -> Result<PlaylistEntries> {
        let value = self
            .call_raw(Method::GetPlaylistEntries, query.to_params())
            .await?;
        PlaylistEntries::from_result(&query.fields, &value).map_err(|e| {
            AimpError::InvalidResponse(format!("{}: {}", Method::GetPlaylistEntries, e))
        })
    }

    pub async fn get_playlist_entries_count(&self, playlist_id: PlaylistId) -> Result<u64> {
        self.call(
            Method::GetPlaylistEntriesCount,
            json!({ "playlist_id": playlist_id.0 }),
        )
        .await
    }

    /// Track title rendered by the player from `format`, e.g. `"%a - %T"`.
    pub async fn get_formatted_track_title(
        &self,
        track: TrackDescription,
        format: &str,
    ) -> Result<String> {
        let mut params = track_params(track);
        params.insert("format_string".into(), Value::from(format));
        let reply: FormattedTitleReply = self
            .call(Method::GetFormattedEntryTitle, Value::Object(params))
            .await?;
        Ok(reply.formatted_string)
    }

    pub async fn get_track_info(&self, track: TrackDescription) -> Result<TrackInfo> {
        let value = self
            .call_raw(Method::GetPlaylistEntryInfo, Value::Object(track_params(track)))
            .await?;
        let names: Vec<&str> = EntryField::ALL.iter().map(|f| f.as_str()).collect();
        decode_row(&names, &value).map_err(|e| {
            AimpError::InvalidResponse(format!("{}: {}", Method::GetPlaylistEntryInfo, e))
        })
    }

    /// Rating is clamped to `[0, 5]`.
    pub async fn set_track_rating(&self, track: TrackDescription, rating: i32) -> Result<()> {
        let mut params = track_params(track);
        params.insert(
            "rating".into(),
            Value::from(rating.clamp(0, MAX_TRACK_RATING)),
        );
        self.call_raw(Method::SetTrackRating, Value::Object(params))
            .await
            .map(|_| ())
    }

    pub async fn enqueue_track(
        &self,
        track: TrackDescription,
        insert_at_queue_beginning: bool,
    ) -> Result<()> {
        let mut params = track_params(track);
        if insert_at_queue_beginning {
            params.insert("insert_at_queue_beginning".into(), Value::Bool(true));
        }
        self.call_raw(Method::EnqueueTrack, Value::Object(params))
            .await
            .map(|_| ())
    }

    pub async fn remove_track_from_play_queue(&self, track: TrackDescription) -> Result<()> {
        self.call_raw(Method::RemoveTrackFromPlayQueue, Value::Object(track_params(track)))
            .await
            .map(|_| ())
    }

    /// URI of the album cover, scaled to `size` when given.
    pub async fn get_cover(
        &self,
        track: TrackDescription,
        size: Option<(u32, u32)>,
    ) -> Result<String> {
        let mut params = track_params(track);
        if let Some((width, height)) = size {
            params.insert("cover_width".into(), Value::from(width));
            params.insert("cover_height".into(), Value::from(height));
        }
        let reply: CoverReply = self.call(Method::GetCover, Value::Object(params)).await?;
        Ok(reply.album_cover_uri)
    }

    /// Wait for the next `event` notification.
    ///
    /// The plugin holds the request open until the event fires, so this is
    /// sent as a long-poll call that ignores the ordinary request timeout.
    pub async fn subscribe(&self, event: EventType) -> Result<Notification> {
        let call = RpcCall::long_poll(
            Method::Subscribe.wire_name(self.naming),
            json!({ "event": event.as_str() }),
        );
        let value = self.invoke(call, Method::Subscribe).await?;
        Notification::parse(event, value).map_err(|e| {
            AimpError::InvalidResponse(format!("{} {}: {}", Method::Subscribe, event, e))
        })
    }
}

fn decode<T: DeserializeOwned>(method: Method, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| AimpError::InvalidResponse(format!("{}: {}", method, e)))
}
