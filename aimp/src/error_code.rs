use crate::i18n::MessageCatalog;

/// Message key used when the server reports a code missing from the table.
pub const UNKNOWN_ERROR_KEY: &str = "error_unknown";

/// Error codes reported by the AIMP control plugin.
///
/// Codes 1-7 come from the RPC layer itself (request parsing, value access),
/// codes 11 and up are raised by individual player methods. Anything else is
/// kept verbatim in [`RpcErrorCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorCode {
    RequestParsing,
    MethodNotFound,
    Type,
    IndexRange,
    ObjectAccess,
    ValueRange,
    Internal,
    WrongArgument,
    PlaybackFailed,
    ShuffleModeSetFailed,
    RepeatModeSetFailed,
    VolumeOutOfRange,
    VolumeSetFailed,
    MuteSetFailed,
    EnqueueTrackFailed,
    DequeueTrackFailed,
    PlaylistNotFound,
    TrackNotFound,
    AlbumCoverLoadFailed,
    RatingSetFailed,
    StatusSetFailed,
    Unknown(i64),
}

impl RpcErrorCode {
    /// Every code with an entry in the message table.
    pub const KNOWN: [RpcErrorCode; 21] = [
        RpcErrorCode::RequestParsing,
        RpcErrorCode::MethodNotFound,
        RpcErrorCode::Type,
        RpcErrorCode::IndexRange,
        RpcErrorCode::ObjectAccess,
        RpcErrorCode::ValueRange,
        RpcErrorCode::Internal,
        RpcErrorCode::WrongArgument,
        RpcErrorCode::PlaybackFailed,
        RpcErrorCode::ShuffleModeSetFailed,
        RpcErrorCode::RepeatModeSetFailed,
        RpcErrorCode::VolumeOutOfRange,
        RpcErrorCode::VolumeSetFailed,
        RpcErrorCode::MuteSetFailed,
        RpcErrorCode::EnqueueTrackFailed,
        RpcErrorCode::DequeueTrackFailed,
        RpcErrorCode::PlaylistNotFound,
        RpcErrorCode::TrackNotFound,
        RpcErrorCode::AlbumCoverLoadFailed,
        RpcErrorCode::RatingSetFailed,
        RpcErrorCode::StatusSetFailed,
    ];

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => RpcErrorCode::RequestParsing,
            2 => RpcErrorCode::MethodNotFound,
            3 => RpcErrorCode::Type,
            4 => RpcErrorCode::IndexRange,
            5 => RpcErrorCode::ObjectAccess,
            6 => RpcErrorCode::ValueRange,
            7 => RpcErrorCode::Internal,
            11 => RpcErrorCode::WrongArgument,
            12 => RpcErrorCode::PlaybackFailed,
            13 => RpcErrorCode::ShuffleModeSetFailed,
            14 => RpcErrorCode::RepeatModeSetFailed,
            15 => RpcErrorCode::VolumeOutOfRange,
            16 => RpcErrorCode::VolumeSetFailed,
            17 => RpcErrorCode::MuteSetFailed,
            18 => RpcErrorCode::EnqueueTrackFailed,
            19 => RpcErrorCode::DequeueTrackFailed,
            20 => RpcErrorCode::PlaylistNotFound,
            21 => RpcErrorCode::TrackNotFound,
            22 => RpcErrorCode::AlbumCoverLoadFailed,
            23 => RpcErrorCode::RatingSetFailed,
            24 => RpcErrorCode::StatusSetFailed,
            other => RpcErrorCode::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            RpcErrorCode::RequestParsing => 1,
            RpcErrorCode::MethodNotFound => 2,
            RpcErrorCode::Type => 3,
            RpcErrorCode::IndexRange => 4,
            RpcErrorCode::ObjectAccess => 5,
            RpcErrorCode::ValueRange => 6,
            RpcErrorCode::Internal => 7,
            RpcErrorCode::WrongArgument => 11,
            RpcErrorCode::PlaybackFailed => 12,
            RpcErrorCode::ShuffleModeSetFailed => 13,
            RpcErrorCode::RepeatModeSetFailed => 14,
            RpcErrorCode::VolumeOutOfRange => 15,
            RpcErrorCode::VolumeSetFailed => 16,
            RpcErrorCode::MuteSetFailed => 17,
            RpcErrorCode::EnqueueTrackFailed => 18,
            RpcErrorCode::DequeueTrackFailed => 19,
            RpcErrorCode::PlaylistNotFound => 20,
            RpcErrorCode::TrackNotFound => 21,
            RpcErrorCode::AlbumCoverLoadFailed => 22,
            RpcErrorCode::RatingSetFailed => 23,
            RpcErrorCode::StatusSetFailed => 24,
            RpcErrorCode::Unknown(code) => *code,
        }
    }

    /// Message key of this code, `None` for unknown codes.
    pub fn message_key(&self) -> Option<&'static str> {
        let key = match self {
            RpcErrorCode::RequestParsing => "error_request_parsing",
            RpcErrorCode::MethodNotFound => "error_method_not_found",
            RpcErrorCode::Type => "error_type",
            RpcErrorCode::IndexRange => "error_index_range",
            RpcErrorCode::ObjectAccess => "error_object_access",
            RpcErrorCode::ValueRange => "error_value_range",
            RpcErrorCode::Internal => "error_internal",
            RpcErrorCode::WrongArgument => "error_wrong_argument",
            RpcErrorCode::PlaybackFailed => "error_playback_failed",
            RpcErrorCode::ShuffleModeSetFailed => "error_shuffle_mode_set_failed",
            RpcErrorCode::RepeatModeSetFailed => "error_repeat_mode_set_failed",
            RpcErrorCode::VolumeOutOfRange => "error_volume_out_of_range",
            RpcErrorCode::VolumeSetFailed => "error_volume_set_failed",
            RpcErrorCode::MuteSetFailed => "error_mute_set_failed",
            RpcErrorCode::EnqueueTrackFailed => "error_enqueue_track_failed",
            RpcErrorCode::DequeueTrackFailed => "error_dequeue_track_failed",
            RpcErrorCode::PlaylistNotFound => "error_playlist_not_found",
            RpcErrorCode::TrackNotFound => "error_track_not_found",
            RpcErrorCode::AlbumCoverLoadFailed => "error_album_cover_load_failed",
            RpcErrorCode::RatingSetFailed => "error_rating_set_failed",
            RpcErrorCode::StatusSetFailed => "error_status_set_failed",
            RpcErrorCode::Unknown(_) => return None,
        };
        Some(key)
    }

    /// True for errors raised by the RPC layer rather than a player method.
    pub fn is_protocol_error(&self) -> bool {
        self.is_known() && self.code() <= 7
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RpcErrorCode::Unknown(_))
    }
}

impl From<i64> for RpcErrorCode {
    fn from(code: i64) -> Self {
        RpcErrorCode::from_code(code)
    }
}

impl std::fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Key identifying the message for `code`.
///
/// Unknown codes yield the generic key followed by the numeric code, so the
/// raw value survives for diagnosis.
pub fn resolve_error_key(code: i64) -> String {
    match RpcErrorCode::from_code(code).message_key() {
        Some(key) => key.to_string(),
        None => format!("{} {}", UNKNOWN_ERROR_KEY, code),
    }
}

/// Localized, user-presentable message for `code`.
pub fn resolve_error(code: i64, catalog: &MessageCatalog) -> String {
    match RpcErrorCode::from_code(code).message_key() {
        Some(key) => catalog.text(key),
        None => format!("{} {}", catalog.text(UNKNOWN_ERROR_KEY), code),
    }
}
