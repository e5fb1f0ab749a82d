pub mod callbacks;
pub mod config;
pub mod error;
pub mod error_code;
pub mod i18n;
pub mod models;
pub mod proxy;
pub mod state;
pub mod streaming;
pub mod transport;

// Re-export key types for easier access
pub use callbacks::{dispatch, Callbacks, Completion};
pub use config::{ClientConfig, MethodNaming};
pub use error::{AimpError, Result};
pub use error_code::{resolve_error, resolve_error_key, RpcErrorCode};
pub use i18n::MessageCatalog;
pub use models::{
    ControlPanelState, EntriesQuery, EntryField, OrderDirection, PlaybackState, Playlist,
    PlaylistEntries, PlaylistEntry, PlaylistField, PlaylistId, PlayingSource, StatusId,
    TrackDescription, TrackId, TrackInfo,
};
pub use proxy::{AimpProxy, Method};
pub use state::{PlayerState, StateCache};
pub use streaming::{
    ActiveSynchronizer, EventType, FailureSource, LifecycleHandlers, Notification, SyncConfig,
    SyncError, SyncFailure, SyncStats, SynchronizerBuilder,
};
pub use transport::{HttpTransport, RpcCall, RpcTransport, ScriptedTransport, TransportError};
