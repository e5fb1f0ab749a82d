use serde_json::Value;

use super::types::EventType;
use crate::models::{ControlPanelState, PlayStateChange, PlayingSource, PlaylistsContentChange};

/// Decoded answer to a `subscribe` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    PlayState(PlayStateChange),
    CurrentTrack(PlayingSource),
    ControlPanel(ControlPanelState),
    PlaylistsContent(PlaylistsContentChange),
}

impl Notification {
    /// Decode the result of `subscribe(event)`; the payload shape depends on the event.
    pub fn parse(event: EventType, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match event {
            EventType::PlayStateChange => Notification::PlayState(serde_json::from_value(payload)?),
            EventType::CurrentTrackChange => {
                Notification::CurrentTrack(serde_json::from_value(payload)?)
            }
            EventType::ControlPanelStateChange => {
                Notification::ControlPanel(serde_json::from_value(payload)?)
            }
            EventType::PlaylistsContentChange => {
                // The plugin may answer with an empty result.
                let payload = if payload.is_null() {
                    Value::Object(Default::default())
                } else {
                    payload
                };
                Notification::PlaylistsContent(serde_json::from_value(payload)?)
            }
        })
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Notification::PlayState(_) => EventType::PlayStateChange,
            Notification::CurrentTrack(_) => EventType::CurrentTrackChange,
            Notification::ControlPanel(_) => EventType::ControlPanelStateChange,
            Notification::PlaylistsContent(_) => EventType::PlaylistsContentChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlaybackState, PlaylistId, TrackId};
    use serde_json::json;

    #[test]
    fn test_parse_current_track() {
        let notification = Notification::parse(
            EventType::CurrentTrackChange,
            json!({ "playlist_id": 1, "track_id": 9 }),
        )
        .unwrap();

        assert_eq!(
            notification,
            Notification::CurrentTrack(PlayingSource {
                playlist_id: PlaylistId(1),
                track_id: TrackId(9),
            })
        );
        assert_eq!(notification.event_type(), EventType::CurrentTrackChange);
    }

    #[test]
    fn test_parse_play_state() {
        let notification =
            Notification::parse(EventType::PlayStateChange, json!({ "playback_state": "paused" }))
                .unwrap();

        match notification {
            Notification::PlayState(change) => {
                assert_eq!(change.playback_state, PlaybackState::Paused);
                assert_eq!(change.track_position, None);
            }
            other => panic!("Expected play state, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_playlists_change() {
        let notification = Notification::parse(EventType::PlaylistsContentChange, Value::Null).unwrap();
        assert_eq!(
            notification,
            Notification::PlaylistsContent(PlaylistsContentChange {
                playlists_changed: false
            })
        );
    }

    #[test]
    fn test_wrong_payload_is_error() {
        let result = Notification::parse(EventType::ControlPanelStateChange, json!({ "volume": 3 }));
        assert!(result.is_err());
    }
}
