use std::sync::Arc;

use aimp::{PlaybackState, PlayerState, PlaylistEntry, PlaylistId, TrackDescription};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListItem, Paragraph, Tabs};
use ratatui::Frame;

use crate::commands::player::VOLUME_STEP;
use crate::commands::PlayerCommand;
use crate::state::reducers::AppAction;
use crate::state::store::{AppState, Store};
use crate::widgets::control_panel::{self, format_time};
use crate::widgets::selectable_list::SelectableList;

const KEY_HINTS: &str =
    "space play/pause  s stop  n/p next/prev  +/- volume  m r z modes  tab playlist  enter play  q quit";

/// What the track list was last built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShownTracks {
    playlist: Option<PlaylistId>,
    entries_version: u64,
    playing: Option<TrackDescription>,
}

pub struct ControlView {
    store: Arc<Store>,
    tracks: SelectableList,
    shown: Option<ShownTracks>,
}

impl ControlView {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            tracks: SelectableList::new(" Tracks ", Vec::new()),
            shown: None,
        }
    }

    /// Rebuilds the track list when the playlist, its entries or the playing track changed.
    fn sync_tracks(&mut self) {
        let (shown, items) = self.store.with_state(|state| {
            let shown = ShownTracks {
                playlist: state.selected_playlist_id(),
                entries_version: state.entries_version,
                playing: state.current_track(),
            };
            if self.shown == Some(shown) {
                return (shown, None);
            }
            let items = shown
                .playlist
                .and_then(|id| state.entries_of(id).map(|entries| (id, entries)))
                .map(|(id, entries)| track_items(id, entries, shown.playing))
                .unwrap_or_default();
            (shown, Some(items))
        });

        if let Some(items) = items {
            if self.shown.map(|s| s.playlist) != Some(shown.playlist) {
                self.tracks.update_items(Vec::new());
            }
            self.tracks.update_items(items);
            log::debug!("Showing {} tracks of playlist {:?}", self.tracks.len(), shown.playlist);
            self.shown = Some(shown);
        }
    }

    fn selected_track(&self, state: &AppState) -> Option<TrackDescription> {
        let playlist_id = state.selected_playlist_id()?;
        let entry = state.entries_of(playlist_id)?.get(self.tracks.selected()?)?;
        let track_id = entry.id?;
        Some(TrackDescription {
            track_id,
            playlist_id,
        })
    }
}

fn track_items(
    playlist_id: PlaylistId,
    entries: &[PlaylistEntry],
    playing: Option<TrackDescription>,
) -> Vec<ListItem<'static>> {
    entries
        .iter()
        .map(|entry| {
            let is_playing = match (playing, entry.id) {
                (Some(track), Some(id)) => track == TrackDescription { track_id: id, playlist_id },
                _ => false,
            };
            let marker = if is_playing { "♪ " } else { "  " };
            let duration = entry
                .duration
                .map(|ms| format_time((ms / 1000) as u32))
                .unwrap_or_default();

            let line = Line::from(vec![
                Span::raw(marker),
                Span::raw(entry.title.clone().unwrap_or_default()).bold(),
                Span::raw("  "),
                Span::raw(entry.artist.clone().unwrap_or_default()),
                Span::raw("  "),
                Span::raw(duration).dim(),
            ]);
            ListItem::new(line)
        })
        .collect()
}

fn playlist_tabs(state: &AppState) -> Tabs<'static> {
    let titles: Vec<String> = state
        .playlists
        .iter()
        .map(|playlist| match (&playlist.title, playlist.id) {
            (Some(title), _) => title.clone(),
            (None, Some(id)) => format!("Playlist {}", id),
            (None, None) => "?".to_string(),
        })
        .collect();

    Tabs::new(titles)
        .select(state.selected_playlist.unwrap_or(0))
        .highlight_style(Style::new().reversed())
}

fn clamp_volume(volume: i32) -> i32 {
    volume.clamp(0, 100)
}

/// Keys that need the current control panel to build their command.
fn panel_command(code: KeyCode, player: &PlayerState) -> Option<PlayerCommand> {
    let panel = player.control_panel.as_ref()?;
    let volume = i32::from(panel.volume);
    match code {
        KeyCode::Char(' ') => Some(if player.playback_state() == Some(PlaybackState::Playing) {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Play(None)
        }),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            Some(PlayerCommand::SetVolume(clamp_volume(volume + VOLUME_STEP)))
        }
        KeyCode::Char('-') => Some(PlayerCommand::SetVolume(clamp_volume(volume - VOLUME_STEP))),
        KeyCode::Char('m') => Some(PlayerCommand::SetMute(!panel.mute_mode_on)),
        KeyCode::Char('r') => Some(PlayerCommand::SetRepeat(!panel.repeat_mode_on)),
        KeyCode::Char('z') => Some(PlayerCommand::SetShuffle(!panel.shuffle_mode_on)),
        _ => None,
    }
}

impl super::View for ControlView {
    fn render(&mut self, frame: &mut Frame) {
        self.sync_tracks();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let catalog = self.store.catalog();
        self.store.with_state(|state| {
            let title = state
                .player
                .current_track()
                .and_then(|track| state.title_for(track));
            control_panel::draw(frame, chunks[0], chunks[1], &state.player, title, catalog);
            frame.render_widget(playlist_tabs(state), chunks[2]);
            frame.render_widget(Paragraph::new(state.status_message.clone()), chunks[4]);
        });

        self.tracks.draw(frame, chunks[3]);
        frame.render_widget(Paragraph::new(KEY_HINTS).dim(), chunks[5]);
    }

    fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> Option<PlayerCommand> {
        match key_event.code {
            KeyCode::Up => {
                self.tracks.previous();
                None
            }
            KeyCode::Down => {
                self.tracks.next();
                None
            }
            KeyCode::Tab => {
                store.dispatch(AppAction::SelectNextPlaylist);
                None
            }
            KeyCode::Enter => {
                let track = store.with_state(|state| self.selected_track(state));
                if track.is_none() {
                    store.dispatch(AppAction::SetStatusMessage("No track selected".to_string()));
                }
                track.map(|track| PlayerCommand::Play(Some(track)))
            }
            KeyCode::Char('s') => Some(PlayerCommand::Stop),
            KeyCode::Char('n') => Some(PlayerCommand::Next),
            KeyCode::Char('p') => Some(PlayerCommand::Previous),
            code => store.with_state(|state| panel_command(code, &state.player)),
        }
    }
}
