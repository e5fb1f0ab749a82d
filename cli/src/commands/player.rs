use aimp::{AimpProxy, TrackDescription};

use crate::commands::CommandResult;
use crate::widgets::control_panel::playback_state_label;

pub const VOLUME_STEP: i32 = 5;

/// Control commands issued from the keyboard.
///
/// Toggles are resolved against the current control panel before a command
/// is built, so every variant carries the exact value to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Resume, or start the given track.
    Play(Option<TrackDescription>),
    Pause,
    Stop,
    Next,
    Previous,
    SetVolume(i32),
    SetMute(bool),
    SetRepeat(bool),
    SetShuffle(bool),
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Play(_) => "Play",
            PlayerCommand::Pause => "Pause",
            PlayerCommand::Stop => "Stop",
            PlayerCommand::Next => "Next",
            PlayerCommand::Previous => "Previous",
            PlayerCommand::SetVolume(_) => "Volume",
            PlayerCommand::SetMute(_) => "Mute",
            PlayerCommand::SetRepeat(_) => "Repeat",
            PlayerCommand::SetShuffle(_) => "Shuffle",
        }
    }

    /// Catalog key of the "action failed" text shown when the command fails.
    pub fn failure_key(&self) -> &'static str {
        match self {
            PlayerCommand::Play(_) => "error_play_playback",
            PlayerCommand::Pause => "error_pause_playback",
            PlayerCommand::Stop => "error_stop_playback",
            PlayerCommand::Next => "error_play_next_track",
            PlayerCommand::Previous => "error_play_previous_track",
            PlayerCommand::SetVolume(_) => "error_volume_set",
            PlayerCommand::SetMute(_) => "error_mute_set",
            PlayerCommand::SetRepeat(_) => "error_repeat_set",
            PlayerCommand::SetShuffle(_) => "error_shuffle_set",
        }
    }

    /// Sends the command and describes the outcome for the status line.
    pub async fn execute(self, proxy: &AimpProxy) -> CommandResult {
        let catalog = proxy.catalog();
        match self {
            PlayerCommand::Play(track) => {
                let source = proxy.play(track).await?;
                Ok(format!(
                    "{}: playlist {}, track {}",
                    playback_state_label(catalog, aimp::PlaybackState::Playing),
                    source.playlist_id,
                    source.track_id
                ))
            }
            PlayerCommand::Pause => {
                let state = proxy.pause().await?;
                Ok(playback_state_label(catalog, state))
            }
            PlayerCommand::Stop => {
                let state = proxy.stop().await?;
                Ok(playback_state_label(catalog, state))
            }
            PlayerCommand::Next => {
                let source = proxy.play_next().await?;
                Ok(format!("Next track: {}", source.track_id))
            }
            PlayerCommand::Previous => {
                let source = proxy.play_previous().await?;
                Ok(format!("Previous track: {}", source.track_id))
            }
            PlayerCommand::SetVolume(level) => {
                let volume = proxy.volume(Some(level)).await?;
                Ok(format!("Volume {}%", volume))
            }
            PlayerCommand::SetMute(on) => {
                let on = proxy.mute(Some(on)).await?;
                Ok(format!("Mute {}", on_off(on)))
            }
            PlayerCommand::SetRepeat(on) => {
                let on = proxy.repeat_playback_mode(Some(on)).await?;
                Ok(format!("Repeat {}", on_off(on)))
            }
            PlayerCommand::SetShuffle(on) => {
                let on = proxy.shuffle_playback_mode(Some(on)).await?;
                Ok(format!("Shuffle {}", on_off(on)))
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
