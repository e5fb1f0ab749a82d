use aimp::{MessageCatalog, PlaybackState, PlayerState};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// `mm:ss`, or `hh:mm:ss` once the hour is non-zero.
pub fn format_time(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Localized name of a playback state.
pub fn playback_state_label(catalog: &MessageCatalog, state: PlaybackState) -> String {
    let label = catalog.text(&format!("playback_state_{}", state.as_str()));
    if label.is_empty() {
        state.as_str().to_string()
    } else {
        label
    }
}

pub fn progress_label(player: &PlayerState) -> Option<String> {
    player
        .progress()
        .map(|(position, length)| format!("{}/{}", format_time(position), format_time(length)))
}

fn indicator(key: char, label: &str, on: bool) -> Span<'static> {
    let text = format!("[{}] {}", key, label);
    if on {
        Span::styled(text, Style::new().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(text, Style::new().dim())
    }
}

/// Draws the control panel into `area` (5 rows) and the volume gauge into `volume_area`.
///
/// Nothing is drawn until a control panel snapshot has arrived.
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    volume_area: Rect,
    player: &PlayerState,
    title: Option<&str>,
    catalog: &MessageCatalog,
) {
    let Some(panel) = player.control_panel.as_ref() else {
        return;
    };
    let state_label = playback_state_label(
        catalog,
        player.playback_state().unwrap_or(panel.playback_state),
    );
    let title = if player.is_playback_active() {
        title.unwrap_or("")
    } else {
        ""
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(state_label, Style::new().bold()),
            Span::raw("  "),
            Span::raw(title.to_string()),
        ]),
        Line::from(progress_label(player).unwrap_or_default()),
        Line::from(vec![
            indicator('m', "mute", panel.mute_mode_on),
            Span::raw("  "),
            indicator('r', "repeat", panel.repeat_mode_on),
            Span::raw("  "),
            indicator('z', "shuffle", panel.shuffle_mode_on),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" AIMP "));
    frame.render_widget(paragraph, area);

    let volume = panel.volume.min(100);
    let gauge = Gauge::default()
        .gauge_style(Style::new().fg(if panel.mute_mode_on { Color::DarkGray } else { Color::Cyan }))
        .percent(u16::from(volume))
        .label(format!("Volume {}%", volume));
    frame.render_widget(gauge, volume_area);
}
