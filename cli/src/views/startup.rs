use std::sync::Arc;
use crossterm::event::KeyEvent;
use ratatui::{
  layout::{ Alignment, Constraint, Direction, Layout },
  style::{ Style, Stylize },
  text::{ Line, Text },
  widgets::Paragraph,
  Frame,
};

use crate::commands::PlayerCommand;
use crate::state::store::Store;
use crate::widgets::util;

use super::View;

const LOGO: [&str; 4] = [
  r"   _   ___ __  __ ___ ",
  r"  /_\ |_ _|  \/  | _ \",
  r" / _ \ | || |\/| |  _/",
  r"/_/ \_\___|_|  |_|_|  ",
];

/// Shown until the first control panel state arrives.
pub struct StartupView {
  store: Arc<Store>,
}

impl StartupView {
  pub fn new(store: Arc<Store>) -> Self {
    Self { store }
  }

  fn get_status_message(&self) -> String {
    self.store.with_state(|state| {
      if state.status_message.is_empty() {
        format!("Connecting to {} ...", state.endpoint)
      } else {
        state.status_message.clone()
      }
    })
  }
}

impl View for StartupView {
  fn render(&mut self, frame: &mut Frame) {
    let body = Text::from(self.get_status_message());

    let inner_layout = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(5),
        Constraint::Length(1),
      ]);
    let (logo_area, text_area) = util::vertically_centered_layout(frame.area(), inner_layout);

    let logo_paragraph = Paragraph::new(Text::from(LOGO.map(Line::raw).to_vec()))
      .style(Style::new().bold())
      .alignment(Alignment::Center);
    frame.render_widget(logo_paragraph, logo_area);

    let body_paragraph = Paragraph::new(body).alignment(Alignment::Center);
    frame.render_widget(body_paragraph, text_area);
  }

  fn handle_input(&mut self, _key_event: KeyEvent, _store: &Store) -> Option<PlayerCommand> {
    None
  }
}
