pub mod control;
pub mod startup;

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::commands::PlayerCommand;
use crate::state::store::Store;

pub trait View {
  fn render(&mut self, frame: &mut Frame);
  /// Returns the player command the key maps to, if any.
  fn handle_input(&mut self, key_event: KeyEvent, store: &Store) -> Option<PlayerCommand>;
}
