use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Bordered list with a wrapping cursor.
#[derive(Clone)]
pub struct SelectableList {
    title: String,
    items: Vec<ListItem<'static>>,
    state: ListState,
}

impl SelectableList {
    pub fn new(title: &str, items: Vec<ListItem<'static>>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        Self {
            title: title.to_string(),
            items,
            state,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            let block = Block::default().borders(Borders::TOP).title(self.title.clone());
            frame.render_widget(Paragraph::new("  (empty)").dim().block(block), area);
            return;
        }

        let list = List::new(self.items.clone())
            .block(Block::default().borders(Borders::TOP).title(self.title.clone()))
            .highlight_style(Style::new().reversed())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let i = self.state.selected().unwrap_or(0);
        let next = (i + 1) % self.items.len();
        self.state.select(Some(next));
        Some(next)
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        Some(i)
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the items, keeping the cursor where it was when it still fits.
    pub fn update_items(&mut self, items: Vec<ListItem<'static>>) {
        let selected = match self.state.selected() {
            _ if items.is_empty() => None,
            Some(i) if i < items.len() => Some(i),
            _ => Some(0),
        };
        self.items = items;
        self.state.select(selected);
        if selected.is_none() {
            *self.state.offset_mut() = 0;
        }
    }
}
