use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Title,
    DueDate,
}

#[derive(Debug, Default)]
pub struct SearchBar {
    query: String,
    mode: SearchMode,
    is_focused: bool,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self, mode: SearchMode) {
        if self.mode != mode {
            self.query.clear();
        }
        self.mode = mode;
        self.is_focused = true;
    }

    pub fn blur(&mut self) {
        self.is_focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn insert_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn delete_char(&mut self) {
        self.query.pop();
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match (self.mode, self.is_focused) {
            (SearchMode::Title, true) => "Search by title",
            (SearchMode::DueDate, true) => "Filter by due date (yyyy-MM-dd, Enter to apply)",
            (_, false) => "Search (/ title, f due date)",
        };

        let border_style = if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, text_style) = if self.query.is_empty() {
            let hint = match (self.mode, self.is_focused) {
                (SearchMode::Title, true) => "Type at least 3 characters...",
                (SearchMode::DueDate, true) => "2030-01-31",
                (_, false) => "Press / to search",
            };
            (hint, Style::default().fg(Color::DarkGray))
        } else {
            (self.query.as_str(), Style::default())
        };

        frame.render_widget(Paragraph::new(text).block(block).style(text_style), area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.query.chars().count() as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: area.y + 1,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_mode_clears_query() {
        let mut bar = SearchBar::new();
        bar.focus(SearchMode::Title);
        bar.insert_char('m');
        bar.insert_char('é');
        bar.delete_char();
        assert_eq!(bar.query(), "m");

        bar.focus(SearchMode::Title);
        assert_eq!(bar.query(), "m");

        bar.focus(SearchMode::DueDate);
        assert_eq!(bar.query(), "");
        assert_eq!(bar.mode(), SearchMode::DueDate);
    }
}
