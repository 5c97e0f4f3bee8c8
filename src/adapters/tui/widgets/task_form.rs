use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::domain::validation::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::domain::TaskForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    DueDate,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::DueDate,
            FormField::DueDate => FormField::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::DueDate,
            FormField::Description => FormField::Title,
            FormField::DueDate => FormField::Description,
        }
    }

    pub fn value(self, form: &TaskForm) -> &str {
        match self {
            FormField::Title => &form.title,
            FormField::Description => &form.description,
            FormField::DueDate => &form.due_date,
        }
    }

    fn label(self) -> String {
        match self {
            FormField::Title => format!("Title (max {MAX_TITLE_CHARS})"),
            FormField::Description => format!("Description (max {MAX_DESCRIPTION_CHARS})"),
            FormField::DueDate => "Due date (yyyy-MM-dd)".to_string(),
        }
    }

    fn error(self, form: &TaskForm) -> Option<&str> {
        match self {
            FormField::Title => form.title_error.as_deref(),
            FormField::Description => form.description_error.as_deref(),
            FormField::DueDate => form.due_date_error.as_deref(),
        }
    }
}

/// Draws the three editable fields with their inline errors.
pub struct TaskFormView<'a> {
    pub heading: &'a str,
    pub form: &'a TaskForm,
    pub focused: FormField,
    pub is_loading: bool,
    pub error: Option<&'a str>,
}

impl TaskFormView<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.heading)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        for (field, chunk) in [FormField::Title, FormField::Description, FormField::DueDate]
            .into_iter()
            .zip(chunks.iter())
        {
            self.render_field(frame, *chunk, field);
        }

        let footer = if self.is_loading {
            Line::styled("Saving...", Style::default().fg(Color::Gray))
        } else if let Some(error) = self.error {
            Line::styled(error.to_string(), Style::default().fg(Color::Red))
        } else if self.form.is_form_valid {
            Line::styled("Ready to save", Style::default().fg(Color::Green))
        } else {
            Line::styled("Fill in the required fields", Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(Paragraph::new(footer), chunks[3]);
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, field: FormField) {
        let is_focused = field == self.focused;
        let error = field.error(self.form);
        let border_style = match (is_focused, error.is_some()) {
            (_, true) => Style::default().fg(Color::Red),
            (true, false) => Style::default().fg(Color::Yellow),
            (false, false) => Style::default().fg(Color::Gray),
        };

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let value = field.value(self.form);
        let input = Paragraph::new(value).block(
            Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(input, parts[0]);

        if let Some(error) = error {
            frame.render_widget(
                Paragraph::new(error).style(Style::default().fg(Color::Red)),
                parts[1],
            );
        }

        if is_focused {
            let cursor_x = parts[0].x + 1 + value.chars().count() as u16;
            if cursor_x < parts[0].x + parts[0].width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: parts[0].y + 1,
                });
            }
        }
    }
}
