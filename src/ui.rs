use crate::editor::EditorMode;
use crate::widgets::{FieldView, InfoDialog, ToastWidget};
use crate::App;
use ratatui::prelude::*;

const HELP: &str = "Ctrl+S add/save  Ctrl+L cloze  Ctrl+E edit last  Ctrl+N note type  Tab field  Ctrl+Q quit";

impl App {
    /// Main render function for the application UI
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Note type and buttons
                Constraint::Min(1),    // Fields
                Constraint::Length(1), // Status line
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_fields(f, chunks[1]);
        self.render_status_line(f, chunks[2]);

        self.services.toast_manager.update();
        if self.services.toast_manager.has_active_toasts() {
            f.render_widget(ToastWidget::new(&self.services.toast_manager), f.area());
        }

        if let Some(dialog) = &self.services.dialog {
            let width = (f.area().width * 2 / 3).max(60);
            f.render_widget(
                InfoDialog::new(&dialog.title, &dialog.message).width(width),
                f.area(),
            );
        }
    }

    /// Note type, window mode and the add-on's buttons
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let mode = match self.mode {
            EditorMode::Add => " ADD ",
            EditorMode::Edit => " EDIT ",
        };

        let mut spans = vec![
            Span::styled(
                mode,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} ", self.note.model().name),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
        ];

        for button in &self.buttons {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{}]", button.label),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
            if let Some(chord) = self.keymap.chord_for(button.command) {
                spans.push(Span::styled(
                    format!(" {}", chord),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }

        f.render_widget(Line::from(spans), area);
    }

    /// Fields top to bottom, scrolled so the focused one is visible
    fn render_fields(&mut self, f: &mut Frame, area: Rect) {
        self.field_areas.clear();
        if self.fields.is_empty() || area.height == 0 {
            return;
        }

        let heights: Vec<u16> = self.fields.iter().map(FieldView::height).collect();
        self.scroll_to_active(&heights, area.height);

        let mut y = area.y;
        for index in self.field_scroll..self.fields.len() {
            if y >= area.bottom() {
                break;
            }
            let height = heights[index].min(area.bottom() - y);
            let field_area = Rect::new(area.x, y, area.width, height);
            let focused = index == self.active_field;

            let view = FieldView::new(&self.fields[index]).focused(focused);
            if focused {
                if let Some(position) = view.cursor_position(field_area) {
                    if self.services.dialog.is_none() {
                        f.set_cursor_position(position);
                    }
                }
            }
            f.render_widget(view, field_area);

            self.field_areas.push((index, field_area));
            y += height;
        }
    }

    fn scroll_to_active(&mut self, heights: &[u16], available: u16) {
        if self.active_field < self.field_scroll {
            self.field_scroll = self.active_field;
        }
        while self.field_scroll < self.active_field {
            let needed: u32 = heights[self.field_scroll..=self.active_field]
                .iter()
                .map(|h| u32::from(*h))
                .sum();
            if needed <= u32::from(available) {
                break;
            }
            self.field_scroll += 1;
        }
    }

    fn render_status_line(&self, f: &mut Frame, area: Rect) {
        let (text, style) = match &self.status_message {
            Some(message) => (
                message.as_str(),
                Style::default().fg(Color::White).bg(Color::Blue),
            ),
            None => (HELP, Style::default().fg(Color::Gray).bg(Color::Black)),
        };

        let selection = self
            .active_buffer()
            .and_then(|buffer| buffer.selected_text())
            .map(|text| format!(" {} selected ", text.chars().count()))
            .unwrap_or_default();

        let line = Line::from(vec![
            Span::styled(format!(" {} ", text), style),
            Span::styled(selection, Style::default().fg(Color::Black).bg(Color::Yellow)),
        ]);
        f.render_widget(line, area);
    }
}
