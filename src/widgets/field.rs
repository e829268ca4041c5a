use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::buffer::FieldBuffer;

const SELECTION_STYLE: Style = Style::new().bg(Color::DarkGray).fg(Color::White);

/// A note field: bordered, titled with the field name, selection
/// highlighted. Content lines are shown as-is, without wrapping.
pub struct FieldView<'a> {
    pub buffer: &'a FieldBuffer,
    pub focused: bool,
}

impl<'a> FieldView<'a> {
    pub fn new(buffer: &'a FieldBuffer) -> Self {
        Self {
            buffer,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Rows the field needs, borders included
    pub fn height(buffer: &FieldBuffer) -> u16 {
        let lines = buffer.content.split('\n').count().max(1);
        (lines as u16).saturating_add(2)
    }

    /// Screen position of the buffer's cursor when drawn into `area`
    pub fn cursor_position(&self, area: Rect) -> Option<Position> {
        let before = &self.buffer.content[..self.buffer.cursor];
        let row = before.matches('\n').count() as u16;
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |line| line.chars().count()) as u16;

        let x = area.x.saturating_add(1).saturating_add(col);
        let y = area.y.saturating_add(1).saturating_add(row);
        let inside = x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1);
        inside.then_some(Position::new(x, y))
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let buffer: &'a FieldBuffer = self.buffer;
        let content = buffer.content.as_str();
        let selection = buffer.selection_range();
        let mut lines = Vec::new();
        let mut offset = 0;

        for text in content.split('\n') {
            let start = offset;
            let end = offset + text.len();
            offset = end + 1;

            let Some((sel_start, sel_end)) = selection else {
                lines.push(Line::from(text));
                continue;
            };

            // Part of this line that is selected, in line-local offsets
            let from = sel_start.clamp(start, end) - start;
            let to = sel_end.clamp(start, end) - start;
            if from == to {
                lines.push(Line::from(text));
                continue;
            }

            let mut spans = Vec::with_capacity(3);
            if from > 0 {
                spans.push(Span::raw(&text[..from]));
            }
            spans.push(Span::styled(&text[from..to], SELECTION_STYLE));
            if to < text.len() {
                spans.push(Span::raw(&text[to..]));
            }
            lines.push(Line::from(spans));
        }

        lines
    }
}

impl Widget for FieldView<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let border_style = if self.focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let title = if self.buffer.is_dirty() {
            format!(" {} * ", self.buffer.name)
        } else {
            format!(" {} ", self.buffer.name)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        Paragraph::new(self.lines())
            .style(Style::default().fg(Color::White))
            .block(block)
            .render(area, buf);
    }
}
