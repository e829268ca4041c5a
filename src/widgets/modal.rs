use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Blocking information dialog, dismissed with Enter or Esc
pub struct InfoDialog<'a> {
    title: &'a str,
    message: &'a str,
    width: u16,
}

impl<'a> InfoDialog<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self {
            title,
            message,
            width: 60,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Rows needed for the message at the dialog's width, plus borders
    /// and the hint line
    fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2).max(1) as usize;
        let lines: usize = self
            .message
            .lines()
            .map(|line| line.chars().count().max(1).div_ceil(inner))
            .sum();
        (lines as u16).saturating_add(4)
    }

    /// Centered area for the dialog
    fn centered_rect(&self, area: Rect) -> Rect {
        let width = self.width.min(area.width);
        let height = self.height(width).min(area.height);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(area.height.saturating_sub(height) / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(area.width.saturating_sub(width) / 2),
                Constraint::Length(width),
                Constraint::Min(0),
            ])
            .split(vertical[1])[1]
    }
}

impl Widget for InfoDialog<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let dialog_area = self.centered_rect(area);
        Clear.render(dialog_area, buf);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        let mut lines: Vec<Line> = self.message.lines().map(Line::from).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter/Esc to close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines)
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
