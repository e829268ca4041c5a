use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use std::time::{Duration, Instant};

/// Kind of tooltip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Warning,
}

impl ToastKind {
    fn color(self) -> Color {
        match self {
            ToastKind::Info => Color::Cyan,
            ToastKind::Warning => Color::Yellow,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            ToastKind::Info => "ℹ",
            ToastKind::Warning => "⚠",
        }
    }
}

/// A transient notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
    pub period: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind, period: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
            period,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.period
    }

    /// 0.0 when shown, 1.0 once expired
    pub fn progress(&self) -> f32 {
        let total = self.period.as_secs_f32();
        if total == 0.0 {
            return 1.0;
        }
        (self.created_at.elapsed().as_secs_f32() / total).min(1.0)
    }
}

/// Keeps and renders the visible tooltips
pub struct ToastManager {
    toasts: Vec<Toast>,
    max_toasts: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: Vec::new(),
            max_toasts: 4,
        }
    }

    pub fn add_toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
        if self.toasts.len() > self.max_toasts {
            let excess = self.toasts.len() - self.max_toasts;
            self.toasts.drain(..excess);
        }
    }

    pub fn add_tip(&mut self, message: impl Into<String>, period: Duration) {
        self.add_toast(Toast::new(message, ToastKind::Info, period));
    }

    pub fn add_warning(&mut self, message: impl Into<String>, period: Duration) {
        self.add_toast(Toast::new(message, ToastKind::Warning, period));
    }

    /// Drop expired toasts
    pub fn update(&mut self) {
        self.toasts.retain(|toast| !toast.is_expired());
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn has_active_toasts(&self) -> bool {
        !self.toasts.is_empty()
    }

    /// Stack the toasts in the bottom-right corner, newest at the bottom
    pub fn render(&self, area: Rect, buf: &mut TuiBuffer) {
        if self.toasts.is_empty() || area.height < 3 {
            return;
        }

        let width = 48.min(area.width.saturating_sub(2));
        let mut bottom = area.y + area.height;

        for toast in self.toasts.iter().rev() {
            if bottom < area.y + 3 {
                break;
            }
            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(width + 1),
                y: bottom - 3,
                width,
                height: 3,
            };
            render_toast(toast, toast_area, buf);
            bottom -= 3;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

fn render_toast(toast: &Toast, area: Rect, buf: &mut TuiBuffer) {
    let color = toast.kind.color();
    // Dim the border once the toast is about to go
    let border = if toast.progress() > 0.8 {
        Color::DarkGray
    } else {
        color
    };

    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(Color::Rgb(30, 30, 30)));
    let inner = block.inner(area);
    block.render(area, buf);

    let room = (inner.width as usize).saturating_sub(2);
    let message: String = if toast.message.chars().count() > room {
        let mut cut: String = toast.message.chars().take(room.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        toast.message.clone()
    };

    let line = Line::from(vec![
        Span::styled(
            format!("{} ", toast.kind.icon()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message, Style::default().fg(Color::White)),
    ]);
    Paragraph::new(line).render(inner, buf);
}

/// Widget wrapper for rendering toasts
pub struct ToastWidget<'a> {
    manager: &'a ToastManager,
}

impl<'a> ToastWidget<'a> {
    pub fn new(manager: &'a ToastManager) -> Self {
        Self { manager }
    }
}

impl Widget for ToastWidget<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        self.manager.render(area, buf);
    }
}
