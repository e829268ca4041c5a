use anyhow::Result;
use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::App;

impl App {
    /// Handle a mouse event: a left click focuses the field under
    /// it, the wheel moves the focus
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        if self.has_dialog() {
            return Ok(());
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.field_at(mouse.column, mouse.row) {
                    self.focus_field(index);
                }
            }
            MouseEventKind::ScrollDown => self.next_field(),
            MouseEventKind::ScrollUp => self.previous_field(),
            _ => {}
        }

        Ok(())
    }

    /// Field drawn at the given screen cell during the last render
    pub fn field_at(&self, column: u16, row: u16) -> Option<usize> {
        let position = Position::new(column, row);
        self.field_areas
            .iter()
            .find(|(_, area)| area.contains(position))
            .map(|(index, _)| *index)
    }
}
