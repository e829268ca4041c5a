use anyhow::Result;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::buffer::CursorMovement;
use crate::editor::EditorMode;
use crate::App;

impl App {
    /// Handle a key press
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }

        // An open dialog blocks everything else
        if self.has_dialog() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.close_dialog();
            }
            return Ok(());
        }

        self.clear_status_message();

        // Add-on hotkeys take precedence over the editor's own keys
        if let Some(command) = self.keymap.lookup(&key) {
            return self.execute_command(command, key.modifiers);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.handle_control_key(key)? {
                return Ok(());
            }
        }

        self.handle_edit_key(key);
        Ok(())
    }

    /// Window-level shortcuts. Returns true when the key was used.
    fn handle_control_key(&mut self, key: KeyEvent) -> Result<bool> {
        let KeyCode::Char(c) = key.code else {
            return Ok(false);
        };

        match c.to_ascii_lowercase() {
            'q' => self.quit(),
            'l' => {
                self.insert_cloze(key.modifiers)?;
            }
            's' => match self.mode {
                EditorMode::Add => {
                    self.add_note()?;
                }
                EditorMode::Edit => {
                    self.save_and_close()?;
                }
            },
            'e' => match self.mode {
                EditorMode::Add => {
                    self.edit_last_note();
                }
                EditorMode::Edit => {
                    self.save_and_close()?;
                }
            },
            'n' => self.cycle_model(),
            'a' => {
                if let Some(buffer) = self.active_buffer_mut() {
                    buffer.select_all();
                }
            }
            _ => return Ok(false),
        }

        Ok(true)
    }

    /// Text editing and focus keys on the active field
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.next_field();
                return;
            }
            KeyCode::BackTab => {
                self.previous_field();
                return;
            }
            KeyCode::Down if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.next_field();
                return;
            }
            KeyCode::Up if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.previous_field();
                return;
            }
            _ => {}
        }

        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        let by_word = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(buffer) = self.active_buffer_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                buffer.insert_char(c);
            }
            KeyCode::Enter => buffer.insert_char('\n'),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left if by_word => buffer.move_cursor(CursorMovement::WordLeft, extend),
            KeyCode::Right if by_word => buffer.move_cursor(CursorMovement::WordRight, extend),
            KeyCode::Left => buffer.move_cursor(CursorMovement::Left, extend),
            KeyCode::Right => buffer.move_cursor(CursorMovement::Right, extend),
            KeyCode::Home | KeyCode::Up => buffer.move_cursor(CursorMovement::Start, extend),
            KeyCode::End | KeyCode::Down => buffer.move_cursor(CursorMovement::End, extend),
            KeyCode::Esc => buffer.clear_selection(),
            _ => {}
        }
    }
}
