//! # Field Buffer
//!
//! Editable text of a single note field, as shown by the terminal host.
//!
//! ## What it does
//!
//! - Stores the field's HTML as one string
//! - Tracks the cursor and an optional selection (byte offsets, always on
//!   char boundaries)
//! - Provides the selection capability the editor actions work through
//!
//! The selection runs from the anchor (`selection_start`) to the cursor,
//! in either direction.

use crate::editor::EditorSurface;

#[derive(Debug, Clone)]
pub struct FieldBuffer {
    pub name: String,
    pub content: String,
    pub modified: bool,
    pub cursor: usize,
    pub selection_start: Option<usize>,
}

/// Cursor movements supported by the field editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMovement {
    Left,
    Right,
    WordLeft,
    WordRight,
    Start,
    End,
}

impl FieldBuffer {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            cursor: content.len(),
            content,
            modified: false,
            selection_start: None,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the whole content, clearing the selection
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.len();
        self.selection_start = None;
        self.modified = false;
    }

    pub fn insert_char(&mut self, c: char) {
        self.delete_selection();
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.modified = true;
    }

    pub fn insert_str(&mut self, text: &str) {
        self.delete_selection();
        self.content.insert_str(self.cursor, text);
        self.cursor += text.len();
        self.modified = true;
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        if let Some(prev) = self.prev_boundary(self.cursor) {
            self.content.replace_range(prev..self.cursor, "");
            self.cursor = prev;
            self.modified = true;
        }
    }

    pub fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        if let Some(next) = self.next_boundary(self.cursor) {
            self.content.replace_range(self.cursor..next, "");
            self.modified = true;
        }
    }

    /// Move the cursor. With `extend` the selection grows from where the
    /// cursor was; without it any selection is dropped.
    pub fn move_cursor(&mut self, movement: CursorMovement, extend: bool) {
        if extend {
            if self.selection_start.is_none() {
                self.selection_start = Some(self.cursor);
            }
        } else {
            self.selection_start = None;
        }

        self.cursor = match movement {
            CursorMovement::Left => self.prev_boundary(self.cursor).unwrap_or(0),
            CursorMovement::Right => self
                .next_boundary(self.cursor)
                .unwrap_or(self.content.len()),
            CursorMovement::WordLeft => self.word_left(),
            CursorMovement::WordRight => self.word_right(),
            CursorMovement::Start => 0,
            CursorMovement::End => self.content.len(),
        };
    }

    pub fn select_all(&mut self) {
        self.selection_start = Some(0);
        self.cursor = self.content.len();
    }

    /// Select the byte range `start..end`, clamped to char boundaries
    pub fn select(&mut self, start: usize, end: usize) {
        self.selection_start = Some(self.floor_boundary(start));
        self.cursor = self.floor_boundary(end);
    }

    pub fn clear_selection(&mut self) {
        self.selection_start = None;
    }

    /// Ordered byte range of the selection, `None` when empty
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        let anchor = self.selection_start?;
        let (start, end) = if anchor <= self.cursor {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        };
        (start < end).then_some((start, end))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection_range()
            .map(|(start, end)| &self.content[start..end])
    }

    /// Remove the selected text. Returns false when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        let range = self.selection_range();
        self.selection_start = None;
        match range {
            Some((start, end)) => {
                self.content.replace_range(start..end, "");
                self.cursor = start;
                self.modified = true;
                true
            }
            None => false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.modified
    }

    fn prev_boundary(&self, pos: usize) -> Option<usize> {
        self.content[..pos].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self, pos: usize) -> Option<usize> {
        self.content[pos..]
            .chars()
            .next()
            .map(|c| pos + c.len_utf8())
    }

    fn floor_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.content.len());
        while !self.content.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn word_left(&self) -> usize {
        let before = &self.content[..self.cursor];
        let trimmed = before.trim_end();
        trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0)
    }

    fn word_right(&self) -> usize {
        let after = &self.content[self.cursor..];
        let skipped = after.len() - after.trim_start().len();
        let rest = &after[skipped..];
        let word = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.cursor + skipped + word
    }
}

impl EditorSurface for FieldBuffer {
    /// Without a selection both parts go in at the cursor, which ends up
    /// between them
    fn wrap_selection(&mut self, prefix: &str, suffix: &str) {
        match self.selection_range() {
            Some((start, end)) => {
                self.content.insert_str(end, suffix);
                self.content.insert_str(start, prefix);
                self.cursor = end + prefix.len() + suffix.len();
            }
            None => {
                self.content.insert_str(self.cursor, suffix);
                self.content.insert_str(self.cursor, prefix);
                self.cursor += prefix.len();
            }
        }
        self.selection_start = None;
        self.modified = true;
    }

    fn selection_html(&self) -> String {
        self.selected_text().unwrap_or_default().to_string()
    }

    fn replace_selection_html(&mut self, html: &str) {
        self.insert_str(html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_either_direction() {
        let mut buffer = FieldBuffer::new("Text", "hello world");
        buffer.cursor = 5;
        buffer.move_cursor(CursorMovement::Start, true);
        assert_eq!(buffer.selected_text(), Some("hello"));

        buffer.select(6, 11);
        assert_eq!(buffer.selected_text(), Some("world"));
    }

    #[test]
    fn test_multibyte_movement() {
        let mut buffer = FieldBuffer::new("Text", "äö");
        buffer.move_cursor(CursorMovement::Left, false);
        assert_eq!(buffer.cursor, 2);
        buffer.backspace();
        assert_eq!(buffer.content, "ö");
        assert_eq!(buffer.cursor, 0);
    }

    #[test]
    fn test_word_movement() {
        let mut buffer = FieldBuffer::new("Text", "one two  three");
        buffer.move_cursor(CursorMovement::WordLeft, false);
        assert_eq!(buffer.cursor, 9);
        buffer.move_cursor(CursorMovement::WordLeft, false);
        assert_eq!(buffer.cursor, 4);
        buffer.move_cursor(CursorMovement::WordRight, false);
        assert_eq!(buffer.cursor, 7);
    }
}
