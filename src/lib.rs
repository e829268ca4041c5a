//! Overlapping cloze editing for a flashcard note editor
//!
//! The add-on side (`cloze`, `editor`, `hooks`, `handlers::lifecycle`,
//! `keymap`) works against the [`editor::EditorSurface`] and
//! [`editor::Host`] traits. The rest is the terminal host `olc` that
//! provides them.

pub mod app;
pub mod buffer;
pub mod cloze;
pub mod collection;
pub mod config;
pub mod editor;
pub mod handlers;
pub mod hooks;
pub mod keymap;
pub mod logging;
pub mod note;
pub mod overlapper;
pub mod ui;
pub mod widgets;

// Re-export main types for convenience
pub use app::App;
pub use buffer::FieldBuffer;
pub use config::Config;
pub use note::Note;
