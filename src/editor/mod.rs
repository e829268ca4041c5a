//! # Note Editor Integration
//!
//! Everything the add-on does inside the host's note editor.
//!
//! ## Capabilities
//!
//! The editor hands the add-on three things:
//!
//! - an [`EditorSurface`] that can read and rewrite the current selection
//! - a [`Host`] for notifications, the scheduler and the options dialog
//! - the note being edited, together with the add-on [`Config`]
//!
//! They travel together in an [`EditorContext`], which is what every
//! action and lifecycle hook receives.

pub mod actions;
pub mod buttons;
pub mod fragment;

use std::time::Duration;

use anyhow::Result;
use ratatui::crossterm::event::KeyModifiers;

use crate::cloze::MarkerFamily;
use crate::config::Config;
use crate::note::{check_model, CardId, ModelCheck, Note};
use crate::overlapper::OverlapGenerator;

pub use buttons::{setup_editor_buttons, EditorButton};

/// How long a tooltip stays up unless told otherwise
pub const DEFAULT_TOOLTIP_PERIOD: Duration = Duration::from_millis(3000);

/// Selection-scoped editing provided by the editor widget
pub trait EditorSurface {
    /// Put `prefix` before and `suffix` after the selection
    fn wrap_selection(&mut self, prefix: &str, suffix: &str);

    /// HTML of the current selection, empty when nothing is selected
    fn selection_html(&self) -> String;

    /// Replace the current selection with `html`
    fn replace_selection_html(&mut self, html: &str);
}

/// Services of the host application
pub trait Host {
    /// Transient, non-blocking notification
    fn tooltip(&mut self, message: &str, period: Duration);

    /// Blocking informational dialog
    fn show_info(&mut self, message: &str);

    /// Suspend cards in the host's scheduler
    fn suspend_cards(&mut self, ids: &[CardId]) -> Result<()>;

    /// Open the note-specific options dialog
    fn open_note_options(&mut self, note: &Note);
}

/// Whether the editor belongs to the add-cards window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Add,
    Edit,
}

/// The editor state an action or hook works on
pub struct EditorContext<'a> {
    pub note: &'a mut Note,
    pub surface: &'a mut dyn EditorSurface,
    pub host: &'a mut dyn Host,
    pub generator: &'a mut dyn OverlapGenerator,
    pub config: &'a Config,
    pub mode: EditorMode,

    /// Keyboard modifiers held when the action was triggered
    pub modifiers: KeyModifiers,
}

impl EditorContext<'_> {
    /// Holding Alt reuses the highest cloze index instead of adding one
    pub fn reuse_index(&self) -> bool {
        self.modifiers.contains(KeyModifiers::ALT)
    }

    pub fn check_model(&self, check_fields: bool) -> ModelCheck {
        check_model(self.note.model(), self.config, check_fields)
    }

    /// Marker syntax that applies to the current note type
    pub fn marker_family(&self) -> MarkerFamily {
        MarkerFamily::for_model(self.check_model(false).is_managed())
    }
}
