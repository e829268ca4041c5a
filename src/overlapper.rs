//! Contract of the overlapping cloze generator.
//!
//! The generator turns a note's original list into the numbered text
//! fields and the full cloze. It lives outside this crate; the editor
//! integration only calls it and reports what it did.

use anyhow::Result;

use crate::note::{Note, NoteModel};

/// List markup requested for the generated fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarkup {
    /// `<ol>`
    Ordered,
    /// `<ul>`
    Unordered,
}

impl ListMarkup {
    pub fn tag(self) -> &'static str {
        match self {
            ListMarkup::Ordered => "ol",
            ListMarkup::Unordered => "ul",
        }
    }
}

/// Options for a single generator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Convert the original field to this list type first
    pub markup: Option<ListMarkup>,

    /// Do not show warnings or previews
    pub silent: bool,
}

impl GenerateRequest {
    pub fn silent() -> Self {
        Self {
            markup: None,
            silent: true,
        }
    }

    pub fn with_markup(markup: ListMarkup) -> Self {
        Self {
            markup: Some(markup),
            silent: false,
        }
    }
}

/// What a generator run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generated {
    /// False when the caller should abort the surrounding operation
    pub ok: bool,

    /// Number of cloze cards generated
    pub total: usize,
}

/// Generates overlapping clozes for a note
pub trait OverlapGenerator {
    fn add(&mut self, note: &mut Note, request: GenerateRequest) -> Result<Generated>;
}

/// Generator used when no real one is attached: changes nothing
#[derive(Debug, Default)]
pub struct NoopGenerator;

impl OverlapGenerator for NoopGenerator {
    fn add(&mut self, _note: &mut Note, request: GenerateRequest) -> Result<Generated> {
        tracing::debug!("No overlap generator attached, skipping ({:?})", request);
        Ok(Generated { ok: true, total: 0 })
    }
}

/// Highest `N` among the model's fields named `<prefix>N`, 0 if none.
///
/// This is the number of text fields, and so also the ordinal of the full
/// cloze card (ordinals start at 0).
pub fn max_fields(model: &NoteModel, prefix: &str) -> usize {
    model
        .fields
        .iter()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|suffix| suffix.parse::<usize>().ok())
        .max()
        .unwrap_or(0)
}
