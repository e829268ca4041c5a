//! # Cloze Markers
//!
//! Reading and writing the two cloze marker families.
//!
//! ## Syntax
//!
//! Both families share one shape: an opening sequence carrying a 1-based
//! index, the visible content, an optional hint, and a closing sequence.
//!
//! - add-on markers: `[[oc3::content]]`, `[[oc3::content::hint]]`
//! - host-native markers: `{{c3::content}}`, `{{c3::content::hint}}`
//!
//! ## What it does
//!
//! - Parses field HTML into a sequence of [`Segment`]s
//! - Serializes segments back to markup
//! - Strips markers down to their visible content
//! - Finds the highest index in use and picks the next one

mod index;
mod parser;

pub use index::{highest_index, indices, next_index};
pub use parser::{parse, serialize, strip};

/// Separates the index from the content, and the content from the hint
pub const SEPARATOR: &str = "::";

/// Which cloze syntax a marker uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerFamily {
    /// `[[ocN::...]]`, owned by the overlapping cloze note types
    Overlapping,

    /// `{{cN::...}}`, understood by the host's own cloze templates
    Native,
}

impl MarkerFamily {
    /// Managed note types use the add-on syntax, everything else the host's
    pub fn for_model(managed: bool) -> Self {
        if managed {
            MarkerFamily::Overlapping
        } else {
            MarkerFamily::Native
        }
    }

    /// Opening sequence without the index
    pub fn prefix(self) -> &'static str {
        match self {
            MarkerFamily::Overlapping => "[[oc",
            MarkerFamily::Native => "{{c",
        }
    }

    /// Closing sequence
    pub fn suffix(self) -> &'static str {
        match self {
            MarkerFamily::Overlapping => "]]",
            MarkerFamily::Native => "}}",
        }
    }

    /// Opening sequence for a given index, e.g. `[[oc2::`
    pub fn opening(self, index: u32) -> String {
        let prefix = self.prefix();
        let mut opening = String::with_capacity(prefix.len() + SEPARATOR.len() + 4);
        opening.push_str(prefix);
        opening.push_str(&index.to_string());
        opening.push_str(SEPARATOR);
        opening
    }

    /// Wrap content in a complete marker
    pub fn wrap(self, index: u32, content: &str) -> String {
        let mut marker = self.opening(index);
        marker.push_str(content);
        marker.push_str(self.suffix());
        marker
    }
}

/// A single cloze deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cloze {
    pub index: u32,
    pub content: String,
    pub hint: Option<String>,
}

impl Cloze {
    pub fn new(index: u32, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Render the cloze in the given family's syntax
    pub fn to_markup(&self, family: MarkerFamily) -> String {
        let mut marker = family.opening(self.index);
        marker.push_str(&self.content);
        if let Some(hint) = &self.hint {
            marker.push_str(SEPARATOR);
            marker.push_str(hint);
        }
        marker.push_str(family.suffix());
        marker
    }
}

/// A piece of parsed field text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Cloze(Cloze),
}

impl Segment {
    /// The part a reader sees once markers are removed
    pub fn visible_text(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Cloze(cloze) => &cloze.content,
        }
    }
}
