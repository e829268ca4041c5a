//! # Notes and Note Types
//!
//! The host's note, note type and card records as far as the editor
//! integration reads them. The host owns persistence; these types only
//! carry the data handed over by it.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::Config;

/// Identifier of a card in the host's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub i64);

/// A card generated from a note. Ordinals start at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub ord: usize,
    pub suspended: bool,
}

impl Card {
    pub fn new(id: CardId, ord: usize) -> Self {
        Self {
            id,
            ord,
            suspended: false,
        }
    }
}

/// A card template of a note type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    pub name: String,
    pub question_format: String,
    pub answer_format: String,
}

impl CardTemplate {
    pub fn new(
        name: impl Into<String>,
        question_format: impl Into<String>,
        answer_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            question_format: question_format.into(),
            answer_format: answer_format.into(),
        }
    }
}

/// A note type: field layout plus card templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteModel {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<CardTemplate>,
}

impl NoteModel {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
            templates: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_template(mut self, template: CardTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }

    /// Whether the first template's question side renders a cloze filter,
    /// e.g. `{{cloze:Text}}` or `{{edit:cloze:Text}}`
    pub fn question_uses_cloze(&self) -> bool {
        static CLOZE_FILTER: OnceLock<Regex> = OnceLock::new();
        let Some(template) = self.templates.first() else {
            return false;
        };
        CLOZE_FILTER
            .get_or_init(|| Regex::new(r"\{\{(.*:)*cloze:").expect("cloze filter pattern"))
            .is_match(&template.question_format)
    }
}

/// A note: ordered field values of one note type, plus its cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Option<i64>,
    model: NoteModel,
    fields: Vec<(String, String)>,
    cards: Vec<Card>,
}

impl Note {
    /// A new, empty note with one blank value per model field
    pub fn new(model: NoteModel) -> Self {
        let fields = model
            .fields
            .iter()
            .map(|name| (name.clone(), String::new()))
            .collect();
        Self {
            id: None,
            model,
            fields,
            cards: Vec::new(),
        }
    }

    pub fn model(&self) -> &NoteModel {
        &self.model
    }

    /// Field names and values in model order
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Field values in model order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn field_at(&self, index: usize) -> Option<(&str, &str)> {
        self.fields
            .get(index)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Set a field by name, returns false when the note has no such field
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn set_field_at(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.fields.get_mut(index) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }
}

/// Outcome of checking a note type against the add-on's configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelCheck {
    /// Managed by the add-on
    Managed,

    /// Not one of the configured note types
    NotManaged,

    /// Configured, but the listed fields are missing
    MissingFields(Vec<String>),
}

impl ModelCheck {
    pub fn is_managed(&self) -> bool {
        matches!(self, ModelCheck::Managed)
    }

    /// Explanation suitable for a tooltip, `None` when managed
    pub fn message(&self) -> Option<String> {
        match self {
            ModelCheck::Managed => None,
            ModelCheck::NotManaged => {
                Some("Cloze Overlapper: this note type is not supported".to_string())
            }
            ModelCheck::MissingFields(fields) => Some(format!(
                "Cloze Overlapper: note type is missing fields: {}",
                fields.join(", ")
            )),
        }
    }
}

/// Check whether `model` is handled by the add-on.
///
/// With `check_fields` the model must also carry the original, settings
/// and full fields plus at least one numbered text field.
pub fn check_model(model: &NoteModel, config: &Config, check_fields: bool) -> ModelCheck {
    let synced = &config.synced;
    if !synced.models.iter().any(|name| *name == model.name) {
        return ModelCheck::NotManaged;
    }
    if !check_fields {
        return ModelCheck::Managed;
    }

    let flds = &synced.flds;
    let mut missing: Vec<String> = [&flds.og, &flds.st, &flds.fl]
        .into_iter()
        .filter(|name| !model.has_field(name))
        .cloned()
        .collect();
    if crate::overlapper::max_fields(model, &flds.tx) == 0 {
        missing.push(format!("{}1", flds.tx));
    }

    if missing.is_empty() {
        ModelCheck::Managed
    } else {
        tracing::debug!("Model '{}' is missing fields {:?}", model.name, missing);
        ModelCheck::MissingFields(missing)
    }
}
