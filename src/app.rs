use std::io::Stdout;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use ratatui::{
    backend::CrosstermBackend,
    crossterm::event::{self, Event, KeyModifiers},
    layout::Rect,
    Terminal,
};

use crate::buffer::FieldBuffer;
use crate::collection::Collection;
use crate::config::{Config, ConfigManager};
use crate::editor::{
    actions, setup_editor_buttons, EditorButton, EditorContext, EditorMode, Host,
    DEFAULT_TOOLTIP_PERIOD,
};
use crate::handlers::lifecycle;
use crate::hooks::{HookPoint, Hooks, Outcome};
use crate::keymap::{EditorCommand, Keymap};
use crate::note::{CardId, CardTemplate, Note, NoteModel};
use crate::overlapper::{NoopGenerator, OverlapGenerator};
use crate::widgets::ToastManager;

/// Text fields of the bundled overlapping note type
const DEFAULT_TEXT_FIELDS: usize = 5;

/// A blocking message waiting to be dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
}

/// The host services handed to the add-on
#[derive(Default)]
pub struct HostServices {
    /// Transient tips
    pub toast_manager: ToastManager,

    /// Blocking dialog, if one is open
    pub dialog: Option<Dialog>,

    /// Name of the field holding per-note settings
    pub settings_field: String,

    /// Cards to suspend once the current operation is over
    pending_suspend: Vec<CardId>,
}

impl HostServices {
    pub fn new(settings_field: impl Into<String>) -> Self {
        Self {
            settings_field: settings_field.into(),
            ..Self::default()
        }
    }

    pub fn take_suspended(&mut self) -> Vec<CardId> {
        std::mem::take(&mut self.pending_suspend)
    }
}

impl Host for HostServices {
    fn tooltip(&mut self, message: &str, period: Duration) {
        self.toast_manager.add_tip(message, period);
    }

    fn show_info(&mut self, message: &str) {
        self.dialog = Some(Dialog {
            title: "Information".to_string(),
            message: message.to_string(),
        });
    }

    fn suspend_cards(&mut self, ids: &[CardId]) -> Result<()> {
        self.pending_suspend.extend_from_slice(ids);
        Ok(())
    }

    fn open_note_options(&mut self, note: &Note) {
        let message = match note.field(&self.settings_field) {
            Some(settings) if !settings.trim().is_empty() => {
                format!("Settings of this note: {}", settings.trim())
            }
            Some(_) => "This note uses the default overlapping settings.".to_string(),
            None => format!("The note type has no '{}' field.", self.settings_field),
        };
        self.dialog = Some(Dialog {
            title: "Note options".to_string(),
            message,
        });
    }
}

/// The terminal note editor
pub struct App {
    /// Whether the application is running
    pub running: bool,

    /// Note types to choose from
    pub models: Vec<NoteModel>,

    /// Index into `models` of the current note's type
    pub model_index: usize,

    /// The note being edited
    pub note: Note,

    /// One buffer per note field, in field order
    pub fields: Vec<FieldBuffer>,

    /// Field with keyboard focus
    pub active_field: usize,

    /// First field drawn when they don't all fit
    pub field_scroll: usize,

    /// Screen area of every drawn field, for mouse focus
    pub field_areas: Vec<(usize, Rect)>,

    pub mode: EditorMode,
    pub config: Config,
    pub keymap: Keymap,
    pub buttons: Vec<EditorButton>,
    pub hooks: Hooks,
    pub generator: Box<dyn OverlapGenerator>,
    pub services: HostServices,
    pub collection: Collection,

    /// Message to display on the status line
    pub status_message: Option<String>,
}

impl App {
    /// An editor on a blank note of the first managed note type
    pub fn new(config: Config) -> Result<Self> {
        let models = default_models(&config);
        Self::with_models(config, models)
    }

    pub fn with_models(config: Config, models: Vec<NoteModel>) -> Result<Self> {
        let model = models
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("No note types to edit"))?;
        let keymap = Keymap::from_config(&config)?;
        let buttons = setup_editor_buttons(&keymap);

        let mut hooks = Hooks::new();
        lifecycle::install(&mut hooks);

        let mut app = Self {
            running: true,
            models,
            model_index: 0,
            note: Note::new(model),
            fields: Vec::new(),
            active_field: 0,
            field_scroll: 0,
            field_areas: Vec::new(),
            mode: EditorMode::Add,
            services: HostServices::new(config.synced.flds.st.clone()),
            config,
            keymap,
            buttons,
            hooks,
            generator: Box::new(NoopGenerator),
            collection: Collection::new(),
            status_message: None,
        };
        app.load_fields();
        Ok(app)
    }

    /// Load the configuration from `config_dir` and start an editor
    pub async fn load(config_dir: &Path) -> Result<Self> {
        let mut manager = ConfigManager::new(config_dir);
        manager.load_async().await?;
        Self::new(manager.get_config().clone())
    }

    pub fn with_generator(mut self, generator: Box<dyn OverlapGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Run the main loop until the user quits
    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let frame_duration = Duration::from_millis(16);
        let mut last_frame: Option<Instant> = None;

        while self.running {
            let frame_start = Instant::now();
            if last_frame.map_or(true, |last| frame_start.duration_since(last) >= frame_duration) {
                terminal.draw(|f| self.render(f))?;
                last_frame = Some(frame_start);
            }

            if event::poll(Duration::from_millis(1))? {
                let result = match event::read()? {
                    Event::Key(key) => self.handle_key_event(key),
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    self.report_error(&e);
                }
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }

        Ok(())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Run `f` on an editor context over the current note and the focused
    /// field, then bring buffers, note and collection back in line.
    pub fn with_editor<R, F>(&mut self, modifiers: KeyModifiers, f: F) -> Result<R>
    where
        F: FnOnce(&mut EditorContext<'_>, &mut Hooks, &mut Collection) -> Result<R>,
    {
        self.sync_note();

        let active = self.active_field;
        let Some(surface) = self.fields.get_mut(active) else {
            return Err(anyhow!("The note has no fields"));
        };
        let before = surface.content.clone();

        let mut ctx = EditorContext {
            note: &mut self.note,
            surface,
            host: &mut self.services,
            generator: self.generator.as_mut(),
            config: &self.config,
            mode: self.mode,
            modifiers,
        };
        let result = f(&mut ctx, &mut self.hooks, &mut self.collection);

        // The surface edits the focused buffer, the generator edits the note
        if self.fields[active].content != before {
            self.note
                .set_field_at(active, self.fields[active].content.clone());
        }
        self.pull_note_changes();

        let suspended = self.services.take_suspended();
        if !suspended.is_empty() {
            self.collection.suspend(&suspended);
        }

        result
    }

    /// Run an add-on command on the focused field
    pub fn execute_command(&mut self, command: EditorCommand, modifiers: KeyModifiers) -> Result<()> {
        self.with_editor(modifiers, |ctx, _, _| actions::execute(command, ctx))
    }

    /// The editor's own cloze insertion, open to the insert-cloze hook
    pub fn insert_cloze(&mut self, modifiers: KeyModifiers) -> Result<Outcome> {
        self.with_editor(modifiers, |ctx, hooks, _| {
            hooks.run(HookPoint::InsertCloze, ctx, |editor| {
                let index = actions::insert_native_cloze(editor);
                tracing::debug!("Inserted native cloze {}", index);
                Ok(())
            })
        })
    }

    /// Add the current note to the collection and start a blank one
    pub fn add_note(&mut self) -> Result<Outcome> {
        if self.mode != EditorMode::Add {
            return Err(anyhow!("Notes can only be added from the add window"));
        }

        let outcome = self.with_editor(KeyModifiers::NONE, |ctx, hooks, collection| {
            let outcome = hooks.run(HookPoint::AddCards, ctx, |editor| {
                collection.prepare(editor.note)
            })?;
            if outcome == Outcome::Aborted {
                return Ok(outcome);
            }
            hooks.run(HookPoint::NotePersisted, ctx, |editor| {
                collection.insert(editor.note)
            })?;
            Ok(outcome)
        })?;

        if outcome == Outcome::Aborted {
            self.set_status_message("Note not added".to_string());
            return Ok(outcome);
        }

        let cards = self.note.cards().len();
        self.set_status_message(format!("Added note with {} cards", cards));
        self.set_note(Note::new(self.note.model().clone()));
        Ok(outcome)
    }

    /// Open the most recently added note in the edit window
    pub fn edit_last_note(&mut self) -> bool {
        let Some(note) = self.collection.last_note().cloned() else {
            self.set_status_message("No note has been added yet".to_string());
            return false;
        };
        self.mode = EditorMode::Edit;
        self.set_note(note);
        self.set_status_message("Editing the last added note".to_string());
        true
    }

    /// Save the edited note and go back to adding
    pub fn save_and_close(&mut self) -> Result<Outcome> {
        if self.mode != EditorMode::Edit {
            return Err(anyhow!("No note is being edited"));
        }

        let outcome = self.with_editor(KeyModifiers::NONE, |ctx, hooks, collection| {
            hooks.run(HookPoint::SaveAndClose, ctx, |editor| {
                collection.update(editor.note)
            })
        })?;

        self.mode = EditorMode::Add;
        let model = self.models[self.model_index].clone();
        self.set_note(Note::new(model));
        self.set_status_message("Note saved".to_string());
        Ok(outcome)
    }

    /// Switch the add window to the next note type
    pub fn cycle_model(&mut self) {
        if self.mode != EditorMode::Add || self.models.is_empty() {
            return;
        }
        self.model_index = (self.model_index + 1) % self.models.len();
        let model = self.models[self.model_index].clone();
        self.set_status_message(format!("Note type: {}", model.name));
        self.set_note(Note::new(model));
    }

    /// Replace the note being edited
    pub fn set_note(&mut self, note: Note) {
        self.note = note;
        self.load_fields();
    }

    pub fn focus_field(&mut self, index: usize) -> bool {
        if index < self.fields.len() {
            self.active_field = index;
            true
        } else {
            false
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active_field = (self.active_field + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active_field = (self.active_field + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn active_buffer(&self) -> Option<&FieldBuffer> {
        self.fields.get(self.active_field)
    }

    pub fn active_buffer_mut(&mut self) -> Option<&mut FieldBuffer> {
        self.fields.get_mut(self.active_field)
    }

    pub fn has_dialog(&self) -> bool {
        self.services.dialog.is_some()
    }

    pub fn close_dialog(&mut self) {
        self.services.dialog = None;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    /// Show a failed operation as a warning toast
    pub fn report_error(&mut self, error: &anyhow::Error) {
        tracing::warn!("{:#}", error);
        self.services
            .toast_manager
            .add_warning(error.to_string(), DEFAULT_TOOLTIP_PERIOD);
    }

    /// Copy every buffer into the note
    pub fn sync_note(&mut self) {
        for (index, buffer) in self.fields.iter().enumerate() {
            let stale = self
                .note
                .field_at(index)
                .is_some_and(|(_, value)| value != buffer.content);
            if stale {
                self.note.set_field_at(index, buffer.content.clone());
            }
        }
    }

    /// Rebuild the buffers from the note
    fn load_fields(&mut self) {
        self.fields = self
            .note
            .items()
            .map(|(name, value)| FieldBuffer::new(name, value))
            .collect();
        self.active_field = 0;
        self.field_scroll = 0;
        self.field_areas.clear();
    }

    /// Refresh buffers whose field was changed on the note
    fn pull_note_changes(&mut self) {
        for (index, buffer) in self.fields.iter_mut().enumerate() {
            if let Some((_, value)) = self.note.field_at(index) {
                if value != buffer.content {
                    buffer.set_content(value);
                    buffer.modified = true;
                }
            }
        }
    }
}

/// Note types the terminal host offers: the managed overlapping type, a
/// plain cloze type and a basic type
pub fn default_models(config: &Config) -> Vec<NoteModel> {
    let flds = &config.synced.flds;
    let overlapping_name = config
        .synced
        .models
        .first()
        .cloned()
        .unwrap_or_else(|| "Cloze (overlapping)".to_string());

    let text_fields: Vec<String> = (1..=DEFAULT_TEXT_FIELDS)
        .map(|n| format!("{}{}", flds.tx, n))
        .collect();
    let mut fields = vec![flds.og.clone(), flds.tt.clone(), flds.st.clone()];
    fields.extend(text_fields.iter().cloned());
    fields.push(flds.fl.clone());

    let question: String = text_fields
        .iter()
        .chain(std::iter::once(&flds.fl))
        .map(|field| format!("{{{{cloze:{}}}}}", field))
        .collect();
    let answer = format!("{}<hr id=answer>{{{{{}}}}}", question, flds.og);

    vec![
        NoteModel::new(1, overlapping_name)
            .with_fields(fields)
            .with_template(CardTemplate::new("Cloze", question, answer)),
        NoteModel::new(2, "Cloze")
            .with_fields(["Text", "Back Extra"])
            .with_template(CardTemplate::new(
                "Cloze",
                "{{cloze:Text}}",
                "{{cloze:Text}}<br>{{Back Extra}}",
            )),
        NoteModel::new(3, "Basic")
            .with_fields(["Front", "Back"])
            .with_template(CardTemplate::new(
                "Card 1",
                "{{Front}}",
                "{{FrontSide}}<hr id=answer>{{Back}}",
            )),
    ]
}
