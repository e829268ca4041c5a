//! Integration tests for the terminal host
//!
//! Drives the App through key events and checks the note, the collection
//! and the host notifications

use std::fs;
use tempfile::TempDir;

use cloze_overlapper::config::Config;
use cloze_overlapper::editor::EditorMode;
use cloze_overlapper::hooks::{HookPoint, Outcome};
use cloze_overlapper::note::Note;
use cloze_overlapper::App;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    app.handle_key_event(KeyEvent::new(code, modifiers)).unwrap();
}

fn ctrl(app: &mut App, c: char) {
    press(app, KeyCode::Char(c), KeyModifiers::CONTROL);
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c), KeyModifiers::NONE);
    }
}

fn field_index(app: &App, name: &str) -> usize {
    app.fields
        .iter()
        .position(|buffer| buffer.name == name)
        .unwrap()
}

/// Switch the add window to the note type called `name`
fn use_model(app: &mut App, name: &str) {
    while app.note.model().name != name {
        ctrl(app, 'n');
    }
}

#[test]
fn test_app_creation() {
    let app = App::new(Config::default()).unwrap();

    assert!(app.running);
    assert_eq!(app.mode, EditorMode::Add);
    assert_eq!(app.note.model().name, "Cloze (overlapping)");
    // Original, Title, Settings, five text fields, Full
    assert_eq!(app.fields.len(), 9);
    assert_eq!(app.active_field, 0);
    assert_eq!(app.buttons.len(), 3);
    assert_eq!(app.hooks.handler_count(HookPoint::AddCards), 2);
    assert!(app.collection.notes().is_empty());
    assert!(!app.has_dialog());
}

#[test]
fn test_field_navigation() {
    let mut app = App::new(Config::default()).unwrap();

    press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
    assert_eq!(app.active_field, 1);

    press(&mut app, KeyCode::BackTab, KeyModifiers::SHIFT);
    press(&mut app, KeyCode::BackTab, KeyModifiers::SHIFT);
    assert_eq!(app.active_field, app.fields.len() - 1);
}

#[test]
fn test_host_cloze_becomes_overlapping_on_managed_model() {
    let mut app = App::new(Config::default()).unwrap();
    let text1 = field_index(&app, "Text1");
    app.focus_field(text1);

    type_text(&mut app, "mitochondria");
    ctrl(&mut app, 'a');
    ctrl(&mut app, 'l');

    assert_eq!(app.fields[text1].content(), "[[oc1::mitochondria]]");
    assert_eq!(app.note.field("Text1"), Some("[[oc1::mitochondria]]"));
}

#[test]
fn test_host_cloze_with_alt_reuses_index() {
    let mut app = App::new(Config::default()).unwrap();
    use_model(&mut app, "Cloze");

    type_text(&mut app, "a b");
    app.fields[0].select(0, 1);
    ctrl(&mut app, 'l');
    let len = app.fields[0].content().len();
    app.fields[0].select(len - 1, len);
    press(
        &mut app,
        KeyCode::Char('l'),
        KeyModifiers::CONTROL | KeyModifiers::ALT,
    );

    assert_eq!(app.fields[0].content(), "{{c1::a}} {{c1::b}}");
}

#[test]
fn test_add_note_with_native_clozes() {
    let mut app = App::new(Config::default()).unwrap();
    use_model(&mut app, "Cloze");

    type_text(&mut app, "Paris");
    ctrl(&mut app, 'a');
    ctrl(&mut app, 'l');
    type_text(&mut app, " is in ");
    type_text(&mut app, "France");
    let len = app.fields[0].content().len();
    app.fields[0].select(len - "France".len(), len);
    ctrl(&mut app, 'l');
    ctrl(&mut app, 's');

    let notes = app.collection.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].field("Text"), Some("{{c1::Paris}} is in {{c2::France}}"));
    let ords: Vec<usize> = notes[0].cards().iter().map(|card| card.ord).collect();
    assert_eq!(ords, vec![0, 1]);

    // A blank note of the same type follows
    assert_eq!(app.note.model().name, "Cloze");
    assert_eq!(app.fields[0].content(), "");
    assert!(app.status_message.is_some());
}

#[test]
fn test_add_note_without_clozes_fails() {
    let mut app = App::new(Config::default()).unwrap();
    use_model(&mut app, "Cloze");
    type_text(&mut app, "no deletions here");

    let result = app.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

    assert!(result.is_err());
    assert!(app.collection.notes().is_empty());
    assert_eq!(app.fields[0].content(), "no deletions here");
}

fn fill_overlapping_note(app: &mut App) {
    let text1 = field_index(app, "Text1");
    let full = field_index(app, "Full");
    app.fields[text1].set_content("{{c1::one}}");
    app.fields[full].set_content("{{c6::one two}}");
}

#[test]
fn test_add_suspends_full_cloze() {
    let mut app = App::new(Config::default()).unwrap();
    fill_overlapping_note(&mut app);

    let outcome = app.add_note().unwrap();

    assert_eq!(outcome, Outcome::Completed);
    let note = &app.collection.notes()[0];
    let cards: Vec<(usize, bool)> = note
        .cards()
        .iter()
        .map(|card| (card.ord, card.suspended))
        .collect();
    assert_eq!(cards, vec![(0, false), (5, true)]);
}

#[test]
fn test_add_keeps_full_cloze_when_disabled() {
    let mut config = Config::default();
    config.synced.sched.suspend_full = false;
    let mut app = App::new(config).unwrap();
    fill_overlapping_note(&mut app);

    app.add_note().unwrap();

    let note = &app.collection.notes()[0];
    assert!(note.cards().iter().all(|card| !card.suspended));
}

#[test]
fn test_edit_and_save_last_note() {
    let mut app = App::new(Config::default()).unwrap();
    use_model(&mut app, "Cloze");
    app.fields[0].set_content("{{c1::old}}");
    app.add_note().unwrap();

    ctrl(&mut app, 'e');
    assert_eq!(app.mode, EditorMode::Edit);
    assert_eq!(app.fields[0].content(), "{{c1::old}}");

    app.fields[0].set_content("{{c1::new}} {{c2::extra}}");
    ctrl(&mut app, 's');

    assert_eq!(app.mode, EditorMode::Add);
    let notes = app.collection.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].field("Text"), Some("{{c1::new}} {{c2::extra}}"));
    assert_eq!(notes[0].cards().len(), 2);
}

#[test]
fn test_edit_without_notes() {
    let mut app = App::new(Config::default()).unwrap();

    assert!(!app.edit_last_note());
    assert_eq!(app.mode, EditorMode::Add);
    assert!(app.save_and_close().is_err());
}

#[test]
fn test_multi_line_cloze_blocked_when_editing_basic_note() {
    let mut app = App::new(Config::default()).unwrap();
    use_model(&mut app, "Basic");
    app.mode = EditorMode::Edit;
    type_text(&mut app, "one");
    ctrl(&mut app, 'a');

    press(
        &mut app,
        KeyCode::Char('K'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    );

    assert!(app.has_dialog());
    assert_eq!(app.fields[0].content(), "one");

    // Keys other than Enter/Esc do nothing while the dialog is open
    type_text(&mut app, "x");
    assert_eq!(app.fields[0].content(), "one");

    press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
    assert!(!app.has_dialog());
}

#[test]
fn test_multi_line_cloze_in_field() {
    let mut app = App::new(Config::default()).unwrap();
    let text2 = field_index(&app, "Text2");
    app.focus_field(text2);
    app.fields[text2].set_content("<div>alpha</div><div>beta</div>");
    app.fields[text2].select_all();

    press(
        &mut app,
        KeyCode::Char('K'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    );

    assert_eq!(
        app.fields[text2].content(),
        "<div>[[oc1::alpha]]</div><div>[[oc2::beta]]</div>"
    );
    assert_eq!(app.note.field("Text2"), Some(app.fields[text2].content()));
}

#[test]
fn test_multi_line_cloze_on_typed_lines_can_be_removed() {
    let mut app = App::new(Config::default()).unwrap();
    let text1 = field_index(&app, "Text1");
    app.focus_field(text1);

    type_text(&mut app, "alpha");
    press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    type_text(&mut app, "beta");
    ctrl(&mut app, 'a');
    // Ctrl+Shift+K as a legacy terminal sends it
    ctrl(&mut app, 'k');

    assert_eq!(app.fields[text1].content(), "[[oc1::alpha]]\n[[oc2::beta]]");

    app.fields[text1].select_all();
    press(&mut app, KeyCode::Char('U'), KeyModifiers::ALT);

    assert_eq!(app.fields[text1].content(), "alpha\nbeta");
    assert_eq!(app.note.field("Text1"), Some("alpha\nbeta"));
}

#[test]
fn test_remove_clozes_hotkey() {
    let mut app = App::new(Config::default()).unwrap();
    app.fields[0].set_content("[[oc1::keep]] me");
    app.fields[0].select_all();

    press(
        &mut app,
        KeyCode::Char('U'),
        KeyModifiers::ALT | KeyModifiers::SHIFT,
    );

    assert_eq!(app.fields[0].content(), "keep me");
}

#[test]
fn test_note_options_dialog() {
    let mut app = App::new(Config::default()).unwrap();
    let settings = field_index(&app, "Settings");
    app.fields[settings].set_content("1,1,0 | n");

    press(
        &mut app,
        KeyCode::Char('O'),
        KeyModifiers::ALT | KeyModifiers::SHIFT,
    );

    let dialog = app.services.dialog.clone().unwrap();
    assert_eq!(dialog.title, "Note options");
    assert!(dialog.message.contains("1,1,0 | n"));
}

#[test]
fn test_generate_on_unmanaged_model_shows_tip() {
    let mut app = App::new(Config::default()).unwrap();
    use_model(&mut app, "Basic");

    press(
        &mut app,
        KeyCode::Char('C'),
        KeyModifiers::ALT | KeyModifiers::SHIFT,
    );

    assert!(app.services.toast_manager.has_active_toasts());
    assert!(!app.has_dialog());
}

#[test]
fn test_quit() {
    let mut app = App::new(Config::default()).unwrap();
    ctrl(&mut app, 'q');
    assert!(!app.running);
}

#[test]
fn test_set_note_rebuilds_fields() {
    let mut app = App::new(Config::default()).unwrap();
    let model = app.models[2].clone();
    let mut note = Note::new(model);
    note.set_field("Back", "answer");

    app.set_note(note);

    assert_eq!(app.fields.len(), 2);
    assert_eq!(app.fields[1].content(), "answer");
    assert!(!app.fields[1].is_dirty());
}

#[tokio::test]
async fn test_app_load_from_config_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.json"),
        r#"{"synced": {"models": ["My overlaps"], "flds": {"tx": "Line"}}}"#,
    )
    .unwrap();

    let app = App::load(temp_dir.path()).await.unwrap();

    assert_eq!(app.note.model().name, "My overlaps");
    assert!(app.fields.iter().any(|buffer| buffer.name == "Line1"));
    assert!(app.note.model().question_uses_cloze());
}

#[tokio::test]
async fn test_app_load_rejects_bad_keybindings() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.json"),
        r#"{"local": {"keybindings": {"generate": "Ctrl+Alt"}}}"#,
    )
    .unwrap();

    assert!(App::load(temp_dir.path()).await.is_err());
}
