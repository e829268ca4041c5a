//! Integration tests for the hook pipelines and the add-on's lifecycle
//! handlers

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use ratatui::crossterm::event::KeyModifiers;

use cloze_overlapper::config::Config;
use cloze_overlapper::editor::{EditorContext, EditorMode, EditorSurface, Host};
use cloze_overlapper::handlers::lifecycle;
use cloze_overlapper::hooks::{Flow, HookPoint, Hooks, Outcome};
use cloze_overlapper::note::{Card, CardId, CardTemplate, Note, NoteModel};
use cloze_overlapper::overlapper::{GenerateRequest, Generated, OverlapGenerator};

#[derive(Default)]
struct FakeSurface {
    wrapped: Vec<(String, String)>,
}

impl EditorSurface for FakeSurface {
    fn wrap_selection(&mut self, prefix: &str, suffix: &str) {
        self.wrapped.push((prefix.to_string(), suffix.to_string()));
    }

    fn selection_html(&self) -> String {
        String::new()
    }

    fn replace_selection_html(&mut self, _html: &str) {}
}

#[derive(Default)]
struct FakeHost {
    tips: Vec<String>,
    suspended: Vec<CardId>,
}

impl Host for FakeHost {
    fn tooltip(&mut self, message: &str, _period: Duration) {
        self.tips.push(message.to_string());
    }

    fn show_info(&mut self, _message: &str) {}

    fn suspend_cards(&mut self, ids: &[CardId]) -> Result<()> {
        self.suspended.extend_from_slice(ids);
        Ok(())
    }

    fn open_note_options(&mut self, _note: &Note) {}
}

struct FixedGenerator {
    result: Generated,
    calls: Vec<GenerateRequest>,
}

impl OverlapGenerator for FixedGenerator {
    fn add(&mut self, _note: &mut Note, request: GenerateRequest) -> Result<Generated> {
        self.calls.push(request);
        Ok(self.result)
    }
}

struct Fixture {
    note: Note,
    surface: FakeSurface,
    host: FakeHost,
    generator: FixedGenerator,
    config: Config,
    hooks: Hooks,
}

impl Fixture {
    fn new(model: NoteModel, result: Generated) -> Self {
        let mut hooks = Hooks::new();
        lifecycle::install(&mut hooks);
        Self {
            note: Note::new(model),
            surface: FakeSurface::default(),
            host: FakeHost::default(),
            generator: FixedGenerator {
                result,
                calls: Vec::new(),
            },
            config: Config::default(),
            hooks,
        }
    }

    /// Run `point` with a base that records whether it ran
    fn run(&mut self, point: HookPoint, mode: EditorMode) -> (Outcome, bool) {
        let mut ctx = EditorContext {
            note: &mut self.note,
            surface: &mut self.surface,
            host: &mut self.host,
            generator: &mut self.generator,
            config: &self.config,
            mode,
            modifiers: KeyModifiers::NONE,
        };
        let mut base_ran = false;
        let outcome = self
            .hooks
            .run(point, &mut ctx, |_| {
                base_ran = true;
                Ok(())
            })
            .unwrap();
        (outcome, base_ran)
    }
}

fn overlapping_model() -> NoteModel {
    NoteModel::new(1, "Cloze (overlapping)")
        .with_fields(["Original", "Title", "Settings", "Text1", "Text2", "Text3", "Full"])
        .with_template(CardTemplate::new("Cloze", "{{cloze:Text1}}", "{{cloze:Text1}}"))
}

fn cloze_model() -> NoteModel {
    NoteModel::new(2, "Cloze")
        .with_fields(["Text", "Back Extra"])
        .with_template(CardTemplate::new("Cloze", "{{cloze:Text}}", "{{cloze:Text}}"))
}

const GENERATED: Generated = Generated { ok: true, total: 3 };
const FAILED: Generated = Generated { ok: false, total: 0 };

#[test]
fn test_install_registers_every_hook_point() {
    let mut hooks = Hooks::new();
    lifecycle::install(&mut hooks);

    assert_eq!(hooks.handler_count(HookPoint::InsertCloze), 1);
    assert_eq!(hooks.handler_count(HookPoint::AddCards), 2);
    assert_eq!(hooks.handler_count(HookPoint::SaveAndClose), 2);
    assert_eq!(hooks.handler_count(HookPoint::NotePersisted), 1);
}

#[test]
fn test_insert_cloze_taken_over_on_managed_model() {
    let mut fixture = Fixture::new(overlapping_model(), GENERATED);
    fixture.note.set_field("Text2", "[[oc2::x]]");

    let (outcome, base_ran) = fixture.run(HookPoint::InsertCloze, EditorMode::Add);

    assert_eq!(outcome, Outcome::Handled);
    assert!(!base_ran);
    assert_eq!(fixture.surface.wrapped, vec![("[[oc3::".to_string(), "]]".to_string())]);
}

#[test]
fn test_insert_cloze_falls_through_on_other_models() {
    let mut fixture = Fixture::new(cloze_model(), GENERATED);

    let (outcome, base_ran) = fixture.run(HookPoint::InsertCloze, EditorMode::Add);

    assert_eq!(outcome, Outcome::Completed);
    assert!(base_ran);
    assert!(fixture.surface.wrapped.is_empty());
}

#[test]
fn test_add_cards_generates_and_reports() {
    let mut fixture = Fixture::new(overlapping_model(), GENERATED);

    let (outcome, base_ran) = fixture.run(HookPoint::AddCards, EditorMode::Add);

    assert_eq!(outcome, Outcome::Completed);
    assert!(base_ran);
    assert_eq!(fixture.generator.calls, vec![GenerateRequest::silent()]);
    assert_eq!(fixture.host.tips, vec!["Added 3 overlapping cloze cards".to_string()]);
}

#[test]
fn test_add_cards_aborts_when_generation_fails() {
    let mut fixture = Fixture::new(overlapping_model(), FAILED);

    let (outcome, base_ran) = fixture.run(HookPoint::AddCards, EditorMode::Add);

    assert_eq!(outcome, Outcome::Aborted);
    assert!(!base_ran);
    assert!(fixture.host.tips.is_empty());
}

#[test]
fn test_add_cards_leaves_other_models_alone() {
    let mut fixture = Fixture::new(cloze_model(), FAILED);

    let (outcome, base_ran) = fixture.run(HookPoint::AddCards, EditorMode::Add);

    assert_eq!(outcome, Outcome::Completed);
    assert!(base_ran);
    assert!(fixture.generator.calls.is_empty());
}

#[test]
fn test_save_and_close_never_aborts() {
    let mut fixture = Fixture::new(overlapping_model(), FAILED);

    let (outcome, base_ran) = fixture.run(HookPoint::SaveAndClose, EditorMode::Edit);

    assert_eq!(outcome, Outcome::Completed);
    assert!(base_ran);
    assert_eq!(fixture.generator.calls.len(), 1);
}

#[test]
fn test_save_and_close_reports_updates() {
    let mut fixture = Fixture::new(overlapping_model(), GENERATED);

    fixture.run(HookPoint::SaveAndClose, EditorMode::Edit);

    assert_eq!(fixture.host.tips, vec!["Updated 3 overlapping cloze cards".to_string()]);
}

fn with_cards(fixture: &mut Fixture, ords: &[usize]) {
    let cards = ords
        .iter()
        .map(|ord| Card::new(CardId(100 + *ord as i64), *ord))
        .collect();
    fixture.note.set_cards(cards);
}

#[test]
fn test_full_cloze_suspended_when_enabled() {
    let mut fixture = Fixture::new(overlapping_model(), GENERATED);
    with_cards(&mut fixture, &[0, 1, 2, 3]);

    let (outcome, base_ran) = fixture.run(HookPoint::NotePersisted, EditorMode::Add);

    assert_eq!(outcome, Outcome::Completed);
    assert!(base_ran);
    assert_eq!(fixture.host.suspended, vec![CardId(103)]);
}

#[test]
fn test_full_cloze_kept_when_disabled() {
    let mut fixture = Fixture::new(overlapping_model(), GENERATED);
    fixture.config.synced.sched.suspend_full = false;
    with_cards(&mut fixture, &[0, 1, 2, 3]);

    fixture.run(HookPoint::NotePersisted, EditorMode::Add);

    assert!(fixture.host.suspended.is_empty());
}

#[test]
fn test_no_suspension_without_full_cloze_card() {
    let mut fixture = Fixture::new(overlapping_model(), GENERATED);
    with_cards(&mut fixture, &[0, 1]);

    fixture.run(HookPoint::NotePersisted, EditorMode::Add);

    assert!(fixture.host.suspended.is_empty());
}

#[test]
fn test_no_suspension_on_other_models() {
    let mut fixture = Fixture::new(cloze_model(), GENERATED);
    // Ordinal 0 equals the text field count of a model without TextN fields
    with_cards(&mut fixture, &[0]);

    fixture.run(HookPoint::NotePersisted, EditorMode::Add);

    assert!(fixture.host.suspended.is_empty());
}

#[test]
fn test_pipeline_order_and_flow() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut hooks = Hooks::new();

    let first = log.clone();
    hooks.before(HookPoint::AddCards, "first", move |_| {
        first.borrow_mut().push("first");
        Ok(Flow::Continue)
    });
    let second = log.clone();
    hooks.before(HookPoint::AddCards, "second", move |_| {
        second.borrow_mut().push("second");
        Ok(Flow::Handled)
    });
    let skipped = log.clone();
    hooks.before(HookPoint::AddCards, "skipped", move |_| {
        skipped.borrow_mut().push("skipped");
        Ok(Flow::Continue)
    });
    let after = log.clone();
    hooks.after(HookPoint::AddCards, "after", move |_| {
        after.borrow_mut().push("after");
        Ok(Flow::Continue)
    });

    let mut fixture = Fixture::new(cloze_model(), GENERATED);
    fixture.hooks = hooks;
    let (outcome, base_ran) = fixture.run(HookPoint::AddCards, EditorMode::Add);

    assert_eq!(outcome, Outcome::Handled);
    assert!(!base_ran);
    assert_eq!(*log.borrow(), vec!["first", "second", "after"]);
}

#[test]
fn test_abort_skips_base_and_after_handlers() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut hooks = Hooks::new();

    hooks.before(HookPoint::SaveAndClose, "abort", |_| Ok(Flow::Abort));
    let after = log.clone();
    hooks.after(HookPoint::SaveAndClose, "after", move |_| {
        after.borrow_mut().push("after");
        Ok(Flow::Continue)
    });

    let mut fixture = Fixture::new(cloze_model(), GENERATED);
    fixture.hooks = hooks;
    let (outcome, base_ran) = fixture.run(HookPoint::SaveAndClose, EditorMode::Edit);

    assert_eq!(outcome, Outcome::Aborted);
    assert!(!base_ran);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_handler_errors_propagate() {
    let mut hooks = Hooks::new();
    hooks.after(HookPoint::NotePersisted, "broken", |_| Err(anyhow!("scheduler offline")));

    let mut fixture = Fixture::new(cloze_model(), GENERATED);
    fixture.hooks = hooks;
    let mut ctx = EditorContext {
        note: &mut fixture.note,
        surface: &mut fixture.surface,
        host: &mut fixture.host,
        generator: &mut fixture.generator,
        config: &fixture.config,
        mode: EditorMode::Add,
        modifiers: KeyModifiers::NONE,
    };
    let error = fixture
        .hooks
        .run(HookPoint::NotePersisted, &mut ctx, |_| Ok(()))
        .unwrap_err();

    assert_eq!(error.to_string(), "scheduler offline");
}

#[test]
fn test_points_without_handlers_run_the_base() {
    let mut fixture = Fixture::new(cloze_model(), GENERATED);
    fixture.hooks = Hooks::new();

    let (outcome, base_ran) = fixture.run(HookPoint::InsertCloze, EditorMode::Add);

    assert_eq!(outcome, Outcome::Completed);
    assert!(base_ran);
}
