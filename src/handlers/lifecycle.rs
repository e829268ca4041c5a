//! Handlers the add-on registers on the host's lifecycle hooks

use std::time::Duration;

use anyhow::Result;

use crate::editor::actions;
use crate::hooks::{Flow, HookContext, HookPoint, Hooks};
use crate::overlapper::{max_fields, GenerateRequest};

/// How long the generated-cards notice stays up
const NOTICE_PERIOD: Duration = Duration::from_millis(1000);

/// Register every handler. Call once at startup.
pub fn install(hooks: &mut Hooks) {
    hooks.before(HookPoint::InsertCloze, "overlapping-cloze", insert_overlapping_cloze);

    hooks.before(HookPoint::AddCards, "generate-before-add", generate_before_add);
    hooks.after(HookPoint::AddCards, "report-added", report_added);

    hooks.before(HookPoint::SaveAndClose, "generate-before-save", generate_before_save);
    hooks.after(HookPoint::SaveAndClose, "report-updated", report_updated);

    hooks.after(HookPoint::NotePersisted, "suspend-full-cloze", suspend_full_cloze);

    tracing::debug!("Installed lifecycle hooks");
}

/// Take over the host's cloze insertion on managed note types
fn insert_overlapping_cloze(ctx: &mut HookContext<'_, '_>) -> Result<Flow> {
    if !ctx.editor.check_model(false).is_managed() {
        return Ok(Flow::Continue);
    }
    let index = actions::insert_overlapping_cloze(ctx.editor);
    tracing::debug!("Inserted overlapping cloze {}", index);
    Ok(Flow::Handled)
}

/// Generate clozes before the note is added; a failed run cancels the add
fn generate_before_add(ctx: &mut HookContext<'_, '_>) -> Result<Flow> {
    if !ctx.editor.check_model(true).is_managed() {
        return Ok(Flow::Continue);
    }
    let editor = &mut *ctx.editor;
    let generated = editor.generator.add(editor.note, GenerateRequest::silent())?;
    ctx.generated = Some(generated);
    if generated.ok {
        Ok(Flow::Continue)
    } else {
        tracing::info!("Overlap generation failed, not adding the note");
        Ok(Flow::Abort)
    }
}

/// Generate clozes before saving. The window closes either way, so a
/// failed run never cancels.
fn generate_before_save(ctx: &mut HookContext<'_, '_>) -> Result<Flow> {
    if !ctx.editor.check_model(true).is_managed() {
        return Ok(Flow::Continue);
    }
    let editor = &mut *ctx.editor;
    let generated = editor.generator.add(editor.note, GenerateRequest::silent())?;
    ctx.generated = Some(generated);
    Ok(Flow::Continue)
}

fn report_added(ctx: &mut HookContext<'_, '_>) -> Result<Flow> {
    report(ctx, "Added")
}

fn report_updated(ctx: &mut HookContext<'_, '_>) -> Result<Flow> {
    report(ctx, "Updated")
}

fn report(ctx: &mut HookContext<'_, '_>, verb: &str) -> Result<Flow> {
    if let Some(generated) = ctx.generated.filter(|generated| generated.total > 0) {
        let message = format!("{} {} overlapping cloze cards", verb, generated.total);
        ctx.editor.host.tooltip(&message, NOTICE_PERIOD);
    }
    Ok(Flow::Continue)
}

/// Suspend the full cloze card of a freshly added note.
///
/// The full cloze is the last card, and its ordinal equals the number of
/// text fields.
fn suspend_full_cloze(ctx: &mut HookContext<'_, '_>) -> Result<Flow> {
    let editor = &mut *ctx.editor;
    if !editor.check_model(false).is_managed() || !editor.config.synced.sched.suspend_full {
        return Ok(Flow::Continue);
    }

    let full_ord = max_fields(editor.note.model(), &editor.config.synced.flds.tx);
    let Some(last) = editor.note.cards().last() else {
        return Ok(Flow::Continue);
    };

    if last.ord == full_ord {
        let id = last.id;
        editor.host.suspend_cards(&[id])?;
        tracing::info!("Suspended full cloze card {:?}", id);
    }

    Ok(Flow::Continue)
}
