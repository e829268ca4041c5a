//! Editor actions bound to buttons and hotkeys

use anyhow::Result;

use super::fragment::{top_level_nodes, Node};
use super::{EditorContext, EditorMode, DEFAULT_TOOLTIP_PERIOD};
use crate::cloze::{self, MarkerFamily};
use crate::keymap::EditorCommand;
use crate::overlapper::{GenerateRequest, Generated, ListMarkup};

const NO_CLOZE_TEMPLATE_ADD: &str = "Warning, cloze deletions will not work until \
     you switch the type at the top to Cloze.";

const NO_CLOZE_TEMPLATE_EDIT: &str = "To make a cloze deletion on an existing note, \
     you need to change it to a cloze type first, via Edit>Change Note Type.";

/// Run the action bound to `command`
pub fn execute(command: EditorCommand, ctx: &mut EditorContext<'_>) -> Result<()> {
    tracing::debug!("Running editor command {}", command.id());
    match command {
        EditorCommand::GenerateClozes => {
            generate_clozes(ctx, None)?;
        }
        EditorCommand::OrderedList => {
            generate_clozes(ctx, Some(ListMarkup::Ordered))?;
        }
        EditorCommand::UnorderedList => {
            generate_clozes(ctx, Some(ListMarkup::Unordered))?;
        }
        EditorCommand::NoteSettings => {
            open_note_settings(ctx);
        }
        EditorCommand::RemoveClozes => {
            remove_clozes(ctx);
        }
        EditorCommand::MultiLineCloze => {
            insert_multiple_clozes(ctx);
        }
    }
    Ok(())
}

/// Wrap the selection in an add-on cloze with the next free index.
///
/// Callers decide whether the note type is managed; see the insert-cloze
/// hook. Returns the index used.
pub fn insert_overlapping_cloze(ctx: &mut EditorContext<'_>) -> u32 {
    wrap_selection_in_cloze(ctx, MarkerFamily::Overlapping)
}

/// The host's own cloze insertion: same index policy, native markers
pub fn insert_native_cloze(ctx: &mut EditorContext<'_>) -> u32 {
    wrap_selection_in_cloze(ctx, MarkerFamily::Native)
}

fn wrap_selection_in_cloze(ctx: &mut EditorContext<'_>, family: MarkerFamily) -> u32 {
    let highest = cloze::highest_index(family, ctx.note.values());
    let index = cloze::next_index(highest, ctx.reuse_index());
    ctx.surface.wrap_selection(&family.opening(index), family.suffix());
    index
}

/// Wrap every top-level node of the selection in its own cloze.
///
/// Returns false when nothing was changed.
pub fn insert_multiple_clozes(ctx: &mut EditorContext<'_>) -> bool {
    if !ctx.note.model().question_uses_cloze() {
        match ctx.mode {
            EditorMode::Add => {
                ctx.host.tooltip(NO_CLOZE_TEMPLATE_ADD, DEFAULT_TOOLTIP_PERIOD);
            }
            EditorMode::Edit => {
                ctx.host.show_info(NO_CLOZE_TEMPLATE_EDIT);
                return false;
            }
        }
    }

    let family = ctx.marker_family();
    let highest = cloze::highest_index(family, ctx.note.values());
    let increment = !ctx.reuse_index();
    let first = cloze::next_index(highest, !increment);

    let selection = ctx.surface.selection_html();
    if selection.is_empty() {
        return false;
    }

    let clozed = wrap_children(&selection, family, first, increment);
    ctx.surface
        .replace_selection_html(strip_leading_list_item(&clozed));
    true
}

/// Remove markers of the applicable family from the selection
pub fn remove_clozes(ctx: &mut EditorContext<'_>) {
    let family = ctx.marker_family();
    let selection = ctx.surface.selection_html();
    let cleaned = cloze::strip(family, &selection);
    ctx.surface
        .replace_selection_html(strip_leading_list_item(&cleaned));
}

/// Run the generator on a managed note, warning on anything else
pub fn generate_clozes(
    ctx: &mut EditorContext<'_>,
    markup: Option<ListMarkup>,
) -> Result<Option<Generated>> {
    let check = ctx.check_model(true);
    if let Some(message) = check.message() {
        ctx.host.tooltip(&message, DEFAULT_TOOLTIP_PERIOD);
        return Ok(None);
    }

    let request = GenerateRequest {
        markup,
        silent: false,
    };
    let generated = ctx.generator.add(ctx.note, request)?;
    tracing::info!(
        "Generated {} overlapping clozes (ok: {})",
        generated.total,
        generated.ok
    );
    Ok(Some(generated))
}

/// Open the note options dialog for managed notes.
///
/// Returns false when the note type is not managed.
pub fn open_note_settings(ctx: &mut EditorContext<'_>) -> bool {
    let check = ctx.check_model(true);
    if let Some(message) = check.message() {
        ctx.host.tooltip(&message, DEFAULT_TOOLTIP_PERIOD);
        return false;
    }
    ctx.host.open_note_options(ctx.note);
    true
}

/// Wrap the content of each top-level node of `html` in a cloze.
///
/// Every line of a top-level text node counts as its own node, so no
/// marker spans a line break. With `increment` successive nodes count up
/// from `first`, otherwise they all share it.
///
/// Unlike the add-on inside the desktop editor, whitespace-only text and
/// blank lines, void elements and comments are left alone and do not
/// use up an index. Nested elements are not descended into; an element
/// whose content spans lines gets one marker per line, all with the
/// element's index.
pub fn wrap_children(html: &str, family: MarkerFamily, first: u32, increment: bool) -> String {
    let mut out = String::with_capacity(html.len() * 2);
    let mut index = first;

    for node in top_level_nodes(html) {
        match node {
            Node::Element { open, inner, close } => {
                out.push_str(&open);
                if inner.contains('\n') {
                    for (n, line) in inner.split('\n').enumerate() {
                        if n > 0 {
                            out.push('\n');
                        }
                        push_wrapped_line(&mut out, line, family, index);
                    }
                } else {
                    out.push_str(&family.wrap(index, &inner));
                }
                out.push_str(&close);
                if increment {
                    index = index.saturating_add(1);
                }
            }
            Node::Text(text) => {
                for (n, line) in text.split('\n').enumerate() {
                    if n > 0 {
                        out.push('\n');
                    }
                    if push_wrapped_line(&mut out, line, family, index) && increment {
                        index = index.saturating_add(1);
                    }
                }
            }
            other => other.write_to(&mut out),
        }
    }

    out
}

/// Wrap one line, keeping its surrounding whitespace outside the marker.
/// Blank lines are copied as they are. Returns whether a marker was
/// written.
fn push_wrapped_line(out: &mut String, line: &str, family: MarkerFamily, index: u32) -> bool {
    let body = line.trim();
    if body.is_empty() {
        out.push_str(line);
        return false;
    }
    let start = line.len() - line.trim_start().len();
    out.push_str(&line[..start]);
    out.push_str(&family.wrap(index, body));
    out.push_str(&line[start + body.len()..]);
    true
}

/// Drop one leading `<li>`.
///
/// Inserting HTML that starts with a list item into a list item makes the
/// editor duplicate it.
pub fn strip_leading_list_item(html: &str) -> &str {
    html.strip_prefix("<li>").unwrap_or(html)
}
