//! # Lifecycle Hooks
//!
//! Instead of patching the host's methods, every lifecycle event the
//! add-on cares about is a [`HookPoint`] with an ordered [`Pipeline`] of
//! handlers around a base operation supplied by the host.
//!
//! ## Order of execution
//!
//! 1. `before` handlers, in registration order. Each returns a [`Flow`]:
//!    - `Continue`: run the next handler
//!    - `Handled`: skip the remaining `before` handlers and the base
//!    - `Abort`: stop the whole operation, nothing else runs
//! 2. the base operation, unless a handler took over
//! 3. `after` handlers, in registration order. `Abort` skips the rest.
//!
//! Errors from any step are returned as-is.

use std::collections::HashMap;

use anyhow::Result;

use crate::editor::EditorContext;
use crate::overlapper::Generated;

/// Lifecycle events of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// The editor's own cloze button or hotkey
    InsertCloze,

    /// Adding the note in the add-cards window
    AddCards,

    /// Saving and closing the edit-current window
    SaveAndClose,

    /// A new note has been written to the collection
    NotePersisted,
}

/// What a handler wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Handled,
    Abort,
}

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The base operation ran
    Completed,

    /// A handler replaced the base operation
    Handled,

    /// A `before` handler aborted the operation
    Aborted,
}

/// State shared by the handlers of one pipeline run
pub struct HookContext<'a, 'b> {
    pub editor: &'b mut EditorContext<'a>,

    /// Result of the generator, when a handler ran it
    pub generated: Option<Generated>,
}

/// A registered handler
pub type Handler = Box<dyn FnMut(&mut HookContext<'_, '_>) -> Result<Flow>>;

struct NamedHandler {
    name: String,
    handler: Handler,
}

/// Ordered handlers around one base operation
#[derive(Default)]
pub struct Pipeline {
    before: Vec<NamedHandler>,
    after: Vec<NamedHandler>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&mut HookContext<'_, '_>) -> Result<Flow> + 'static,
    {
        self.before.push(NamedHandler {
            name: name.to_string(),
            handler: Box::new(handler),
        });
    }

    pub fn after<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&mut HookContext<'_, '_>) -> Result<Flow> + 'static,
    {
        self.after.push(NamedHandler {
            name: name.to_string(),
            handler: Box::new(handler),
        });
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the handlers around `base`
    pub fn run<F>(&mut self, ctx: &mut HookContext<'_, '_>, base: F) -> Result<Outcome>
    where
        F: FnOnce(&mut EditorContext<'_>) -> Result<()>,
    {
        let mut outcome = Outcome::Completed;

        for entry in &mut self.before {
            match (entry.handler)(ctx)? {
                Flow::Continue => {}
                Flow::Handled => {
                    tracing::debug!("'{}' handled the operation", entry.name);
                    outcome = Outcome::Handled;
                    break;
                }
                Flow::Abort => {
                    tracing::debug!("'{}' aborted the operation", entry.name);
                    return Ok(Outcome::Aborted);
                }
            }
        }

        if outcome == Outcome::Completed {
            base(&mut *ctx.editor)?;
        }

        for entry in &mut self.after {
            if (entry.handler)(ctx)? == Flow::Abort {
                tracing::debug!("'{}' stopped the remaining handlers", entry.name);
                break;
            }
        }

        Ok(outcome)
    }
}

/// All pipelines, keyed by hook point
#[derive(Default)]
pub struct Hooks {
    pipelines: HashMap<HookPoint, Pipeline>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipeline_mut(&mut self, point: HookPoint) -> &mut Pipeline {
        self.pipelines.entry(point).or_default()
    }

    pub fn before<F>(&mut self, point: HookPoint, name: &str, handler: F)
    where
        F: FnMut(&mut HookContext<'_, '_>) -> Result<Flow> + 'static,
    {
        self.pipeline_mut(point).before(name, handler);
    }

    pub fn after<F>(&mut self, point: HookPoint, name: &str, handler: F)
    where
        F: FnMut(&mut HookContext<'_, '_>) -> Result<Flow> + 'static,
    {
        self.pipeline_mut(point).after(name, handler);
    }

    /// Number of handlers registered for `point`
    pub fn handler_count(&self, point: HookPoint) -> usize {
        self.pipelines.get(&point).map_or(0, Pipeline::len)
    }

    /// Run the pipeline of `point` around `base`
    pub fn run<F>(
        &mut self,
        point: HookPoint,
        editor: &mut EditorContext<'_>,
        base: F,
    ) -> Result<Outcome>
    where
        F: FnOnce(&mut EditorContext<'_>) -> Result<()>,
    {
        let mut ctx = HookContext {
            editor,
            generated: None,
        };
        match self.pipelines.get_mut(&point) {
            Some(pipeline) => pipeline.run(&mut ctx, base),
            None => {
                base(&mut *ctx.editor)?;
                Ok(Outcome::Completed)
            }
        }
    }
}
