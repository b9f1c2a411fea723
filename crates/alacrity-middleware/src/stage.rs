//! Stage names and the global handler stacks.
//!
//! Requests flow through a fixed order of stages:
//!
//! ```text
//! setup → use (pre-route) → route handlers → after → finally
//! ```
//!
//! `setup` runs before routing, unconditionally. `use` runs before the route
//! handlers and is frozen per route at registration time. `after` runs
//! post-handler and is skipped on error. `finally` runs unconditionally,
//! exactly once, even after an error — it is the guaranteed-cleanup stage.
//! Within any stage, handlers execute in insertion order.

use alacrity_core::{boxed, BoxedHandler, Handler};

/// One named phase of the middleware pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Pre-routing middleware; always runs first.
    Setup,
    /// Pre-route middleware, frozen per route at registration time.
    Pre,
    /// Post-handler middleware; skipped when the pipeline fails.
    After,
    /// Guaranteed cleanup; always runs, exactly once.
    Finally,
}

impl Stage {
    /// Returns the stage's wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Pre => "use",
            Self::After => "after",
            Self::Finally => "finally",
        }
    }

    /// Parses a stage name. Accepts `"pre"` as an alias for `"use"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "setup" => Some(Self::Setup),
            "use" | "pre" => Some(Self::Pre),
            "after" => Some(Self::After),
            "finally" => Some(Self::Finally),
            _ => None,
        }
    }

    /// All stages, in execution order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Setup, Self::Pre, Self::After, Self::Finally]
    }
}

/// The four global handler stacks.
///
/// Mutated during application configuration only; steady-state serving reads
/// them without locking. Adding stages while traffic is live is outside the
/// supported contract.
#[derive(Default)]
pub struct StageStacks {
    setup: Vec<BoxedHandler>,
    pre: Vec<BoxedHandler>,
    after: Vec<BoxedHandler>,
    finalizers: Vec<BoxedHandler>,
}

impl StageStacks {
    /// Creates empty stacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the given stage, preserving insertion order.
    pub fn add<H: Handler>(&mut self, stage: Stage, handler: H) {
        self.add_boxed(stage, boxed(handler));
    }

    /// Appends an already-boxed handler to the given stage.
    pub fn add_boxed(&mut self, stage: Stage, handler: BoxedHandler) {
        match stage {
            Stage::Setup => self.setup.push(handler),
            Stage::Pre => self.pre.push(handler),
            Stage::After => self.after.push(handler),
            Stage::Finally => self.finalizers.push(handler),
        }
    }

    /// The setup stack.
    #[must_use]
    pub fn setup(&self) -> &[BoxedHandler] {
        &self.setup
    }

    /// The pre-route ("use") stack.
    #[must_use]
    pub fn pre(&self) -> &[BoxedHandler] {
        &self.pre
    }

    /// The after stack.
    #[must_use]
    pub fn after(&self) -> &[BoxedHandler] {
        &self.after
    }

    /// The finally stack.
    #[must_use]
    pub fn finalizers(&self) -> &[BoxedHandler] {
        &self.finalizers
    }

    /// Number of pre-route handlers currently registered.
    ///
    /// Recorded into each route at registration time as its frozen step
    /// count.
    #[must_use]
    pub fn pre_len(&self) -> usize {
        self.pre.len()
    }
}
