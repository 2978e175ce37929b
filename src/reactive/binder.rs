use std::collections::BTreeSet;

use crate::charts::{ChartError, ChartSpec};
use crate::input::InputError;
use crate::model::{Param, Value, WidgetError, WidgetState};

pub type PaneId = &'static str;

/// What a pane currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneContent {
    Markdown(String),
    Chart(ChartSpec),
    /// Intentional empty state, e.g. no selection yet.
    Placeholder(String),
    /// The pane's last recomputation failed.
    Error(String),
}

impl PaneContent {
    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            PaneContent::Chart(spec) => Some(spec),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        matches!(self, PaneContent::Error(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaneError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

type BuildFn<C> = Box<dyn Fn(&C, &WidgetState) -> Result<PaneContent, PaneError>>;

struct Binding<C> {
    pane: PaneId,
    deps: BTreeSet<Param>,
    build: BuildFn<C>,
    content: PaneContent,
    runs: u64,
}

impl<C> Binding<C> {
    fn run(&mut self, ctx: &C, state: &WidgetState) {
        self.runs += 1;
        self.content = match (self.build)(ctx, state) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(pane = self.pane, error = %err, "pane recomputation failed");
                PaneContent::Error(err.to_string())
            }
        };
    }
}

/// Static dependency graph from widget parameters to panes. A change to a
/// parameter re-runs exactly the bindings that list it, in registration
/// order, and replaces their content wholesale.
pub struct Binder<C> {
    state: WidgetState,
    bindings: Vec<Binding<C>>,
}

impl<C> Binder<C> {
    pub fn new(state: WidgetState) -> Self {
        Self {
            state,
            bindings: Vec::new(),
        }
    }

    /// Registers a pane and computes its first content.
    pub fn bind<F>(&mut self, ctx: &C, pane: PaneId, deps: &[Param], build: F)
    where
        F: Fn(&C, &WidgetState) -> Result<PaneContent, PaneError> + 'static,
    {
        let mut binding = Binding {
            pane,
            deps: deps.iter().copied().collect(),
            build: Box::new(build),
            content: PaneContent::Placeholder(String::new()),
            runs: 0,
        };
        binding.run(ctx, &self.state);
        self.bindings.retain(|b| b.pane != pane);
        self.bindings.push(binding);
    }

    /// Applies a widget change. Returns the panes that were recomputed,
    /// empty when the value did not change.
    pub fn set(&mut self, ctx: &C, param: Param, value: Value) -> Result<Vec<PaneId>, WidgetError> {
        if !self.state.set(param, value)? {
            return Ok(Vec::new());
        }
        let mut refreshed = Vec::new();
        for binding in self.bindings.iter_mut().filter(|b| b.deps.contains(&param)) {
            binding.run(ctx, &self.state);
            refreshed.push(binding.pane);
        }
        tracing::debug!(%param, panes = ?refreshed, "widget changed");
        Ok(refreshed)
    }

    /// Re-runs one pane regardless of widget changes, for inputs that live
    /// outside the widget state.
    pub fn refresh(&mut self, ctx: &C, pane: PaneId) -> bool {
        match self.bindings.iter_mut().find(|b| b.pane == pane) {
            Some(binding) => {
                binding.run(ctx, &self.state);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn content(&self, pane: PaneId) -> Option<&PaneContent> {
        self.bindings
            .iter()
            .find(|b| b.pane == pane)
            .map(|b| &b.content)
    }

    pub fn recomputations(&self, pane: PaneId) -> u64 {
        self.bindings
            .iter()
            .find(|b| b.pane == pane)
            .map(|b| b.runs)
            .unwrap_or(0)
    }

    pub fn dependents(&self, param: Param) -> Vec<PaneId> {
        self.bindings
            .iter()
            .filter(|b| b.deps.contains(&param))
            .map(|b| b.pane)
            .collect()
    }

    pub fn panes(&self) -> impl Iterator<Item = (PaneId, &PaneContent)> {
        self.bindings.iter().map(|b| (b.pane, &b.content))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/reactive/binder.rs"]
mod tests;
