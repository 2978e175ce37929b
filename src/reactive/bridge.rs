use std::time::Duration;

use crate::model::Selection;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Debounced one-way link from a chart's brush to the view it filters.
/// Timestamps are supplied by the caller, measured from any fixed origin.
#[derive(Debug, Clone)]
pub struct SelectionBridge {
    debounce: Duration,
    pending: Option<(Selection, Duration)>,
}

impl SelectionBridge {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
        }
    }

    /// Records the newest selection and restarts the debounce window.
    pub fn push(&mut self, selection: Selection, now: Duration) {
        self.pending = Some((selection, now));
    }

    /// Hands out the pending selection once it has been quiet for the
    /// debounce interval.
    pub fn poll(&mut self, now: Duration) -> Option<Selection> {
        let ready = matches!(&self.pending, Some((_, at)) if now.saturating_sub(*at) >= self.debounce);
        if !ready {
            return None;
        }
        self.pending.take().map(|(selection, _)| selection)
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops a selection still waiting out the debounce window.
    pub fn reset(&mut self) {
        self.pending = None;
    }
}

impl Default for SelectionBridge {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
