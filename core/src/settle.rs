//! First-settlement-wins outcome cell.
//!
//! A call can produce more than one completion signal: a status rejection
//! when the head arrives, then a parse result or a transport error when the
//! body ends. `Settlement` keeps the first one and discards the rest. It is
//! owned by a single in-flight call, so `&mut self` is enough to rule out two
//! settlements racing.

/// Holds the outcome of one call. Only the first `settle` is kept.
#[derive(Debug)]
pub struct Settlement<T, E> {
    outcome: Option<Result<T, E>>,
}

impl<T, E> Default for Settlement<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Settlement<T, E> {
    pub fn new() -> Self {
        Self { outcome: None }
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Record `outcome` if nothing was recorded yet. Returns `true` when this
    /// call settled the cell.
    pub fn settle(&mut self, outcome: Result<T, E>) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn resolve(&mut self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&mut self, err: E) -> bool {
        self.settle(Err(err))
    }

    /// Like `settle`, but `f` only runs when the cell is still open.
    pub fn settle_with<F>(&mut self, f: F) -> bool
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(f());
        true
    }

    /// Consume the cell, settling it with `f` first if it is still open.
    pub fn finish_with<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match self.outcome {
            Some(outcome) => outcome,
            None => f(),
        }
    }

    /// Consume the cell. `None` if it was never settled.
    pub fn into_outcome(self) -> Option<Result<T, E>> {
        self.outcome
    }
}
