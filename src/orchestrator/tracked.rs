//! Dependency-tracked task bookkeeping

/// Remembers the dependency values a task last ran with.
///
/// A task re-runs only when the freshly read dependencies compare unequal to
/// the recorded ones; polling the task itself never triggers a run.
#[derive(Debug)]
pub struct Tracked<D> {
    last: Option<D>,
    runs: u64,
}

impl<D: PartialEq> Tracked<D> {
    pub fn new() -> Self {
        Self {
            last: None,
            runs: 0,
        }
    }

    /// Record `deps` and report whether the task has to run
    pub fn update(&mut self, deps: D) -> bool {
        if self.last.as_ref() == Some(&deps) {
            return false;
        }
        self.last = Some(deps);
        self.runs = self.runs.saturating_add(1);
        true
    }

    /// Forget the last run so the next update always runs
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&D> {
        self.last.as_ref()
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl<D: PartialEq> Default for Tracked<D> {
    fn default() -> Self {
        Self::new()
    }
}
