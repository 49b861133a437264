//! Completed-stage tracker.
//!
//! The set only grows: stages are marked once they succeed and never cleared
//! for the lifetime of a pipeline instance.

use std::collections::BTreeSet;

use crate::domain::Stage;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageGate {
    completed: BTreeSet<Stage>,
}

impl StageGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_loaded(&mut self) {
        self.completed.insert(Stage::Loaded);
    }

    /// Called by the pipeline right after a successful forecast; ordering
    /// against `Loaded` is the caller's responsibility.
    pub fn mark_forecasted(&mut self) {
        self.completed.insert(Stage::Forecasted);
    }

    pub fn is_loaded(&self) -> bool {
        self.is_complete(Stage::Loaded)
    }

    pub fn is_forecasted(&self) -> bool {
        self.is_complete(Stage::Forecasted)
    }

    pub fn is_complete(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// `Ok` when `stage` has completed, `NotReady(stage)` otherwise.
    pub fn require(&self, stage: Stage) -> Result<(), AppError> {
        if self.is_complete(stage) {
            Ok(())
        } else {
            Err(AppError::not_ready(stage))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn starts_empty_and_grows() {
        let mut gate = StageGate::new();
        assert!(!gate.is_loaded());
        assert!(!gate.is_forecasted());
        assert_eq!(
            gate.require(Stage::Loaded).unwrap_err().kind(),
            ErrorKind::NotReady(Stage::Loaded)
        );

        gate.mark_loaded();
        gate.mark_loaded();
        assert!(gate.require(Stage::Loaded).is_ok());
        assert_eq!(
            gate.require(Stage::Forecasted).unwrap_err().kind(),
            ErrorKind::NotReady(Stage::Forecasted)
        );

        gate.mark_forecasted();
        assert!(gate.is_loaded() && gate.is_forecasted());
        assert!(gate.require(Stage::Forecasted).is_ok());
    }
}
