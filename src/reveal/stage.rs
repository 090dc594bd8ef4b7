//! Reveal stage: hosts at most one run, replaced wholesale on every replay.

use tracing::debug;

use super::controller::{PhaseController, RevealRun};
use super::model::RevealConfig;

/// Owns the current run and the reset token that identifies it.
///
/// A run is never restarted in place: `replay` tears the old run down and activates a
/// new one, so the new run starts at phase 0 with a freshly selected schedule.
#[derive(Debug, Default)]
pub struct RevealStage {
    controller: PhaseController,
    reset_token: u64,
    current: Option<RevealRun>,
}

impl RevealStage {
    pub fn new(controller: PhaseController) -> Self {
        Self {
            controller,
            reset_token: 0,
            current: None,
        }
    }

    /// Replace the current run with a fresh one for `config`.
    pub fn replay(&mut self, config: RevealConfig) -> &RevealRun {
        self.clear();
        self.reset_token += 1;
        let run = self.controller.activate(config);
        debug!(reset_token = self.reset_token, run_id = %run.run_id(), "Stage replayed");
        self.current.insert(run)
    }

    /// Tear down the current run, leaving the stage empty.
    pub fn clear(&mut self) {
        if let Some(mut run) = self.current.take() {
            run.teardown();
        }
    }

    pub fn current(&self) -> Option<&RevealRun> {
        self.current.as_ref()
    }

    /// Number of runs started on this stage; identifies the current one.
    pub fn reset_token(&self) -> u64 {
        self.reset_token
    }
}
