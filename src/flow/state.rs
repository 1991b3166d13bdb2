//! Wizard state machine — step position, commit status, accumulated form.
//!
//! Pure transitions only; the controller layers session checks and the
//! actual gateway write on top.

use serde::Serialize;

use super::form::FormData;
use super::step::FlowPlan;

/// Status of the commit step's external write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    /// Nothing outstanding.
    Idle,
    /// A write is outstanding. Overlays the commit step.
    InFlight,
    /// The last write failed; the user may retry or retreat.
    Failed { reason: String },
}

/// Result of a completed flow, shown on the terminal step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowOutcome {
    ApplicationAccepted { reference: String, tx_hash: String },
    ProfileCreated { credit_score: u16, tx_hash: String },
}

/// Mutable state of one wizard instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowState {
    /// 1-indexed, bounded by `[1, N]`.
    pub current_step: usize,
    pub commit: CommitStatus,
    pub form: FormData,
    pub outcome: Option<FlowOutcome>,
}

impl FlowState {
    pub fn new() -> Self {
        Self {
            current_step: 1,
            commit: CommitStatus::Idle,
            form: FormData::new(),
            outcome: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.commit, CommitStatus::InFlight)
    }

    pub fn commit_error(&self) -> Option<&str> {
        match &self.commit {
            CommitStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Advance below the commit step. No-op at the commit step (that path
    /// goes through `begin_commit`), at the terminal step, and while a
    /// write is in flight.
    pub fn advance_step(&mut self, plan: &FlowPlan) -> bool {
        if self.is_processing() || self.current_step >= plan.commit_step() {
            return false;
        }
        self.current_step += 1;
        true
    }

    /// Enter the in-flight sub-state from the commit step. Returns false
    /// (and changes nothing) anywhere else or when already in flight.
    pub fn begin_commit(&mut self, plan: &FlowPlan) -> bool {
        if self.current_step != plan.commit_step() || self.is_processing() {
            return false;
        }
        self.commit = CommitStatus::InFlight;
        true
    }

    /// Confirmed success: move to the terminal step.
    pub fn complete_commit(&mut self, plan: &FlowPlan, outcome: FlowOutcome) {
        self.current_step = plan.terminal_step();
        self.commit = CommitStatus::Idle;
        self.outcome = Some(outcome);
    }

    /// Failed write: stay on the commit step in a distinct error state.
    pub fn fail_commit(&mut self, reason: impl Into<String>) {
        self.commit = CommitStatus::Failed {
            reason: reason.into(),
        };
    }

    /// Step back. Disallowed from step 1, from the terminal step, and
    /// while a write is in flight. Clears a failed commit.
    pub fn retreat(&mut self, plan: &FlowPlan) -> bool {
        if self.is_processing()
            || self.current_step <= 1
            || self.current_step >= plan.terminal_step()
        {
            return false;
        }
        self.current_step -= 1;
        self.commit = CommitStatus::Idle;
        true
    }

    /// Back to step 1 with everything cleared.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}
