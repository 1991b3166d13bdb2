//! Flow plans — the ordered steps each wizard walks through.
//!
//! Every plan has the same skeleton: leading info/input steps, one commit
//! step second from the end, and a terminal confirmation step last.

use serde::Serialize;

/// What a step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Informational, nothing collected.
    Info,
    /// Collects form fields.
    Input,
    /// Completing this step triggers the external write.
    Commit,
    /// Confirmation; only `close` leaves it.
    Terminal,
}

/// One step in a plan.
#[derive(Debug, Clone, Serialize)]
pub struct StepDef {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: StepKind,
}

/// An ordered, fixed sequence of steps.
#[derive(Debug, Clone, Serialize)]
pub struct FlowPlan {
    pub name: &'static str,
    steps: Vec<StepDef>,
}

impl FlowPlan {
    fn new(name: &'static str, steps: Vec<StepDef>) -> Self {
        debug_assert!(steps.len() >= 2);
        debug_assert!(matches!(steps[steps.len() - 2].kind, StepKind::Commit));
        debug_assert!(matches!(steps[steps.len() - 1].kind, StepKind::Terminal));
        debug_assert!(
            steps
                .iter()
                .filter(|s| matches!(s.kind, StepKind::Commit | StepKind::Terminal))
                .count()
                == 2
        );
        Self { name, steps }
    }

    /// The five-step loan application wizard.
    pub fn loan_application() -> Self {
        Self::new(
            "loan_application",
            vec![
                StepDef { key: "intro", title: "Loan Application", kind: StepKind::Info },
                StepDef { key: "details", title: "Loan Details", kind: StepKind::Input },
                StepDef { key: "terms", title: "Loan Terms", kind: StepKind::Input },
                StepDef { key: "review", title: "Review Application", kind: StepKind::Commit },
                StepDef { key: "confirmation", title: "Application Submitted", kind: StepKind::Terminal },
            ],
        )
    }

    /// The four-step private score generation wizard.
    pub fn score_generation() -> Self {
        Self::new(
            "score_generation",
            vec![
                StepDef { key: "sources", title: "Connect Your Financial Data", kind: StepKind::Info },
                StepDef { key: "applicant", title: "Personal Information", kind: StepKind::Input },
                StepDef { key: "bank", title: "Bank Account Connection", kind: StepKind::Commit },
                StepDef { key: "confirmation", title: "Private Score Generated", kind: StepKind::Terminal },
            ],
        )
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// 1-indexed position of the commit step (always `N - 1`).
    pub fn commit_step(&self) -> usize {
        self.steps.len() - 1
    }

    /// 1-indexed position of the terminal step (always `N`).
    pub fn terminal_step(&self) -> usize {
        self.steps.len()
    }

    /// Look up a step by 1-indexed position.
    pub fn step(&self, position: usize) -> Option<&StepDef> {
        if position == 0 {
            return None;
        }
        self.steps.get(position - 1)
    }
}
