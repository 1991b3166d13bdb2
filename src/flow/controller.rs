//! Flow controller — drives one wizard instance.
//!
//! Navigation is synchronous; the only suspension point is between
//! issuing the commit write and receiving its outcome. Within one
//! instance transitions are serialized by the in-flight flag: a second
//! `advance` while a write is outstanding changes nothing and issues
//! nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::error::{FlowError, GatewayError};
use crate::gateway::ContractGateway;
use crate::session::WalletSession;

use super::form::FormData;
use super::state::{FlowOutcome, FlowState};
use super::step::{FlowPlan, StepDef};

/// The one committing action of a flow, fed by the accumulated form.
#[async_trait]
pub trait CommitAction: Send + Sync {
    /// Build the payload and issue the external write.
    async fn submit(
        &self,
        form: &FormData,
        gateway: &dyn ContractGateway,
    ) -> Result<FlowOutcome, GatewayError>;

    /// Optional review payload for the commit step.
    fn summary(&self, _form: &FormData) -> Option<serde_json::Value> {
        None
    }
}

/// Notifications to the host screen.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    StepChanged { flow_id: Uuid, step: usize },
    CommitStarted { flow_id: Uuid },
    CommitFailed { flow_id: Uuid, reason: String },
    Completed { flow_id: Uuid },
    Closed { flow_id: Uuid },
}

/// What a navigation call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Progress {
    /// Moved to the given step.
    Moved { step: usize },
    /// Nothing changed (boundary, or a write already in flight).
    NoOp { step: usize },
    /// The commit write succeeded; the flow is on its terminal step.
    Completed { outcome: FlowOutcome },
    /// The commit write failed; the flow stays on the commit step.
    CommitFailed { reason: String },
    /// The write resolved after the flow was closed; its result was
    /// discarded.
    Abandoned,
}

/// Serializable snapshot of a flow for the host.
#[derive(Debug, Clone, Serialize)]
pub struct FlowStatus {
    pub id: Uuid,
    pub flow: &'static str,
    pub current_step: usize,
    pub total_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepDef>,
    pub processing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FlowOutcome>,
    pub form: FormData,
}

pub struct FlowController {
    id: Uuid,
    plan: FlowPlan,
    action: Arc<dyn CommitAction>,
    gateway: Arc<dyn ContractGateway>,
    session: Arc<WalletSession>,
    state: RwLock<FlowState>,
    /// Bumped on reset/close; a write completing under a stale epoch is
    /// discarded instead of touching the fresh state.
    epoch: AtomicU64,
    events: Option<mpsc::Sender<FlowEvent>>,
}

impl FlowController {
    pub fn new(
        plan: FlowPlan,
        action: Arc<dyn CommitAction>,
        gateway: Arc<dyn ContractGateway>,
        session: Arc<WalletSession>,
        events: Option<mpsc::Sender<FlowEvent>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan,
            action,
            gateway,
            session,
            state: RwLock::new(FlowState::new()),
            epoch: AtomicU64::new(0),
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn plan(&self) -> &FlowPlan {
        &self.plan
    }

    /// Merge a field patch into the form.
    pub async fn set_fields(&self, patch: FormData) {
        let mut state = self.state.write().await;
        state.form.merge(patch);
    }

    /// Move forward one step. At the commit step this gates on the wallet
    /// session, issues the external write, and suspends until it
    /// resolves; success lands on the terminal step, failure stays on the
    /// commit step in a retryable error state.
    pub async fn advance(&self) -> Result<Progress, FlowError> {
        let (form, epoch) = {
            let mut state = self.state.write().await;
            if state.is_processing() {
                return Ok(Progress::NoOp {
                    step: state.current_step,
                });
            }
            if state.current_step < self.plan.commit_step() {
                state.advance_step(&self.plan);
                let step = state.current_step;
                drop(state);
                self.emit(FlowEvent::StepChanged {
                    flow_id: self.id,
                    step,
                })
                .await;
                return Ok(Progress::Moved { step });
            }
            if state.current_step == self.plan.terminal_step() {
                return Ok(Progress::NoOp {
                    step: state.current_step,
                });
            }

            // Commit step. The session gate comes before the in-flight
            // flag so a disconnected user never issues a write.
            if !self.session.is_connected().await {
                return Err(FlowError::NotConnected);
            }
            if !state.begin_commit(&self.plan) {
                return Ok(Progress::NoOp {
                    step: state.current_step,
                });
            }
            (state.form.clone(), self.epoch.load(Ordering::Acquire))
        };

        self.emit(FlowEvent::CommitStarted { flow_id: self.id }).await;
        tracing::info!(flow = self.plan.name, flow_id = %self.id, "Submitting commit write");

        let result = self.action.submit(&form, self.gateway.as_ref()).await;

        let mut state = self.state.write().await;
        if self.epoch.load(Ordering::Acquire) != epoch {
            tracing::debug!(
                flow_id = %self.id,
                "Write resolved after the flow was closed — discarding"
            );
            return Ok(Progress::Abandoned);
        }

        match result {
            Ok(outcome) => {
                state.complete_commit(&self.plan, outcome.clone());
                drop(state);
                tracing::info!(flow = self.plan.name, flow_id = %self.id, "Flow completed");
                self.emit(FlowEvent::Completed { flow_id: self.id }).await;
                Ok(Progress::Completed { outcome })
            }
            Err(error) => {
                let reason = error.to_string();
                state.fail_commit(reason.clone());
                drop(state);
                tracing::warn!(
                    flow = self.plan.name,
                    flow_id = %self.id,
                    error = %reason,
                    "Commit write failed"
                );
                self.emit(FlowEvent::CommitFailed {
                    flow_id: self.id,
                    reason: reason.clone(),
                })
                .await;
                Ok(Progress::CommitFailed { reason })
            }
        }
    }

    /// Move back one step. Disallowed from step 1, from the terminal
    /// step, and while a write is in flight.
    pub async fn retreat(&self) -> Progress {
        let mut state = self.state.write().await;
        if state.retreat(&self.plan) {
            let step = state.current_step;
            drop(state);
            self.emit(FlowEvent::StepChanged {
                flow_id: self.id,
                step,
            })
            .await;
            Progress::Moved { step }
        } else {
            Progress::NoOp {
                step: state.current_step,
            }
        }
    }

    /// Reset to step 1 and notify the host. An in-flight write is
    /// abandoned, not cancelled: it may still land on the external
    /// system, but its result can no longer touch this flow.
    pub async fn close(&self) {
        {
            let mut state = self.state.write().await;
            self.epoch.fetch_add(1, Ordering::AcqRel);
            state.reset();
        }
        self.emit(FlowEvent::Closed { flow_id: self.id }).await;
    }

    pub async fn status(&self) -> FlowStatus {
        let state = self.state.read().await;
        let at_commit = state.current_step == self.plan.commit_step();
        FlowStatus {
            id: self.id,
            flow: self.plan.name,
            current_step: state.current_step,
            total_steps: self.plan.total_steps(),
            step: self.plan.step(state.current_step).cloned(),
            processing: state.is_processing(),
            commit_error: state.commit_error().map(str::to_string),
            summary: at_commit.then(|| self.action.summary(&state.form)).flatten(),
            outcome: state.outcome.clone(),
            form: state.form.clone(),
        }
    }

    async fn emit(&self, event: FlowEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}
