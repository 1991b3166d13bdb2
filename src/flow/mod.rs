//! Wizard flows — bounded step sequences ending in one committing action.
//!
//! Two flows ship: the loan application and the private score
//! generation. They share the controller, state machine, and form
//! plumbing; each contributes a plan and a commit payload builder.

pub mod controller;
pub mod form;
pub mod loan;
pub mod routes;
pub mod score;
pub mod state;
pub mod step;

pub use controller::{CommitAction, FlowController, FlowEvent, FlowStatus, Progress};
pub use form::{FieldValue, FormData};
pub use routes::{AppState, flow_routes};
pub use state::{CommitStatus, FlowOutcome, FlowState};
pub use step::{FlowPlan, StepDef, StepKind};
