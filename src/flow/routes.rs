//! REST surface for the flows, contract reads, and the wallet session.
//!
//! This is how the presentation layer drives the dialogs: open a flow,
//! patch fields and advance, retreat, close. Reads proxy straight
//! through to the gateway.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{RwLock, mpsc};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::{FlowError, GatewayError};
use crate::gateway::ContractGateway;
use crate::gateway::types::Address;
use crate::session::WalletSession;

use super::controller::{FlowController, FlowEvent};
use super::form::FormData;
use super::loan::{self, LoanOffer, LoanSubmission};
use super::score::ScoreSubmission;
use super::step::FlowPlan;

/// Shared state for the REST surface.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ContractGateway>,
    pub session: Arc<WalletSession>,
    pub flows: Arc<RwLock<HashMap<Uuid, Arc<FlowController>>>>,
    pub events: Option<mpsc::Sender<FlowEvent>>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        session: Arc<WalletSession>,
        events: Option<mpsc::Sender<FlowEvent>>,
    ) -> Self {
        Self {
            gateway,
            session,
            flows: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }
}

/// Build the REST routes. CORS stays permissive: the SPA is served from
/// a different origin.
pub fn flow_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/flows", post(open_flow))
        .route("/api/flows/{id}", get(flow_status).delete(close_flow))
        .route("/api/flows/{id}/advance", post(advance_flow))
        .route("/api/flows/{id}/retreat", post(retreat_flow))
        .route("/api/products", get(list_products))
        .route("/api/profiles/{id}", get(read_profile))
        .route("/api/loans/{id}", get(read_loan))
        .route("/api/session", get(session_status))
        .route("/api/session/connect", post(connect_session))
        .route("/api/session/disconnect", post(disconnect_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct OpenFlowRequest {
    flow: String,
    /// Loan product key; required for the loan flow.
    product: Option<String>,
}

/// POST /api/flows — open a wizard.
async fn open_flow(
    State(state): State<AppState>,
    Json(request): Json<OpenFlowRequest>,
) -> Response {
    let controller = match request.flow.as_str() {
        "loan_application" => {
            let key = request.product.unwrap_or_default();
            let Some(product) = loan::product(&key) else {
                return flow_error_response(FlowError::UnknownProduct(key));
            };
            Arc::new(FlowController::new(
                FlowPlan::loan_application(),
                Arc::new(LoanSubmission {
                    offer: LoanOffer::from(&product),
                }),
                Arc::clone(&state.gateway),
                Arc::clone(&state.session),
                state.events.clone(),
            ))
        }
        "score_generation" => Arc::new(FlowController::new(
            FlowPlan::score_generation(),
            Arc::new(ScoreSubmission),
            Arc::clone(&state.gateway),
            Arc::clone(&state.session),
            state.events.clone(),
        )),
        other => return flow_error_response(FlowError::UnknownKind(other.to_string())),
    };

    let status = controller.status().await;
    state
        .flows
        .write()
        .await
        .insert(controller.id(), Arc::clone(&controller));
    tracing::info!(flow = controller.plan().name, flow_id = %controller.id(), "Flow opened");
    (StatusCode::CREATED, Json(status)).into_response()
}

/// GET /api/flows/{id}
async fn flow_status(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(controller) => Json(controller.status().await).into_response(),
        Err(error) => flow_error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
struct AdvanceRequest {
    /// Field patch applied before advancing.
    #[serde(default)]
    fields: FormData,
}

/// POST /api/flows/{id}/advance
async fn advance_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceRequest>,
) -> Response {
    let controller = match lookup(&state, id).await {
        Ok(controller) => controller,
        Err(error) => return flow_error_response(error),
    };
    controller.set_fields(request.fields).await;

    match controller.advance().await {
        Ok(progress) => Json(json!({
            "progress": progress,
            "status": controller.status().await,
        }))
        .into_response(),
        Err(error) => flow_error_response(error),
    }
}

/// POST /api/flows/{id}/retreat
async fn retreat_flow(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match lookup(&state, id).await {
        Ok(controller) => {
            let progress = controller.retreat().await;
            Json(json!({
                "progress": progress,
                "status": controller.status().await,
            }))
            .into_response()
        }
        Err(error) => flow_error_response(error),
    }
}

/// DELETE /api/flows/{id} — close and forget the wizard.
async fn close_flow(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let removed = state.flows.write().await.remove(&id);
    match removed {
        Some(controller) => {
            controller.close().await;
            StatusCode::NO_CONTENT.into_response()
        }
        None => flow_error_response(FlowError::UnknownFlow { id }),
    }
}

/// GET /api/products
async fn list_products() -> Response {
    Json(loan::products()).into_response()
}

/// GET /api/profiles/{id}
async fn read_profile(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.gateway.read_profile(id).await {
        Ok(profile) => Json(profile).into_response(),
        Err(error) => gateway_error_response(error),
    }
}

/// GET /api/loans/{id}
async fn read_loan(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.gateway.read_loan(id).await {
        Ok(loan) => Json(loan).into_response(),
        Err(error) => gateway_error_response(error),
    }
}

/// GET /api/session
async fn session_status(State(state): State<AppState>) -> Response {
    Json(state.session.snapshot().await).into_response()
}

#[derive(Debug, Deserialize)]
struct ConnectRequest {
    account: String,
    #[serde(default = "default_chain_id")]
    chain_id: u64,
}

fn default_chain_id() -> u64 {
    1
}

/// POST /api/session/connect
async fn connect_session(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Response {
    match Address::parse(&request.account) {
        Ok(account) => {
            state.session.connect(account, request.chain_id).await;
            Json(state.session.snapshot().await).into_response()
        }
        Err(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": message })),
        )
            .into_response(),
    }
}

/// POST /api/session/disconnect
async fn disconnect_session(State(state): State<AppState>) -> Response {
    state.session.disconnect().await;
    Json(state.session.snapshot().await).into_response()
}

async fn lookup(state: &AppState, id: Uuid) -> Result<Arc<FlowController>, FlowError> {
    state
        .flows
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or(FlowError::UnknownFlow { id })
}

fn flow_error_response(error: FlowError) -> Response {
    let status = match &error {
        FlowError::NotConnected => StatusCode::CONFLICT,
        FlowError::UnknownFlow { .. } => StatusCode::NOT_FOUND,
        FlowError::UnknownKind(_) | FlowError::UnknownProduct(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn gateway_error_response(error: GatewayError) -> Response {
    let status = match &error {
        GatewayError::ReadFailure(_) => StatusCode::NOT_FOUND,
        GatewayError::NotConnected | GatewayError::WriteInFlight => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
