//! Contract gateway — named operations against the lending contract.
//!
//! Callers see four operations and typed results; address and interface
//! wiring stay behind the trait. Two implementations:
//! - **`RpcGateway`**: JSON-RPC against a configured endpoint
//! - **`SimulatedGateway`**: in-memory stand-in for demo mode

pub mod abi;
pub mod rpc;
pub mod simulated;
pub mod types;

pub use rpc::RpcGateway;
pub use simulated::SimulatedGateway;
pub use types::{
    Address, Collateral, CreateProfileRequest, CreditProfile, LoanApplication, LoanPurpose,
    LoanRecord, WriteReceipt,
};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ServiceConfig;
use crate::error::GatewayError;
use crate::session::WalletSession;

/// The contract boundary.
///
/// Reads are idempotent and may be in flight concurrently for different
/// ids. Writes are single-flight per gateway instance: an overlapping
/// write attempt is rejected, never queued.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Fetch a credit profile snapshot by id.
    async fn read_profile(&self, profile_id: u64) -> Result<CreditProfile, GatewayError>;

    /// Fetch a loan snapshot by id.
    async fn read_loan(&self, loan_id: u64) -> Result<LoanRecord, GatewayError>;

    /// Submit a new encrypted credit profile.
    async fn create_profile(
        &self,
        request: CreateProfileRequest,
    ) -> Result<WriteReceipt, GatewayError>;

    /// Submit a loan application.
    async fn submit_application(
        &self,
        application: LoanApplication,
    ) -> Result<WriteReceipt, GatewayError>;
}

/// Select a gateway from configuration: JSON-RPC when an endpoint is set,
/// simulated otherwise.
pub fn create_gateway(
    config: &ServiceConfig,
    session: Arc<WalletSession>,
) -> Arc<dyn ContractGateway> {
    match &config.rpc_url {
        Some(url) => {
            tracing::info!(endpoint = %url, contract = %config.contract_address, "Using JSON-RPC gateway");
            Arc::new(RpcGateway::new(
                url.clone(),
                config.contract_address.clone(),
                session,
            ))
        }
        None => {
            tracing::info!("No RPC endpoint configured — using simulated gateway");
            Arc::new(SimulatedGateway::new())
        }
    }
}
