//! In-memory gateway for demo mode.
//!
//! The product ships without a live deployment: when no RPC endpoint is
//! configured, this gateway serves canned snapshots and accepts writes
//! unconditionally, minting receipt hashes locally.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::error::GatewayError;

use super::ContractGateway;
use super::types::{
    Address, CreateProfileRequest, CreditProfile, LoanApplication, LoanRecord, WriteReceipt,
};

const DEMO_BORROWER: &str = "0x1b5e884f2c2a6bbce92c01d30ffa6a2d941ce6a2";
const DEMO_LENDER: &str = "0x7c3f00521c9b34a2ad87e0b4cf5f04ea3c6d8f10";

pub struct SimulatedGateway {
    profiles: RwLock<HashMap<u64, CreditProfile>>,
    loans: RwLock<HashMap<u64, LoanRecord>>,
    next_profile_id: AtomicU64,
    write_slot: Mutex<()>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        let borrower = Address::parse(DEMO_BORROWER).unwrap_or_else(|_| Address::zero());
        let lender = Address::parse(DEMO_LENDER).unwrap_or_else(|_| Address::zero());
        let now = Utc::now();

        let mut profiles = HashMap::new();
        profiles.insert(
            1,
            CreditProfile {
                credit_score: 742,
                risk_level: 1,
                collateral_ratio: 85,
                is_active: true,
                is_verified: true,
                borrower: borrower.clone(),
                created_at: now - Duration::days(90),
            },
        );

        let mut loans = HashMap::new();
        loans.insert(
            1,
            LoanRecord {
                principal_amount: 25_000,
                interest_rate_bps: 520,
                remaining_balance: 18_750,
                monthly_payment: 760,
                is_active: true,
                is_defaulted: false,
                borrower,
                lender,
                start_date: now - Duration::days(60),
                end_date: now + Duration::days(305),
            },
        );

        Self {
            profiles: RwLock::new(profiles),
            loans: RwLock::new(loans),
            next_profile_id: AtomicU64::new(2),
            write_slot: Mutex::new(()),
        }
    }

    fn mint_tx_hash() -> String {
        format!("0x{:064x}", rand::random::<u128>())
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractGateway for SimulatedGateway {
    async fn read_profile(&self, profile_id: u64) -> Result<CreditProfile, GatewayError> {
        self.profiles
            .read()
            .await
            .get(&profile_id)
            .cloned()
            .ok_or_else(|| GatewayError::ReadFailure(format!("no credit profile with id {profile_id}")))
    }

    async fn read_loan(&self, loan_id: u64) -> Result<LoanRecord, GatewayError> {
        self.loans
            .read()
            .await
            .get(&loan_id)
            .cloned()
            .ok_or_else(|| GatewayError::ReadFailure(format!("no loan with id {loan_id}")))
    }

    async fn create_profile(
        &self,
        request: CreateProfileRequest,
    ) -> Result<WriteReceipt, GatewayError> {
        let _slot = self
            .write_slot
            .try_lock()
            .map_err(|_| GatewayError::WriteInFlight)?;

        let id = self.next_profile_id.fetch_add(1, Ordering::Relaxed);
        let profile = CreditProfile {
            credit_score: request.credit_score,
            risk_level: request.risk_level,
            collateral_ratio: request.collateral_ratio,
            is_active: true,
            is_verified: false,
            borrower: Address::parse(DEMO_BORROWER).unwrap_or_else(|_| Address::zero()),
            created_at: Utc::now(),
        };
        self.profiles.write().await.insert(id, profile);
        tracing::debug!(profile_id = id, "Simulated credit profile created");
        Ok(WriteReceipt {
            tx_hash: Self::mint_tx_hash(),
        })
    }

    async fn submit_application(
        &self,
        application: LoanApplication,
    ) -> Result<WriteReceipt, GatewayError> {
        let _slot = self
            .write_slot
            .try_lock()
            .map_err(|_| GatewayError::WriteInFlight)?;

        tracing::debug!(
            amount = %application.amount,
            term_months = application.term_months,
            "Simulated loan application accepted"
        );
        Ok(WriteReceipt {
            tx_hash: Self::mint_tx_hash(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::LoanPurpose;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn seeded_snapshots_are_served() {
        let gateway = SimulatedGateway::new();
        let profile = gateway.read_profile(1).await.unwrap();
        assert_eq!(profile.credit_score, 742);
        assert!(profile.is_verified);

        let loan = gateway.read_loan(1).await.unwrap();
        assert_eq!(loan.principal_amount, 25_000);
        assert!(!loan.is_defaulted);
    }

    #[tokio::test]
    async fn missing_ids_are_read_failures() {
        let gateway = SimulatedGateway::new();
        assert!(matches!(
            gateway.read_profile(99).await,
            Err(GatewayError::ReadFailure(_))
        ));
        assert!(matches!(
            gateway.read_loan(99).await,
            Err(GatewayError::ReadFailure(_))
        ));
    }

    #[tokio::test]
    async fn create_profile_is_readable_afterwards() {
        let gateway = SimulatedGateway::new();
        let receipt = gateway
            .create_profile(CreateProfileRequest {
                credit_score: 695,
                risk_level: 2,
                collateral_ratio: 70,
                proof: Vec::new(),
            })
            .await
            .unwrap();
        assert!(receipt.tx_hash.starts_with("0x"));
        assert_eq!(receipt.tx_hash.len(), 66);

        let profile = gateway.read_profile(2).await.unwrap();
        assert_eq!(profile.credit_score, 695);
        assert!(!profile.is_verified);
    }

    #[tokio::test]
    async fn concurrent_reads_resolve_independently() {
        let gateway = std::sync::Arc::new(SimulatedGateway::new());
        gateway
            .create_profile(CreateProfileRequest {
                credit_score: 650,
                risk_level: 3,
                collateral_ratio: 50,
                proof: Vec::new(),
            })
            .await
            .unwrap();

        let (a, b) = tokio::join!(gateway.read_profile(1), gateway.read_profile(2));
        assert_eq!(a.unwrap().credit_score, 742);
        assert_eq!(b.unwrap().credit_score, 650);
    }

    #[tokio::test]
    async fn application_receipts_are_distinct() {
        let gateway = SimulatedGateway::new();
        let application = LoanApplication {
            amount: dec!(50000),
            purpose: Some(LoanPurpose::Business),
            term_months: 36,
            collateral: None,
        };
        let first = gateway.submit_application(application.clone()).await.unwrap();
        let second = gateway.submit_application(application).await.unwrap();
        assert_ne!(first.tx_hash, second.tx_hash);
    }
}
