//! Loan application flow — product catalog, offer context, and the
//! commit payload built from the accumulated form.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::GatewayError;
use crate::gateway::types::{Collateral, LoanApplication, LoanPurpose};
use crate::gateway::ContractGateway;

use super::controller::CommitAction;
use super::form::FormData;
use super::state::FlowOutcome;

/// Form field keys collected across the loan steps.
pub mod fields {
    pub const AMOUNT: &str = "loan_amount";
    pub const PURPOSE: &str = "loan_purpose";
    pub const TERM_MONTHS: &str = "loan_term";
    pub const COLLATERAL: &str = "collateral";
}

/// A loan product on offer.
#[derive(Debug, Clone, Serialize)]
pub struct LoanProduct {
    pub key: &'static str,
    pub name: &'static str,
    /// Annual percentage rate.
    pub apr: Decimal,
    pub max_amount: u64,
    /// Required collateralization, whole-number percent.
    pub collateral_ratio: u16,
    pub featured: bool,
}

/// The fixed product catalog.
pub fn products() -> Vec<LoanProduct> {
    vec![
        LoanProduct {
            key: "premium",
            name: "Premium Loan",
            apr: dec!(5.2),
            max_amount: 500_000,
            collateral_ratio: 150,
            featured: true,
        },
        LoanProduct {
            key: "standard",
            name: "Standard Loan",
            apr: dec!(7.8),
            max_amount: 100_000,
            collateral_ratio: 200,
            featured: false,
        },
        LoanProduct {
            key: "starter",
            name: "Starter Loan",
            apr: dec!(12.5),
            max_amount: 25_000,
            collateral_ratio: 300,
            featured: false,
        },
    ]
}

pub fn product(key: &str) -> Option<LoanProduct> {
    products().into_iter().find(|p| p.key == key)
}

/// The offer a loan wizard was opened for. Passed into the controller
/// explicitly rather than read from ambient screen state.
#[derive(Debug, Clone, Serialize)]
pub struct LoanOffer {
    pub product: String,
    pub apr: Decimal,
}

impl From<&LoanProduct> for LoanOffer {
    fn from(product: &LoanProduct) -> Self {
        Self {
            product: product.name.to_string(),
            apr: product.apr,
        }
    }
}

/// Rough monthly payment shown on the review step: 8% flat annual rate
/// over twelve months, rounded to whole dollars.
pub fn monthly_payment_estimate(amount: Decimal) -> Decimal {
    (amount * dec!(0.08) / dec!(12)).round()
}

/// Assemble the on-chain payload from whatever the form holds. Missing
/// fields become zero/unspecified; nothing is rejected here.
pub fn build_application(form: &FormData) -> LoanApplication {
    LoanApplication {
        amount: form.number(fields::AMOUNT).unwrap_or(Decimal::ZERO),
        purpose: form
            .text(fields::PURPOSE)
            .as_deref()
            .and_then(LoanPurpose::from_form_value),
        term_months: form
            .number(fields::TERM_MONTHS)
            .and_then(|n| n.to_u8())
            .unwrap_or(0),
        collateral: form
            .text(fields::COLLATERAL)
            .as_deref()
            .and_then(Collateral::from_form_value),
    }
}

/// Reference shown on the confirmation step, e.g. `LN-2026-9KQ2ZD`.
pub fn application_reference() -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("LN-{}-{}", Utc::now().year(), suffix)
}

/// Commit action for the loan wizard.
pub struct LoanSubmission {
    pub offer: LoanOffer,
}

#[async_trait]
impl CommitAction for LoanSubmission {
    async fn submit(
        &self,
        form: &FormData,
        gateway: &dyn ContractGateway,
    ) -> Result<FlowOutcome, GatewayError> {
        let application = build_application(form);
        let receipt = gateway.submit_application(application).await?;
        Ok(FlowOutcome::ApplicationAccepted {
            reference: application_reference(),
            tx_hash: receipt.tx_hash,
        })
    }

    fn summary(&self, form: &FormData) -> Option<serde_json::Value> {
        let application = build_application(form);
        Some(serde_json::json!({
            "product": self.offer.product,
            "apr": self.offer.apr,
            "amount": application.amount,
            "purpose": application.purpose,
            "term_months": application.term_months,
            "collateral": application.collateral,
            "estimated_monthly_payment": monthly_payment_estimate(application.amount),
        }))
    }
}
