//! Private score generation flow — applicant details and the encrypted
//! profile submission.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;

use crate::error::GatewayError;
use crate::gateway::ContractGateway;
use crate::gateway::types::CreateProfileRequest;

use super::controller::CommitAction;
use super::form::FormData;
use super::state::FlowOutcome;

/// Form field keys collected across the score steps.
pub mod fields {
    pub const FULL_NAME: &str = "full_name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const CREDIT_SCORE: &str = "credit_score";
    pub const RISK_LEVEL: &str = "risk_level";
    pub const COLLATERAL_RATIO: &str = "collateral_ratio";
}

/// Assemble the profile payload from the form. The proof stays empty
/// pass-through bytes; nothing cryptographic happens on this side.
pub fn build_request(form: &FormData) -> CreateProfileRequest {
    CreateProfileRequest {
        credit_score: form
            .number(fields::CREDIT_SCORE)
            .and_then(|n| n.to_u16())
            .unwrap_or(0),
        risk_level: form
            .number(fields::RISK_LEVEL)
            .and_then(|n| n.to_u8())
            .unwrap_or(0),
        collateral_ratio: form
            .number(fields::COLLATERAL_RATIO)
            .and_then(|n| n.to_u8())
            .unwrap_or(0),
        proof: Vec::new(),
    }
}

/// Commit action for the score wizard.
pub struct ScoreSubmission;

#[async_trait]
impl CommitAction for ScoreSubmission {
    async fn submit(
        &self,
        form: &FormData,
        gateway: &dyn ContractGateway,
    ) -> Result<FlowOutcome, GatewayError> {
        let request = build_request(form);
        let credit_score = request.credit_score;
        let receipt = gateway.create_profile(request).await?;
        Ok(FlowOutcome::ProfileCreated {
            credit_score,
            tx_hash: receipt.tx_hash,
        })
    }

    fn summary(&self, form: &FormData) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "full_name": form.text(fields::FULL_NAME),
            "email": form.text(fields::EMAIL),
            "phone": form.text(fields::PHONE),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn request_builds_from_form() {
        let mut form = FormData::new();
        form.set_text(fields::FULL_NAME, "Ada Lovelace");
        form.set_number(fields::CREDIT_SCORE, dec!(742));
        form.set_number(fields::RISK_LEVEL, dec!(1));
        form.set_text(fields::COLLATERAL_RATIO, "85");

        let request = build_request(&form);
        assert_eq!(request.credit_score, 742);
        assert_eq!(request.risk_level, 1);
        assert_eq!(request.collateral_ratio, 85);
        assert!(request.proof.is_empty());
    }

    #[test]
    fn missing_numbers_default_to_zero() {
        let request = build_request(&FormData::new());
        assert_eq!(request.credit_score, 0);
        assert_eq!(request.risk_level, 0);
        assert_eq!(request.collateral_ratio, 0);
    }

    #[test]
    fn out_of_range_numbers_default_to_zero() {
        let mut form = FormData::new();
        form.set_number(fields::RISK_LEVEL, dec!(900));
        assert_eq!(build_request(&form).risk_level, 0);
    }
}
