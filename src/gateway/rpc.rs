//! JSON-RPC gateway — `eth_call` reads, `eth_sendTransaction` writes.
//!
//! Errors pass through with minimal classification: transport failures,
//! node rejections, and malformed payloads. Nothing is retried here.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::error::GatewayError;
use crate::session::WalletSession;

use super::ContractGateway;
use super::abi::{self, AbiValue};
use super::types::{
    Address, CreateProfileRequest, CreditProfile, LoanApplication, LoanRecord, WriteReceipt,
};

/// How an RPC exchange failed, before mapping to the operation's error.
enum RpcFailure {
    Transport(String),
    Node(String),
    Malformed(String),
}

pub struct RpcGateway {
    client: reqwest::Client,
    endpoint: String,
    contract: Address,
    session: Arc<WalletSession>,
    next_id: AtomicU64,
    /// Held for the duration of a write. `try_lock` keeps overlapping
    /// writes from queueing behind each other.
    write_slot: Mutex<()>,
}

impl RpcGateway {
    pub fn new(endpoint: String, contract: Address, session: Arc<WalletSession>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            contract,
            session,
            next_id: AtomicU64::new(1),
            write_slot: Mutex::new(()),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = rpc_body(id, method, params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| RpcFailure::Malformed(e.to_string()))?;

        if let Some(error) = payload.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(RpcFailure::Node(message));
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| RpcFailure::Malformed("response has neither result nor error".to_string()))
    }

    /// `eth_call` against the contract, returning the raw hex result.
    async fn eth_call(&self, calldata: String) -> Result<String, GatewayError> {
        let params = json!([{ "to": self.contract.as_str(), "data": calldata }, "latest"]);
        let result = self.request("eth_call", params).await.map_err(|f| match f {
            RpcFailure::Transport(m) => GatewayError::NetworkUnavailable(m),
            RpcFailure::Node(m) => GatewayError::ReadFailure(m),
            RpcFailure::Malformed(m) => GatewayError::InvalidResponse(m),
        })?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::InvalidResponse("eth_call result is not a string".to_string()))
    }

    /// `eth_sendTransaction` from the connected account.
    async fn send_transaction(&self, calldata: String) -> Result<WriteReceipt, GatewayError> {
        let from = self
            .session
            .account()
            .await
            .ok_or(GatewayError::NotConnected)?;

        let _slot = self
            .write_slot
            .try_lock()
            .map_err(|_| GatewayError::WriteInFlight)?;

        let params = json!([{
            "from": from.as_str(),
            "to": self.contract.as_str(),
            "data": calldata,
        }]);
        let result = self
            .request("eth_sendTransaction", params)
            .await
            .map_err(|f| match f {
                RpcFailure::Transport(m) => GatewayError::NetworkUnavailable(m),
                RpcFailure::Node(m) => GatewayError::WriteRejected(m),
                RpcFailure::Malformed(m) => GatewayError::InvalidResponse(m),
            })?;

        let tx_hash = result
            .as_str()
            .ok_or_else(|| {
                GatewayError::InvalidResponse("transaction hash is not a string".to_string())
            })?
            .to_string();
        tracing::info!(tx_hash = %tx_hash, "Transaction accepted");
        Ok(WriteReceipt { tx_hash })
    }
}

#[async_trait]
impl ContractGateway for RpcGateway {
    async fn read_profile(&self, profile_id: u64) -> Result<CreditProfile, GatewayError> {
        let calldata = abi::encode_call(
            abi::GET_CREDIT_PROFILE_INFO,
            &[AbiValue::Uint(profile_id.into())],
        );
        let data = self.eth_call(calldata).await?;
        let words = abi::decode_return(&data, 7)?;
        Ok(CreditProfile {
            credit_score: words[0].as_u16()?,
            risk_level: words[1].as_u8()?,
            collateral_ratio: words[2].as_u8()?,
            is_active: words[3].as_bool()?,
            is_verified: words[4].as_bool()?,
            borrower: words[5].as_address()?,
            created_at: words[6].as_timestamp()?,
        })
    }

    async fn read_loan(&self, loan_id: u64) -> Result<LoanRecord, GatewayError> {
        let calldata = abi::encode_call(abi::GET_LOAN_INFO, &[AbiValue::Uint(loan_id.into())]);
        let data = self.eth_call(calldata).await?;
        let words = abi::decode_return(&data, 10)?;
        Ok(LoanRecord {
            principal_amount: words[0].as_u64()?,
            interest_rate_bps: words[1].as_u32()?,
            remaining_balance: words[2].as_u64()?,
            monthly_payment: words[3].as_u64()?,
            is_active: words[4].as_bool()?,
            is_defaulted: words[5].as_bool()?,
            borrower: words[6].as_address()?,
            lender: words[7].as_address()?,
            start_date: words[8].as_timestamp()?,
            end_date: words[9].as_timestamp()?,
        })
    }

    async fn create_profile(
        &self,
        request: CreateProfileRequest,
    ) -> Result<WriteReceipt, GatewayError> {
        let calldata = abi::encode_call(
            abi::CREATE_CREDIT_PROFILE,
            &[
                AbiValue::Uint(request.credit_score.into()),
                AbiValue::Uint(request.risk_level.into()),
                AbiValue::Uint(request.collateral_ratio.into()),
                AbiValue::Bytes(request.proof),
            ],
        );
        self.send_transaction(calldata).await
    }

    async fn submit_application(
        &self,
        application: LoanApplication,
    ) -> Result<WriteReceipt, GatewayError> {
        let amount = application
            .amount
            .trunc()
            .to_u128()
            .unwrap_or_default();
        let calldata = abi::encode_call(
            abi::SUBMIT_LOAN_APPLICATION,
            &[
                AbiValue::Uint(amount),
                AbiValue::Uint(application.purpose.map(|p| p.wire_code()).unwrap_or(0).into()),
                AbiValue::Uint(application.term_months.into()),
                AbiValue::Uint(application.collateral.map(|c| c.wire_code()).unwrap_or(0).into()),
            ],
        );
        self.send_transaction(calldata).await
    }
}

fn rpc_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}
