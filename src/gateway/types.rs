//! Data types crossing the contract boundary.
//!
//! `CreditProfile` and `LoanRecord` are read-only snapshots owned entirely
//! by the external contract; this side only requests them by id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A 20-byte account or contract address, kept in checksummed-or-lower
/// `0x`-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address. Accepts `0x` + 40 hex digits.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let hex = raw
            .strip_prefix("0x")
            .ok_or_else(|| format!("address must start with 0x: {raw}"))?;
        if hex.len() != 40 {
            return Err(format!("address must be 20 bytes, got {} hex digits", hex.len()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("address contains non-hex characters: {raw}"));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// The all-zero address, used as the unset placeholder.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Credit profile snapshot as reported by `getCreditProfileInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub credit_score: u16,
    pub risk_level: u8,
    /// Collateralization as a whole-number percentage.
    pub collateral_ratio: u8,
    pub is_active: bool,
    pub is_verified: bool,
    pub borrower: Address,
    pub created_at: DateTime<Utc>,
}

/// Loan snapshot as reported by `getLoanInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub principal_amount: u64,
    /// Interest rate in basis points.
    pub interest_rate_bps: u32,
    pub remaining_balance: u64,
    pub monthly_payment: u64,
    pub is_active: bool,
    pub is_defaulted: bool,
    pub borrower: Address,
    pub lender: Address,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// What a loan is for. Wire code 0 is reserved for "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanPurpose {
    Business,
    RealEstate,
    Education,
    Personal,
    DebtConsolidation,
}

impl LoanPurpose {
    pub fn wire_code(self) -> u8 {
        match self {
            Self::Business => 1,
            Self::RealEstate => 2,
            Self::Education => 3,
            Self::Personal => 4,
            Self::DebtConsolidation => 5,
        }
    }

    pub fn from_form_value(value: &str) -> Option<Self> {
        match value {
            "business" => Some(Self::Business),
            "real-estate" => Some(Self::RealEstate),
            "education" => Some(Self::Education),
            "personal" => Some(Self::Personal),
            "debt-consolidation" => Some(Self::DebtConsolidation),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Business => "business",
            Self::RealEstate => "real-estate",
            Self::Education => "education",
            Self::Personal => "personal",
            Self::DebtConsolidation => "debt-consolidation",
        };
        write!(f, "{s}")
    }
}

/// Collateral backing a loan application. Wire code 0 is "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collateral {
    Ethereum,
    Bitcoin,
    Usdc,
    Mixed,
}

impl Collateral {
    pub fn wire_code(self) -> u8 {
        match self {
            Self::Ethereum => 1,
            Self::Bitcoin => 2,
            Self::Usdc => 3,
            Self::Mixed => 4,
        }
    }

    pub fn from_form_value(value: &str) -> Option<Self> {
        match value {
            "ethereum" => Some(Self::Ethereum),
            "bitcoin" => Some(Self::Bitcoin),
            "usdc" => Some(Self::Usdc),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Payload for `createCreditProfile`.
///
/// The proof bytes are opaque pass-through: this side performs no
/// cryptographic work on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub credit_score: u16,
    pub risk_level: u8,
    pub collateral_ratio: u8,
    #[serde(default)]
    pub proof: Vec<u8>,
}

/// Payload for `submitLoanApplication`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Whole-dollar principal requested.
    pub amount: Decimal,
    pub purpose: Option<LoanPurpose>,
    pub term_months: u8,
    pub collateral: Option<Collateral>,
}

/// Receipt for an accepted write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteReceipt {
    pub tx_hash: String,
}
