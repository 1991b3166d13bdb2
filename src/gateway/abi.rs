//! Contract interface description — function selectors and word codec.
//!
//! The interface is fixed: four named operations against the lending
//! contract. Callers never see selectors or word layout; the gateway is the
//! only module that depends on this shape.

use sha3::{Digest, Keccak256};

use crate::error::GatewayError;
use crate::gateway::types::Address;

/// `getCreditProfileInfo(uint256 profileId)` view.
pub const GET_CREDIT_PROFILE_INFO: &str = "getCreditProfileInfo(uint256)";
/// `getLoanInfo(uint256 loanId)` view.
pub const GET_LOAN_INFO: &str = "getLoanInfo(uint256)";
/// `createCreditProfile(uint16 score, uint8 riskLevel, uint8 collateralRatio, bytes proof)`.
pub const CREATE_CREDIT_PROFILE: &str = "createCreditProfile(uint16,uint8,uint8,bytes)";
/// `submitLoanApplication(uint256 amount, uint8 purpose, uint8 termMonths, uint8 collateral)`.
pub const SUBMIT_LOAN_APPLICATION: &str = "submitLoanApplication(uint256,uint8,uint8,uint8)";

/// An argument value for a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(u128),
    Bytes(Vec<u8>),
}

/// First four bytes of the Keccak-256 hash of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Encode a call as `0x`-prefixed calldata: selector, then the head words,
/// then the tail for dynamic arguments.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> String {
    let head_len = args.len() * 32;
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for arg in args {
        match arg {
            AbiValue::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            AbiValue::Bytes(data) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend_from_slice(&uint_word(data.len() as u128));
                tail.extend_from_slice(data);
                tail.resize(tail.len() + (32 - data.len() % 32) % 32, 0);
            }
        }
    }

    let mut calldata = Vec::with_capacity(4 + head.len() + tail.len());
    calldata.extend_from_slice(&selector(signature));
    calldata.extend_from_slice(&head);
    calldata.extend_from_slice(&tail);
    format!("0x{}", hex_encode(&calldata))
}

/// A single 32-byte return word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word([u8; 32]);

impl Word {
    pub fn as_u128(&self) -> Result<u128, GatewayError> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return Err(GatewayError::InvalidResponse(
                "integer word exceeds 128 bits".to_string(),
            ));
        }
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&self.0[16..]);
        Ok(u128::from_be_bytes(buf))
    }

    pub fn as_u64(&self) -> Result<u64, GatewayError> {
        let value = self.as_u128()?;
        u64::try_from(value)
            .map_err(|_| GatewayError::InvalidResponse(format!("value out of u64 range: {value}")))
    }

    pub fn as_u32(&self) -> Result<u32, GatewayError> {
        let value = self.as_u128()?;
        u32::try_from(value)
            .map_err(|_| GatewayError::InvalidResponse(format!("value out of u32 range: {value}")))
    }

    pub fn as_u16(&self) -> Result<u16, GatewayError> {
        let value = self.as_u128()?;
        u16::try_from(value)
            .map_err(|_| GatewayError::InvalidResponse(format!("value out of u16 range: {value}")))
    }

    pub fn as_u8(&self) -> Result<u8, GatewayError> {
        let value = self.as_u128()?;
        u8::try_from(value)
            .map_err(|_| GatewayError::InvalidResponse(format!("value out of u8 range: {value}")))
    }

    pub fn as_bool(&self) -> Result<bool, GatewayError> {
        match self.as_u128()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(GatewayError::InvalidResponse(format!(
                "boolean word with value {other}"
            ))),
        }
    }

    /// Last 20 bytes of the word as an address.
    pub fn as_address(&self) -> Result<Address, GatewayError> {
        let hex = hex_encode(&self.0[12..]);
        Address::parse(&format!("0x{hex}"))
            .map_err(GatewayError::InvalidResponse)
    }

    /// Unix-seconds word as a UTC timestamp.
    pub fn as_timestamp(&self) -> Result<chrono::DateTime<chrono::Utc>, GatewayError> {
        let secs = self.as_u64()?;
        let secs = i64::try_from(secs)
            .map_err(|_| GatewayError::InvalidResponse(format!("timestamp overflow: {secs}")))?;
        chrono::DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| GatewayError::InvalidResponse(format!("invalid timestamp: {secs}")))
    }
}

/// Split `0x`-prefixed return data into words, requiring at least
/// `expected` of them.
pub fn decode_return(data: &str, expected: usize) -> Result<Vec<Word>, GatewayError> {
    let hex = data
        .strip_prefix("0x")
        .ok_or_else(|| GatewayError::InvalidResponse("return data missing 0x prefix".to_string()))?;
    let bytes = hex_decode(hex).map_err(GatewayError::InvalidResponse)?;
    if bytes.len() % 32 != 0 {
        return Err(GatewayError::InvalidResponse(format!(
            "return data is not word-aligned: {} bytes",
            bytes.len()
        )));
    }
    let words: Vec<Word> = bytes
        .chunks_exact(32)
        .map(|chunk| {
            let mut word = [0u8; 32];
            word.copy_from_slice(chunk);
            Word(word)
        })
        .collect();
    if words.len() < expected {
        return Err(GatewayError::InvalidResponse(format!(
            "expected {expected} return words, got {}",
            words.len()
        )));
    }
    Ok(words)
}

fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn hex_decode(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err(format!("odd-length hex string: {} digits", hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("non-hex byte at offset {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_known_vector() {
        // transfer(address,uint256) is the canonical ERC-20 selector.
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn encode_static_args() {
        let calldata = encode_call(GET_LOAN_INFO, &[AbiValue::Uint(7)]);
        // selector (4 bytes) + one word
        assert_eq!(calldata.len(), 2 + 8 + 64);
        assert!(calldata.ends_with(
            "0000000000000000000000000000000000000000000000000000000000000007"
        ));
    }

    #[test]
    fn encode_dynamic_bytes_offset_and_padding() {
        let calldata = encode_call(
            CREATE_CREDIT_PROFILE,
            &[
                AbiValue::Uint(742),
                AbiValue::Uint(1),
                AbiValue::Uint(85),
                AbiValue::Bytes(vec![0xde, 0xad]),
            ],
        );
        let hex = calldata.strip_prefix("0x").unwrap();
        let body = &hex[8..]; // skip selector
        // Offset word for the bytes argument points past the 4-word head.
        let offset_word = &body[3 * 64..4 * 64];
        assert!(offset_word.ends_with("80"));
        // Length word says 2, data padded to a full word.
        let length_word = &body[4 * 64..5 * 64];
        assert!(length_word.ends_with("02"));
        assert_eq!(body.len(), 6 * 64);
        assert!(body.ends_with("dead000000000000000000000000000000000000000000000000000000000000"));
    }

    #[test]
    fn encode_empty_proof_has_no_padding() {
        let calldata = encode_call(
            CREATE_CREDIT_PROFILE,
            &[
                AbiValue::Uint(700),
                AbiValue::Uint(2),
                AbiValue::Uint(60),
                AbiValue::Bytes(Vec::new()),
            ],
        );
        let hex = calldata.strip_prefix("0x").unwrap();
        // head (4 words) + length word only
        assert_eq!(hex.len() - 8, 5 * 64);
    }

    #[test]
    fn decode_words_and_accessors() {
        let data = format!(
            "0x{}{}{}",
            "00000000000000000000000000000000000000000000000000000000000002e6", // 742
            "0000000000000000000000000000000000000000000000000000000000000001", // true
            "000000000000000000000000000000000000000000000000000000000000002a", // 42
        );
        let words = decode_return(&data, 3).unwrap();
        assert_eq!(words[0].as_u16().unwrap(), 742);
        assert!(words[1].as_bool().unwrap());
        assert_eq!(words[2].as_u8().unwrap(), 42);
        // 742 does not fit a u8
        assert!(words[0].as_u8().is_err());
    }

    #[test]
    fn decode_rejects_short_or_misaligned_data() {
        assert!(decode_return("0x00", 1).is_err());
        let one_word = format!("0x{}", "0".repeat(64));
        assert!(decode_return(&one_word, 2).is_err());
        assert!(decode_return(&"0".repeat(64), 1).is_err()); // missing prefix
    }

    #[test]
    fn address_word_decodes_low_twenty_bytes() {
        let data = format!("0x{}{}", "0".repeat(24), "00000000000000000000000000000000000000ab");
        let words = decode_return(&data, 1).unwrap();
        assert_eq!(
            words[0].as_address().unwrap().as_str(),
            "0x00000000000000000000000000000000000000ab"
        );
    }
}
