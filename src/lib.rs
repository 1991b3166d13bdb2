//! Credit Flow — application core for the private lending product.
//!
//! Owns the wizard flows (loan application, private score generation),
//! the contract gateway they commit through, the wallet session they
//! consult, and a REST surface for the presentation layer.

pub mod config;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod session;
