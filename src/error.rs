//! Error types for Credit Flow.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Wizard flow errors.
///
/// `NotConnected` is the only condition a running flow surfaces to the user
/// as a prompt; the flow itself stays where it is.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("No wallet connected — connect an account before submitting")]
    NotConnected,

    #[error("Flow {id} not found")]
    UnknownFlow { id: uuid::Uuid },

    #[error("Unknown flow kind: {0}")]
    UnknownKind(String),

    #[error("Unknown loan product: {0}")]
    UnknownProduct(String),
}

/// Contract gateway errors.
///
/// Pass-through classification of external failures: the gateway maps the
/// transport outcome onto these variants and nothing more. Retry policy,
/// if any, belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No account connected to sign the transaction")]
    NotConnected,

    #[error("RPC endpoint unreachable: {0}")]
    NetworkUnavailable(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("Read failed: {0}")]
    ReadFailure(String),

    #[error("A write is already in flight on this gateway")]
    WriteInFlight,

    #[error("Malformed response from the contract: {0}")]
    InvalidResponse(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
