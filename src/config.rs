//! Service configuration.

use crate::error::ConfigError;
use crate::gateway::types::Address;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// JSON-RPC endpoint. `None` selects the simulated gateway.
    pub rpc_url: Option<String>,
    /// Address of the deployed lending contract.
    pub contract_address: Address,
    /// Chain the contract is deployed on.
    pub chain_id: u64,
    /// REST listen port.
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: Address::zero(),
            chain_id: 1,
            port: 8090,
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from environment variables.
    ///
    /// - `CREDIT_FLOW_RPC_URL` — JSON-RPC endpoint (unset = simulated mode)
    /// - `CREDIT_FLOW_CONTRACT` — contract address (required with an RPC URL)
    /// - `CREDIT_FLOW_CHAIN_ID` — chain id (default 1)
    /// - `CREDIT_FLOW_PORT` — listen port (default 8090)
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = std::env::var("CREDIT_FLOW_RPC_URL").ok().filter(|s| !s.is_empty());

        let contract_address = match std::env::var("CREDIT_FLOW_CONTRACT") {
            Ok(raw) => Address::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                key: "CREDIT_FLOW_CONTRACT".to_string(),
                message: e,
            })?,
            Err(_) if rpc_url.is_some() => {
                return Err(ConfigError::MissingRequired {
                    key: "CREDIT_FLOW_CONTRACT".to_string(),
                    hint: "Set the deployed contract address when an RPC URL is configured."
                        .to_string(),
                });
            }
            Err(_) => Address::zero(),
        };

        let chain_id = parse_env("CREDIT_FLOW_CHAIN_ID", 1u64)?;
        let port = parse_env("CREDIT_FLOW_PORT", 8090u16)?;

        Ok(Self {
            rpc_url,
            contract_address,
            chain_id,
            port,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_simulated_mode() {
        let config = ServiceConfig::default();
        assert!(config.rpc_url.is_none());
        assert_eq!(config.port, 8090);
        assert_eq!(config.contract_address, Address::zero());
    }
}
