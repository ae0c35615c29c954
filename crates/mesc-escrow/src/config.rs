//! Engine configuration.
//!
//! The engine address is the only setting. It is mixed into every
//! commitment and release message, and it is the account holding escrowed
//! funds. Build it explicitly, or read it from `ESCROW_ENGINE_ADDRESS`.

use mesc_core::Address;
use serde::{Deserialize, Serialize};

/// Environment variable holding the engine address.
pub const ENGINE_ADDRESS_VAR: &str = "ESCROW_ENGINE_ADDRESS";

/// Configuration for an [`EscrowEngine`](crate::EscrowEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Address used for domain separation and as custodian.
    pub engine_address: Address,
}

impl EngineConfig {
    /// Configuration with an explicit engine address.
    pub fn new(engine_address: Address) -> Self {
        Self { engine_address }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ESCROW_ENGINE_ADDRESS` (required): 40 hex characters, `0x` optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup(ENGINE_ADDRESS_VAR).ok_or(ConfigError::Missing(ENGINE_ADDRESS_VAR))?;
        let engine_address = raw
            .parse::<Address>()
            .map_err(|e| ConfigError::InvalidAddress(ENGINE_ADDRESS_VAR, e.to_string()))?;
        if engine_address.is_zero() {
            return Err(ConfigError::InvalidAddress(
                ENGINE_ADDRESS_VAR,
                "zero address".to_string(),
            ));
        }
        Ok(Self { engine_address })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    /// A variable does not hold a usable non-zero address.
    #[error("invalid address in {0}: {1}")]
    InvalidAddress(&'static str, String),
}
