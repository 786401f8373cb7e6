// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::env;

use lootdrop_abi::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the deployed contract address.
pub const CONTRACT_ADDRESS_VAR: &str = "CONTRACT_ADDRESS";

/// Misconfiguration of the client. These are fatal and never shown as alerts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing CONTRACT_ADDRESS from environment")]
    MissingContractAddress,

    #[error("invalid contract address {value:?}: {message}")]
    InvalidContractAddress { value: String, message: String },

    #[error("invalid contract interface: {0}")]
    Interface(#[from] serde_json::Error),
}

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the deployed LootDrop contract
    pub contract_address: Option<Address>,
}

impl ClientConfig {
    pub fn new(contract_address: Address) -> Self {
        ClientConfig {
            contract_address: Some(contract_address),
        }
    }

    /// Reads [`CONTRACT_ADDRESS_VAR`]. An unset or empty variable leaves the
    /// address absent; the error only surfaces when a contract is needed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let contract_address = match lookup(CONTRACT_ADDRESS_VAR) {
            Some(value) if !value.trim().is_empty() => {
                let address = value.trim().parse::<Address>().map_err(|e| {
                    ConfigError::InvalidContractAddress {
                        value: value.clone(),
                        message: e.to_string(),
                    }
                })?;
                Some(address)
            }
            _ => None,
        };
        log::debug!("Loaded contract address: {:?}", contract_address);
        Ok(ClientConfig { contract_address })
    }

    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        self.contract_address
            .ok_or(ConfigError::MissingContractAddress)
    }
}
