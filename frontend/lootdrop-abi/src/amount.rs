// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use alloy_primitives::{utils, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits of one ether.
const ETHER_DECIMALS: usize = 18;

/// Base units in one ether.
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// An amount of ETH in base units (wei), bounded by the contract's `uint256`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wei(U256);

impl Wei {
    pub fn zero() -> Self {
        Wei(U256::ZERO)
    }

    /// `tokens` whole ether.
    pub fn from_ether(tokens: u64) -> Self {
        Wei(U256::from(tokens) * U256::from(WEI_PER_ETHER))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn to_u128(&self) -> Option<u128> {
        u128::try_from(self.0).ok()
    }
}

impl From<u64> for Wei {
    fn from(wei: u64) -> Self {
        Wei(U256::from(wei))
    }
}

impl From<u128> for Wei {
    fn from(wei: u128) -> Self {
        Wei(U256::from(wei))
    }
}

impl From<U256> for Wei {
    fn from(wei: U256) -> Self {
        Wei(wei)
    }
}

/// Displays the raw wei count; use [`format_ether`] for ETH.
impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while parsing an ETH amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("missing amount")]
    Empty,

    #[error("negative amount: {0}")]
    Negative(String),

    #[error("invalid decimal amount: {0}")]
    Invalid(String),

    #[error("amount {0} has more than 18 decimals")]
    TooManyDecimals(String),

    #[error("amount {0} does not fit in uint256")]
    OutOfRange(String),
}

/// Parses an ETH-denominated decimal string (`"1.5"`, `".25"`, `"3"`) into wei.
///
/// Input is rejected rather than truncated or wrapped: more than 18 significant
/// decimals or a value above `uint256` is an error.
pub fn parse_ether(value: &str) -> Result<Wei, AmountError> {
    if value.is_empty() {
        return Err(AmountError::Empty);
    }
    if value.starts_with('-') {
        return Err(AmountError::Negative(value.to_string()));
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(value.to_string()));
    }

    // Trailing zeros never lose precision
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > ETHER_DECIMALS {
        return Err(AmountError::TooManyDecimals(value.to_string()));
    }

    // Exactly 18 decimals: the unit conversion only parses digits
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = format!("{whole}.{fraction:0<width$}", width = ETHER_DECIMALS);
    utils::parse_ether(&normalized)
        .map(Wei)
        .map_err(|_| AmountError::OutOfRange(value.to_string()))
}

/// Formats wei as ETH, trimming trailing fractional zeros but keeping one
/// fractional digit: `1.0`, `1.5`, `0.000000000000000001`.
pub fn format_ether(amount: &Wei) -> String {
    let formatted = utils::format_ether(amount.0);
    match formatted.split_once('.') {
        Some((whole, fraction)) => match fraction.trim_end_matches('0') {
            "" => format!("{whole}.0"),
            fraction => format!("{whole}.{fraction}"),
        },
        None => format!("{formatted}.0"),
    }
}
