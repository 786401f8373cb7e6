// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! Shared ABI definitions for the LootDrop giveaway contract */

mod amount;
mod interface;

pub use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::amount::{format_ether, parse_ether, AmountError, Wei, WEI_PER_ETHER};
pub use self::interface::{
    AbiItem, EventItem, FunctionItem, Interface, Param, StateMutability, LOOTDROP_INTERFACE,
};

/// Identifier of a giveaway, assigned by the contract.
pub type GiveawayId = u64;

// ========================================
// Records
// ========================================

/// Kind of prize held by a giveaway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PrizeType {
    /// Native ETH attached to the creation call
    #[default]
    Eth = 0,
}

impl PrizeType {
    /// Value of the `uint8` enum argument expected by the contract.
    pub fn abi_value(self) -> u8 {
        self as u8
    }
}

/// A giveaway as returned by the `giveaways(id)` getter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Giveaway {
    pub id: GiveawayId,
    pub creator: Address,
    pub name: String,
    pub prize_type: PrizeType,
    pub prize_amount: Wei,
    pub num_winners: u64,
    pub max_participants: u64,
    pub end_time: u64, // Unix seconds
    pub is_active: bool,
    pub is_finalized: bool, // Randomness has been requested
}

/// Arguments of `createGiveaway`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateGiveawayArgs {
    pub name: String,
    pub prize_type: PrizeType,
    pub prize_amount: Wei,
    pub num_winners: u64,
    pub max_participants: u64,
    pub duration_secs: u64,
}

// ========================================
// Calls, outputs and events
// ========================================

/// A call to one of the contract functions consumed by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GiveawayCall {
    // Writes
    /// Create a giveaway; payable, the prize is attached as value
    CreateGiveaway(CreateGiveawayArgs),
    /// Join a giveaway as the signing account
    JoinGiveaway { id: GiveawayId },
    /// Ask the VRF coordinator for randomness to pick the winners
    RequestRandomWinner { id: GiveawayId, native_payment: bool },
    /// Transfer the prize to the selected winners
    PayoutWinners { id: GiveawayId },

    // Reads
    GetActiveGiveaways,
    Giveaways { id: GiveawayId },
    GetParticipants { id: GiveawayId },
}

impl GiveawayCall {
    /// Name of the contract function, as listed in the interface description.
    pub fn function_name(&self) -> &'static str {
        match self {
            GiveawayCall::CreateGiveaway(_) => "createGiveaway",
            GiveawayCall::JoinGiveaway { .. } => "joinGiveaway",
            GiveawayCall::RequestRandomWinner { .. } => "requestRandomWinner",
            GiveawayCall::PayoutWinners { .. } => "payoutWinners",
            GiveawayCall::GetActiveGiveaways => "getActiveGiveaways",
            GiveawayCall::Giveaways { .. } => "giveaways",
            GiveawayCall::GetParticipants { .. } => "getParticipants",
        }
    }

    /// Number of ABI arguments the call carries.
    pub fn argument_count(&self) -> usize {
        match self {
            GiveawayCall::CreateGiveaway(_) => 6,
            GiveawayCall::RequestRandomWinner { .. } => 2,
            GiveawayCall::GetActiveGiveaways => 0,
            GiveawayCall::JoinGiveaway { .. }
            | GiveawayCall::PayoutWinners { .. }
            | GiveawayCall::Giveaways { .. }
            | GiveawayCall::GetParticipants { .. } => 1,
        }
    }

    /// The giveaway the call targets, if any.
    pub fn giveaway_id(&self) -> Option<GiveawayId> {
        match self {
            GiveawayCall::JoinGiveaway { id }
            | GiveawayCall::RequestRandomWinner { id, .. }
            | GiveawayCall::PayoutWinners { id }
            | GiveawayCall::Giveaways { id }
            | GiveawayCall::GetParticipants { id } => Some(*id),
            GiveawayCall::CreateGiveaway(_) | GiveawayCall::GetActiveGiveaways => None,
        }
    }
}

/// Decoded return data of a call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CallOutput {
    Unit,
    GiveawayIds(Vec<GiveawayId>),
    Giveaway(Giveaway),
    Participants(Vec<Address>),
}

/// Events emitted by the contract that the client listens to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContractEvent {
    /// The VRF callback picked the winners of a giveaway
    WinnersSelected {
        giveaway_id: GiveawayId,
        winners: Vec<Address>,
    },
}

impl ContractEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ContractEvent::WinnersSelected { .. } => "WinnersSelected",
        }
    }
}

/// A submitted transaction that has not been confirmed yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: String,
}

/// Confirmation of a mined transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: String,
    pub block_number: u64,
}

// ========================================
// Errors
// ========================================

/// Failure of a remote call, as reported by the wallet or the contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The contract reverted
    #[error("execution reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Reverted {
        /// Revert reason decoded from the return data
        reason: Option<String>,
        /// Message of the nested JSON-RPC error, when the provider sends one
        provider_message: Option<String>,
    },

    #[error("user rejected the request")]
    UserRejected,

    #[error("insufficient funds for value and gas")]
    InsufficientFunds,

    #[error("wallet provider error: {0}")]
    Provider(String),

    #[error("`{0}` is not a function of the contract interface")]
    UnknownFunction(&'static str),

    #[error("`{0}` is not an event of the contract interface")]
    UnknownEvent(&'static str),

    #[error("non-payable function `{0}` cannot receive value")]
    NonPayable(&'static str),

    #[error("`{function}` expects {expected} arguments, got {got}")]
    ArgumentCount {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unexpected return data from `{0}`")]
    UnexpectedOutput(&'static str),
}

impl RemoteError {
    /// Revert reason, if the contract gave one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            RemoteError::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Message of the nested provider error, if any.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            RemoteError::Reverted {
                provider_message, ..
            } => provider_message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names_match_interface() {
        let interface = Interface::lootdrop().unwrap();
        let calls = [
            GiveawayCall::CreateGiveaway(CreateGiveawayArgs {
                name: "Test".to_string(),
                prize_type: PrizeType::Eth,
                prize_amount: Wei::from(1u64),
                num_winners: 1,
                max_participants: 10,
                duration_secs: 3600,
            }),
            GiveawayCall::JoinGiveaway { id: 1 },
            GiveawayCall::RequestRandomWinner { id: 1, native_payment: false },
            GiveawayCall::PayoutWinners { id: 1 },
            GiveawayCall::GetActiveGiveaways,
            GiveawayCall::Giveaways { id: 1 },
            GiveawayCall::GetParticipants { id: 1 },
        ];
        for call in calls {
            let function = interface
                .function(call.function_name())
                .unwrap_or_else(|| panic!("missing {}", call.function_name()));
            assert_eq!(function.inputs.len(), call.argument_count());
        }
    }

    #[test]
    fn test_reason_accessors() {
        let error = RemoteError::Reverted {
            reason: Some("Already joined".to_string()),
            provider_message: None,
        };
        assert_eq!(error.reason(), Some("Already joined"));
        assert_eq!(error.provider_message(), None);
        assert_eq!(error.to_string(), "execution reverted: Already joined");
        assert_eq!(RemoteError::UserRejected.reason(), None);
    }
}
