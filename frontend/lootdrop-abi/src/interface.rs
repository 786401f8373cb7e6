// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use crate::{GiveawayCall, RemoteError, Wei};

/// JSON ABI of the deployed LootDrop contract.
pub const LOOTDROP_INTERFACE: &str = include_str!("../abi/LootDrop.json");

/// Mutability of a contract function
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

/// A function or event parameter
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub indexed: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FunctionItem {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub outputs: Vec<Param>,
    #[serde(rename = "stateMutability", default)]
    pub state_mutability: StateMutability,
}

impl FunctionItem {
    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventItem {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub anonymous: bool,
}

/// One entry of a JSON ABI
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    Function(FunctionItem),
    Event(EventItem),
    /// Constructors, errors, fallback and receive entries
    #[serde(other)]
    Other,
}

/// A parsed interface description
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Interface {
    items: Vec<AbiItem>,
}

impl Interface {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The interface of the LootDrop contract.
    pub fn lootdrop() -> Result<Self, serde_json::Error> {
        Self::parse(LOOTDROP_INTERFACE)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionItem> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Function(function) if function.name == name => Some(function),
            _ => None,
        })
    }

    pub fn event(&self, name: &str) -> Option<&EventItem> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Event(event) if event.name == name => Some(event),
            _ => None,
        })
    }

    /// Checks that `call` names a function of the interface with the right
    /// arity, and that value is only attached to a payable function.
    pub fn check_call(&self, call: &GiveawayCall, value: &Wei) -> Result<&FunctionItem, RemoteError> {
        let name = call.function_name();
        let function = self
            .function(name)
            .ok_or(RemoteError::UnknownFunction(name))?;
        if function.inputs.len() != call.argument_count() {
            return Err(RemoteError::ArgumentCount {
                function: name,
                expected: function.inputs.len(),
                got: call.argument_count(),
            });
        }
        if !value.is_zero() && !function.is_payable() {
            return Err(RemoteError::NonPayable(name));
        }
        Ok(function)
    }

    /// Checks that the interface declares the event `name`.
    pub fn check_event(&self, name: &'static str) -> Result<&EventItem, RemoteError> {
        self.event(name).ok_or(RemoteError::UnknownEvent(name))
    }
}
