// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use futures::stream::{BoxStream, StreamExt};
use lootdrop_abi::{
    Address, CallOutput, ContractEvent, CreateGiveawayArgs, Giveaway, GiveawayCall, GiveawayId,
    Interface, PendingTransaction, Receipt, RemoteError, Wei,
};

use crate::{backend::ContractBackend, config::ClientConfig, config::ConfigError};

/// Binds the configured contract address and the LootDrop interface to `backend`.
///
/// Every call returns a fresh handle.
pub fn get_contract<B: ContractBackend>(
    config: &ClientConfig,
    backend: B,
) -> Result<GiveawayContract<B>, ConfigError> {
    let address = config.contract_address()?;
    let interface = Interface::lootdrop()?;
    Ok(GiveawayContract {
        address,
        interface,
        backend,
    })
}

/// Proxy exposing the contract functions the client uses
#[derive(Debug, Clone)]
pub struct GiveawayContract<B> {
    address: Address,
    interface: Interface,
    backend: B,
}

impl<B: ContractBackend> GiveawayContract<B> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn read(&self, call: GiveawayCall) -> Result<CallOutput, RemoteError> {
        self.interface.check_call(&call, &Wei::zero())?;
        self.backend.call(self.address, call).await
    }

    async fn write(&self, call: GiveawayCall, value: Wei) -> Result<PendingTransaction, RemoteError> {
        self.interface.check_call(&call, &value)?;
        log::debug!("Submitting {} with value {}", call.function_name(), value);
        self.backend.send(self.address, call, value).await
    }

    // Writes

    /// `createGiveaway(...)` with the prize attached as value.
    pub async fn create_giveaway(
        &self,
        args: CreateGiveawayArgs,
        value: Wei,
    ) -> Result<PendingTransaction, RemoteError> {
        self.write(GiveawayCall::CreateGiveaway(args), value).await
    }

    pub async fn join_giveaway(&self, id: GiveawayId) -> Result<PendingTransaction, RemoteError> {
        self.write(GiveawayCall::JoinGiveaway { id }, Wei::zero()).await
    }

    pub async fn request_random_winner(
        &self,
        id: GiveawayId,
        native_payment: bool,
    ) -> Result<PendingTransaction, RemoteError> {
        self.write(
            GiveawayCall::RequestRandomWinner { id, native_payment },
            Wei::zero(),
        )
        .await
    }

    pub async fn payout_winners(&self, id: GiveawayId) -> Result<PendingTransaction, RemoteError> {
        self.write(GiveawayCall::PayoutWinners { id }, Wei::zero()).await
    }

    /// Waits for a submitted transaction to be mined.
    pub async fn wait(&self, transaction: PendingTransaction) -> Result<Receipt, RemoteError> {
        self.backend.wait(transaction).await
    }

    // Reads

    pub async fn get_active_giveaways(&self) -> Result<Vec<GiveawayId>, RemoteError> {
        match self.read(GiveawayCall::GetActiveGiveaways).await? {
            CallOutput::GiveawayIds(ids) => Ok(ids),
            _ => Err(RemoteError::UnexpectedOutput("getActiveGiveaways")),
        }
    }

    pub async fn giveaways(&self, id: GiveawayId) -> Result<Giveaway, RemoteError> {
        match self.read(GiveawayCall::Giveaways { id }).await? {
            CallOutput::Giveaway(giveaway) => Ok(giveaway),
            _ => Err(RemoteError::UnexpectedOutput("giveaways")),
        }
    }

    pub async fn get_participants(&self, id: GiveawayId) -> Result<Vec<Address>, RemoteError> {
        match self.read(GiveawayCall::GetParticipants { id }).await? {
            CallOutput::Participants(participants) => Ok(participants),
            _ => Err(RemoteError::UnexpectedOutput("getParticipants")),
        }
    }

    // Events

    /// Ids of the giveaways whose winners get selected from now on.
    pub fn winners_selected(&self) -> Result<BoxStream<'static, GiveawayId>, RemoteError> {
        self.interface.check_event("WinnersSelected")?;
        Ok(self
            .backend
            .events(self.address)
            .filter_map(|event| async move {
                match event {
                    ContractEvent::WinnersSelected { giveaway_id, .. } => Some(giveaway_id),
                }
            })
            .boxed())
    }
}
