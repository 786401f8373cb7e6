// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seams to the injected wallet. The wallet owns ABI encoding, signing and
//! transport; the client only deals in typed calls.

use std::future::Future;

use futures::stream::BoxStream;
use lootdrop_abi::{
    Address, CallOutput, ContractEvent, GiveawayCall, PendingTransaction, Receipt, RemoteError,
    Wei,
};

/// Something that can read from and write to a deployed contract.
pub trait ContractBackend: Clone + Send + Sync + 'static {
    /// Executes a read-only call against `to`.
    fn call(
        &self,
        to: Address,
        call: GiveawayCall,
    ) -> impl Future<Output = Result<CallOutput, RemoteError>> + Send;

    /// Signs and submits a transaction carrying `value` wei.
    fn send(
        &self,
        to: Address,
        call: GiveawayCall,
        value: Wei,
    ) -> impl Future<Output = Result<PendingTransaction, RemoteError>> + Send;

    /// Resolves once the transaction is mined; fails if it reverted.
    fn wait(
        &self,
        transaction: PendingTransaction,
    ) -> impl Future<Output = Result<Receipt, RemoteError>> + Send;

    /// Live stream of the events emitted by `to`. Dropping the stream
    /// unsubscribes.
    fn events(&self, to: Address) -> BoxStream<'static, ContractEvent>;
}

/// An authenticated handle acting for one account.
pub trait Signer: ContractBackend {
    fn address(&self) -> impl Future<Output = Result<Address, RemoteError>> + Send;
}

/// A browser-injected wallet provider (EIP-1193).
pub trait WalletProvider: Send + Sync + 'static {
    type Signer: Signer;

    /// `eth_requestAccounts`: prompts the user and returns the granted accounts.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, RemoteError>> + Send;

    /// Signer for the currently selected account.
    fn signer(&self) -> Self::Signer;

    /// `accountsChanged` notifications. Dropping the stream unsubscribes.
    fn accounts_changed(&self) -> BoxStream<'static, Vec<Address>>;
}
