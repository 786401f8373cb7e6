// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use lootdrop_abi::Address;
use tokio::task::JoinHandle;

use crate::{
    backend::{Signer, WalletProvider},
    lock,
    notify::{ActionOutcome, Notifier},
};

/// Receives the active signer, or `None` once the wallet disconnects.
pub type ConnectCallback<S> = Arc<dyn Fn(Option<S>) + Send + Sync>;

/// Connects the injected wallet and follows account switches.
pub struct WalletConnector<P: WalletProvider> {
    provider: Option<Arc<P>>,
    notifier: Arc<dyn Notifier>,
    on_connect: ConnectCallback<P::Signer>,
    address: Arc<Mutex<Option<Address>>>,
    listener: Option<JoinHandle<()>>,
}

impl<P: WalletProvider> WalletConnector<P> {
    /// `provider` is `None` when the environment has no injected wallet.
    pub fn new(
        provider: Option<Arc<P>>,
        notifier: Arc<dyn Notifier>,
        on_connect: impl Fn(Option<P::Signer>) + Send + Sync + 'static,
    ) -> Self {
        WalletConnector {
            provider,
            notifier,
            on_connect: Arc::new(on_connect),
            address: Arc::new(Mutex::new(None)),
            listener: None,
        }
    }

    /// Address of the connected account.
    pub fn address(&self) -> Option<Address> {
        *lock(&self.address)
    }

    /// Connected address shortened for display, `0x1234...abcd`.
    pub fn display_address(&self) -> Option<String> {
        self.address().map(|address| {
            let full = address.to_string();
            format!("{}...{}", &full[..6], &full[full.len() - 4..])
        })
    }

    /// Requests account access and hands the signer to the callback.
    pub async fn connect(&self) -> ActionOutcome {
        let Some(provider) = &self.provider else {
            self.notifier.alert("MetaMask not found!");
            return ActionOutcome::Skipped;
        };

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                log::error!("Wallet connection failed: {e}");
                self.notifier.alert("Wallet connection failed.");
                return ActionOutcome::Failed(e);
            }
        };
        if accounts.is_empty() {
            self.notifier.alert("No account was shared by the wallet.");
            return ActionOutcome::Skipped;
        }

        let signer = provider.signer();
        match signer.address().await {
            Ok(address) => {
                log::info!("Connected {address}");
                *lock(&self.address) = Some(address);
                (self.on_connect)(Some(signer));
                ActionOutcome::Completed
            }
            Err(e) => {
                log::error!("Could not read the signer address: {e}");
                self.notifier.alert("Wallet connection failed.");
                ActionOutcome::Failed(e)
            }
        }
    }

    /// Subscribes to account switches until [`Self::unmount`].
    pub fn mount(&mut self) {
        let Some(provider) = self.provider.clone() else {
            return;
        };
        if self.listener.is_some() {
            return;
        }

        let mut changes = provider.accounts_changed();
        let address = self.address.clone();
        let on_connect = self.on_connect.clone();
        self.listener = Some(tokio::spawn(async move {
            while let Some(accounts) = changes.next().await {
                if accounts.is_empty() {
                    log::info!("Wallet disconnected");
                    *lock(&address) = None;
                    on_connect(None);
                    continue;
                }
                let signer = provider.signer();
                match signer.address().await {
                    Ok(new_address) => {
                        log::info!("Switched to {new_address}");
                        *lock(&address) = Some(new_address);
                        on_connect(Some(signer));
                    }
                    Err(e) => log::error!("Could not read the switched account: {e}"),
                }
            }
        }));
    }

    /// Drops the account-switch subscription.
    pub fn unmount(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }
}

impl<P: WalletProvider> Drop for WalletConnector<P> {
    fn drop(&mut self) {
        self.unmount();
    }
}
