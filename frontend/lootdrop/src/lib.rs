// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! LootDrop client: wallet connection, giveaway views and the GraphQL view
service, on top of an injected wallet backend. */

pub mod accessor;
pub mod active;
pub mod backend;
pub mod config;
pub mod create;
pub mod notify;
pub mod payout;
pub mod render;
pub mod service;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use accessor::{get_contract, GiveawayContract};
pub use active::{ActiveGiveaways, GiveawayView, RefreshTrigger};
pub use backend::{ContractBackend, Signer, WalletProvider};
pub use config::{ClientConfig, ConfigError};
pub use create::{CreateGiveaway, CreateGiveawayForm};
pub use notify::{ActionOutcome, Notifier};
pub use payout::PayoutSubscription;
pub use service::{GiveawayBoard, GiveawayForm, LootDropSchema, LootDropService};
pub use wallet::WalletConnector;

// Re-export the ABI for hosts implementing the backend traits
pub use lootdrop_abi;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks view state, ignoring poisoning: critical sections are single updates.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
