// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures::StreamExt;
use lootdrop_abi::{GiveawayId, RemoteError};
use tokio::task::JoinHandle;

use crate::{accessor::GiveawayContract, active::RefreshTrigger, backend::Signer, notify::Notifier};

/// Pays out every giveaway whose winners get selected, for as long as it is
/// alive. Dropping it ends the subscription.
pub struct PayoutSubscription {
    task: JoinHandle<()>,
}

impl PayoutSubscription {
    pub fn subscribe<S: Signer>(
        contract: GiveawayContract<S>,
        notifier: Arc<dyn Notifier>,
        refresh: RefreshTrigger,
    ) -> Result<Self, RemoteError> {
        let selections = contract.winners_selected()?;
        let task = tokio::spawn(async move {
            selections
                .for_each_concurrent(None, |id| {
                    pay_out(&contract, notifier.as_ref(), &refresh, id)
                })
                .await;
        });
        Ok(PayoutSubscription { task })
    }

    /// Ends the subscription; in-flight payouts are abandoned.
    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PayoutSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn pay_out<S: Signer>(
    contract: &GiveawayContract<S>,
    notifier: &dyn Notifier,
    refresh: &RefreshTrigger,
    id: GiveawayId,
) {
    log::info!("Winners selected for giveaway {id}, paying out");
    let result = async { contract.wait(contract.payout_winners(id).await?).await }.await;
    match result {
        Ok(receipt) => {
            log::info!("Giveaway {id} paid out in {}", receipt.transaction_hash);
            notifier.alert("Payout complete!");
            refresh.flip();
        }
        Err(e) => log::error!("Payout error for giveaway {id}: {e}"),
    }
}
