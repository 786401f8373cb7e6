// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_graphql::InputObject;
use lootdrop_abi::{parse_ether, CreateGiveawayArgs, PrizeType, Wei};
use serde::{Deserialize, Serialize};

use crate::{
    accessor::get_contract,
    backend::Signer,
    config::{ClientConfig, ConfigError},
    notify::{ActionOutcome, Notifier},
};

const INVALID_FORM: &str = "Please enter valid giveaway name and amount.";

/// Inputs of the "create giveaway" form. `amount` is decimal ETH as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, InputObject)]
pub struct CreateGiveawayForm {
    pub name: String,
    pub amount: String,
    pub winners: u64,
    pub max_participants: u64,
    pub duration_secs: u64,
}

impl Default for CreateGiveawayForm {
    fn default() -> Self {
        CreateGiveawayForm {
            name: String::new(),
            amount: String::new(),
            winners: 1,
            max_participants: 10,
            duration_secs: 3600,
        }
    }
}

impl CreateGiveawayForm {
    /// The prize in wei, if the form can be submitted.
    fn prize(&self) -> Option<Wei> {
        if self.name.is_empty() {
            return None;
        }
        parse_ether(&self.amount)
            .ok()
            .filter(|amount| !amount.is_zero())
    }
}

/// Submits new giveaways funded with the prize amount.
pub struct CreateGiveaway<S> {
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
    signer: S,
}

impl<S: Signer> CreateGiveaway<S> {
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>, signer: S) -> Self {
        CreateGiveaway {
            config,
            notifier,
            signer,
        }
    }

    pub async fn create(&self, form: &CreateGiveawayForm) -> Result<ActionOutcome, ConfigError> {
        let Some(prize) = form.prize() else {
            self.notifier.alert(INVALID_FORM);
            return Ok(ActionOutcome::Skipped);
        };
        let contract = get_contract(&self.config, self.signer.clone())?;

        let args = CreateGiveawayArgs {
            name: form.name.clone(),
            prize_type: PrizeType::Eth,
            prize_amount: prize,
            num_winners: form.winners,
            max_participants: form.max_participants,
            duration_secs: form.duration_secs,
        };
        let result =
            async { contract.wait(contract.create_giveaway(args, prize).await?).await }.await;
        match result {
            Ok(receipt) => {
                log::info!("Created giveaway {:?} in {}", form.name, receipt.transaction_hash);
                self.notifier.alert("Giveaway Created!");
                Ok(ActionOutcome::Completed)
            }
            Err(e) => {
                log::error!("Create giveaway error: {e}");
                self.notifier.alert("Failed to create giveaway.");
                Ok(ActionOutcome::Failed(e))
            }
        }
    }
}
