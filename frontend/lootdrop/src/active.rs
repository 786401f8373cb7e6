// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_graphql::SimpleObject;
use futures::future;
use lootdrop_abi::{format_ether, Address, Giveaway, GiveawayId, RemoteError};
use serde::{Deserialize, Serialize};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    accessor::{get_contract, GiveawayContract},
    backend::Signer,
    config::{ClientConfig, ConfigError},
    lock,
    notify::{ActionOutcome, Notifier},
    payout::PayoutSubscription,
    render,
};

/// Display projection of a giveaway plus the UI flags of its card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct GiveawayView {
    pub id: GiveawayId,
    pub name: String,
    pub prize_amount: String, // Formatted in ETH
    pub participants: u64,
    pub max_participants: u64,
    pub end_timestamp: u64,
    pub num_winners: u64,
    pub is_creator: bool,
    pub show_participants: bool,
    pub participant_list: Vec<String>,
    pub finalizing: bool,
}

impl GiveawayView {
    /// `user` is the connected account, compared by address bytes so that
    /// checksum casing does not matter.
    pub fn from_record(giveaway: &Giveaway, participants: &[Address], user: Option<Address>) -> Self {
        GiveawayView {
            id: giveaway.id,
            name: giveaway.name.clone(),
            prize_amount: format_ether(&giveaway.prize_amount),
            participants: participants.len() as u64,
            max_participants: giveaway.max_participants,
            end_timestamp: giveaway.end_time,
            num_winners: giveaway.num_winners,
            is_creator: user == Some(giveaway.creator),
            show_participants: false,
            participant_list: Vec::new(),
            finalizing: false,
        }
    }
}

/// Flipping the trigger asks the mounted view to reload its list.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    sender: Arc<watch::Sender<u64>>,
}

impl RefreshTrigger {
    pub fn new() -> Self {
        RefreshTrigger {
            sender: Arc::new(watch::Sender::new(0)),
        }
    }

    pub fn flip(&self) {
        self.sender.send_modify(|flips| *flips += 1);
    }

    /// Number of flips so far.
    pub fn flips(&self) -> u64 {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }
}

impl Default for RefreshTrigger {
    fn default() -> Self {
        Self::new()
    }
}

struct Session<S> {
    signer: Option<S>,
    address: Option<Address>,
    /// Bumped on every signer change; loads started under an older
    /// generation are discarded.
    generation: u64,
}

impl<S> Default for Session<S> {
    fn default() -> Self {
        Session {
            signer: None,
            address: None,
            generation: 0,
        }
    }
}

impl<S> Session<S> {
    fn rebind(&mut self, signer: Option<S>, address: Option<Address>) {
        self.signer = signer;
        self.address = address;
        self.generation += 1;
    }
}

/// Marks a join as in flight for one giveaway; cleared on drop.
struct JoinMarker<'a> {
    joining: &'a Mutex<HashSet<GiveawayId>>,
    id: GiveawayId,
}

impl<'a> JoinMarker<'a> {
    fn set(joining: &'a Mutex<HashSet<GiveawayId>>, id: GiveawayId) -> Option<Self> {
        let inserted = lock(joining).insert(id);
        inserted.then(|| JoinMarker { joining, id })
    }
}

impl Drop for JoinMarker<'_> {
    fn drop(&mut self) {
        lock(self.joining).remove(&self.id);
    }
}

/// Raises the `finalizing` flag of one card; lowered on drop.
struct FinalizingFlag<'a> {
    giveaways: &'a Mutex<Vec<GiveawayView>>,
    id: GiveawayId,
}

impl<'a> FinalizingFlag<'a> {
    fn raise(giveaways: &'a Mutex<Vec<GiveawayView>>, id: GiveawayId) -> Self {
        set_finalizing(giveaways, id, true);
        FinalizingFlag { giveaways, id }
    }
}

impl Drop for FinalizingFlag<'_> {
    fn drop(&mut self) {
        set_finalizing(self.giveaways, self.id, false);
    }
}

fn set_finalizing(giveaways: &Mutex<Vec<GiveawayView>>, id: GiveawayId, finalizing: bool) {
    for giveaway in lock(giveaways).iter_mut().filter(|giveaway| giveaway.id == id) {
        giveaway.finalizing = finalizing;
    }
}

/// The list of open giveaways and the actions on them
pub struct ActiveGiveaways<S: Signer> {
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
    session: Mutex<Session<S>>,
    giveaways: Mutex<Vec<GiveawayView>>,
    joining: Mutex<HashSet<GiveawayId>>,
    refresh: RefreshTrigger,
    payouts: Mutex<Option<PayoutSubscription>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Signer> ActiveGiveaways<S> {
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Arc::new(ActiveGiveaways {
            config,
            notifier,
            session: Mutex::new(Session::default()),
            giveaways: Mutex::new(Vec::new()),
            joining: Mutex::new(HashSet::new()),
            refresh: RefreshTrigger::new(),
            payouts: Mutex::new(None),
            driver: Mutex::new(None),
        })
    }

    pub fn giveaways(&self) -> Vec<GiveawayView> {
        lock(&self.giveaways).clone()
    }

    pub fn user_address(&self) -> Option<Address> {
        lock(&self.session).address
    }

    pub fn signer(&self) -> Option<S> {
        lock(&self.session).signer.clone()
    }

    /// Giveaways with a join in flight, in ascending order.
    pub fn joining(&self) -> Vec<GiveawayId> {
        let mut ids: Vec<_> = lock(&self.joining).iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_joining(&self, id: GiveawayId) -> bool {
        lock(&self.joining).contains(&id)
    }

    pub fn refresh_trigger(&self) -> &RefreshTrigger {
        &self.refresh
    }

    pub fn has_payout_subscription(&self) -> bool {
        lock(&self.payouts).is_some()
    }

    /// Text rendering of the list at Unix time `now`.
    pub fn render(&self, now: u64) -> String {
        render::render_giveaways(&self.giveaways(), &self.joining(), now)
    }

    /// Reloads on every refresh flip until [`Self::unmount`].
    pub fn mount(self: &Arc<Self>) {
        let mut driver = lock(&self.driver);
        if driver.is_some() {
            return;
        }
        let mut flips = self.refresh.subscribe();
        let view = Arc::downgrade(self);
        *driver = Some(tokio::spawn(async move {
            loop {
                let Some(view) = view.upgrade() else {
                    break;
                };
                if let Err(e) = view.refresh().await {
                    log::error!("Cannot load giveaways: {e}");
                }
                drop(view);
                if flips.changed().await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Stops reloading and drops the payout subscription.
    pub fn unmount(&self) {
        if let Some(driver) = lock(&self.driver).take() {
            driver.abort();
        }
        if let Some(payouts) = lock(&self.payouts).take() {
            payouts.unsubscribe();
        }
    }

    /// Connection callback target: binds the view to `signer`, replacing the
    /// payout subscription, or clears the session on disconnect.
    pub async fn set_signer(&self, signer: Option<S>) -> Result<(), ConfigError> {
        let Some(signer) = signer else {
            if let Some(previous) = lock(&self.payouts).take() {
                previous.unsubscribe();
            }
            lock(&self.session).rebind(None, None);
            lock(&self.giveaways).clear();
            return Ok(());
        };

        // Resolved first: on a configuration error the previous session and
        // its subscription stay in place.
        let contract = get_contract(&self.config, signer.clone())?;
        let address = match signer.address().await {
            Ok(address) => Some(address),
            Err(e) => {
                log::error!("Cannot read signer address: {e}");
                None
            }
        };
        let subscription = PayoutSubscription::subscribe(
            contract,
            self.notifier.clone(),
            self.refresh.clone(),
        )
        .map_err(|e| log::error!("Cannot listen to WinnersSelected: {e}"))
        .ok();
        let previous = std::mem::replace(&mut *lock(&self.payouts), subscription);
        if let Some(previous) = previous {
            previous.unsubscribe();
        }

        lock(&self.session).rebind(Some(signer), address);
        self.refresh.flip();
        Ok(())
    }

    /// Replaces the list with the current active giveaways. A failed load is
    /// logged and keeps the previous list, and a load that outlives its
    /// session is dropped.
    pub async fn refresh(&self) -> Result<(), ConfigError> {
        let (signer, user, generation) = {
            let session = lock(&self.session);
            (session.signer.clone(), session.address, session.generation)
        };
        let Some(signer) = signer else {
            return Ok(());
        };
        let contract = get_contract(&self.config, signer)?;

        match load_giveaways(&contract, user).await {
            Ok(giveaways) => {
                // Lock order: list, then session.
                let mut list = lock(&self.giveaways);
                if lock(&self.session).generation != generation {
                    log::debug!("Dropping giveaways loaded for a previous account");
                    return Ok(());
                }
                log::debug!("Loaded {} active giveaways", giveaways.len());
                *list = giveaways;
            }
            Err(e) => log::error!("Error loading giveaways: {e}"),
        }
        Ok(())
    }

    /// Joins giveaway `id`. At most one join per giveaway is in flight.
    pub async fn join(&self, id: GiveawayId) -> Result<ActionOutcome, ConfigError> {
        let Some(signer) = self.connected_signer() else {
            return Ok(ActionOutcome::Skipped);
        };
        let Some(_marker) = JoinMarker::set(&self.joining, id) else {
            log::debug!("Join for giveaway {id} already in flight");
            return Ok(ActionOutcome::Skipped);
        };
        let contract = get_contract(&self.config, signer)?;

        let result = async { contract.wait(contract.join_giveaway(id).await?).await }.await;
        match result {
            Ok(receipt) => {
                log::info!("Joined giveaway {id} in {}", receipt.transaction_hash);
                self.notifier.alert("Joined the giveaway!");
                self.refresh.flip();
                Ok(ActionOutcome::Completed)
            }
            Err(e) => {
                log::error!("Join failed: {e}");
                self.notifier
                    .alert(e.reason().unwrap_or("Join failed. Already joined?"));
                Ok(ActionOutcome::Failed(e))
            }
        }
    }

    /// Loads the participants of `id` into its card.
    pub async fn show_participants(&self, id: GiveawayId) -> Result<ActionOutcome, ConfigError> {
        let Some(signer) = self.connected_signer() else {
            return Ok(ActionOutcome::Skipped);
        };
        let contract = get_contract(&self.config, signer)?;

        match contract.get_participants(id).await {
            Ok(participants) => {
                let list: Vec<String> = participants.iter().map(ToString::to_string).collect();
                for giveaway in lock(&self.giveaways).iter_mut().filter(|g| g.id == id) {
                    giveaway.show_participants = true;
                    giveaway.participant_list = list.clone();
                }
                Ok(ActionOutcome::Completed)
            }
            Err(e) => {
                log::error!("Failed to fetch participants: {e}");
                Ok(ActionOutcome::Failed(e))
            }
        }
    }

    /// Requests the randomness that picks the winners of `id`. Creator only.
    pub async fn finalize(&self, id: GiveawayId) -> Result<ActionOutcome, ConfigError> {
        let Some(signer) = self.connected_signer() else {
            return Ok(ActionOutcome::Skipped);
        };
        let is_creator = lock(&self.giveaways)
            .iter()
            .any(|giveaway| giveaway.id == id && giveaway.is_creator);
        if !is_creator {
            self.notifier
                .alert("Only the creator can finalize this giveaway.");
            return Ok(ActionOutcome::Skipped);
        }
        let contract = get_contract(&self.config, signer)?;

        // No in-flight guard: repeated finalize calls each submit a request.
        let _finalizing = FinalizingFlag::raise(&self.giveaways, id);
        let result = async {
            contract
                .wait(contract.request_random_winner(id, false).await?)
                .await
        }
        .await;
        match result {
            Ok(_) => {
                log::info!("Randomness requested for giveaway {id}");
                self.notifier.alert("Randomness requested!");
                Ok(ActionOutcome::Completed)
            }
            Err(e) => {
                log::error!("Finalize failed: {e}");
                let reason = e
                    .provider_message()
                    .or_else(|| e.reason())
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                self.notifier.alert(&format!("Finalize failed:\n{reason}"));
                Ok(ActionOutcome::Failed(e))
            }
        }
    }

    fn connected_signer(&self) -> Option<S> {
        let signer = self.signer();
        if signer.is_none() {
            self.notifier.alert("Connect your wallet first.");
        }
        signer
    }
}

impl<S: Signer> Drop for ActiveGiveaways<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn load_giveaways<S: Signer>(
    contract: &GiveawayContract<S>,
    user: Option<Address>,
) -> Result<Vec<GiveawayView>, RemoteError> {
    let ids = contract.get_active_giveaways().await?;
    future::try_join_all(ids.into_iter().map(|id| async move {
        let (giveaway, participants) =
            future::try_join(contract.giveaways(id), contract.get_participants(id)).await?;
        Ok::<_, RemoteError>(GiveawayView::from_record(&giveaway, &participants, user))
    }))
    .await
}
