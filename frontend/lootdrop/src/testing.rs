// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory chain and wallet used by the unit tests.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use futures::{
    channel::mpsc::{self, UnboundedSender},
    stream::{BoxStream, StreamExt},
};
use lootdrop_abi::{
    Address, CallOutput, ContractEvent, Giveaway, GiveawayCall, GiveawayId, PendingTransaction,
    PrizeType, Receipt, RemoteError, Wei,
};
use tokio::sync::Semaphore;

use crate::{
    backend::{ContractBackend, Signer, WalletProvider},
    config::ClientConfig,
    notify::Notifier,
};

/// Block timestamp of the fake chain.
pub const NOW: u64 = 1_700_000_000;

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn reverted(reason: &str) -> RemoteError {
    RemoteError::Reverted {
        reason: Some(reason.to_string()),
        provider_message: None,
    }
}

/// Polls `condition` between scheduler yields until it holds.
pub async fn until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub from: Address,
    pub to: Address,
    pub call: GiveawayCall,
    pub value: Wei,
}

#[derive(Debug, Default)]
struct ChainState {
    next_id: GiveawayId,
    giveaways: BTreeMap<GiveawayId, Giveaway>,
    participants: BTreeMap<GiveawayId, Vec<Address>>,
    sent: Vec<SentTransaction>,
    reads: usize,
    fail_next_send: Option<RemoteError>,
    fail_reads: Option<RemoteError>,
    event_subscribers: Vec<UnboundedSender<ContractEvent>>,
}

#[derive(Debug)]
pub struct FakeChain {
    contract: Address,
    state: Mutex<ChainState>,
    hold_confirmations: AtomicBool,
    confirmations: Semaphore,
    hold_reads: AtomicBool,
    read_permits: Semaphore,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeChain {
            contract: address(0xc0),
            state: Mutex::new(ChainState {
                next_id: 1,
                ..ChainState::default()
            }),
            hold_confirmations: AtomicBool::new(false),
            confirmations: Semaphore::new(0),
            hold_reads: AtomicBool::new(false),
            read_permits: Semaphore::new(0),
        })
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.contract)
    }

    pub fn signer(self: &Arc<Self>, address: Address) -> FakeSigner {
        FakeSigner {
            chain: self.clone(),
            address,
        }
    }

    pub fn add_giveaway(
        &self,
        creator: Address,
        name: &str,
        prize_amount: Wei,
        max_participants: u64,
    ) -> GiveawayId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.giveaways.insert(
            id,
            Giveaway {
                id,
                creator,
                name: name.to_string(),
                prize_type: PrizeType::Eth,
                prize_amount,
                num_winners: 1,
                max_participants,
                end_time: NOW + 3600,
                is_active: true,
                is_finalized: false,
            },
        );
        state.participants.insert(id, Vec::new());
        id
    }

    pub fn add_participant(&self, id: GiveawayId, participant: Address) {
        let mut state = self.state.lock().unwrap();
        state.participants.entry(id).or_default().push(participant);
    }

    pub fn giveaway(&self, id: GiveawayId) -> Option<Giveaway> {
        self.state.lock().unwrap().giveaways.get(&id).cloned()
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Transactions submitted to `function`.
    pub fn sent_to(&self, function: &str) -> Vec<SentTransaction> {
        self.sent()
            .into_iter()
            .filter(|sent| sent.call.function_name() == function)
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn fail_next_send(&self, error: RemoteError) {
        self.state.lock().unwrap().fail_next_send = Some(error);
    }

    pub fn fail_reads(&self, error: Option<RemoteError>) {
        self.state.lock().unwrap().fail_reads = error;
    }

    /// Keeps every confirmation pending until released one by one.
    pub fn hold_confirmations(&self) {
        self.hold_confirmations.store(true, Ordering::SeqCst);
    }

    pub fn release_confirmation(&self) {
        self.confirmations.add_permits(1);
    }

    /// Keeps the next read pending until [`Self::release_reads`].
    pub fn hold_reads(&self) {
        self.hold_reads.store(true, Ordering::SeqCst);
    }

    /// Lets the held read through; later reads are served at once.
    pub fn release_reads(&self) {
        self.hold_reads.store(false, Ordering::SeqCst);
        self.read_permits.add_permits(1);
    }

    pub fn emit_winners_selected(&self, giveaway_id: GiveawayId, winners: Vec<Address>) {
        let event = ContractEvent::WinnersSelected {
            giveaway_id,
            winners,
        };
        let mut state = self.state.lock().unwrap();
        state
            .event_subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }

    /// Event streams that are still being listened to.
    pub fn live_event_subscribers(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        state.event_subscribers.retain(|subscriber| !subscriber.is_closed());
        state.event_subscribers.len()
    }

    fn apply(&self, from: Address, call: &GiveawayCall) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        match call {
            GiveawayCall::CreateGiveaway(args) => {
                let id = state.next_id;
                state.next_id += 1;
                state.giveaways.insert(
                    id,
                    Giveaway {
                        id,
                        creator: from,
                        name: args.name.clone(),
                        prize_type: args.prize_type,
                        prize_amount: args.prize_amount,
                        num_winners: args.num_winners,
                        max_participants: args.max_participants,
                        end_time: NOW + args.duration_secs,
                        is_active: true,
                        is_finalized: false,
                    },
                );
                state.participants.insert(id, Vec::new());
            }
            GiveawayCall::JoinGiveaway { id } => {
                let max = state
                    .giveaways
                    .get(id)
                    .ok_or_else(|| reverted("Giveaway does not exist"))?
                    .max_participants;
                let participants = state.participants.entry(*id).or_default();
                if participants.contains(&from) {
                    return Err(reverted("Already joined"));
                }
                if participants.len() as u64 >= max {
                    return Err(reverted("Giveaway is full"));
                }
                participants.push(from);
            }
            GiveawayCall::RequestRandomWinner { id, .. } => {
                let giveaway = state
                    .giveaways
                    .get_mut(id)
                    .ok_or_else(|| reverted("Giveaway does not exist"))?;
                if giveaway.creator != from {
                    return Err(reverted("Only creator can finalize"));
                }
                giveaway.is_finalized = true;
            }
            GiveawayCall::PayoutWinners { id } => {
                let giveaway = state
                    .giveaways
                    .get_mut(id)
                    .ok_or_else(|| reverted("Giveaway does not exist"))?;
                giveaway.is_active = false;
            }
            GiveawayCall::GetActiveGiveaways
            | GiveawayCall::Giveaways { .. }
            | GiveawayCall::GetParticipants { .. } => {
                return Err(RemoteError::Provider("read-only call sent as transaction".to_string()))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FakeSigner {
    chain: Arc<FakeChain>,
    address: Address,
}

impl FakeSigner {
    pub fn account(&self) -> Address {
        self.address
    }
}

impl ContractBackend for FakeSigner {
    async fn call(&self, _to: Address, call: GiveawayCall) -> Result<CallOutput, RemoteError> {
        if self.chain.hold_reads.load(Ordering::SeqCst) {
            self.chain
                .read_permits
                .acquire()
                .await
                .map_err(|e| RemoteError::Provider(e.to_string()))?
                .forget();
        }
        let mut state = self.chain.state.lock().unwrap();
        state.reads += 1;
        if let Some(error) = state.fail_reads.clone() {
            return Err(error);
        }
        match call {
            GiveawayCall::GetActiveGiveaways => Ok(CallOutput::GiveawayIds(
                state
                    .giveaways
                    .values()
                    .filter(|giveaway| giveaway.is_active)
                    .map(|giveaway| giveaway.id)
                    .collect(),
            )),
            GiveawayCall::Giveaways { id } => state
                .giveaways
                .get(&id)
                .cloned()
                .map(CallOutput::Giveaway)
                .ok_or_else(|| reverted("Giveaway does not exist")),
            GiveawayCall::GetParticipants { id } => Ok(CallOutput::Participants(
                state.participants.get(&id).cloned().unwrap_or_default(),
            )),
            _ => Ok(CallOutput::Unit),
        }
    }

    async fn send(
        &self,
        to: Address,
        call: GiveawayCall,
        value: Wei,
    ) -> Result<PendingTransaction, RemoteError> {
        let (hash, failure) = {
            let mut state = self.chain.state.lock().unwrap();
            state.sent.push(SentTransaction {
                from: self.address,
                to,
                call: call.clone(),
                value,
            });
            (format!("0x{:064x}", state.sent.len()), state.fail_next_send.take())
        };
        if let Some(error) = failure {
            return Err(error);
        }
        self.chain.apply(self.address, &call)?;
        Ok(PendingTransaction { hash })
    }

    async fn wait(&self, transaction: PendingTransaction) -> Result<Receipt, RemoteError> {
        if self.chain.hold_confirmations.load(Ordering::SeqCst) {
            self.chain
                .confirmations
                .acquire()
                .await
                .map_err(|e| RemoteError::Provider(e.to_string()))?
                .forget();
        }
        Ok(Receipt {
            transaction_hash: transaction.hash,
            block_number: 1,
        })
    }

    fn events(&self, _to: Address) -> BoxStream<'static, ContractEvent> {
        let (sender, receiver) = mpsc::unbounded();
        self.chain
            .state
            .lock()
            .unwrap()
            .event_subscribers
            .push(sender);
        receiver.boxed()
    }
}

impl Signer for FakeSigner {
    async fn address(&self) -> Result<Address, RemoteError> {
        Ok(self.address)
    }
}

#[derive(Debug)]
pub struct FakeWallet {
    chain: Arc<FakeChain>,
    accounts: Mutex<Vec<Address>>,
    reject_requests: AtomicBool,
    listeners: Mutex<Vec<UnboundedSender<Vec<Address>>>>,
}

impl FakeWallet {
    pub fn new(chain: &Arc<FakeChain>, accounts: Vec<Address>) -> Arc<Self> {
        Arc::new(FakeWallet {
            chain: chain.clone(),
            accounts: Mutex::new(accounts),
            reject_requests: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn reject_requests(&self) {
        self.reject_requests.store(true, Ordering::SeqCst);
    }

    /// Switches the selected accounts and fires `accountsChanged`.
    pub fn switch_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts.clone();
        self.listeners
            .lock()
            .unwrap()
            .retain(|listener| listener.unbounded_send(accounts.clone()).is_ok());
    }

    pub fn live_listeners(&self) -> usize {
        let mut listeners = self.listeners.lock().unwrap();
        listeners.retain(|listener| !listener.is_closed());
        listeners.len()
    }
}

impl WalletProvider for FakeWallet {
    type Signer = FakeSigner;

    async fn request_accounts(&self) -> Result<Vec<Address>, RemoteError> {
        if self.reject_requests.load(Ordering::SeqCst) {
            return Err(RemoteError::UserRejected);
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    fn signer(&self) -> FakeSigner {
        let selected = self
            .accounts
            .lock()
            .unwrap()
            .first()
            .copied()
            .unwrap_or(Address::ZERO);
        self.chain.signer(selected)
    }

    fn accounts_changed(&self) -> BoxStream<'static, Vec<Address>> {
        let (sender, receiver) = mpsc::unbounded();
        self.listeners.lock().unwrap().push(sender);
        receiver.boxed()
    }
}

/// Collects alerts instead of showing them.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
