// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema};
use futures::future::{BoxFuture, FutureExt};
use lootdrop_abi::{Address, GiveawayId};

use crate::{
    active::{ActiveGiveaways, GiveawayView},
    backend::Signer,
    config::ConfigError,
    create::{CreateGiveaway, CreateGiveawayForm},
    notify::ActionOutcome,
};

/// The giveaway list as seen by the GraphQL service
pub trait GiveawayBoard: Send + Sync {
    fn snapshot(&self) -> Vec<GiveawayView>;

    fn connected_address(&self) -> Option<Address>;

    fn joining_ids(&self) -> Vec<GiveawayId>;

    fn render_text(&self, now: u64) -> String;

    fn reload(&self) -> BoxFuture<'_, Result<(), ConfigError>>;

    fn join_giveaway(&self, id: GiveawayId) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>>;

    fn open_participants(
        &self,
        id: GiveawayId,
    ) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>>;

    fn finalize_giveaway(
        &self,
        id: GiveawayId,
    ) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>>;
}

impl<S: Signer> GiveawayBoard for ActiveGiveaways<S> {
    fn snapshot(&self) -> Vec<GiveawayView> {
        self.giveaways()
    }

    fn connected_address(&self) -> Option<Address> {
        self.user_address()
    }

    fn joining_ids(&self) -> Vec<GiveawayId> {
        self.joining()
    }

    fn render_text(&self, now: u64) -> String {
        self.render(now)
    }

    fn reload(&self) -> BoxFuture<'_, Result<(), ConfigError>> {
        self.refresh().boxed()
    }

    fn join_giveaway(&self, id: GiveawayId) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>> {
        self.join(id).boxed()
    }

    fn open_participants(
        &self,
        id: GiveawayId,
    ) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>> {
        self.show_participants(id).boxed()
    }

    fn finalize_giveaway(
        &self,
        id: GiveawayId,
    ) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>> {
        self.finalize(id).boxed()
    }
}

/// The creation form as seen by the GraphQL service
pub trait GiveawayForm: Send + Sync {
    fn submit(&self, form: CreateGiveawayForm) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>>;
}

impl<S: Signer> GiveawayForm for CreateGiveaway<S> {
    fn submit(&self, form: CreateGiveawayForm) -> BoxFuture<'_, Result<ActionOutcome, ConfigError>> {
        async move { self.create(&form).await }.boxed()
    }
}

pub type LootDropSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// GraphQL front of the giveaway views.
pub struct LootDropService {
    board: Arc<dyn GiveawayBoard>,
    form: Arc<dyn GiveawayForm>,
}

impl LootDropService {
    pub fn new(board: Arc<dyn GiveawayBoard>, form: Arc<dyn GiveawayForm>) -> Self {
        LootDropService { board, form }
    }

    pub fn schema(&self) -> LootDropSchema {
        Schema::build(
            QueryRoot {
                board: self.board.clone(),
            },
            MutationRoot {
                board: self.board.clone(),
                form: self.form.clone(),
            },
            EmptySubscription,
        )
        .finish()
    }

    pub async fn handle_query(&self, request: Request) -> Response {
        self.schema().execute(request).await
    }
}

pub struct QueryRoot {
    board: Arc<dyn GiveawayBoard>,
}

#[Object]
impl QueryRoot {
    /// Active giveaways, as last loaded
    async fn giveaways(&self) -> Vec<GiveawayView> {
        self.board.snapshot()
    }

    /// Checksummed address of the connected account
    async fn connected_address(&self) -> Option<String> {
        self.board.connected_address().map(|address| address.to_string())
    }

    /// Giveaways with a join in flight
    async fn joining(&self) -> Vec<GiveawayId> {
        self.board.joining_ids()
    }

    async fn rendered(&self, now: u64) -> String {
        self.board.render_text(now)
    }
}

pub struct MutationRoot {
    board: Arc<dyn GiveawayBoard>,
    form: Arc<dyn GiveawayForm>,
}

#[Object]
impl MutationRoot {
    /// Reloads the active giveaways
    async fn refresh(&self) -> async_graphql::Result<bool> {
        self.board.reload().await?;
        Ok(true)
    }

    async fn join_giveaway(&self, id: GiveawayId) -> async_graphql::Result<String> {
        Ok(self.board.join_giveaway(id).await?.to_string())
    }

    async fn show_participants(&self, id: GiveawayId) -> async_graphql::Result<String> {
        Ok(self.board.open_participants(id).await?.to_string())
    }

    /// Requests randomness to pick the winners; creator only
    async fn finalize_giveaway(&self, id: GiveawayId) -> async_graphql::Result<String> {
        Ok(self.board.finalize_giveaway(id).await?.to_string())
    }

    async fn create_giveaway(&self, form: CreateGiveawayForm) -> async_graphql::Result<String> {
        Ok(self.form.submit(form).await?.to_string())
    }
}
