/// 목록 조회 결과를 고정해 두는 저장소.
/// 목록 조회와 개별 상품 처리 사이에 상품이 삭제되는 경우를 재현한다.
// region:    --- Imports
use super::{AuctionStore, MemoryStore};
use crate::auction::status::{AuctionStatus, Closing};
use crate::authentication::machine::DecisionOutcome;
use crate::authentication::model::{AuthenticationRequest, Decision, SecondOpinionPolicy};
use crate::bidding::model::{Bid, Item, Money, NewItem, PlacedBid};
use crate::error::AuctionResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

// endregion: --- Imports

#[derive(Default)]
pub struct StaleListStore {
    inner: MemoryStore,
    snapshot: Mutex<Option<Vec<Item>>>,
}

impl StaleListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 목록을 고정한다. 이후 목록 조회는 이 스냅샷을 돌려준다.
    pub async fn freeze(&self) {
        let items = self.inner.list_items().await.unwrap();
        *self.snapshot.lock().unwrap() = Some(items);
    }

    fn frozen(&self) -> Option<Vec<Item>> {
        self.snapshot.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuctionStore for StaleListStore {
    async fn insert_item(&self, item: NewItem, created_at: DateTime<Utc>) -> AuctionResult<Item> {
        self.inner.insert_item(item, created_at).await
    }

    async fn get_item(&self, item_id: i64) -> AuctionResult<Item> {
        self.inner.get_item(item_id).await
    }

    async fn list_items(&self) -> AuctionResult<Vec<Item>> {
        match self.frozen() {
            Some(items) => Ok(items),
            None => self.inner.list_items().await,
        }
    }

    async fn list_items_by_status(&self, status: AuctionStatus) -> AuctionResult<Vec<Item>> {
        match self.frozen() {
            Some(items) => Ok(items
                .into_iter()
                .filter(|item| item.auction_status == status)
                .collect()),
            None => self.inner.list_items_by_status(status).await,
        }
    }

    async fn publish_item(
        &self,
        item_id: i64,
        publisher_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<Item> {
        self.inner.publish_item(item_id, publisher_id, now).await
    }

    async fn remove_item(&self, item_id: i64, owner_id: i64) -> AuctionResult<()> {
        self.inner.remove_item(item_id, owner_id).await
    }

    async fn item_with_bids(&self, item_id: i64) -> AuctionResult<(Item, Vec<Bid>)> {
        self.inner.item_with_bids(item_id).await
    }

    async fn place_bid(
        &self,
        item_id: i64,
        bidder_id: i64,
        amount: Money,
        now: DateTime<Utc>,
    ) -> AuctionResult<PlacedBid> {
        self.inner.place_bid(item_id, bidder_id, amount, now).await
    }

    async fn close_if_due(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<(Item, Option<Closing>)> {
        self.inner.close_if_due(item_id, now).await
    }

    async fn submit_authentication(
        &self,
        item_id: i64,
        requester_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<AuthenticationRequest> {
        self.inner
            .submit_authentication(item_id, requester_id, now)
            .await
    }

    async fn get_authentication_request(
        &self,
        request_id: i64,
    ) -> AuctionResult<AuthenticationRequest> {
        self.inner.get_authentication_request(request_id).await
    }

    async fn list_authentication_requests(
        &self,
        item_id: i64,
    ) -> AuctionResult<Vec<AuthenticationRequest>> {
        self.inner.list_authentication_requests(item_id).await
    }

    async fn assign_expert(
        &self,
        request_id: i64,
        expert_id: i64,
    ) -> AuctionResult<AuthenticationRequest> {
        self.inner.assign_expert(request_id, expert_id).await
    }

    async fn decide_authentication(
        &self,
        request_id: i64,
        decision: Decision,
        now: DateTime<Utc>,
        policy: SecondOpinionPolicy,
    ) -> AuctionResult<DecisionOutcome> {
        self.inner
            .decide_authentication(request_id, decision, now, policy)
            .await
    }
}
