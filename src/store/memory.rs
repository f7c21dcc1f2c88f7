/// 메모리 저장소
/// 상품마다 tokio Mutex를 두어 입찰/상태 전이를 상품 단위로 직렬화한다.
// region:    --- Imports
use super::AuctionStore;
use crate::auction::status::{self, AuctionStatus, Closing};
use crate::authentication::machine::{self, DecisionOutcome};
use crate::authentication::model::{AuthenticationRequest, Decision, SecondOpinionPolicy};
use crate::bidding::ledger;
use crate::bidding::model::{Bid, Item, Money, NewItem, PlacedBid};
use crate::error::{AuctionError, AuctionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

// endregion: --- Imports

// region:    --- Memory Store
struct ItemEntry {
    item: Item,
    bids: Vec<Bid>,
    requests: Vec<AuthenticationRequest>,
}

#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<i64, Arc<Mutex<ItemEntry>>>>,
    // 감정 요청 id -> 상품 id
    request_index: RwLock<HashMap<i64, i64>>,
    next_item_id: AtomicI64,
    next_bid_id: AtomicI64,
    next_request_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn entry(&self, item_id: i64) -> AuctionResult<Arc<Mutex<ItemEntry>>> {
        self.items
            .read()
            .await
            .get(&item_id)
            .cloned()
            .ok_or_else(|| AuctionError::NotFound(format!("상품 {item_id}")))
    }

    async fn entry_for_request(&self, request_id: i64) -> AuctionResult<Arc<Mutex<ItemEntry>>> {
        let item_id = self
            .request_index
            .read()
            .await
            .get(&request_id)
            .copied()
            .ok_or_else(|| AuctionError::NotFound(format!("감정 요청 {request_id}")))?;
        self.entry(item_id).await
    }

    async fn snapshot_all(&self) -> Vec<Item> {
        let entries: Vec<_> = self.items.read().await.values().cloned().collect();
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            items.push(entry.lock().await.item.clone());
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }
}

fn request_position(entry: &ItemEntry, request_id: i64) -> AuctionResult<usize> {
    entry
        .requests
        .iter()
        .position(|r| r.id == request_id)
        .ok_or_else(|| AuctionError::NotFound(format!("감정 요청 {request_id}")))
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn insert_item(&self, item: NewItem, created_at: DateTime<Utc>) -> AuctionResult<Item> {
        item.validate(created_at)?;
        let id = Self::next_id(&self.next_item_id);
        let item = item.into_item(id, created_at);
        self.items.write().await.insert(
            id,
            Arc::new(Mutex::new(ItemEntry {
                item: item.clone(),
                bids: Vec::new(),
                requests: Vec::new(),
            })),
        );
        Ok(item)
    }

    async fn get_item(&self, item_id: i64) -> AuctionResult<Item> {
        Ok(self.entry(item_id).await?.lock().await.item.clone())
    }

    async fn list_items(&self) -> AuctionResult<Vec<Item>> {
        Ok(self.snapshot_all().await)
    }

    async fn list_items_by_status(&self, status: AuctionStatus) -> AuctionResult<Vec<Item>> {
        let mut items = self.snapshot_all().await;
        items.retain(|item| item.auction_status == status);
        Ok(items)
    }

    async fn publish_item(
        &self,
        item_id: i64,
        publisher_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<Item> {
        let entry = self.entry(item_id).await?;
        let mut entry = entry.lock().await;
        let published = status::publish(&entry.item, publisher_id, now)?;
        entry.item = published.clone();
        Ok(published)
    }

    async fn remove_item(&self, item_id: i64, owner_id: i64) -> AuctionResult<()> {
        let mut items = self.items.write().await;
        let entry = items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| AuctionError::NotFound(format!("상품 {item_id}")))?;
        let entry = entry.lock().await;
        if entry.item.owner_id != owner_id {
            return Err(AuctionError::NotOwner);
        }

        let mut index = self.request_index.write().await;
        for request in &entry.requests {
            index.remove(&request.id);
        }
        items.remove(&item_id);
        debug!(
            "{:<12} --> 상품 {} 삭제 (입찰 {}건, 감정 요청 {}건)",
            "MemoryStore",
            item_id,
            entry.bids.len(),
            entry.requests.len()
        );
        Ok(())
    }

    async fn item_with_bids(&self, item_id: i64) -> AuctionResult<(Item, Vec<Bid>)> {
        let entry = self.entry(item_id).await?;
        let entry = entry.lock().await;
        Ok((entry.item.clone(), entry.bids.clone()))
    }

    async fn place_bid(
        &self,
        item_id: i64,
        bidder_id: i64,
        amount: Money,
        now: DateTime<Utc>,
    ) -> AuctionResult<PlacedBid> {
        let entry = self.entry(item_id).await?;
        let mut entry = entry.lock().await;
        let previous_leader =
            ledger::validate_bid(&entry.item, &entry.bids, bidder_id, amount, now)?;

        let bid = Bid {
            id: Self::next_id(&self.next_bid_id),
            item_id,
            bidder_id,
            amount,
            placed_at: now,
        };
        entry.bids.push(bid.clone());
        Ok(PlacedBid {
            bid,
            previous_leader,
        })
    }

    async fn close_if_due(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<(Item, Option<Closing>)> {
        let entry = self.entry(item_id).await?;
        let mut entry = entry.lock().await;
        match status::tick(&entry.item, &entry.bids, now) {
            Some((closed, closing)) => {
                entry.item = closed.clone();
                Ok((closed, Some(closing)))
            }
            None => Ok((entry.item.clone(), None)),
        }
    }

    async fn submit_authentication(
        &self,
        item_id: i64,
        requester_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<AuthenticationRequest> {
        let entry = self.entry(item_id).await?;
        let mut entry = entry.lock().await;
        machine::ensure_can_submit(&entry.requests)?;

        let request = AuthenticationRequest::pending(
            Self::next_id(&self.next_request_id),
            item_id,
            requester_id,
            now,
        );
        entry.requests.push(request.clone());
        entry.item.authentication_status = request.status;
        self.request_index.write().await.insert(request.id, item_id);
        Ok(request)
    }

    async fn get_authentication_request(
        &self,
        request_id: i64,
    ) -> AuctionResult<AuthenticationRequest> {
        let entry = self.entry_for_request(request_id).await?;
        let entry = entry.lock().await;
        let position = request_position(&entry, request_id)?;
        Ok(entry.requests[position].clone())
    }

    async fn list_authentication_requests(
        &self,
        item_id: i64,
    ) -> AuctionResult<Vec<AuthenticationRequest>> {
        Ok(self.entry(item_id).await?.lock().await.requests.clone())
    }

    async fn assign_expert(
        &self,
        request_id: i64,
        expert_id: i64,
    ) -> AuctionResult<AuthenticationRequest> {
        let entry = self.entry_for_request(request_id).await?;
        let mut entry = entry.lock().await;
        let position = request_position(&entry, request_id)?;
        let assigned = machine::assign(&entry.requests[position], expert_id)?;
        entry.requests[position] = assigned.clone();
        Ok(assigned)
    }

    async fn decide_authentication(
        &self,
        request_id: i64,
        decision: Decision,
        now: DateTime<Utc>,
        policy: SecondOpinionPolicy,
    ) -> AuctionResult<DecisionOutcome> {
        let entry = self.entry_for_request(request_id).await?;
        let mut entry = entry.lock().await;
        let position = request_position(&entry, request_id)?;
        let outcome = machine::decide(&entry.requests[position], &decision, now, policy)?;

        entry.requests[position] = outcome.request.clone();
        if let Some(status) = outcome.item_status {
            entry.item.authentication_status = status;
        }
        Ok(outcome)
    }
}
// endregion: --- Memory Store

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::model::{AuthenticationStatus, Verdict};
    use chrono::Duration;

    async fn active_item(store: &MemoryStore, now: DateTime<Utc>) -> Item {
        let item = store
            .insert_item(
                NewItem {
                    owner_id: 1,
                    title: "카메라".into(),
                    description: "필름 카메라".into(),
                    minimum_price: 50,
                    end_time: now + Duration::hours(1),
                    posting_fee: None,
                },
                now,
            )
            .await
            .unwrap();
        store.publish_item(item.id, 1, now).await.unwrap()
    }

    #[tokio::test]
    async fn rejected_bid_leaves_ledger_unchanged() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let item = active_item(&store, now).await;

        store.place_bid(item.id, 2, 60, now).await.unwrap();
        let err = store.place_bid(item.id, 3, 55, now).await.unwrap_err();
        assert!(matches!(err, AuctionError::InvalidAmount { current_price: 60 }));

        let (_, bids) = store.item_with_bids(item.id).await.unwrap();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].amount, 60);
    }

    #[tokio::test]
    async fn concurrent_equal_bids_only_one_wins() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let item_id = active_item(&store, now).await.id;

        let mut handles = Vec::new();
        for bidder in 2..=21 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.place_bid(item_id, bidder, 100, now).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(store.item_with_bids(item_id).await.unwrap().1.len(), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let item = active_item(&store, now).await;
        store.place_bid(item.id, 2, 55, now).await.unwrap();
        store.place_bid(item.id, 3, 60, now).await.unwrap();

        let later = item.end_time + Duration::seconds(1);
        let (closed, closing) = store.close_if_due(item.id, later).await.unwrap();
        assert_eq!(closed.auction_status, AuctionStatus::EndedSold);
        assert!(closing.is_some());

        let (again, closing) = store.close_if_due(item.id, later).await.unwrap();
        assert_eq!(closing, None);
        assert_eq!(again.final_price, Some(60));
        assert_eq!(again, closed);
    }

    #[tokio::test]
    async fn removal_cascades_and_checks_owner() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let item = active_item(&store, now).await;
        store.place_bid(item.id, 2, 55, now).await.unwrap();
        let request = store.submit_authentication(item.id, 1, now).await.unwrap();

        assert!(matches!(
            store.remove_item(item.id, 2).await,
            Err(AuctionError::NotOwner)
        ));
        store.remove_item(item.id, 1).await.unwrap();

        assert!(matches!(store.get_item(item.id).await, Err(AuctionError::NotFound(_))));
        assert!(matches!(
            store.get_authentication_request(request.id).await,
            Err(AuctionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn decision_updates_item_authentication_status() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let item = active_item(&store, now).await;

        let request = store.submit_authentication(item.id, 1, now).await.unwrap();
        assert_eq!(
            store.get_item(item.id).await.unwrap().authentication_status,
            AuthenticationStatus::Pending
        );
        assert!(matches!(
            store.submit_authentication(item.id, 1, now).await,
            Err(AuctionError::RequestPending)
        ));

        store.assign_expert(request.id, 100).await.unwrap();
        store
            .decide_authentication(
                request.id,
                Decision {
                    expert_id: 100,
                    verdict: Verdict::Rejected,
                    comments: None,
                    second_opinion: false,
                },
                now,
                SecondOpinionPolicy::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            store.get_item(item.id).await.unwrap().authentication_status,
            AuthenticationStatus::Rejected
        );
        // 거절 이후에는 새 요청이 가능하다.
        assert!(store.submit_authentication(item.id, 1, now).await.is_ok());
        assert_eq!(store.list_authentication_requests(item.id).await.unwrap().len(), 2);
    }
}
