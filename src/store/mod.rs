/// 영속성 협력자
/// 모든 변경 연산은 상품 단위의 배타적 임계 구역 안에서
/// "조회 -> 검증 -> 기록"을 원자적으로 수행한다.
// region:    --- Imports
use crate::auction::status::{AuctionStatus, Closing};
use crate::authentication::machine::DecisionOutcome;
use crate::authentication::model::{AuthenticationRequest, Decision, SecondOpinionPolicy};
use crate::bidding::model::{Bid, Item, Money, NewItem, PlacedBid};
use crate::error::AuctionResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// endregion: --- Imports

pub mod memory;
pub mod postgres;
#[cfg(test)]
pub(crate) mod stale;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// region:    --- Store Trait
#[async_trait]
pub trait AuctionStore: Send + Sync {
    // 상품
    async fn insert_item(&self, item: NewItem, created_at: DateTime<Utc>) -> AuctionResult<Item>;
    async fn get_item(&self, item_id: i64) -> AuctionResult<Item>;
    async fn list_items(&self) -> AuctionResult<Vec<Item>>;
    async fn list_items_by_status(&self, status: AuctionStatus) -> AuctionResult<Vec<Item>>;
    async fn publish_item(
        &self,
        item_id: i64,
        publisher_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<Item>;
    /// 소유자 요청에 의한 삭제. 입찰과 감정 요청도 함께 삭제된다.
    async fn remove_item(&self, item_id: i64, owner_id: i64) -> AuctionResult<()>;

    // 입찰 원장
    /// 상품과 입찰 목록의 일관된 스냅샷
    async fn item_with_bids(&self, item_id: i64) -> AuctionResult<(Item, Vec<Bid>)>;
    async fn place_bid(
        &self,
        item_id: i64,
        bidder_id: i64,
        amount: Money,
        now: DateTime<Utc>,
    ) -> AuctionResult<PlacedBid>;
    /// 종료 시간이 지났으면 종료 상태로 전이한다.
    /// 전이가 일어난 경우에만 Closing을 돌려준다.
    async fn close_if_due(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<(Item, Option<Closing>)>;

    // 감정 요청
    async fn submit_authentication(
        &self,
        item_id: i64,
        requester_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<AuthenticationRequest>;
    async fn get_authentication_request(
        &self,
        request_id: i64,
    ) -> AuctionResult<AuthenticationRequest>;
    async fn list_authentication_requests(
        &self,
        item_id: i64,
    ) -> AuctionResult<Vec<AuthenticationRequest>>;
    async fn assign_expert(
        &self,
        request_id: i64,
        expert_id: i64,
    ) -> AuctionResult<AuthenticationRequest>;
    async fn decide_authentication(
        &self,
        request_id: i64,
        decision: Decision,
        now: DateTime<Utc>,
        policy: SecondOpinionPolicy,
    ) -> AuctionResult<DecisionOutcome>;
}
// endregion: --- Store Trait
