/// PostgreSQL 저장소
/// 상품 행을 `SELECT ... FOR UPDATE`로 잠근 트랜잭션 안에서
/// 검증과 기록을 수행한다.
// region:    --- Imports
use super::AuctionStore;
use crate::auction::status::{self, AuctionStatus, Closing};
use crate::authentication::machine::{self, DecisionOutcome};
use crate::authentication::model::{
    AuthenticationRequest, AuthenticationRequestRow, Decision, SecondOpinionPolicy,
};
use crate::bidding::ledger;
use crate::bidding::model::{Bid, Item, ItemRow, Money, NewItem, PlacedBid};
use crate::database::DatabaseManager;
use crate::error::{AuctionError, AuctionResult};
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Row Helpers
async fn lock_item(conn: &mut PgConnection, item_id: i64) -> AuctionResult<Item> {
    sqlx::query_as::<_, ItemRow>(queries::GET_ITEM_FOR_UPDATE)
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AuctionError::NotFound(format!("상품 {item_id}")))?
        .try_into()
}

async fn fetch_bids(conn: &mut PgConnection, item_id: i64) -> AuctionResult<Vec<Bid>> {
    Ok(sqlx::query_as::<_, Bid>(queries::GET_ITEM_BIDS)
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await?)
}

async fn fetch_requests(
    conn: &mut PgConnection,
    item_id: i64,
) -> AuctionResult<Vec<AuthenticationRequest>> {
    sqlx::query_as::<_, AuthenticationRequestRow>(queries::GET_ITEM_AUTHENTICATION_REQUESTS)
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(AuthenticationRequest::try_from)
        .collect()
}

async fn fetch_request(
    conn: &mut PgConnection,
    request_id: i64,
) -> AuctionResult<AuthenticationRequest> {
    sqlx::query_as::<_, AuthenticationRequestRow>(queries::GET_AUTHENTICATION_REQUEST)
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AuctionError::NotFound(format!("감정 요청 {request_id}")))?
        .try_into()
}

async fn request_item_id(conn: &mut PgConnection, request_id: i64) -> AuctionResult<i64> {
    sqlx::query_scalar::<_, i64>(queries::GET_REQUEST_ITEM_ID)
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AuctionError::NotFound(format!("감정 요청 {request_id}")))
}

async fn write_item_state(conn: &mut PgConnection, item: &Item) -> AuctionResult<()> {
    sqlx::query(queries::UPDATE_ITEM_STATE)
        .bind(item.id)
        .bind(item.auction_status.as_str())
        .bind(item.authentication_status.as_str())
        .bind(item.final_price)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn write_request(
    conn: &mut PgConnection,
    request: &AuthenticationRequest,
) -> AuctionResult<()> {
    sqlx::query(queries::UPDATE_AUTHENTICATION_REQUEST)
        .bind(request.id)
        .bind(request.assigned_expert_id)
        .bind(request.second_expert_id)
        .bind(request.status.as_str())
        .bind(request.first_decision.map(|verdict| verdict.status().as_str()))
        .bind(request.second_opinion_requested)
        .bind(&request.comments)
        .bind(request.decided_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
// endregion: --- Row Helpers

// region:    --- Postgres Store
pub struct PostgresStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionStore for PostgresStore {
    async fn insert_item(&self, item: NewItem, created_at: DateTime<Utc>) -> AuctionResult<Item> {
        item.validate(created_at)?;
        let row = sqlx::query_as::<_, ItemRow>(queries::INSERT_ITEM)
            .bind(item.owner_id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.minimum_price)
            .bind(created_at)
            .bind(item.end_time)
            .bind(item.posting_fee)
            .fetch_one(self.db_manager.pool())
            .await?;
        row.try_into()
    }

    async fn get_item(&self, item_id: i64) -> AuctionResult<Item> {
        sqlx::query_as::<_, ItemRow>(queries::GET_ITEM)
            .bind(item_id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or_else(|| AuctionError::NotFound(format!("상품 {item_id}")))?
            .try_into()
    }

    async fn list_items(&self) -> AuctionResult<Vec<Item>> {
        sqlx::query_as::<_, ItemRow>(queries::GET_ALL_ITEMS)
            .fetch_all(self.db_manager.pool())
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }

    async fn list_items_by_status(&self, status: AuctionStatus) -> AuctionResult<Vec<Item>> {
        sqlx::query_as::<_, ItemRow>(queries::GET_ITEMS_BY_STATUS)
            .bind(status.as_str())
            .fetch_all(self.db_manager.pool())
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }

    async fn publish_item(
        &self,
        item_id: i64,
        publisher_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<Item> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item = lock_item(&mut **tx, item_id).await?;
                    let published = status::publish(&item, publisher_id, now)?;
                    write_item_state(&mut **tx, &published).await?;
                    Ok(published)
                })
            })
            .await
    }

    async fn remove_item(&self, item_id: i64, owner_id: i64) -> AuctionResult<()> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item = lock_item(&mut **tx, item_id).await?;
                    if item.owner_id != owner_id {
                        return Err(AuctionError::NotOwner);
                    }
                    sqlx::query(queries::DELETE_ITEM)
                        .bind(item_id)
                        .execute(&mut **tx)
                        .await?;
                    info!("{:<12} --> 상품 {} 삭제", "PgStore", item_id);
                    Ok(())
                })
            })
            .await
    }

    async fn item_with_bids(&self, item_id: i64) -> AuctionResult<(Item, Vec<Bid>)> {
        // 행 잠금으로 입찰 추가 도중의 부분 상태를 읽지 않는다.
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item = lock_item(&mut **tx, item_id).await?;
                    let bids = fetch_bids(&mut **tx, item_id).await?;
                    Ok((item, bids))
                })
            })
            .await
    }

    async fn place_bid(
        &self,
        item_id: i64,
        bidder_id: i64,
        amount: Money,
        now: DateTime<Utc>,
    ) -> AuctionResult<PlacedBid> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item = lock_item(&mut **tx, item_id).await?;
                    let bids = fetch_bids(&mut **tx, item_id).await?;
                    let previous_leader =
                        ledger::validate_bid(&item, &bids, bidder_id, amount, now)?;

                    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(item_id)
                        .bind(bidder_id)
                        .bind(amount)
                        .bind(now)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(PlacedBid {
                        bid,
                        previous_leader,
                    })
                })
            })
            .await
    }

    async fn close_if_due(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<(Item, Option<Closing>)> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item = lock_item(&mut **tx, item_id).await?;
                    let bids = fetch_bids(&mut **tx, item_id).await?;
                    match status::tick(&item, &bids, now) {
                        Some((closed, closing)) => {
                            write_item_state(&mut **tx, &closed).await?;
                            Ok((closed, Some(closing)))
                        }
                        None => Ok((item, None)),
                    }
                })
            })
            .await
    }

    async fn submit_authentication(
        &self,
        item_id: i64,
        requester_id: i64,
        now: DateTime<Utc>,
    ) -> AuctionResult<AuthenticationRequest> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let mut item = lock_item(&mut **tx, item_id).await?;
                    let existing = fetch_requests(&mut **tx, item_id).await?;
                    machine::ensure_can_submit(&existing)?;

                    let request: AuthenticationRequest =
                        sqlx::query_as::<_, AuthenticationRequestRow>(
                            queries::INSERT_AUTHENTICATION_REQUEST,
                        )
                        .bind(item_id)
                        .bind(requester_id)
                        .bind(now)
                        .fetch_one(&mut **tx)
                        .await?
                        .try_into()?;

                    item.authentication_status = request.status;
                    write_item_state(&mut **tx, &item).await?;
                    Ok(request)
                })
            })
            .await
    }

    async fn get_authentication_request(
        &self,
        request_id: i64,
    ) -> AuctionResult<AuthenticationRequest> {
        sqlx::query_as::<_, AuthenticationRequestRow>(queries::GET_AUTHENTICATION_REQUEST)
            .bind(request_id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or_else(|| AuctionError::NotFound(format!("감정 요청 {request_id}")))?
            .try_into()
    }

    async fn list_authentication_requests(
        &self,
        item_id: i64,
    ) -> AuctionResult<Vec<AuthenticationRequest>> {
        // 존재하지 않는 상품은 빈 목록 대신 NotFound
        self.get_item(item_id).await?;
        sqlx::query_as::<_, AuthenticationRequestRow>(queries::GET_ITEM_AUTHENTICATION_REQUESTS)
            .bind(item_id)
            .fetch_all(self.db_manager.pool())
            .await?
            .into_iter()
            .map(AuthenticationRequest::try_from)
            .collect()
    }

    async fn assign_expert(
        &self,
        request_id: i64,
        expert_id: i64,
    ) -> AuctionResult<AuthenticationRequest> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item_id = request_item_id(&mut **tx, request_id).await?;
                    lock_item(&mut **tx, item_id).await?;
                    let request = fetch_request(&mut **tx, request_id).await?;
                    let assigned = machine::assign(&request, expert_id)?;
                    write_request(&mut **tx, &assigned).await?;
                    Ok(assigned)
                })
            })
            .await
    }

    async fn decide_authentication(
        &self,
        request_id: i64,
        decision: Decision,
        now: DateTime<Utc>,
        policy: SecondOpinionPolicy,
    ) -> AuctionResult<DecisionOutcome> {
        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let item_id = request_item_id(&mut **tx, request_id).await?;
                    let mut item = lock_item(&mut **tx, item_id).await?;
                    let request = fetch_request(&mut **tx, request_id).await?;
                    let outcome = machine::decide(&request, &decision, now, policy)?;

                    write_request(&mut **tx, &outcome.request).await?;
                    if let Some(status) = outcome.item_status {
                        item.authentication_status = status;
                        write_item_state(&mut **tx, &item).await?;
                    }
                    Ok(outcome)
                })
            })
            .await
    }
}
// endregion: --- Postgres Store
