// region:    --- Imports
use crate::auction::commands::close_if_due;
use crate::auction::status::AuctionStatus;
use crate::authentication::model::AuthenticationRequest;
use crate::bidding::model::{Bid, Item, Money};
use crate::bidding::price::{self, PriceSummary};
use crate::error::{AuctionError, AuctionResult};
use crate::state::AppState;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Query Handlers

/// 상품 조회. 조회 시점에 종료 여부를 평가한다.
pub async fn get_item(state: &AppState, item_id: i64) -> AuctionResult<Item> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", item_id);
    close_if_due(state, item_id).await
}

/// 모든 상품 조회
pub async fn get_all_items(state: &AppState) -> AuctionResult<Vec<Item>> {
    info!("{:<12} --> 모든 상품 조회", "Query");
    let now = state.clock.now();
    let listed = state.store.list_items().await?;
    let mut items = Vec::with_capacity(listed.len());
    for item in listed {
        if item.auction_status != AuctionStatus::Active || now < item.end_time {
            items.push(item);
            continue;
        }
        match close_if_due(state, item.id).await {
            Ok(closed) => items.push(closed),
            // 목록 조회 이후 삭제된 상품
            Err(AuctionError::NotFound(_)) => {
                debug!("{:<12} --> 삭제된 상품 제외 id: {}", "Query", item.id)
            }
            Err(e) => return Err(e),
        }
    }
    Ok(items)
}

/// 현재가 조회
pub async fn get_current_price(state: &AppState, item_id: i64) -> AuctionResult<Money> {
    info!("{:<12} --> 현재가 조회 id: {}", "Query", item_id);
    let (item, bids) = state.store.item_with_bids(item_id).await?;
    Ok(price::current_price(&item, &bids))
}

/// 현재가 요약 (최고 입찰자, 입찰 수)
pub async fn get_price_summary(state: &AppState, item_id: i64) -> AuctionResult<PriceSummary> {
    info!("{:<12} --> 현재가 요약 조회 id: {}", "Query", item_id);
    let (item, bids) = state.store.item_with_bids(item_id).await?;
    Ok(price::summarize(&item, &bids))
}

/// 상품 입찰 이력 조회 (시간 순)
pub async fn get_item_bids(state: &AppState, item_id: i64) -> AuctionResult<Vec<Bid>> {
    info!("{:<12} --> 상품 입찰 조회 id: {}", "Query", item_id);
    let (_, bids) = state.store.item_with_bids(item_id).await?;
    Ok(bids)
}

/// 감정 요청 조회
pub async fn get_authentication_request(
    state: &AppState,
    request_id: i64,
) -> AuctionResult<AuthenticationRequest> {
    info!("{:<12} --> 감정 요청 조회 id: {}", "Query", request_id);
    state.store.get_authentication_request(request_id).await
}

/// 상품 감정 요청 이력 조회
pub async fn get_item_authentication_requests(
    state: &AppState,
    item_id: i64,
) -> AuctionResult<Vec<AuthenticationRequest>> {
    info!("{:<12} --> 상품 감정 이력 조회 id: {}", "Query", item_id);
    state.store.list_authentication_requests(item_id).await
}

// endregion: --- Query Handlers
