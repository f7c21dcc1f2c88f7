/// 입찰 관련 커맨드 처리
// region:    --- Imports
use super::model::{Money, PlacedBid};
use crate::auction::events::{AuctionEvent, Notification};
use crate::error::AuctionResult;
use crate::notification;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub item_id: i64,
    pub bidder_id: i64,
    pub amount: Money,
}

/// 입찰
/// 검증과 추가는 저장소의 상품 단위 임계 구역 안에서 수행되고,
/// 이전 최고 입찰자에게는 커밋 후 outbid 알림을 보낸다.
pub async fn handle_place_bid(state: &AppState, cmd: PlaceBidCommand) -> AuctionResult<PlacedBid> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let now = state.clock.now();

    let placed = match state
        .store
        .place_bid(cmd.item_id, cmd.bidder_id, cmd.amount, now)
        .await
    {
        Ok(placed) => placed,
        Err(e) => {
            warn!("{:<12} --> 입찰 거절: {}", "Command", e);
            return Err(e);
        }
    };

    if let Some(previous) = placed.previous_leader.filter(|&id| id != cmd.bidder_id) {
        notification::dispatch(
            state.notifier.as_ref(),
            Notification::new(
                previous,
                cmd.item_id,
                AuctionEvent::Outbid {
                    new_amount: placed.bid.amount,
                    new_bidder_id: placed.bid.bidder_id,
                },
                now,
            ),
        )
        .await;
    }

    info!(
        "{:<12} --> 입찰 성공: item={}, amount={}",
        "Command", placed.bid.item_id, placed.bid.amount
    );
    Ok(placed)
}
// endregion: --- Commands
