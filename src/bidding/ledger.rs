/// 입찰 원장 규칙
/// 저장소는 상품 단위 임계 구역 안에서 `validate_bid` 후 입찰을 추가한다.
// region:    --- Imports
use super::model::{Bid, Item, Money};
use super::price;
use crate::auction::status::AuctionStatus;
use crate::error::AuctionError;
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Validation
/// 입찰 검증. 통과하면 직전 최고 입찰자를 돌려준다.
pub fn validate_bid(
    item: &Item,
    bids: &[Bid],
    bidder_id: i64,
    amount: Money,
    now: DateTime<Utc>,
) -> Result<Option<i64>, AuctionError> {
    if item.auction_status != AuctionStatus::Active || now >= item.end_time {
        return Err(AuctionError::AuctionClosed);
    }

    if bidder_id == item.owner_id {
        return Err(AuctionError::SelfBid);
    }

    let current_price = price::current_price(item, bids);
    if amount <= current_price || amount <= 0 {
        return Err(AuctionError::InvalidAmount { current_price });
    }

    Ok(price::highest_bid(bids).map(|bid| bid.bidder_id))
}
// endregion: --- Validation
