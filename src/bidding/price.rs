/// 현재가 계산
/// 현재가는 저장하지 않고 입찰 원장에서 매번 다시 계산한다.
// region:    --- Imports
use super::model::{Bid, Item, Money};
use serde::Serialize;

// endregion: --- Imports

// region:    --- Resolver
/// 최고 입찰. 입찰은 항상 현재가보다 커야 하므로 최대값은 유일하다.
pub fn highest_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().max_by_key(|bid| bid.amount)
}

/// 현재가: 최고 입찰가, 입찰이 없으면 최저가
pub fn current_price(item: &Item, bids: &[Bid]) -> Money {
    highest_bid(bids).map_or(item.minimum_price, |bid| bid.amount)
}

/// 현재가 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    pub item_id: i64,
    pub current_price: Money,
    pub highest_bidder: Option<i64>,
    pub bid_count: usize,
}

pub fn summarize(item: &Item, bids: &[Bid]) -> PriceSummary {
    PriceSummary {
        item_id: item.id,
        current_price: current_price(item, bids),
        highest_bidder: highest_bid(bids).map(|bid| bid.bidder_id),
        bid_count: bids.len(),
    }
}
// endregion: --- Resolver
