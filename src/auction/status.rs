/// 경매 상태 머신
/// NotListed -> Active -> EndedSold | EndedUnsold
/// `tick`은 순수 함수이며 여러 번 호출해도 같은 결과를 낸다.
// region:    --- Imports
use crate::bidding::model::{Bid, Item};
use crate::bidding::price;
use crate::error::AuctionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// endregion: --- Imports

// region:    --- Auction Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    NotListed,
    Active,
    EndedSold,
    EndedUnsold,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::NotListed => "NOT_LISTED",
            AuctionStatus::Active => "ACTIVE",
            AuctionStatus::EndedSold => "ENDED_SOLD",
            AuctionStatus::EndedUnsold => "ENDED_UNSOLD",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::EndedSold | AuctionStatus::EndedUnsold)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionStatus {
    type Err = AuctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_LISTED" => Ok(AuctionStatus::NotListed),
            "ACTIVE" => Ok(AuctionStatus::Active),
            "ENDED_SOLD" => Ok(AuctionStatus::EndedSold),
            "ENDED_UNSOLD" => Ok(AuctionStatus::EndedUnsold),
            other => Err(AuctionError::Corrupt(format!("경매 상태 {other}"))),
        }
    }
}
// endregion: --- Auction Status

// region:    --- Transitions
/// 종료 전이 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closing {
    /// 낙찰. 최고 입찰자와 확정가
    Sold { winner_id: i64, final_price: i64 },
    Unsold,
}

/// 상품 게시: NotListed -> Active
pub fn publish(item: &Item, publisher_id: i64, now: DateTime<Utc>) -> Result<Item, AuctionError> {
    if publisher_id != item.owner_id {
        return Err(AuctionError::NotOwner);
    }
    if item.auction_status != AuctionStatus::NotListed {
        return Err(AuctionError::InvalidTransition(format!(
            "{} 상태의 상품은 게시할 수 없습니다.",
            item.auction_status
        )));
    }
    if item.end_time <= now {
        return Err(AuctionError::InvalidEndTime);
    }

    let mut published = item.clone();
    published.auction_status = AuctionStatus::Active;
    Ok(published)
}

/// 종료 시간 경과 여부에 따른 상태 평가.
/// 전이가 일어난 경우에만 새 상태와 종료 결과를 돌려준다.
pub fn tick(item: &Item, bids: &[Bid], now: DateTime<Utc>) -> Option<(Item, Closing)> {
    if item.auction_status != AuctionStatus::Active || now < item.end_time {
        return None;
    }

    let mut closed = item.clone();
    let closing = match price::highest_bid(bids) {
        Some(winner) => {
            let final_price = price::current_price(item, bids);
            closed.auction_status = AuctionStatus::EndedSold;
            closed.final_price = Some(final_price);
            Closing::Sold {
                winner_id: winner.bidder_id,
                final_price,
            }
        }
        None => {
            closed.auction_status = AuctionStatus::EndedUnsold;
            closed.final_price = None;
            Closing::Unsold
        }
    };
    Some((closed, closing))
}

/// 마감 임박 여부
pub fn is_ending_soon(item: &Item, now: DateTime<Utc>, window: chrono::Duration) -> bool {
    item.auction_status == AuctionStatus::Active
        && now < item.end_time
        && item.end_time - now <= window
}
// endregion: --- Transitions

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::price::tests::{bid, sample_item};
    use chrono::Duration;

    fn active_item(minimum_price: i64) -> Item {
        let mut item = sample_item(minimum_price);
        item.auction_status = AuctionStatus::Active;
        item
    }

    #[test]
    fn publish_activates_listing_with_future_end() {
        let item = sample_item(50);
        let published = publish(&item, item.owner_id, Utc::now()).unwrap();
        assert_eq!(published.auction_status, AuctionStatus::Active);
    }

    #[test]
    fn publish_rejects_past_end_non_owner_and_repeat() {
        let item = sample_item(50);
        assert!(matches!(
            publish(&item, item.owner_id, item.end_time),
            Err(AuctionError::InvalidEndTime)
        ));
        assert!(matches!(
            publish(&item, item.owner_id + 1, Utc::now()),
            Err(AuctionError::NotOwner)
        ));
        let active = active_item(50);
        assert!(matches!(
            publish(&active, active.owner_id, Utc::now()),
            Err(AuctionError::InvalidTransition(_))
        ));
    }

    #[test]
    fn unbid_item_ends_unsold_without_final_price() {
        let item = active_item(50);
        let after_end = item.end_time + Duration::seconds(1);

        let (closed, closing) = tick(&item, &[], after_end).unwrap();
        assert_eq!(closed.auction_status, AuctionStatus::EndedUnsold);
        assert_eq!(closed.final_price, None);
        assert_eq!(closing, Closing::Unsold);
    }

    #[test]
    fn bid_item_ends_sold_at_highest_bid() {
        let item = active_item(50);
        let bids = vec![bid(1, 2, 55), bid(2, 3, 60)];

        let (closed, closing) = tick(&item, &bids, item.end_time).unwrap();
        assert_eq!(closed.auction_status, AuctionStatus::EndedSold);
        assert_eq!(closed.final_price, Some(60));
        assert_eq!(
            closing,
            Closing::Sold {
                winner_id: 3,
                final_price: 60
            }
        );
    }

    #[test]
    fn tick_is_idempotent_past_end() {
        let item = active_item(50);
        let bids = vec![bid(1, 2, 55)];
        let later = item.end_time + Duration::hours(1);

        let (closed, _) = tick(&item, &bids, later).unwrap();
        assert_eq!(tick(&closed, &bids, later), None);
        assert_eq!(tick(&closed, &bids, later + Duration::days(1)), None);
        assert_eq!(closed.final_price, Some(55));
    }

    #[test]
    fn tick_before_end_or_unlisted_does_nothing() {
        let item = active_item(50);
        assert_eq!(tick(&item, &[], item.end_time - Duration::seconds(1)), None);

        let unlisted = sample_item(50);
        assert_eq!(tick(&unlisted, &[], unlisted.end_time + Duration::hours(1)), None);
    }

    #[test]
    fn ending_soon_window() {
        let item = active_item(50);
        let window = Duration::minutes(10);
        assert!(is_ending_soon(&item, item.end_time - Duration::minutes(5), window));
        assert!(!is_ending_soon(&item, item.end_time - Duration::minutes(30), window));
        assert!(!is_ending_soon(&item, item.end_time, window));
    }

    #[test]
    fn status_round_trips_through_column_text() {
        for status in [
            AuctionStatus::NotListed,
            AuctionStatus::Active,
            AuctionStatus::EndedSold,
            AuctionStatus::EndedUnsold,
        ] {
            assert_eq!(status.as_str().parse::<AuctionStatus>().unwrap(), status);
        }
    }
}
