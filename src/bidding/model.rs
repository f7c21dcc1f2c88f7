// region:    --- Imports
use crate::auction::status::AuctionStatus;
use crate::authentication::model::AuthenticationStatus;
use crate::error::AuctionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

/// 금액(최소 화폐 단위)
pub type Money = i64;

// region:    --- Models
/// 상품 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub minimum_price: Money,
    pub created_at: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub authentication_status: AuthenticationStatus,
    pub auction_status: AuctionStatus,
    pub final_price: Option<Money>,
    pub posting_fee: Option<Money>,
}

/// 신규 상품 등록 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub minimum_price: Money,
    pub end_time: DateTime<Utc>,
    pub posting_fee: Option<Money>,
}

impl NewItem {
    /// 등록 시점 검증. 종료 시간은 생성 시간 이후여야 한다.
    pub fn validate(&self, created_at: DateTime<Utc>) -> Result<(), AuctionError> {
        if self.end_time <= created_at {
            return Err(AuctionError::InvalidEndTime);
        }
        if self.minimum_price < 0 || self.posting_fee.is_some_and(|fee| fee < 0) {
            return Err(AuctionError::InvalidAmount { current_price: 0 });
        }
        Ok(())
    }

    pub fn into_item(self, id: i64, created_at: DateTime<Utc>) -> Item {
        Item {
            id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            minimum_price: self.minimum_price,
            created_at,
            end_time: self.end_time,
            authentication_status: AuthenticationStatus::NotRequested,
            auction_status: AuctionStatus::NotListed,
            final_price: None,
            posting_fee: self.posting_fee,
        }
    }
}

/// 입찰 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub item_id: i64,
    pub bidder_id: i64,
    pub amount: Money,
    pub placed_at: DateTime<Utc>,
}

/// 입찰 성공 결과. 직전 최고 입찰자를 함께 돌려준다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedBid {
    pub bid: Bid,
    pub previous_leader: Option<i64>,
}

/// 상품 테이블 행
#[derive(Debug, sqlx::FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub minimum_price: i64,
    pub created_at: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub authentication_status: String,
    pub auction_status: String,
    pub final_price: Option<i64>,
    pub posting_fee: Option<i64>,
}

impl TryFrom<ItemRow> for Item {
    type Error = AuctionError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            minimum_price: row.minimum_price,
            created_at: row.created_at,
            end_time: row.end_time,
            authentication_status: row.authentication_status.parse()?,
            auction_status: row.auction_status.parse()?,
            final_price: row.final_price,
            posting_fee: row.posting_fee,
        })
    }
}
// endregion: --- Models
