use crate::bidding::model::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Outbid,
    Won,
    EndingSoon,
    Ended,
}

/// 알림 이벤트 페이로드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuctionEvent {
    // 상위 입찰 발생
    Outbid {
        new_amount: Money,
        new_bidder_id: i64,
    },
    // 낙찰
    Won {
        final_price: Money,
    },
    // 마감 임박
    EndingSoon {
        end_time: DateTime<Utc>,
    },
    // 경매 종료 (판매자 대상)
    Ended {
        sold: bool,
        final_price: Option<Money>,
    },
}

/// 알림 협력자로 전달되는 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub user_id: i64,
    pub item_id: i64,
    pub payload: AuctionEvent,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: i64,
        item_id: i64,
        payload: AuctionEvent,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let kind = match payload {
            AuctionEvent::Outbid { .. } => NotificationKind::Outbid,
            AuctionEvent::Won { .. } => NotificationKind::Won,
            AuctionEvent::EndingSoon { .. } => NotificationKind::EndingSoon,
            AuctionEvent::Ended { .. } => NotificationKind::Ended,
        };
        Self {
            kind,
            user_id,
            item_id,
            payload,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_payload() {
        let n = Notification::new(
            3,
            1,
            AuctionEvent::Outbid {
                new_amount: 60,
                new_bidder_id: 4,
            },
            Utc::now(),
        );
        assert_eq!(n.kind, NotificationKind::Outbid);

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["kind"], "outbid");
        assert_eq!(json["payload"]["event"], "outbid");
        assert_eq!(json["payload"]["new_amount"], 60);
    }
}
