/// 경매 수명주기 커맨드
/// 1. 상품 등록 / 게시 / 삭제
/// 2. 종료 평가 (조회, 스케줄러, 명시적 요청 어디서든 호출 가능)
// region:    --- Imports
use super::events::{AuctionEvent, Notification};
use super::status::{self, AuctionStatus, Closing};
use crate::bidding::model::{Item, NewItem};
use crate::error::AuctionResult;
use crate::notification;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 게시/삭제 요청자
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct OwnerCommand {
    pub owner_id: i64,
}

/// 상품 등록 (NotListed)
pub async fn handle_create_item(state: &AppState, new_item: NewItem) -> AuctionResult<Item> {
    info!("{:<12} --> 상품 등록: {:?}", "Command", new_item.title);
    state.store.insert_item(new_item, state.clock.now()).await
}

/// 상품 게시: NotListed -> Active
pub async fn handle_publish_item(
    state: &AppState,
    item_id: i64,
    cmd: OwnerCommand,
) -> AuctionResult<Item> {
    info!("{:<12} --> 상품 게시 id: {}", "Command", item_id);
    state
        .store
        .publish_item(item_id, cmd.owner_id, state.clock.now())
        .await
}

/// 소유자에 의한 상품 삭제
pub async fn handle_remove_item(
    state: &AppState,
    item_id: i64,
    cmd: OwnerCommand,
) -> AuctionResult<()> {
    info!("{:<12} --> 상품 삭제 id: {}", "Command", item_id);
    state.store.remove_item(item_id, cmd.owner_id).await
}

/// 종료 평가. 전이가 일어난 경우에만 won/ended 알림을 보낸다.
pub async fn close_if_due(state: &AppState, item_id: i64) -> AuctionResult<Item> {
    close_at(state, item_id, state.clock.now()).await
}

async fn close_at(state: &AppState, item_id: i64, now: DateTime<Utc>) -> AuctionResult<Item> {
    let (item, closing) = state.store.close_if_due(item_id, now).await?;
    let Some(closing) = closing else {
        return Ok(item);
    };

    info!(
        "{:<12} --> 경매 종료 id: {}, 상태: {}",
        "Command", item.id, item.auction_status
    );
    match closing {
        Closing::Sold {
            winner_id,
            final_price,
        } => {
            notification::dispatch(
                state.notifier.as_ref(),
                Notification::new(winner_id, item.id, AuctionEvent::Won { final_price }, now),
            )
            .await;
            notification::dispatch(
                state.notifier.as_ref(),
                Notification::new(
                    item.owner_id,
                    item.id,
                    AuctionEvent::Ended {
                        sold: true,
                        final_price: Some(final_price),
                    },
                    now,
                ),
            )
            .await;
        }
        Closing::Unsold => {
            notification::dispatch(
                state.notifier.as_ref(),
                Notification::new(
                    item.owner_id,
                    item.id,
                    AuctionEvent::Ended {
                        sold: false,
                        final_price: None,
                    },
                    now,
                ),
            )
            .await;
        }
    }
    Ok(item)
}

/// 스윕 결과
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub closed: Vec<i64>,
    pub ending_soon: Vec<i64>,
    /// 평가에 실패한 상품. 다음 스윕에서 다시 평가된다.
    pub failed: Vec<i64>,
}

/// 진행 중인 모든 상품을 평가한다.
/// `already_warned`에 없는 마감 임박 상품의 입찰자에게
/// ending_soon 알림을 보낸다.
pub async fn sweep(
    state: &AppState,
    already_warned: &mut BTreeSet<i64>,
) -> AuctionResult<SweepReport> {
    // 한 번의 스윕은 같은 시각 기준으로 판단한다.
    let now = state.clock.now();
    let window = state.config.ending_soon_window();
    let mut report = SweepReport::default();

    let active = state.store.list_items_by_status(AuctionStatus::Active).await?;
    // 진행 중이 아닌 상품은 더 이상 경고 대상이 아니다.
    let active_ids: BTreeSet<i64> = active.iter().map(|item| item.id).collect();
    already_warned.retain(|id| active_ids.contains(id));

    for item in active {
        if now >= item.end_time {
            match close_at(state, item.id, now).await {
                Ok(closed) if closed.auction_status.is_terminal() => {
                    already_warned.remove(&item.id);
                    report.closed.push(item.id);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("{:<12} --> 경매 종료 실패 id: {}, {:?}", "Command", item.id, e);
                    report.failed.push(item.id);
                }
            }
        } else if status::is_ending_soon(&item, now, window) && already_warned.insert(item.id) {
            let bids = match state.store.item_with_bids(item.id).await {
                Ok((_, bids)) => bids,
                Err(e) => {
                    warn!("{:<12} --> 입찰 조회 실패 id: {}, {:?}", "Command", item.id, e);
                    already_warned.remove(&item.id);
                    report.failed.push(item.id);
                    continue;
                }
            };
            let bidders: BTreeSet<i64> = bids.iter().map(|bid| bid.bidder_id).collect();
            for bidder in bidders {
                notification::dispatch(
                    state.notifier.as_ref(),
                    Notification::new(
                        bidder,
                        item.id,
                        AuctionEvent::EndingSoon {
                            end_time: item.end_time,
                        },
                        now,
                    ),
                )
                .await;
            }
            report.ending_soon.push(item.id);
        }
    }

    debug!("{:<12} --> 스윕 완료: {:?}", "Command", report);
    Ok(report)
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::events::NotificationKind;
    use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
    use crate::clock::{Clock, ManualClock};
    use crate::config::Config;
    use crate::notification::MemoryNotifier;
    use crate::store::stale::StaleListStore;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn setup() -> (AppState, ManualClock, Arc<MemoryNotifier>) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        let notifier = Arc::new(MemoryNotifier::new());
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            notifier.clone(),
            Arc::new(clock.clone()),
            Config::default(),
        );
        (state, clock, notifier)
    }

    async fn listed_item(state: &AppState, clock: &ManualClock, minimum_price: i64) -> Item {
        let item = handle_create_item(
            state,
            NewItem {
                owner_id: 1,
                title: "LP".into(),
                description: "초판".into(),
                minimum_price,
                end_time: clock.now() + Duration::hours(1),
                posting_fee: Some(3),
            },
        )
        .await
        .unwrap();
        handle_publish_item(state, item.id, OwnerCommand { owner_id: 1 })
            .await
            .unwrap()
    }

    async fn bid(state: &AppState, item_id: i64, bidder_id: i64, amount: i64) -> AuctionResult<()> {
        handle_place_bid(
            state,
            PlaceBidCommand {
                item_id,
                bidder_id,
                amount,
            },
        )
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn sold_auction_notifies_winner_and_owner() {
        let (state, clock, notifier) = setup();
        let item = listed_item(&state, &clock, 50).await;
        bid(&state, item.id, 2, 55).await.unwrap();
        bid(&state, item.id, 3, 60).await.unwrap();

        clock.advance(Duration::hours(2));
        let closed = close_if_due(&state, item.id).await.unwrap();
        assert_eq!(closed.auction_status, AuctionStatus::EndedSold);
        assert_eq!(closed.final_price, Some(60));

        let sent = notifier.sent();
        let kinds: Vec<_> = sent.iter().map(|n| (n.kind, n.user_id)).collect();
        assert_eq!(
            kinds,
            vec![
                (NotificationKind::Outbid, 2),
                (NotificationKind::Won, 3),
                (NotificationKind::Ended, 1),
            ]
        );

        // 두 번째 평가는 알림을 다시 보내지 않는다.
        let again = close_if_due(&state, item.id).await.unwrap();
        assert_eq!(again, closed);
        assert_eq!(notifier.sent().len(), 3);
    }

    #[tokio::test]
    async fn sweep_warns_once_then_closes() {
        let (state, clock, notifier) = setup();
        let unbid = listed_item(&state, &clock, 50).await;
        let bid_on = listed_item(&state, &clock, 50).await;
        bid(&state, bid_on.id, 2, 70).await.unwrap();

        let mut warned = BTreeSet::new();
        clock.advance(Duration::minutes(55));
        let report = sweep(&state, &mut warned).await.unwrap();
        assert_eq!(report.ending_soon.len(), 2);
        assert!(report.closed.is_empty());

        let report = sweep(&state, &mut warned).await.unwrap();
        assert!(report.ending_soon.is_empty());

        clock.advance(Duration::minutes(10));
        let report = sweep(&state, &mut warned).await.unwrap();
        assert_eq!(report.closed.len(), 2);
        assert!(warned.is_empty());

        assert_eq!(
            state.store.get_item(unbid.id).await.unwrap().auction_status,
            AuctionStatus::EndedUnsold
        );
        let ending_soon: Vec<_> = notifier
            .sent()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::EndingSoon)
            .collect();
        assert_eq!(ending_soon.len(), 1);
        assert_eq!(ending_soon[0].user_id, 2);
    }

    #[tokio::test]
    async fn sweep_skips_items_removed_after_listing() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        let store = Arc::new(StaleListStore::new());
        let state = AppState::new(
            store.clone(),
            Arc::new(MemoryNotifier::new()),
            Arc::new(clock.clone()),
            Config::default(),
        );
        let removed = listed_item(&state, &clock, 50).await;
        let kept = listed_item(&state, &clock, 50).await;

        store.freeze().await;
        handle_remove_item(&state, removed.id, OwnerCommand { owner_id: 1 })
            .await
            .unwrap();

        clock.advance(Duration::hours(2));
        let mut warned = BTreeSet::from([removed.id]);
        let report = sweep(&state, &mut warned).await.unwrap();
        assert_eq!(report.closed, vec![kept.id]);
        assert_eq!(report.failed, vec![removed.id]);
        assert_eq!(
            state.store.get_item(kept.id).await.unwrap().auction_status,
            AuctionStatus::EndedUnsold
        );
    }

    #[tokio::test]
    async fn warned_set_forgets_items_closed_elsewhere() {
        let (state, clock, _) = setup();
        let mut warned = BTreeSet::new();

        for round in 0..3 {
            let item = listed_item(&state, &clock, 50).await;
            clock.advance(Duration::minutes(55));
            let report = sweep(&state, &mut warned).await.unwrap();
            assert_eq!(report.ending_soon, vec![item.id], "round {round}");

            // 스윕이 아닌 조회로 종료된다.
            clock.advance(Duration::minutes(10));
            close_if_due(&state, item.id).await.unwrap();

            sweep(&state, &mut warned).await.unwrap();
            assert!(warned.is_empty(), "round {round}: {warned:?}");
        }

        // 삭제된 상품도 남지 않는다.
        let item = listed_item(&state, &clock, 50).await;
        clock.advance(Duration::minutes(55));
        sweep(&state, &mut warned).await.unwrap();
        assert_eq!(warned, BTreeSet::from([item.id]));
        handle_remove_item(&state, item.id, OwnerCommand { owner_id: 1 })
            .await
            .unwrap();
        sweep(&state, &mut warned).await.unwrap();
        assert!(warned.is_empty());
    }

    #[tokio::test]
    async fn closed_auction_rejects_bids() {
        let (state, clock, _) = setup();
        let item = listed_item(&state, &clock, 50).await;
        clock.advance(Duration::hours(2));
        close_if_due(&state, item.id).await.unwrap();

        let err = bid(&state, item.id, 2, 500).await.unwrap_err();
        assert!(matches!(err, crate::error::AuctionError::AuctionClosed));
    }
}
