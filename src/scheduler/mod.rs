/// 경매 상태 스윕 스케줄러
/// 상태 전이는 조회 시점에도 평가되므로, 스케줄러는 아무도 조회하지 않는
/// 상품의 종료와 마감 임박 알림을 담당한다.
// region:    --- Imports
use crate::auction::commands;
use crate::state::AppState;
use std::collections::BTreeSet;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Auction Scheduler
pub struct AuctionScheduler {
    state: AppState,
}

impl AuctionScheduler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 스케줄러 시작
    pub fn start(self) -> JoinHandle<()> {
        let period = Duration::from_secs(self.state.config.sweep_interval_secs.max(1));
        info!("{:<12} --> 스윕 주기 {:?}", "Scheduler", period);

        tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut warned = BTreeSet::new();
            loop {
                interval.tick().await;
                match commands::sweep(&self.state, &mut warned).await {
                    Ok(report) => {
                        if !report.closed.is_empty() {
                            info!("{:<12} --> 경매 종료 처리: {:?}", "Scheduler", report.closed);
                        }
                        if !report.failed.is_empty() {
                            warn!("{:<12} --> 다음 스윕에서 재시도: {:?}", "Scheduler", report.failed);
                        }
                        debug!("{:<12} --> 스윕 완료 (경고 대상 {}건)", "Scheduler", warned.len());
                    }
                    Err(e) => error!(
                        "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                        "Scheduler", e
                    ),
                }
            }
        })
    }
}
// endregion: --- Auction Scheduler
