use crate::clock::Clock;
use crate::config::Config;
use crate::notification::Notifier;
use crate::store::AuctionStore;
use std::sync::Arc;

/// 핸들러와 스케줄러가 공유하는 협력자 묶음
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuctionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config: Arc::new(config),
        }
    }
}
