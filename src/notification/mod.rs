/// 알림 협력자
/// 엔진은 이벤트만 발행하고 전달/순서 보장은 협력자가 담당한다.
// region:    --- Imports
use crate::auction::events::Notification;
use crate::error::{AuctionError, AuctionResult};
use crate::message_broker::KafkaProducer;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Notifier Trait
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> AuctionResult<()>;
}

/// 알림 전송. 실패해도 이미 커밋된 입찰/전이는 되돌리지 않는다.
pub async fn dispatch(notifier: &dyn Notifier, notification: Notification) {
    let kind = notification.kind;
    let user_id = notification.user_id;
    if let Err(e) = notifier.notify(notification).await {
        warn!(
            "{:<12} --> 알림 전송 실패: kind={:?}, user={}, error={}",
            "Notify", kind, user_id, e
        );
    }
}
// endregion: --- Notifier Trait

// region:    --- Kafka Notifier
pub struct KafkaNotifier {
    producer: Arc<KafkaProducer>,
    topic: String,
}

impl KafkaNotifier {
    pub fn new(producer: Arc<KafkaProducer>, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl Notifier for KafkaNotifier {
    async fn notify(&self, notification: Notification) -> AuctionResult<()> {
        let payload = serde_json::to_string(&notification)
            .map_err(|e| AuctionError::Broker(e.to_string()))?;
        // 사용자 id를 키로 사용해 사용자별 순서를 유지한다.
        self.producer
            .send_message(&self.topic, &notification.user_id.to_string(), &payload)
            .await
            .map_err(AuctionError::Broker)
    }
}
// endregion: --- Kafka Notifier

// region:    --- Local Notifiers
/// 브로커 없이 로그만 남기는 알림
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> AuctionResult<()> {
        info!(
            "{:<12} --> {:?} user={} item={}",
            "Notify", notification.kind, notification.user_id, notification.item_id
        );
        Ok(())
    }
}

/// 전송된 알림을 기록하는 알림 (테스트용)
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: Notification) -> AuctionResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}
// endregion: --- Local Notifiers
