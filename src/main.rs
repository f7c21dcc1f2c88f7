// region:    --- Imports
use auction_marketplace::clock::SystemClock;
use auction_marketplace::config::{Config, StoreBackend};
use auction_marketplace::database::DatabaseManager;
use auction_marketplace::handlers;
use auction_marketplace::message_broker::KafkaManager;
use auction_marketplace::notification::{KafkaNotifier, LogNotifier, Notifier};
use auction_marketplace::scheduler::AuctionScheduler;
use auction_marketplace::state::AppState;
use auction_marketplace::store::{AuctionStore, MemoryStore, PostgresStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::load()?;

    // 저장소 생성
    let store: Arc<dyn AuctionStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set")?;
            let db_manager =
                Arc::new(DatabaseManager::connect(database_url, config.max_connections).await?);

            // 데이터베이스 초기화
            if let Err(e) = db_manager.initialize_database(config.reset_database).await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            Arc::new(PostgresStore::new(db_manager))
        }
        StoreBackend::Memory => {
            warn!("{:<12} --> 메모리 저장소 사용 (재시작 시 데이터 유실)", "Main");
            Arc::new(MemoryStore::new())
        }
    };

    // 알림 협력자 생성
    let notifier: Arc<dyn Notifier> = match config.kafka_brokers.as_deref() {
        Some(brokers) => {
            let kafka_manager = KafkaManager::new(brokers)?;
            kafka_manager
                .create_topic(&config.notification_topic, 5, 1)
                .await?;
            info!("{:<12} --> Kafka 초기화 성공", "Main");
            Arc::new(KafkaNotifier::new(
                kafka_manager.get_producer(),
                config.notification_topic.clone(),
            ))
        }
        None => {
            warn!("{:<12} --> KAFKA_BROKERS 미설정, 알림은 로그로만 남김", "Main");
            Arc::new(LogNotifier)
        }
    };

    let port = config.port;
    let state = AppState::new(store, notifier, Arc::new(SystemClock), config);

    // 경매 종료 스윕
    AuctionScheduler::new(state.clone()).start();

    let routes_all = handlers::routes(state);

    // 리스너 생성
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
