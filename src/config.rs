/// 환경 변수 기반 설정
// region:    --- Imports
use crate::authentication::model::SecondOpinionPolicy;
use std::{env, fmt::Display, str::FromStr};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Config
/// 마감 임박 알림 창의 상한 (7일)
pub const MAX_ENDING_SOON_MINUTES: i64 = 7 * 24 * 60;

/// 저장소 구현 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("알 수 없는 저장소: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub reset_database: bool,
    pub kafka_brokers: Option<String>,
    pub notification_topic: String,
    pub sweep_interval_secs: u64,
    pub ending_soon_minutes: i64,
    pub second_opinion_policy: SecondOpinionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            store_backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 5,
            reset_database: false,
            kafka_brokers: None,
            notification_topic: "notifications".to_string(),
            sweep_interval_secs: 1,
            ending_soon_minutes: 10,
            second_opinion_policy: SecondOpinionPolicy::default(),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn load() -> Result<Self, String> {
        let config = Self {
            port: try_load("PORT", "3000")?,
            store_backend: try_load("STORE_BACKEND", "postgres")?,
            database_url: var("DATABASE_URL"),
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "5")?,
            reset_database: try_load("RESET_DATABASE", "false")?,
            kafka_brokers: var("KAFKA_BROKERS"),
            notification_topic: try_load("NOTIFICATION_TOPIC", "notifications")?,
            sweep_interval_secs: try_load("SWEEP_INTERVAL_SECS", "1")?,
            ending_soon_minutes: try_load("ENDING_SOON_MINUTES", "10")?,
            second_opinion_policy: try_load("SECOND_OPINION_POLICY", "second-decision-wins")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(0..=MAX_ENDING_SOON_MINUTES).contains(&self.ending_soon_minutes) {
            return Err(format!(
                "잘못된 ENDING_SOON_MINUTES 값: {} (0..={MAX_ENDING_SOON_MINUTES})",
                self.ending_soon_minutes
            ));
        }
        Ok(())
    }

    /// 마감 임박 판단 창
    pub fn ending_soon_window(&self) -> chrono::Duration {
        let minutes = self.ending_soon_minutes.clamp(0, MAX_ENDING_SOON_MINUTES);
        chrono::Duration::minutes(minutes)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .map_err(|_| {
            warn!("{:<12} --> 환경 변수 {key} 없음", "Config");
        })
        .ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{:<12} --> {key} 기본값 사용: {default}", "Config");
            default.to_string()
        })
        .parse()
        .map_err(|e| format!("잘못된 {key} 값: {e}"))
}
// endregion: --- Config
