/// 경매 엔진 오류 정의
/// 비즈니스 규칙 위반(4xx)과 인프라 장애(5xx)를 구분한다.
// region:    --- Imports
use crate::bidding::model::Money;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Error
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("입찰 금액이 현재 가격({current_price})보다 높아야 합니다.")]
    InvalidAmount { current_price: Money },

    #[error("경매가 종료되었거나 진행 중이 아닙니다.")]
    AuctionClosed,

    #[error("자신이 등록한 상품에는 입찰할 수 없습니다.")]
    SelfBid,

    #[error("이미 결정된 감정 요청입니다.")]
    AlreadyDecided,

    #[error("배정된 감정사만 결정할 수 있습니다.")]
    NotAssigned,

    #[error("{0}을(를) 찾을 수 없습니다.")]
    NotFound(String),

    #[error("상품 소유자만 수행할 수 있는 작업입니다.")]
    NotOwner,

    #[error("종료 시간이 유효하지 않습니다.")]
    InvalidEndTime,

    #[error("허용되지 않는 상태 전이입니다: {0}")]
    InvalidTransition(String),

    #[error("이미 진행 중인 감정 요청이 있습니다.")]
    RequestPending,

    #[error("잘못된 감정사 배정입니다: {0}")]
    InvalidAssignment(String),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("메시지 브로커 오류: {0}")]
    Broker(String),

    #[error("저장된 값을 해석할 수 없습니다: {0}")]
    Corrupt(String),
}

pub type AuctionResult<T> = Result<T, AuctionError>;

impl AuctionError {
    /// 응답 본문에 포함되는 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::InvalidAmount { .. } => "INVALID_AMOUNT",
            AuctionError::AuctionClosed => "AUCTION_CLOSED",
            AuctionError::SelfBid => "SELF_BID",
            AuctionError::AlreadyDecided => "ALREADY_DECIDED",
            AuctionError::NotAssigned => "NOT_ASSIGNED",
            AuctionError::NotFound(_) => "NOT_FOUND",
            AuctionError::NotOwner => "NOT_OWNER",
            AuctionError::InvalidEndTime => "INVALID_END_TIME",
            AuctionError::InvalidTransition(_) => "INVALID_TRANSITION",
            AuctionError::RequestPending => "REQUEST_PENDING",
            AuctionError::InvalidAssignment(_) => "INVALID_ASSIGNMENT",
            AuctionError::Database(_) => "DATABASE_ERROR",
            AuctionError::Broker(_) => "BROKER_ERROR",
            AuctionError::Corrupt(_) => "CORRUPT_DATA",
        }
    }

    /// 인프라 장애 여부
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuctionError::Database(_) | AuctionError::Broker(_) | AuctionError::Corrupt(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuctionError::NotFound(_) => StatusCode::NOT_FOUND,
            AuctionError::NotOwner | AuctionError::NotAssigned => StatusCode::FORBIDDEN,
            AuctionError::AuctionClosed
            | AuctionError::AlreadyDecided
            | AuctionError::InvalidTransition(_)
            | AuctionError::RequestPending => StatusCode::CONFLICT,
            AuctionError::InvalidAmount { .. }
            | AuctionError::SelfBid
            | AuctionError::InvalidEndTime
            | AuctionError::InvalidAssignment(_) => StatusCode::BAD_REQUEST,
            AuctionError::Database(_) | AuctionError::Broker(_) | AuctionError::Corrupt(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        if self.is_infrastructure() {
            error!("{:<12} --> 인프라 오류: {:?}", "Error", self);
        }

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let AuctionError::InvalidAmount { current_price } = &self {
            body["current_price"] = serde_json::json!(current_price);
        }

        (self.status_code(), Json(body)).into_response()
    }
}
// endregion: --- Error
