// region:    --- Imports
use crate::auction::commands::{
    close_if_due, handle_create_item, handle_publish_item, handle_remove_item, OwnerCommand,
};
use crate::authentication::commands::{
    handle_assign, handle_decide, handle_submit, AssignExpertCommand, SubmitAuthenticationCommand,
};
use crate::authentication::model::Decision;
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::bidding::model::NewItem;
use crate::error::AuctionError;
use crate::query;
use crate::state::AppState;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- Router

/// 라우터 설정
pub fn routes(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/bid", post(handle_bid))
        .route("/items", get(handle_get_items).post(handle_create))
        .route("/items/:id", get(handle_get_item).delete(handle_remove))
        .route("/items/:id/publish", post(handle_publish))
        .route("/items/:id/close", post(handle_close))
        .route("/items/:id/price", get(handle_get_price))
        .route("/items/:id/bids", get(handle_get_item_bids))
        .route(
            "/items/:id/authentication-requests",
            get(handle_get_item_authentication_requests),
        )
        .route("/authentication-requests", post(handle_submit_authentication))
        .route(
            "/authentication-requests/:id",
            get(handle_get_authentication_request),
        )
        .route("/authentication-requests/:id/assign", post(handle_assign_expert))
        .route("/authentication-requests/:id/decision", post(handle_decision))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// endregion: --- Router

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse, AuctionError> {
    let placed = handle_place_bid(&state, cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "입찰이 성공적으로 처리되었습니다.",
            "current_price": placed.bid.amount,
            "bid": placed.bid,
        })),
    ))
}

/// 상품 등록
pub async fn handle_create(
    State(state): State<AppState>,
    Json(new_item): Json<NewItem>,
) -> Result<impl IntoResponse, AuctionError> {
    let item = handle_create_item(&state, new_item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// 상품 게시
pub async fn handle_publish(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(cmd): Json<OwnerCommand>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(handle_publish_item(&state, item_id, cmd).await?))
}

/// 상품 삭제
pub async fn handle_remove(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Query(cmd): Query<OwnerCommand>,
) -> Result<impl IntoResponse, AuctionError> {
    handle_remove_item(&state, item_id, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 경매 종료 평가 요청
pub async fn handle_close(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 종료 평가 요청 id: {}", "Handler", item_id);
    Ok(Json(close_if_due(&state, item_id).await?))
}

/// 감정 요청
pub async fn handle_submit_authentication(
    State(state): State<AppState>,
    Json(cmd): Json<SubmitAuthenticationCommand>,
) -> Result<impl IntoResponse, AuctionError> {
    let request = handle_submit(&state, cmd).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// 감정사 배정
pub async fn handle_assign_expert(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(cmd): Json<AssignExpertCommand>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(handle_assign(&state, request_id, cmd).await?))
}

/// 감정 결정
pub async fn handle_decision(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(decision): Json<Decision>,
) -> Result<impl IntoResponse, AuctionError> {
    let outcome = handle_decide(&state, request_id, decision).await?;
    Ok(Json(outcome.request))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 모든 상품 조회
pub async fn handle_get_items(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(query::handlers::get_all_items(&state).await?))
}

/// 상품 조회
pub async fn handle_get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(query::handlers::get_item(&state, item_id).await?))
}

/// 현재가 조회
pub async fn handle_get_price(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(query::handlers::get_price_summary(&state, item_id).await?))
}

/// 상품 입찰 이력 조회
pub async fn handle_get_item_bids(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(query::handlers::get_item_bids(&state, item_id).await?))
}

/// 감정 요청 조회
pub async fn handle_get_authentication_request(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(
        query::handlers::get_authentication_request(&state, request_id).await?,
    ))
}

/// 상품 감정 이력 조회
pub async fn handle_get_item_authentication_requests(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    Ok(Json(
        query::handlers::get_item_authentication_requests(&state, item_id).await?,
    ))
}

// endregion: --- Query Handlers
