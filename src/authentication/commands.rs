/// 감정 요청 커맨드 처리
/// 1. 감정 요청
/// 2. 감정사 배정
/// 3. 감정 결정
// region:    --- Imports
use super::machine::DecisionOutcome;
use super::model::{AuthenticationRequest, Decision};
use crate::error::AuctionResult;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 감정 요청 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitAuthenticationCommand {
    pub item_id: i64,
    pub requester_id: i64,
}

/// 감정사 배정 명령
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct AssignExpertCommand {
    pub expert_id: i64,
}

/// 1. 감정 요청
pub async fn handle_submit(
    state: &AppState,
    cmd: SubmitAuthenticationCommand,
) -> AuctionResult<AuthenticationRequest> {
    info!("{:<12} --> 감정 요청: {:?}", "Command", cmd);
    state
        .store
        .submit_authentication(cmd.item_id, cmd.requester_id, state.clock.now())
        .await
}

/// 2. 감정사 배정
pub async fn handle_assign(
    state: &AppState,
    request_id: i64,
    cmd: AssignExpertCommand,
) -> AuctionResult<AuthenticationRequest> {
    info!(
        "{:<12} --> 감정사 배정 request: {}, expert: {}",
        "Command", request_id, cmd.expert_id
    );
    state.store.assign_expert(request_id, cmd.expert_id).await
}

/// 3. 감정 결정
pub async fn handle_decide(
    state: &AppState,
    request_id: i64,
    decision: Decision,
) -> AuctionResult<DecisionOutcome> {
    info!(
        "{:<12} --> 감정 결정 request: {}, expert: {}, verdict: {:?}",
        "Command", request_id, decision.expert_id, decision.verdict
    );
    state
        .store
        .decide_authentication(
            request_id,
            decision,
            state.clock.now(),
            state.config.second_opinion_policy,
        )
        .await
}
// endregion: --- Commands
