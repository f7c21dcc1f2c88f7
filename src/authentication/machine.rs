/// 감정 상태 머신
/// NotRequested -> Pending -> Approved | Rejected
// region:    --- Imports
use super::model::{
    AuthenticationRequest, AuthenticationStatus, Decision, SecondOpinionPolicy, Verdict,
};
use crate::error::AuctionError;
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Transitions
/// 신규 감정 요청 가능 여부. 같은 상품에 진행 중인 요청이 없어야 한다.
pub fn ensure_can_submit(existing: &[AuthenticationRequest]) -> Result<(), AuctionError> {
    if existing.iter().any(AuthenticationRequest::is_pending) {
        return Err(AuctionError::RequestPending);
    }
    Ok(())
}

/// 감정사 배정
/// 1차 판정 전에는 담당 감정사를,
/// 2차 감정 대기 중에는 2차 감정사를 배정한다.
pub fn assign(
    request: &AuthenticationRequest,
    expert_id: i64,
) -> Result<AuthenticationRequest, AuctionError> {
    if !request.is_pending() {
        return Err(AuctionError::AlreadyDecided);
    }

    let mut assigned = request.clone();
    if request.awaiting_second_opinion() {
        if request.assigned_expert_id == Some(expert_id) {
            return Err(AuctionError::InvalidAssignment(
                "2차 감정사는 1차 감정사와 달라야 합니다.".into(),
            ));
        }
        if request.second_expert_id.is_some() {
            return Err(AuctionError::InvalidAssignment(
                "2차 감정사가 이미 배정되었습니다.".into(),
            ));
        }
        assigned.second_expert_id = Some(expert_id);
    } else {
        assigned.assigned_expert_id = Some(expert_id);
    }
    Ok(assigned)
}

/// 결정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub request: AuthenticationRequest,
    /// 요청이 Pending을 벗어난 경우 상품에 반영할 감정 상태
    pub item_status: Option<AuthenticationStatus>,
}

/// 감정사 결정 기록
pub fn decide(
    request: &AuthenticationRequest,
    decision: &Decision,
    now: DateTime<Utc>,
    policy: SecondOpinionPolicy,
) -> Result<DecisionOutcome, AuctionError> {
    let expert = Some(decision.expert_id);
    let is_first = request.assigned_expert_id.is_some() && request.assigned_expert_id == expert;
    let is_second = request.second_expert_id.is_some() && request.second_expert_id == expert;

    // 배정 여부를 먼저 확인해 무관한 감정사는 항상 NotAssigned를 받는다.
    if !is_first && !is_second {
        return Err(AuctionError::NotAssigned);
    }
    if !request.is_pending() {
        return Err(AuctionError::AlreadyDecided);
    }

    let mut updated = request.clone();
    match request.first_decision {
        None if is_first => {
            updated.comments = decision.comments.clone();
            if decision.second_opinion {
                updated.first_decision = Some(decision.verdict);
                updated.second_opinion_requested = true;
                return Ok(DecisionOutcome {
                    request: updated,
                    item_status: None,
                });
            }
            finalize(&mut updated, decision.verdict, now);
        }
        Some(first) if is_second => {
            updated.comments = join_comments(&request.comments, &decision.comments);
            let verdict = match policy {
                SecondOpinionPolicy::SecondDecisionWins => decision.verdict,
                SecondOpinionPolicy::FirstDecisionWins => first,
            };
            finalize(&mut updated, verdict, now);
        }
        // 1차 감정사가 이미 판정했거나,
        // 2차 감정사가 1차 판정 전에 결정하려는 경우
        Some(_) => return Err(AuctionError::AlreadyDecided),
        None => return Err(AuctionError::NotAssigned),
    }

    let item_status = Some(updated.status);
    Ok(DecisionOutcome {
        request: updated,
        item_status,
    })
}

fn finalize(request: &mut AuthenticationRequest, verdict: Verdict, now: DateTime<Utc>) {
    request.status = verdict.status();
    request.decided_at = Some(now);
}

fn join_comments(first: &Option<String>, second: &Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
        (Some(a), None) => Some(a.clone()),
        (None, b) => b.clone(),
    }
}
// endregion: --- Transitions
