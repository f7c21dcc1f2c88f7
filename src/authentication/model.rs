// region:    --- Imports
use crate::error::AuctionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// endregion: --- Imports

// region:    --- Status
/// 상품의 감정 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationStatus {
    NotRequested,
    Pending,
    Approved,
    Rejected,
}

impl AuthenticationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationStatus::NotRequested => "NOT_REQUESTED",
            AuthenticationStatus::Pending => "PENDING",
            AuthenticationStatus::Approved => "APPROVED",
            AuthenticationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for AuthenticationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationStatus {
    type Err = AuctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_REQUESTED" => Ok(AuthenticationStatus::NotRequested),
            "PENDING" => Ok(AuthenticationStatus::Pending),
            "APPROVED" => Ok(AuthenticationStatus::Approved),
            "REJECTED" => Ok(AuthenticationStatus::Rejected),
            other => Err(AuctionError::Corrupt(format!("감정 상태 {other}"))),
        }
    }
}

/// 감정사 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn status(&self) -> AuthenticationStatus {
        match self {
            Verdict::Approved => AuthenticationStatus::Approved,
            Verdict::Rejected => AuthenticationStatus::Rejected,
        }
    }

    fn parse_column(s: &str) -> Result<Self, AuctionError> {
        match s {
            "APPROVED" => Ok(Verdict::Approved),
            "REJECTED" => Ok(Verdict::Rejected),
            other => Err(AuctionError::Corrupt(format!("판정 {other}"))),
        }
    }
}

/// 2차 감정 시 최종 판정 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecondOpinionPolicy {
    /// 2차 감정사의 판정이 최종 결과
    #[default]
    SecondDecisionWins,
    /// 1차 감정사의 판정이 최종 결과, 2차는 확인 절차
    FirstDecisionWins,
}

impl FromStr for SecondOpinionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "second-decision-wins" => Ok(SecondOpinionPolicy::SecondDecisionWins),
            "first-decision-wins" => Ok(SecondOpinionPolicy::FirstDecisionWins),
            other => Err(format!("알 수 없는 2차 감정 정책: {other}")),
        }
    }
}
// endregion: --- Status

// region:    --- Models
/// 감정 요청 모델
/// status가 Pending을 벗어나는 순간에만 decided_at이 설정된다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationRequest {
    pub id: i64,
    pub item_id: i64,
    pub requester_id: i64,
    pub assigned_expert_id: Option<i64>,
    pub second_expert_id: Option<i64>,
    pub status: AuthenticationStatus,
    pub first_decision: Option<Verdict>,
    pub second_opinion_requested: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl AuthenticationRequest {
    pub fn pending(id: i64, item_id: i64, requester_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            item_id,
            requester_id,
            assigned_expert_id: None,
            second_expert_id: None,
            status: AuthenticationStatus::Pending,
            first_decision: None,
            second_opinion_requested: false,
            comments: None,
            created_at,
            decided_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == AuthenticationStatus::Pending
    }

    /// 1차 판정이 기록되어 2차 감정을 기다리는 중인지
    pub fn awaiting_second_opinion(&self) -> bool {
        self.is_pending() && self.first_decision.is_some()
    }
}

/// 감정사 결정 입력
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub expert_id: i64,
    pub verdict: Verdict,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub second_opinion: bool,
}

/// 감정 요청 테이블 행
#[derive(Debug, sqlx::FromRow)]
pub struct AuthenticationRequestRow {
    pub id: i64,
    pub item_id: i64,
    pub requester_id: i64,
    pub assigned_expert_id: Option<i64>,
    pub second_expert_id: Option<i64>,
    pub status: String,
    pub first_decision: Option<String>,
    pub second_opinion_requested: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<AuthenticationRequestRow> for AuthenticationRequest {
    type Error = AuctionError;

    fn try_from(row: AuthenticationRequestRow) -> Result<Self, Self::Error> {
        Ok(AuthenticationRequest {
            id: row.id,
            item_id: row.item_id,
            requester_id: row.requester_id,
            assigned_expert_id: row.assigned_expert_id,
            second_expert_id: row.second_expert_id,
            status: row.status.parse()?,
            first_decision: row
                .first_decision
                .as_deref()
                .map(Verdict::parse_column)
                .transpose()?,
            second_opinion_requested: row.second_opinion_requested,
            comments: row.comments,
            created_at: row.created_at,
            decided_at: row.decided_at,
        })
    }
}
// endregion: --- Models
