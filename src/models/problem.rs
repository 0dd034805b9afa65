//! 题目

use serde::{Deserialize, Serialize};

use super::move_log::MoveLog;
use super::proposal::Proposal;

/// 创建题目的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProblem {
    pub creator_id: Option<i32>,
    pub remaining_tile_count: i32,
    /// 原始对局日志文本
    pub moves: String,
    pub note: String,
}

impl NewProblem {
    pub fn from_proposal(proposal: &Proposal, move_log: &MoveLog) -> Self {
        Self {
            creator_id: proposal.creator_id,
            remaining_tile_count: proposal.remaining_tile_count,
            moves: move_log.as_str().to_string(),
            note: proposal.note.clone(),
        }
    }
}

/// API 创建的题目，创建后归 API 所有
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Problem {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creator_id: Option<i32>,
    #[serde(default)]
    pub note: Option<String>,
}
