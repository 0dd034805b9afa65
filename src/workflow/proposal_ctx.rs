//! 提案处理上下文
//!
//! 封装"我正在处理第几个提案、哪一局"这一信息

use std::fmt::Display;

use crate::models::Proposal;

/// 提案处理上下文
#[derive(Debug, Clone)]
pub struct ProposalCtx {
    /// 本次运行中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 本次运行的提案总数
    pub total: usize,

    pub proposal_id: i32,

    pub table_id: String,
}

impl ProposalCtx {
    pub fn new(index: usize, total: usize, proposal: &Proposal) -> Self {
        Self {
            index,
            total,
            proposal_id: proposal.id,
            table_id: proposal.table_id.clone(),
        }
    }
}

impl Display for ProposalCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[提案 #{} 对局 {}]", self.proposal_id, self.table_id)
    }
}
