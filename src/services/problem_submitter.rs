//! 题目提交 - 业务能力层
//!
//! 创建题目和标记提案是两个独立调用，必须先创建成功再标记

use std::sync::Arc;

use tracing::debug;

use crate::clients::ProblemApi;
use crate::error::UpstreamError;
use crate::models::{MoveLog, NewProblem, Problem, Proposal};

/// 题目提交服务
pub struct ProblemSubmitter {
    api: Arc<dyn ProblemApi>,
}

impl ProblemSubmitter {
    pub fn new(api: Arc<dyn ProblemApi>) -> Self {
        Self { api }
    }

    /// 用提案信息和对局日志创建题目
    pub async fn submit(
        &self,
        proposal: &Proposal,
        move_log: &MoveLog,
    ) -> Result<Problem, UpstreamError> {
        let body = NewProblem::from_proposal(proposal, move_log);
        let problem = self.api.create_problem(&body).await?;
        debug!("提案 #{} 已创建题目 #{}", proposal.id, problem.id);
        Ok(problem)
    }

    /// 标记提案已使用
    pub async fn mark_used(&self, proposal_id: i32) -> Result<Proposal, UpstreamError> {
        self.api.use_proposal(proposal_id).await
    }
}
