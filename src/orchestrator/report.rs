//! 运行结果统计

use crate::models::Proposal;
use crate::workflow::{FlowError, Stage};

/// 单个提案的失败记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub proposal_id: i32,
    pub table_id: String,
    pub stage: Stage,
    pub message: String,
    /// 已创建但未能关联到提案的题目
    pub problem_id: Option<i32>,
}

/// 一次运行的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 本次取到的待处理提案数
    pub total: usize,
    /// 成功处理的提案（按处理顺序）
    pub processed: Vec<i32>,
    /// 处理失败的提案，题目未创建
    pub failed: Vec<FailureRecord>,
    /// 已被使用而跳过的提案
    pub skipped: Vec<i32>,
    /// 题目已创建但提案未能标记
    pub inconsistent: Vec<FailureRecord>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, proposal: &Proposal, err: &FlowError) {
        let record = FailureRecord {
            proposal_id: proposal.id,
            table_id: proposal.table_id.clone(),
            stage: err.stage,
            message: err.source.to_string(),
            problem_id: err.problem_id,
        };
        if err.is_inconsistent() {
            self.inconsistent.push(record);
        } else {
            self.failed.push(record);
        }
    }

    /// 没有成功创建并标记的提案数
    pub fn failed_count(&self) -> usize {
        self.failed.len() + self.inconsistent.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }
}
