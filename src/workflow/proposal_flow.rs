//! 提案处理流程 - 流程层
//!
//! 核心职责：定义"一个提案"的完整处理流程
//!
//! 流程顺序：
//! 1. 打开对局回放页面并选择视角
//! 2. 提取 g_gamelogs 对局日志
//! 3. 创建题目
//! 4. 标记提案已使用（仅在第 3 步成功后）
//!
//! 任何一步失败都写入 warn 文件，由编排层记录后继续下一个提案

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::clients::ProblemApi;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::SiteDriver;
use crate::models::Proposal;
use crate::services::{LogExtractor, ProblemSubmitter, Session, SessionManager, WarnWriter};
use crate::utils::truncate_text;
use crate::workflow::proposal_ctx::ProposalCtx;

/// 失败发生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Navigation,
    Extraction,
    Submit,
    MarkUsed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Navigation => "navigation",
            Stage::Extraction => "extraction",
            Stage::Submit => "submit",
            Stage::MarkUsed => "mark_used",
        };
        f.write_str(name)
    }
}

/// 提案处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 题目已创建且提案已标记
    Processed { problem_id: i32 },
    /// 提案已被使用，未重复提交
    Skipped,
}

/// 单个提案的处理失败
#[derive(Debug, Error)]
#[error("[{stage}] {source}")]
pub struct FlowError {
    pub stage: Stage,
    /// 标记阶段失败时，已经创建的题目
    pub problem_id: Option<i32>,
    #[source]
    pub source: AppError,
}

impl FlowError {
    fn new(stage: Stage, source: impl Into<AppError>) -> Self {
        Self {
            stage,
            problem_id: None,
            source: source.into(),
        }
    }

    fn with_problem(mut self, problem_id: i32) -> Self {
        self.problem_id = Some(problem_id);
        self
    }

    /// 题目已创建但提案仍是待处理状态
    pub fn is_inconsistent(&self) -> bool {
        self.stage == Stage::MarkUsed && self.problem_id.is_some()
    }
}

/// 提案处理流程
///
/// - 编排单个提案的处理步骤
/// - 不持有会话，会话由编排层传入并复用
/// - 只依赖业务能力（services）
pub struct ProposalFlow {
    sessions: SessionManager,
    extractor: LogExtractor,
    submitter: ProblemSubmitter,
    warn_writer: WarnWriter,
    verbose_logging: bool,
}

impl ProposalFlow {
    pub fn new(config: &Config, api: Arc<dyn ProblemApi>) -> Self {
        Self {
            sessions: SessionManager::new(config),
            extractor: LogExtractor::new(),
            submitter: ProblemSubmitter::new(api),
            warn_writer: WarnWriter::with_path(&config.warn_file),
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run<D: SiteDriver>(
        &self,
        session: &mut Session<D>,
        proposal: &Proposal,
        ctx: &ProposalCtx,
    ) -> Result<ProcessResult, FlowError> {
        if !proposal.is_pending() {
            warn!("{} ⚠️ 提案已被使用，跳过", ctx);
            return Ok(ProcessResult::Skipped);
        }

        info!(
            "{} ({}/{}) 剩余牌数: {}",
            ctx, ctx.index, ctx.total, proposal.remaining_tile_count
        );

        let result = self.process(session, proposal, ctx).await;
        if let Err(e) = &result {
            self.write_warn(ctx, e);
        }
        result
    }

    async fn process<D: SiteDriver>(
        &self,
        session: &mut Session<D>,
        proposal: &Proposal,
        ctx: &ProposalCtx,
    ) -> Result<ProcessResult, FlowError> {
        // ========== 1. 打开回放页面 ==========
        info!("{} 🌐 正在打开对局回放页面...", ctx);
        let page = self
            .sessions
            .navigate_to_table(session, &proposal.table_id)
            .await
            .map_err(|e| FlowError::new(Stage::Navigation, e))?;

        // ========== 2. 提取对局日志 ==========
        let move_log = self
            .extractor
            .extract(&page.content, &page.table_id)
            .map_err(|e| FlowError::new(Stage::Extraction, e))?;
        info!("{} ✓ 已提取对局日志 ({} 字节)", ctx, move_log.len());
        if self.verbose_logging {
            info!("{}   日志预览: {}", ctx, truncate_text(move_log.as_str(), 80));
        }

        // ========== 3. 创建题目 ==========
        info!("{} 📤 正在创建题目...", ctx);
        let problem = self
            .submitter
            .submit(proposal, &move_log)
            .await
            .map_err(|e| FlowError::new(Stage::Submit, e))?;
        info!("{} ✓ 题目 #{} 创建成功", ctx, problem.id);

        // ========== 4. 标记提案 ==========
        self.submitter
            .mark_used(proposal.id)
            .await
            .map_err(|e| FlowError::new(Stage::MarkUsed, e).with_problem(problem.id))?;
        info!("{} ✓ 提案已标记为已使用", ctx);

        Ok(ProcessResult::Processed {
            problem_id: problem.id,
        })
    }

    /// 写入警告日志，写入失败只记录不中断
    fn write_warn(&self, ctx: &ProposalCtx, err: &FlowError) {
        let reason = err.source.to_string();
        let written = match err.problem_id.filter(|_| err.is_inconsistent()) {
            Some(problem_id) => {
                self.warn_writer
                    .write_inconsistent(ctx.proposal_id, &ctx.table_id, problem_id, &reason)
            }
            None => self.warn_writer.write_failure(
                ctx.proposal_id,
                &ctx.table_id,
                &err.stage.to_string(),
                &reason,
            ),
        };

        match written {
            Ok(()) => warn!(
                "{} ⚠️ 已写入 {}: 阶段 {} (原因: {})",
                ctx,
                self.warn_writer.path(),
                err.stage,
                reason
            ),
            Err(e) => warn!("{} ⚠️ 写入 {} 失败: {}", ctx, self.warn_writer.path(), e),
        }
    }
}
