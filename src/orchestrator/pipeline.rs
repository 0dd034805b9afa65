//! 提案流水线 - 编排层
//!
//! ## 职责
//!
//! 1. **取提案**：没有待处理提案时直接返回，不启动浏览器
//! 2. **登录一次**：整次运行只有一个会话，登录失败中止整次运行
//! 3. **顺序处理**：按 API 返回顺序逐个处理，单个失败只记录不中断
//! 4. **释放会话**：无论成功失败，退出前都释放浏览器

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::ProblemApi;
use crate::config::{Config, Credentials};
use crate::error::AppResult;
use crate::infrastructure::DriverFactory;
use crate::models::Proposal;
use crate::orchestrator::report::RunReport;
use crate::services::{ProposalSource, Session, SessionManager};
use crate::utils::logging::log_proposals_loaded;
use crate::workflow::{ProcessResult, ProposalCtx, ProposalFlow};

/// 提案流水线
pub struct Pipeline<F: DriverFactory> {
    factory: F,
    source: ProposalSource,
    sessions: SessionManager,
    flow: ProposalFlow,
}

impl<F: DriverFactory> Pipeline<F> {
    pub fn new(config: &Config, factory: F, api: Arc<dyn ProblemApi>) -> Self {
        Self {
            factory,
            source: ProposalSource::new(api.clone(), config.creator_filter),
            sessions: SessionManager::new(config),
            flow: ProposalFlow::new(config, api),
        }
    }

    /// 处理全部待处理提案
    ///
    /// 只有取提案、获取浏览器、登录失败会返回 `Err`，单个提案的失败记录在报告中
    pub async fn run(&self, credentials: &Credentials) -> AppResult<RunReport> {
        info!("\n📁 正在获取待处理的提案...");
        let proposals = self.source.list_pending().await?;

        if proposals.is_empty() {
            warn!("⚠️ 没有待处理的提案，程序结束");
            return Ok(RunReport::default());
        }
        log_proposals_loaded(proposals.len());

        let driver = self.factory.acquire().await?;
        let mut session = Session::new(driver);

        let result = self.drain(&mut session, credentials, &proposals).await;
        session.release().await;
        result
    }

    async fn drain(
        &self,
        session: &mut Session<F::Driver>,
        credentials: &Credentials,
        proposals: &[Proposal],
    ) -> AppResult<RunReport> {
        if let Err(e) = self.sessions.authenticate(session, credentials).await {
            error!("❌ 登录失败，中止本次运行: {}", e);
            return Err(e.into());
        }

        let total = proposals.len();
        let mut report = RunReport::new(total);

        for (idx, proposal) in proposals.iter().enumerate() {
            let ctx = ProposalCtx::new(idx + 1, total, proposal);

            match self.flow.run(session, proposal, &ctx).await {
                Ok(ProcessResult::Processed { .. }) => report.processed.push(proposal.id),
                Ok(ProcessResult::Skipped) => report.skipped.push(proposal.id),
                Err(e) => {
                    error!("{} ❌ 处理失败: {}", ctx, e);
                    report.record_failure(proposal, &e);
                }
            }
        }

        Ok(report)
    }
}
