//! # Generate Problem
//!
//! 把题目提案转换成题目：抓取外部站点的对局回放日志，提交到内部题目 API
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器页面），只暴露能力
//! - `SiteDriver` - 页面操作能力（打开、等待、输入、点击、读内容）
//! - `DriverFactory` - 需要会话时才获取浏览器
//! - `browser/` - chromiumoxide 实现（无头 / 带窗口 / 连接已有浏览器）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个提案
//! - `SessionManager` - 多步登录和打开对局回放
//! - `LogExtractor` - 提取 g_gamelogs 对局日志
//! - `ProposalSource` / `ProblemSubmitter` - 内部 API 的读与写
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个提案"的完整处理流程
//! - `ProposalCtx` - 上下文封装（proposal_id + table_id）
//! - `ProposalFlow` - 流程编排（navigate → extract → submit → mark used）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 登录一次，顺序处理全部提案
//! - `orchestrator/download` - 只下载一局日志
//! - `orchestrator/app` - 应用生命周期与统计

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use config::{Config, Credentials, DriverMode};
pub use error::{AppError, AppResult};
pub use models::{MoveLog, Problem, Proposal};
pub use orchestrator::{App, Pipeline, RunReport};
pub use workflow::{ProcessResult, ProposalCtx, ProposalFlow, Stage};
