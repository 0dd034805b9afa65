//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 提案流水线
//! - 取待处理提案（Vec<Proposal>），为空时不启动浏览器
//! - 获取浏览器并登录一次
//! - 按顺序逐个交给 ProposalFlow，汇总 RunReport
//! - 在所有退出路径上释放会话
//!
//! ### `download` - 单局下载
//! - 登录后抓取一局日志写入文件，不调用内部 API
//!
//! ### `app` - 应用生命周期
//! - 初始化日志文件和 API 客户端
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! pipeline (处理 Vec<Proposal>)
//!     ↓
//! workflow::ProposalFlow (处理单个 Proposal)
//!     ↓
//! services (能力层：session / extract / submit / warn)
//!     ↓
//! infrastructure (基础设施：SiteDriver)
//! ```

pub mod app;
pub mod download;
pub mod pipeline;
pub mod report;

pub use app::App;
pub use download::download_table;
pub use pipeline::Pipeline;
pub use report::{FailureRecord, RunReport};
