//! 应用入口 - 编排层
//!
//! 初始化日志文件、连接 API、按配置选择浏览器，然后交给流水线

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::browser::ChromeDriverFactory;
use crate::clients::ApiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::orchestrator::download::download_table;
use crate::orchestrator::pipeline::Pipeline;
use crate::orchestrator::report::RunReport;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    factory: ChromeDriverFactory,
    pipeline: Pipeline<ChromeDriverFactory>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let api = Arc::new(ApiClient::new(&config)?);
        let factory = ChromeDriverFactory::new(&config);
        let pipeline = Pipeline::new(&config, factory.clone(), api);

        Ok(Self {
            config,
            factory,
            pipeline,
        })
    }

    /// 处理所有待处理提案并输出统计
    pub async fn run(&self) -> AppResult<RunReport> {
        let report = self.pipeline.run(&self.config.credentials).await?;
        print_final_stats(&report, &self.config);
        Ok(report)
    }

    /// 只下载一局的对局日志
    pub async fn download(&self, table_id: &str, out_dir: &Path) -> AppResult<PathBuf> {
        download_table(&self.config, &self.factory, table_id, out_dir).await
    }
}
