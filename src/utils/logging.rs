//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use std::fs;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::orchestrator::report::RunReport;

/// 初始化日志文件，写入带时间戳的文件头
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    fs::write(log_file_path, log_file_header()).map_err(|e| AppError::file(log_file_path, e))
}

fn log_file_header() -> String {
    format!(
        "{}\n提案处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    )
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 提案转题目模式");
    info!("🌐 外部站点: {}", config.site_base_url);
    info!("📡 内部 API: {}", config.api_base_url);
    info!("🖥️ 浏览器模式: {:?}", config.driver_mode);
    if let Some(creator) = config.creator_filter {
        info!("👤 只处理创建者 {} 的提案", creator);
    }
    info!("{}", "=".repeat(60));
}

/// 记录提案加载信息
pub fn log_proposals_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的提案", total);
    info!("💡 将登录一次并按顺序逐个处理\n");
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.processed.len(), report.total);
    info!("❌ 失败: {}", report.failed.len());
    if !report.skipped.is_empty() {
        info!("⏭️ 跳过(已使用): {}", report.skipped.len());
    }
    for record in &report.inconsistent {
        warn!(
            "⚠️ 提案 {} 已创建题目 {:?} 但未标记为已使用，需要人工处理",
            record.proposal_id, record.problem_id
        );
    }
    info!("{}", "=".repeat(60));
    if !report.is_clean() {
        info!("失败明细已写入: {}", config.warn_file);
    }
    info!("\n日志已保存至: {}", config.output_log_file);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
