//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn 文件"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// 警告写入服务
///
/// 职责：
/// - 将处理失败的提案追加到 warn 文件
/// - 将"题目已创建但提案未标记"的提案单独标出，便于人工对账
/// - 只处理单个提案
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用默认路径 warn.txt
    pub fn new() -> Self {
        Self::with_path("warn.txt")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 记录处理失败的提案
    pub fn write_failure(
        &self,
        proposal_id: i32,
        table_id: &str,
        stage: &str,
        reason: &str,
    ) -> AppResult<()> {
        self.append(&format!(
            "提案 {} | 对局 {} | 阶段 {} | 原因: {}\n",
            proposal_id,
            table_id,
            stage,
            single_line(reason)
        ))
    }

    /// 记录已创建题目但未能标记的提案
    pub fn write_inconsistent(
        &self,
        proposal_id: i32,
        table_id: &str,
        problem_id: i32,
        reason: &str,
    ) -> AppResult<()> {
        self.append(&format!(
            "提案 {} | 对局 {} | 已创建题目 {} 但未标记为已使用 | 原因: {}\n",
            proposal_id,
            table_id,
            problem_id,
            single_line(reason)
        ))
    }

    fn append(&self, line: &str) -> AppResult<()> {
        debug!("写入警告: {}", line.trim_end());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .map_err(|e| AppError::file(&self.warn_file_path, e))?;

        file.write_all(line.as_bytes())
            .map_err(|e| AppError::file(&self.warn_file_path, e))
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

// 每条记录占一行
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
