//! 对局日志

use serde::de::IgnoredAny;

use crate::error::ExtractionError;

/// 从对局回放页面抓取的原始日志
///
/// 内容对本程序不透明，只保证是合法的 JSON，原样转发给 API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveLog {
    table_id: String,
    raw: String,
}

impl MoveLog {
    /// 校验并封装原始日志文本
    pub fn parse(table_id: impl Into<String>, raw: impl Into<String>) -> Result<Self, ExtractionError> {
        let table_id = table_id.into();
        let raw = raw.into();
        if let Err(source) = serde_json::from_str::<IgnoredAny>(&raw) {
            return Err(ExtractionError::InvalidLog { table_id, source });
        }
        Ok(Self { table_id, raw })
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}
