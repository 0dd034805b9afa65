//! 对局日志提取 - 业务能力层
//!
//! 只负责从渲染后的页面内容中取出 `g_gamelogs` 数据，不关心页面怎么来的

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::MoveLog;

/// 页面中赋值语句的变量名
pub const LOG_MARKER: &str = "g_gamelogs = ";

// 跨行匹配；贪婪前缀让最后一处赋值生效，捕获到其后第一个行尾分号为止
const LOG_PATTERN: &str = r"(?s)^.*g_gamelogs = (.*?);[ \t]*(?:\r?\n|\z)";

fn log_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LOG_PATTERN).expect("g_gamelogs 正则无效"))
}

/// 对局日志提取服务
#[derive(Debug, Default, Clone, Copy)]
pub struct LogExtractor;

impl LogExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 从完整页面内容中提取对局日志
    ///
    /// 标记不存在或捕获内容不是合法 JSON 时返回 `ExtractionError`，不做部分恢复
    pub fn extract(&self, content: &str, table_id: &str) -> Result<MoveLog, ExtractionError> {
        let raw = log_regex()
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ExtractionError::MarkerNotFound {
                table_id: table_id.to_string(),
            })?;

        debug!("对局 {} 日志长度: {} 字节", table_id, raw.len());
        MoveLog::parse(table_id, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = "{\"channel\":\"/table/t447137094\",\n \"data\":[\n  {\"uid\":\"1\",\"type\":\"playTile\",\"args\":{\"x\":0,\"y\":1}},\n  {\"uid\":\"2\",\"type\":\"placeMeeple\",\"args\":{\"pos\":\"N\"}}\n ]}";

    fn page_with(blob: &str) -> String {
        format!(
            "<html><head><script>\nvar g_gamethemeurl = '/x/';\ng_gamelogs = {};\nvar g_replayFrom = 0;\n</script></head></html>",
            blob
        )
    }

    #[test]
    fn test_extracts_multiline_literal_exactly() {
        let log = LogExtractor::new()
            .extract(&page_with(BLOB), "447137094")
            .unwrap();
        assert_eq!(log.as_str(), BLOB);
        assert_eq!(log.table_id(), "447137094");
    }

    #[test]
    fn test_excludes_marker_and_terminator() {
        let log = LogExtractor::new()
            .extract("g_gamelogs = [1,2,3];\n", "1")
            .unwrap();
        assert_eq!(log.as_str(), "[1,2,3]");
    }

    #[test]
    fn test_crlf_and_end_of_input_terminators() {
        let extractor = LogExtractor::new();
        let crlf = extractor
            .extract("x\r\ng_gamelogs = {\"a\":1};\r\nmore", "1")
            .unwrap();
        assert_eq!(crlf.as_str(), "{\"a\":1}");

        let eof = extractor.extract("g_gamelogs = {\"a\":2};", "1").unwrap();
        assert_eq!(eof.as_str(), "{\"a\":2}");
    }

    #[test]
    fn test_semicolon_inside_line_does_not_terminate() {
        let blob = "{\"msg\":\"a; b\",\n\"n\":1}";
        let log = LogExtractor::new().extract(&page_with(blob), "1").unwrap();
        assert_eq!(log.as_str(), blob);
    }

    #[test]
    fn test_last_assignment_wins() {
        let page = "<script>\ng_gamelogs = {};\n</script><script>\ng_gamelogs = {\"real\":1};\n</script>";
        let log = LogExtractor::new().extract(page, "1").unwrap();
        assert_eq!(log.as_str(), "{\"real\":1}");
    }

    #[test]
    fn test_marker_without_terminator_falls_back_to_earlier_one() {
        let page = "g_gamelogs = [1];\nvar x = 'g_gamelogs = unterminated'";
        let log = LogExtractor::new().extract(page, "1").unwrap();
        assert_eq!(log.as_str(), "[1]");
    }

    #[test]
    fn test_missing_marker_is_error() {
        let err = LogExtractor::new()
            .extract("<html><body>Select a player</body></html>", "42")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MarkerNotFound { ref table_id } if table_id == "42"));
    }

    #[test]
    fn test_unparseable_literal_is_error() {
        let err = LogExtractor::new()
            .extract(&page_with("{\"data\": [1, 2,"), "42")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidLog { .. }));
    }
}
