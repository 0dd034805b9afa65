//! 题目提案

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// 提案状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Pending,
    Used,
}

/// 题目提案
///
/// 由用户提交，指向外部站点上的一局对局。状态只会从 pending 变为 used，
/// 且只由本程序通过 API 修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i32,
    /// 外部站点对局 ID
    #[serde(deserialize_with = "string_or_number")]
    pub table_id: String,
    #[serde(default)]
    pub creator_id: Option<i32>,
    pub remaining_tile_count: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub note: String,
    #[serde(default)]
    pub status: ProposalStatus,
    /// API 以时间戳形式标记已使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Proposal {
    /// 是否仍待处理
    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending && self.used_at.is_none()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
