//! Prompt 日志数据模型

use serde::{Deserialize, Serialize};

use super::SiteId;
use crate::utils::precision::option_score_precision;

/// 等待响应的请求（仅存在于内存中，由关联存储独占）
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub request_id: String,
    /// 请求发起时间（毫秒时间戳）
    pub timestamp: i64,
    pub site: SiteId,
    pub model: String,
    /// 截断后的 prompt
    pub prompt_preview: String,
    /// 完整 prompt 的指纹（截断前计算）
    pub prompt_hash: String,
    pub tokens_in_estimate: u64,
}

/// 从响应头提取到的用量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub tokens_out: u64,
}

impl TokenUsage {
    pub fn new(tokens_out: u64) -> Self {
        Self { tokens_out }
    }
}

/// 持久化的日志条目（构建后不可变）
///
/// JSON 字段名与浏览器扩展导出的格式保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    /// 请求完成时间（毫秒时间戳）
    pub timestamp: i64,
    pub site: SiteId,
    pub model: String,
    #[serde(rename = "prompt")]
    pub prompt_preview: String,
    pub prompt_hash: String,
    #[serde(rename = "tokensIn")]
    pub tokens_in_estimate: u64,
    pub tokens_out: u64,
    /// tokensIn / tokensOut，仅在 tokens_out > 0 时存在
    #[serde(
        default,
        with = "option_score_precision",
        skip_serializing_if = "Option::is_none"
    )]
    pub success_score: Option<f64>,
}
