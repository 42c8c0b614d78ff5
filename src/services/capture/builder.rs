// 日志构建层
//
// 职责：请求发起时生成待完成记录，请求完成时合并用量生成最终日志

use chrono::Utc;

use super::prompt_extractor::{truncate_chars, ExtractedPrompt};
use crate::models::{LogEntry, PendingRequest, SiteId, TokenUsage};
use crate::utils::precision::round_score;
use crate::utils::prompt_hash;

pub struct LogRecordBuilder;

impl LogRecordBuilder {
    /// 由提取结果生成待完成请求
    ///
    /// 指纹基于完整 prompt 计算，预览在写入前截断。
    pub fn pending(
        request_id: &str,
        timestamp: i64,
        site: SiteId,
        extracted: ExtractedPrompt,
        max_prompt_len: usize,
    ) -> PendingRequest {
        PendingRequest {
            request_id: request_id.to_string(),
            timestamp,
            site,
            prompt_hash: prompt_hash(&extracted.prompt),
            prompt_preview: truncate_chars(&extracted.prompt, max_prompt_len),
            model: extracted.model,
            tokens_in_estimate: extracted.tokens_in_estimate,
        }
    }

    /// 生成日志（完成时间取当前时间）
    pub fn build(pending: PendingRequest, usage: TokenUsage) -> LogEntry {
        Self::build_at(pending, usage, Utc::now().timestamp_millis())
    }

    /// 生成日志（指定完成时间）
    pub fn build_at(pending: PendingRequest, usage: TokenUsage, completed_at: i64) -> LogEntry {
        LogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: completed_at,
            site: pending.site,
            model: pending.model,
            prompt_preview: pending.prompt_preview,
            prompt_hash: pending.prompt_hash,
            tokens_in_estimate: pending.tokens_in_estimate,
            tokens_out: usage.tokens_out,
            success_score: success_score(pending.tokens_in_estimate, usage.tokens_out),
        }
    }
}

/// 效率评分 = 输入 Token / 输出 Token（保留2位小数），越低越好
///
/// 输出为 0 时没有评分。
pub fn success_score(tokens_in: u64, tokens_out: u64) -> Option<f64> {
    if tokens_out == 0 {
        return None;
    }
    Some(round_score(tokens_in as f64 / tokens_out as f64))
}
