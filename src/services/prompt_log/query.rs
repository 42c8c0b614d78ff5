//! 日志查询：过滤与排序

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::LogEntry;

/// 可排序字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    #[default]
    Timestamp,
    Site,
    Model,
    Prompt,
    PromptHash,
    TokensIn,
    TokensOut,
    SuccessScore,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Timestamp => "timestamp",
            SortField::Site => "site",
            SortField::Model => "model",
            SortField::Prompt => "prompt",
            SortField::PromptHash => "promptHash",
            SortField::TokensIn => "tokensIn",
            SortField::TokensOut => "tokensOut",
            SortField::SuccessScore => "successScore",
        }
    }

    fn compare(&self, a: &LogEntry, b: &LogEntry) -> Ordering {
        match self {
            SortField::Id => cmp_ignore_case(&a.id, &b.id),
            SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortField::Site => cmp_ignore_case(a.site.as_str(), b.site.as_str()),
            SortField::Model => cmp_ignore_case(&a.model, &b.model),
            SortField::Prompt => cmp_ignore_case(&a.prompt_preview, &b.prompt_preview),
            SortField::PromptHash => cmp_ignore_case(&a.prompt_hash, &b.prompt_hash),
            SortField::TokensIn => a.tokens_in_estimate.cmp(&b.tokens_in_estimate),
            SortField::TokensOut => a.tokens_out.cmp(&b.tokens_out),
            SortField::SuccessScore => cmp_score(a.success_score, b.success_score),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    /// 同时接受 camelCase 与 snake_case 写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "").as_str() {
            "id" => Ok(SortField::Id),
            "timestamp" => Ok(SortField::Timestamp),
            "site" => Ok(SortField::Site),
            "model" => Ok(SortField::Model),
            "prompt" => Ok(SortField::Prompt),
            "prompthash" => Ok(SortField::PromptHash),
            "tokensin" => Ok(SortField::TokensIn),
            "tokensout" => Ok(SortField::TokensOut),
            "successscore" | "score" => Ok(SortField::SuccessScore),
            _ => Err(format!("不支持的排序字段: {}", s)),
        }
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// 无评分排在所有有评分的记录之前（升序时）
fn cmp_score(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

/// 查询条件，默认按时间倒序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    /// 对 site / model / prompt 做不区分大小写的子串匹配
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub ascending: bool,
}

impl LogQuery {
    pub fn new(filter: Option<String>, sort: SortField, ascending: bool) -> Self {
        Self {
            filter,
            sort,
            ascending,
        }
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        let needle = match self.normalized_filter() {
            Some(needle) => needle,
            None => return true,
        };

        [
            entry.site.as_str(),
            entry.model.as_str(),
            entry.prompt_preview.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// 过滤并排序，相等的记录保持原有顺序
    pub fn apply(&self, logs: &[LogEntry]) -> Vec<LogEntry> {
        let mut result: Vec<LogEntry> = logs.iter().filter(|e| self.matches(e)).cloned().collect();

        result.sort_by(|a, b| {
            let ordering = self.sort.compare(a, b);
            if self.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        result
    }

    fn normalized_filter(&self) -> Option<String> {
        self.filter
            .as_deref()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
    }
}
