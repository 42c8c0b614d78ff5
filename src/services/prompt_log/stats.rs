//! 日志统计摘要

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{LogEntry, SiteId};
use crate::utils::precision::{option_score_precision, round_score};

/// 评分档位（越低越好）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Ok,
    Bad,
    Unknown,
}

impl ScoreBand {
    /// < 0.5 为 good，< 1.0 为 ok，其余为 bad
    pub fn of(score: Option<f64>) -> Self {
        match score {
            None => ScoreBand::Unknown,
            Some(s) if s < 0.5 => ScoreBand::Good,
            Some(s) if s < 1.0 => ScoreBand::Ok,
            Some(_) => ScoreBand::Bad,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Ok => "ok",
            ScoreBand::Bad => "bad",
            ScoreBand::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub total: usize,
    /// 有评分的条数
    pub scored: usize,
    #[serde(with = "option_score_precision")]
    pub average_score: Option<f64>,
    pub total_tokens_in: u64,
    pub total_tokens_out: u64,
    pub by_site: BTreeMap<SiteId, usize>,
}

impl LogSummary {
    pub fn from_logs(logs: &[LogEntry]) -> Self {
        let scores: Vec<f64> = logs.iter().filter_map(|l| l.success_score).collect();
        let average_score = if scores.is_empty() {
            None
        } else {
            Some(round_score(scores.iter().sum::<f64>() / scores.len() as f64))
        };

        let mut by_site = BTreeMap::new();
        for log in logs {
            *by_site.entry(log.site).or_insert(0) += 1;
        }

        Self {
            total: logs.len(),
            scored: scores.len(),
            average_score,
            total_tokens_in: logs.iter().map(|l| l.tokens_in_estimate).sum(),
            total_tokens_out: logs.iter().map(|l| l.tokens_out).sum(),
            by_site,
        }
    }
}
