//! 日志导出（JSON / CSV）与 JSON 导入

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, TimeZone, Utc};

use crate::error::AppResult;
use crate::models::LogEntry;

const CSV_HEADERS: &[&str] = &[
    "timestamp",
    "site",
    "model",
    "prompt",
    "prompt_hash",
    "tokens_in",
    "tokens_out",
    "success_score",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn render(&self, logs: &[LogEntry]) -> AppResult<String> {
        match self {
            ExportFormat::Json => to_json(logs),
            ExportFormat::Csv => Ok(to_csv(logs)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("不支持的导出格式: {}", other)),
        }
    }
}

/// 导出为格式化的 JSON 数组
pub fn to_json(logs: &[LogEntry]) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(logs)?)
}

/// 解析导出的 JSON 数组
pub fn from_json(content: &str) -> AppResult<Vec<LogEntry>> {
    Ok(serde_json::from_str(content)?)
}

/// 导出为 CSV
///
/// 时间为 ISO-8601 UTC；输出 Token 为 0 或没有评分时对应列留空。
pub fn to_csv(logs: &[LogEntry]) -> String {
    let mut lines = Vec::with_capacity(logs.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for log in logs {
        let tokens_out = if log.tokens_out > 0 {
            log.tokens_out.to_string()
        } else {
            String::new()
        };
        let score = log
            .success_score
            .map(|s| s.to_string())
            .unwrap_or_default();

        let row = [
            format_timestamp(log.timestamp),
            escape_csv(log.site.as_str()),
            escape_csv(&log.model),
            escape_csv(&log.prompt_preview),
            escape_csv(&log.prompt_hash),
            log.tokens_in_estimate.to_string(),
            tokens_out,
            score,
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

/// 包含逗号、引号或换行的字段加引号，内部引号双写
fn escape_csv(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
