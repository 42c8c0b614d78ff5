// 日志查询、统计、导入导出命令

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, TimeZone};
use promptmeter::models::LogEntry;
use promptmeter::services::capture::prompt_extractor::truncate_chars;
use promptmeter::services::prompt_log::{
    from_json, ExportFormat, LogQuery, LogSink, LogSummary, ScoreBand,
};

use super::AppContext;

const PREVIEW_CHARS: usize = 60;

pub fn list_logs(
    ctx: &AppContext,
    query: &LogQuery,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let db = ctx.open_db()?;
    let mut logs = query.apply(&db.read_all().context("读取日志失败")?);
    if let Some(limit) = limit {
        logs.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
        return Ok(());
    }

    for log in &logs {
        println!("{}", format_row(log));
    }
    tracing::debug!(shown = logs.len(), sort = %query.sort, "列出日志");
    Ok(())
}

fn format_row(log: &LogEntry) -> String {
    let time = Local
        .timestamp_millis_opt(log.timestamp)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| log.timestamp.to_string());
    let score = log
        .success_score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "-".to_string());
    let preview =
        truncate_chars(&log.prompt_preview, PREVIEW_CHARS).replace(&['\n', '\r'][..], " ");

    format!(
        "{}  {:<14} {:<24} in={:<6} out={:<6} score={:<5} [{}]  {}",
        time,
        log.site,
        log.model,
        log.tokens_in_estimate,
        log.tokens_out,
        score,
        ScoreBand::of(log.success_score).as_str(),
        preview
    )
}

pub fn show_stats(ctx: &AppContext, json: bool) -> Result<()> {
    let db = ctx.open_db()?;
    let summary = LogSummary::from_logs(&db.read_all().context("读取日志失败")?);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("total:      {}", summary.total);
    println!("scored:     {}", summary.scored);
    match summary.average_score {
        Some(avg) => println!(
            "avg score:  {:.2} ({})",
            avg,
            ScoreBand::of(Some(avg)).as_str()
        ),
        None => println!("avg score:  -"),
    }
    println!("tokens in:  {}", summary.total_tokens_in);
    println!("tokens out: {}", summary.total_tokens_out);
    for (site, count) in &summary.by_site {
        println!("  {:<14} {}", site, count);
    }
    Ok(())
}

pub fn export_logs(ctx: &AppContext, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let db = ctx.open_db()?;
    let logs = db.read_all().context("读取日志失败")?;
    let content = format.render(&logs).context("导出失败")?;

    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("写入导出文件失败: {}", path.display()))?;
            tracing::info!(count = logs.len(), format = %format, path = %path.display(), "已导出日志");
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// 导入 JSON 导出文件，已存在的 id 跳过
pub fn import_logs(ctx: &AppContext, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("读取导入文件失败: {}", file.display()))?;
    let entries = from_json(&content).context("导入文件不是有效的日志 JSON")?;

    let db = ctx.open_db()?;
    let mut known: HashSet<String> = db
        .read_all()
        .context("读取日志失败")?
        .into_iter()
        .map(|e| e.id)
        .collect();

    let mut imported = 0usize;
    for entry in &entries {
        if !known.insert(entry.id.clone()) {
            continue;
        }
        db.append(entry)
            .with_context(|| format!("写入日志失败: {}", entry.id))?;
        imported += 1;
    }

    tracing::info!(imported, total = entries.len(), "导入完成");
    println!("imported {} of {} entries", imported, entries.len());
    Ok(())
}

pub fn clear_logs(ctx: &AppContext, yes: bool) -> Result<()> {
    if !yes {
        bail!("清空日志需要 --yes 确认");
    }
    let deleted = ctx.open_db()?.clear().context("清空日志失败")?;
    println!("deleted {} entries", deleted);
    Ok(())
}
