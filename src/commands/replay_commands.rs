// 事件回放命令
//
// 读取 NDJSON 事件文件，按顺序驱动请求监控器并写入日志库。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use promptmeter::services::capture::{HostEvent, RequestMonitor};

use super::AppContext;

pub fn replay_file(ctx: &AppContext, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("读取事件文件失败: {}", file.display()))?;

    let mut skipped = 0usize;
    let events: Vec<HostEvent> = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                skipped += 1;
                tracing::warn!(line = index + 1, error = %e, "无法解析的事件，跳过");
                None
            }
        })
        .collect();

    let db = ctx.open_db()?;
    let mut monitor = RequestMonitor::new(db, ctx.config.capture.clone());
    let report = monitor.replay(events);
    let unfinished = monitor.shutdown();

    println!(
        "events: {}, logged: {}, failed writes: {}, unfinished: {}, malformed lines: {}",
        report.events, report.logged, report.failed_writes, unfinished, skipped
    );
    Ok(())
}
