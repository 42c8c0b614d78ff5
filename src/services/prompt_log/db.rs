//! Prompt 日志 SQLite 存储
//!
//! 按写入顺序保存，写入与超额清理在同一事务内完成（最旧的先删除）。

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Row};

use super::LogSink;
use crate::error::{AppError, AppResult};
use crate::models::{LogEntry, SiteId};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS prompt_logs (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        timestamp INTEGER NOT NULL,
        site TEXT NOT NULL,
        model TEXT NOT NULL,
        prompt TEXT NOT NULL,
        prompt_hash TEXT NOT NULL,
        tokens_in INTEGER NOT NULL,
        tokens_out INTEGER NOT NULL,
        success_score REAL
    );
    CREATE INDEX IF NOT EXISTS idx_prompt_logs_timestamp ON prompt_logs(timestamp);
";

#[derive(Debug, Clone)]
pub struct PromptLogDb {
    path: PathBuf,
    max_logs: usize,
}

impl PromptLogDb {
    /// 创建存储（保留条数至少为 1）
    pub fn new(path: impl Into<PathBuf>, max_logs: usize) -> Self {
        Self {
            path: path.into(),
            max_logs: max_logs.max(1),
        }
    }

    /// 创建并初始化表结构
    pub fn open(path: impl Into<PathBuf>, max_logs: usize) -> AppResult<Self> {
        let db = Self::new(path, max_logs);
        db.init_table()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_logs(&self) -> usize {
        self.max_logs
    }

    pub fn init_table(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = self.connection()?;
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    fn connection(&self) -> AppResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    fn get_count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
        let value: i64 = row.get(idx)?;
        u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
        let site: String = row.get(2)?;
        let tokens_in = Self::get_count(row, 6)?;
        let tokens_out = Self::get_count(row, 7)?;

        Ok(LogEntry {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            site: site.parse().unwrap_or(SiteId::Unknown),
            model: row.get(3)?,
            prompt_preview: row.get(4)?,
            prompt_hash: row.get(5)?,
            tokens_in_estimate: tokens_in,
            tokens_out,
            success_score: row.get(8)?,
        })
    }
}

impl LogSink for PromptLogDb {
    fn append(&self, entry: &LogEntry) -> AppResult<()> {
        let tokens_in = i64::try_from(entry.tokens_in_estimate).map_err(AppError::persistence)?;
        let tokens_out = i64::try_from(entry.tokens_out).map_err(AppError::persistence)?;

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO prompt_logs (id, timestamp, site, model, prompt, prompt_hash, tokens_in, tokens_out, success_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id,
                entry.timestamp,
                entry.site.as_str(),
                entry.model,
                entry.prompt_preview,
                entry.prompt_hash,
                tokens_in,
                tokens_out,
                entry.success_score,
            ],
        )?;

        // 删除第 max_logs 条之前的所有旧记录
        let evicted = tx.execute(
            "DELETE FROM prompt_logs WHERE seq <= (
                SELECT seq FROM prompt_logs ORDER BY seq DESC LIMIT 1 OFFSET ?1
            )",
            params![self.max_logs as i64],
        )?;

        tx.commit()?;

        if evicted > 0 {
            tracing::debug!(evicted, max_logs = self.max_logs, "超出保留上限，已清理最旧日志");
        }
        Ok(())
    }

    fn read_all(&self) -> AppResult<Vec<LogEntry>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, site, model, prompt, prompt_hash, tokens_in, tokens_out, success_score
             FROM prompt_logs ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn clear(&self) -> AppResult<usize> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM prompt_logs", [])?;
        tracing::info!(deleted, "已清空 Prompt 日志");
        Ok(deleted)
    }

    fn count(&self) -> AppResult<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM prompt_logs", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}
