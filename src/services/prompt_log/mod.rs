//! Prompt 日志服务模块
//!
//! 持久化存储、查询（过滤/排序）、导出与统计。

mod db;
pub mod export;
pub mod query;
pub mod stats;

pub use db::PromptLogDb;
pub use export::{from_json, to_csv, to_json, ExportFormat};
pub use query::{LogQuery, SortField};
pub use stats::{LogSummary, ScoreBand};

use crate::error::AppResult;
use crate::models::LogEntry;

/// 日志存储接口
///
/// 写入时负责执行保留上限（最旧的先淘汰），并在进程重启后保留数据。
pub trait LogSink {
    fn append(&self, entry: &LogEntry) -> AppResult<()>;

    /// 按写入顺序返回全部日志
    fn read_all(&self) -> AppResult<Vec<LogEntry>>;

    /// 清空，返回删除条数
    fn clear(&self) -> AppResult<usize>;

    fn count(&self) -> AppResult<usize>;
}
