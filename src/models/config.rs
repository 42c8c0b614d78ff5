//! 应用配置模型
//!
//! 以 TOML 形式保存在配置目录下，缺失的字段使用默认值

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::LogConfig;

/// Prompt 预览的默认最大长度
pub const DEFAULT_MAX_PROMPT_LEN: usize = 500;

/// 日志默认保留条数
pub const DEFAULT_MAX_LOGS: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

/// 请求捕获配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub max_prompt_len: usize,
    /// 未完成请求的最长保留时间（毫秒），未设置时不清理
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pending_age_ms: Option<u64>,
    /// 只处理 xmlhttprequest 类型的请求
    pub require_xhr: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_prompt_len: DEFAULT_MAX_PROMPT_LEN,
            max_pending_age_ms: None,
            require_xhr: true,
        }
    }
}

/// 日志存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 数据库路径，未设置时使用配置目录下的 prompt_logs.db
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    pub max_logs: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            max_logs: DEFAULT_MAX_LOGS,
        }
    }
}
