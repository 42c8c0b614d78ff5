//! 日志系统初始化
//!
//! 基于 tracing-subscriber，支持控制台/文件输出与文本/JSON 格式。
//! `RUST_LOG` 环境变量优先于配置中的日志级别。

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};

const LOG_FILE_PREFIX: &str = "promptmeter.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("不支持的日志级别: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
}

/// 日志配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl LogConfig {
    /// 构建过滤器：`RUST_LOG` > 配置级别
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }
}

/// 初始化全局日志
///
/// 文件输出时返回 `WorkerGuard`，调用方需要持有它直到进程退出，否则缓冲日志会丢失。
pub fn init_logger(config: &LogConfig, log_dir: &Path) -> AppResult<Option<WorkerGuard>> {
    let filter = config.env_filter();

    match config.output {
        LogOutput::Console => {
            let registry = tracing_subscriber::registry().with(filter);
            let result = match config.format {
                LogFormat::Text => registry
                    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                    .try_init(),
                LogFormat::Json => registry
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .try_init(),
            };
            result.map_err(AppError::config)?;
            Ok(None)
        }
        LogOutput::File => {
            std::fs::create_dir_all(log_dir)?;
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let registry = tracing_subscriber::registry().with(filter);
            let result = match config.format {
                LogFormat::Text => registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .try_init(),
                LogFormat::Json => registry
                    .with(fmt::layer().json().with_writer(writer))
                    .try_init(),
            };
            result.map_err(AppError::config)?;
            Ok(Some(guard))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_toml_names() {
        let config: LogConfig = toml::from_str(
            r#"
            level = "debug"
            format = "json"
            output = "file"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::File);
    }

    #[test]
    fn test_default_level_is_info() {
        let config = LogConfig::default();
        assert_eq!(config.level.as_str(), "info");
        assert_eq!(config.output, LogOutput::Console);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
