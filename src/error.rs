use std::fmt::Display;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML 解析错误: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("TOML 序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("日志写入失败: {0}")]
    Persistence(String),
}

impl AppError {
    pub fn config<E: Display>(err: E) -> Self {
        Self::Config(err.to_string())
    }

    pub fn persistence<E: Display>(err: E) -> Self {
        Self::Persistence(err.to_string())
    }
}
