//! 配置目录与全局配置读写

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

/// 覆盖配置目录的环境变量
pub const HOME_ENV: &str = "PROMPTMETER_HOME";

const CONFIG_FILE: &str = "config.toml";
const DB_FILE: &str = "prompt_logs.db";

/// 获取配置目录（`$PROMPTMETER_HOME` 或 `~/.promptmeter`）
pub fn config_dir() -> AppResult<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::home_dir()
        .map(|home| home.join(".promptmeter"))
        .ok_or_else(|| AppError::config("无法获取用户主目录"))
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// 读取配置，文件不存在或为空时返回 None
pub fn read_config(dir: &Path) -> AppResult<Option<AppConfig>> {
    let path = config_path(dir);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(toml::from_str(&content)?))
}

/// 读取配置，缺失时使用默认值
pub fn load_config(dir: &Path) -> AppResult<AppConfig> {
    Ok(read_config(dir)?.unwrap_or_default())
}

/// 原子写入配置（先写临时文件再替换）
pub fn write_config(dir: &Path, config: &AppConfig) -> AppResult<()> {
    fs::create_dir_all(dir)?;
    let path = config_path(dir);
    let tmp_path = path.with_extension("tmp");

    let content = toml::to_string_pretty(config)?;
    fs::write(&tmp_path, content)?;

    if path.exists() {
        fs::remove_file(&path)?;
    }
    fs::rename(tmp_path, &path)?;
    Ok(())
}

/// 日志数据库路径（配置优先）
pub fn resolve_db_path(dir: &Path, config: &AppConfig) -> PathBuf {
    config
        .storage
        .db_path
        .clone()
        .unwrap_or_else(|| dir.join(DB_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        assert!(read_config(dir.path()).unwrap().is_none());
        assert_eq!(load_config(dir.path()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_write_then_read_config() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.max_logs = 42;
        config.capture.max_pending_age_ms = Some(5_000);

        write_config(dir.path(), &config).unwrap();
        // 覆盖写入不应残留临时文件
        write_config(dir.path(), &config).unwrap();

        assert_eq!(read_config(dir.path()).unwrap(), Some(config));
        assert!(!dir.path().join("config.tmp").exists());
    }

    #[test]
    fn test_resolve_db_path() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        assert_eq!(
            resolve_db_path(dir.path(), &config),
            dir.path().join("prompt_logs.db")
        );

        config.storage.db_path = Some(PathBuf::from("/tmp/custom.db"));
        assert_eq!(
            resolve_db_path(dir.path(), &config),
            PathBuf::from("/tmp/custom.db")
        );
    }
}
