pub mod config_commands;
pub mod log_commands;
pub mod replay_commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use promptmeter::models::AppConfig;
use promptmeter::services::prompt_log::PromptLogDb;
use promptmeter::utils::{config_dir, config_path, load_config, resolve_db_path};

pub use config_commands::{init_config, show_config};
pub use log_commands::{clear_logs, export_logs, import_logs, list_logs, show_stats};
pub use replay_commands::replay_file;

/// 命令执行上下文：配置目录与已加载的配置
pub struct AppContext {
    pub home: PathBuf,
    pub config: AppConfig,
}

impl AppContext {
    pub fn load(home: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => config_dir().context("无法确定配置目录")?,
        };
        let config = load_config(&home)
            .with_context(|| format!("读取配置失败: {}", config_path(&home).display()))?;
        Ok(Self { home, config })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    pub fn open_db(&self) -> Result<PromptLogDb> {
        let path = resolve_db_path(&self.home, &self.config);
        PromptLogDb::open(&path, self.config.storage.max_logs)
            .with_context(|| format!("打开日志数据库失败: {}", path.display()))
    }
}
