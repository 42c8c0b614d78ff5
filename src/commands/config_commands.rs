// 配置查看与初始化命令

use anyhow::{bail, Context, Result};
use promptmeter::models::AppConfig;
use promptmeter::services::capture::monitored_domains;
use promptmeter::utils::{config_path, resolve_db_path, write_config};

use super::AppContext;

pub fn show_config(ctx: &AppContext) -> Result<()> {
    let content = toml::to_string_pretty(&ctx.config).context("序列化配置失败")?;
    println!("# {}", config_path(&ctx.home).display());
    println!("# database: {}", resolve_db_path(&ctx.home, &ctx.config).display());
    println!(
        "# monitored: {}",
        monitored_domains().collect::<Vec<_>>().join(", ")
    );
    print!("{}", content);
    Ok(())
}

pub fn init_config(ctx: &AppContext, force: bool) -> Result<()> {
    let path = config_path(&ctx.home);
    if path.exists() && !force {
        bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
    }

    write_config(&ctx.home, &AppConfig::default())
        .with_context(|| format!("写入配置失败: {}", path.display()))?;
    tracing::info!(path = %path.display(), "已写入默认配置");
    println!("{}", path.display());
    Ok(())
}
