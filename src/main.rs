mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promptmeter::core::{init_logger, LogLevel};
use promptmeter::services::prompt_log::{ExportFormat, LogQuery, SortField};

use commands::AppContext;

#[derive(Debug, Parser)]
#[command(name = "promptmeter", version, about = "记录 LLM 网页请求的 Prompt 与 Token 用量")]
struct Cli {
    /// 配置目录（默认 $PROMPTMETER_HOME 或 ~/.promptmeter）
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// 覆盖配置中的日志级别
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 回放宿主事件文件（每行一个 JSON 事件）
    Replay { file: PathBuf },
    /// 列出日志
    List {
        /// 按站点 / 模型 / prompt 过滤（不区分大小写）
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(short, long, default_value = "timestamp")]
        sort: SortField,
        /// 升序（默认降序）
        #[arg(long)]
        asc: bool,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 统计摘要
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// 导出全部日志
    Export {
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// 输出文件，省略时写到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 导入 JSON 导出文件
    Import { file: PathBuf },
    /// 清空日志
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// 显示当前生效的配置
    Show,
    /// 写入默认配置
    Init {
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut ctx = AppContext::load(cli.home)?;
    if let Some(level) = cli.log_level {
        ctx.config.log.level = level;
    }
    let _guard = init_logger(&ctx.config.log, &ctx.log_dir()).context("初始化日志系统失败")?;
    tracing::debug!(home = %ctx.home.display(), "配置目录");

    match cli.command {
        Command::Replay { file } => commands::replay_file(&ctx, &file),
        Command::List {
            filter,
            sort,
            asc,
            limit,
            json,
        } => commands::list_logs(&ctx, &LogQuery::new(filter, sort, asc), limit, json),
        Command::Stats { json } => commands::show_stats(&ctx, json),
        Command::Export { format, output } => commands::export_logs(&ctx, format, output.as_deref()),
        Command::Import { file } => commands::import_logs(&ctx, &file),
        Command::Clear { yes } => commands::clear_logs(&ctx, yes),
        Command::Config { action } => match action {
            ConfigAction::Show => commands::show_config(&ctx),
            ConfigAction::Init { force } => commands::init_config(&ctx, force),
        },
    }
}
