// apps/ft_cli/src/main.rs

//! FracTrans 命令行界面
//!
//! 裂隙网络粒子追踪的命令行工具：
//!
//! - `run`: 读取网格与流场，运行粒子系综，写出运移结果
//! - `info`: 显示网格 / 流场统计或默认配置
//! - `validate`: 检查配置文件与输入文件的一致性

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FracTrans 裂隙网络粒子追踪命令行工具
#[derive(Parser)]
#[command(name = "ft_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FracTrans particle tracking on discrete fracture networks", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行粒子追踪
    Run(commands::run::RunArgs),
    /// 显示网格 / 流场信息
    Info(commands::info::InfoArgs),
    /// 验证配置与输入文件
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
