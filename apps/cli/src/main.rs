//! # Fleet CLI
//!
//! Command-line interface for tracking and commanding a robot fleet.
//!
//! ```bash
//! # 写入默认配置
//! fleet-cli config init
//!
//! # 在进程内总线上运行 5 台模拟机器人，执行演示流程，Ctrl+C 退出
//! fleet-cli run --simulate --demo
//!
//! # 模拟一轮目标后以 JSON 输出状态
//! fleet-cli --count 3 status --simulate --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod sim;

use commands::{ConfigCommand, RunCommand, StatusCommand};
use config::CliConfig;

/// Fleet CLI - 编队命令行工具
#[derive(Parser, Debug)]
#[command(name = "fleet-cli")]
#[command(about = "Command-line interface for tracking and commanding a robot fleet", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/fleet-cli/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 机器人数量（覆盖配置文件）
    #[arg(long, global = true)]
    count: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 构建编队并运行，直到 Ctrl+C
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 执行演示流程后退出
    Demo,

    /// 打印所有机器人的状态快照
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    fleet_sdk::init_logger_with(&["fleet_cli=info"])?;

    let cli = Cli::parse();

    if let Commands::Config(cmd) = &cli.command {
        return cmd.execute(cli.config.as_deref(), cli.count);
    }

    let (config, _) = CliConfig::load(cli.config.as_deref())?;
    let config = config.with_overrides(cli.count)?;

    match cli.command {
        Commands::Run { args } => args.execute(&config),
        Commands::Demo => {
            let fleet = commands::build_fleet(&config)?;
            commands::demo::run_demo(&fleet)?;
            fleet.shutdown();
            Ok(())
        },
        Commands::Status { args } => args.execute(&config),
        Commands::Config(_) => Ok(()),
    }
}
