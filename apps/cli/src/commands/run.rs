//! run 命令
//!
//! 构建编队并阻塞运行，直到 Ctrl+C

use anyhow::{Context, Result};
use clap::Args;
use fleet_sdk::CancelToken;
use fleet_sdk::driver::RobotSnapshot;
use std::time::Duration;
use tracing::info;

use super::{build_fleet, demo, print_snapshot};
use crate::config::CliConfig;
use crate::sim;

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 为每台机器人挂上模拟导航栈
    #[arg(long)]
    pub simulate: bool,

    /// 启动后执行演示流程
    #[arg(long)]
    pub demo: bool,
}

impl RunCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let token = CancelToken::new();
        let trigger = token.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Shutting down...");
            trigger.cancel();
        })
        .context("Failed to set signal handler")?;

        let snapshots = self.run_until(config, &token)?;
        println!();
        print_snapshot(&snapshots);
        Ok(())
    }

    /// 构建编队并阻塞到 `token` 被取消，返回停止时的快照
    pub fn run_until(&self, config: &CliConfig, token: &CancelToken) -> Result<Vec<RobotSnapshot>> {
        let fleet = build_fleet(config)?;

        if self.simulate {
            sim::attach(&fleet, Duration::from_millis(config.simulator.result_delay_ms))?;
        }

        if self.demo {
            demo::run_demo(&fleet)?;
        }

        println!("🚀 {} robots running, press Ctrl+C to stop", fleet.len());
        fleet.run(token)?;
        info!("fleet stopped");

        Ok(fleet.snapshot())
    }
}
