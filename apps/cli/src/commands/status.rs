//! status 命令
//!
//! 构建编队，可选地模拟一轮目标，然后打印所有机器人的状态快照

use anyhow::{Context, Result};
use clap::Args;
use fleet_sdk::FleetManager;
use fleet_sdk::driver::RobotSnapshot;
use fleet_sdk::msgs::Pose;
use std::time::{Duration, Instant};

use super::{build_fleet, print_snapshot};
use crate::config::CliConfig;
use crate::sim;

/// 状态查询命令参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,

    /// 先为每台机器人模拟一个目标并等待完成
    #[arg(long)]
    pub simulate: bool,
}

impl StatusCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let snapshots = self.collect(config)?;

        if self.json {
            let json = serde_json::to_string_pretty(&snapshots).context("serialize snapshot")?;
            println!("{json}");
        } else {
            print_snapshot(&snapshots);
        }
        Ok(())
    }

    /// 构建编队、按需模拟一轮并取快照；无论模拟是否成功都关闭编队
    fn collect(&self, config: &CliConfig) -> Result<Vec<RobotSnapshot>> {
        let fleet = build_fleet(config)?;

        let simulated = if self.simulate {
            let delay = Duration::from_millis(config.simulator.result_delay_ms);
            sim::attach(&fleet, delay)
                .and_then(|()| simulate_round(&fleet, delay * 2 + Duration::from_secs(1)))
        } else {
            Ok(())
        };

        let snapshots = fleet.snapshot();
        fleet.shutdown();
        simulated?;
        Ok(snapshots)
    }
}

/// 第 i 台机器人前往 (i, i)，等待全部完成或超时
fn simulate_round(fleet: &FleetManager, timeout: Duration) -> Result<()> {
    for (index, robot) in fleet.handles().enumerate() {
        let target = index as f64;
        robot.send_goal(Pose::planar(target, target, 0.0))?;
    }

    let deadline = Instant::now() + timeout;
    while fleet.handles().any(|robot| robot.is_goal_in_flight()) {
        if Instant::now() >= deadline {
            eprintln!("⚠️ Timed out waiting for simulated goals");
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}
