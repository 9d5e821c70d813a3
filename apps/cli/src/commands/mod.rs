//! 命令定义和实现

pub mod config;
pub mod demo;
pub mod run;
pub mod status;

pub use config::ConfigCommand;
pub use run::RunCommand;
pub use status::StatusCommand;

use crate::config::CliConfig;
use anyhow::{Context, Result};
use fleet_sdk::driver::RobotSnapshot;
use fleet_sdk::{FleetBuilder, FleetManager};

/// 按配置在新的 LocalBus 上构建编队
pub fn build_fleet(config: &CliConfig) -> Result<FleetManager> {
    FleetBuilder::new()
        .config(config.fleet.clone())
        .bus_config(config.bus.clone())
        .build()
        .context("Failed to build fleet")
}

/// 以表格形式打印快照
pub fn print_snapshot(snapshots: &[RobotSnapshot]) {
    println!(
        "{:<12} {:>9} {:>9} {:>8}  {:<16} {:<9}",
        "NAME", "X", "Y", "YAW", "STATUS", "IN_FLIGHT"
    );
    for s in snapshots {
        let (x, y, yaw) = if s.has_pose {
            (
                format!("{:.2}", s.pose.position.x),
                format!("{:.2}", s.pose.position.y),
                format!("{:.2}", s.pose.orientation.yaw()),
            )
        } else {
            ("-".to_string(), "-".to_string(), "-".to_string())
        };
        println!(
            "{:<12} {:>9} {:>9} {:>8}  {:<16} {:<9}",
            s.name,
            x,
            y,
            yaw,
            s.goal_status.to_string(),
            s.goal_in_flight
        );
    }
}
