//! demo 命令
//!
//! 固定的演示流程：查询名称、向两台机器人下发目标、读取状态。需要至少 5 台机器人。

use anyhow::{Context, Result};
use fleet_sdk::FleetManager;
use fleet_sdk::msgs::{Header, Point, Pose, PoseStamped, Quaternion};

fn goal(frame_id: &str, x: f64, y: f64) -> PoseStamped {
    PoseStamped::new(
        Header::stamped(frame_id),
        Pose {
            position: Point::new(x, y, 0.0),
            orientation: Quaternion::IDENTITY,
        },
    )
}

/// 执行演示流程
pub fn run_demo(fleet: &FleetManager) -> Result<()> {
    let frame_id = fleet.config().goal_frame_id.as_str();

    let robot_1 = fleet.handle_at(1).context("demo needs robot 1")?;
    println!("Robot name: {}", robot_1.name());

    robot_1
        .send_goal_command(goal(frame_id, 3.0, 7.0))
        .context("send goal to robot 1")?;
    println!("🎯 {} -> (3.0, 7.0)", robot_1.name());

    let robot_3 = fleet.handle_at(3).context("demo needs robot 3")?;
    robot_3
        .send_goal_command(goal(frame_id, -4.0, -2.0))
        .context("send goal to robot 3")?;
    println!("🎯 {} -> (-4.0, -2.0)", robot_3.name());

    let robot_4 = fleet.handle_at(4).context("demo needs robot 4")?;
    println!("{} goal status: {}", robot_4.name(), robot_4.current_goal_status());

    for index in [0, 1] {
        let robot = fleet.handle_at(index)?;
        println!("{} goal in flight: {}", robot.name(), robot.is_goal_in_flight());
    }

    Ok(())
}
