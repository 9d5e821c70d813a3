//! 机器人模拟器
//!
//! 在同一总线上扮演导航栈：收到目标后把里程计"瞬移"到目标位姿，
//! 延迟一段时间后回报 SUCCEEDED。

use anyhow::{Context, Result};
use fleet_sdk::bus::{MessageCallback, Transport};
use fleet_sdk::driver::{FleetManager, ResolvedTopics};
use fleet_sdk::msgs::{BusMessage, GoalResult, GoalStatusCode, MessageKind, Odometry, PoseStamped};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 单台机器人的模拟导航栈
struct SimulatedRobot {
    name: String,
    topics: ResolvedTopics,
    /// 弱引用：模拟器回调由总线持有，不能反过来让总线存活
    transport: Weak<dyn Transport>,
    result_delay: Duration,
}

impl SimulatedRobot {
    fn on_goal(&self, goal: PoseStamped) -> Result<()> {
        debug!(robot = %self.name, x = goal.pose.position.x, y = goal.pose.position.y, "simulating goal");

        let mut odom = Odometry::at(goal.pose);
        odom.header.frame_id = goal.header.frame_id.clone();
        self.publish(&self.topics.odom, odom.into())
            .context("publish simulated odometry")?;

        std::thread::sleep(self.result_delay);

        let mut result = GoalResult::with_code(GoalStatusCode::Succeeded);
        result.status.text = "Goal reached.".to_string();
        self.publish(&self.topics.goal_result, result.into())
            .context("publish simulated goal result")?;
        Ok(())
    }

    /// 传输层已释放时静默跳过
    fn publish(&self, topic: &str, msg: BusMessage) -> Result<()> {
        let Some(transport) = self.transport.upgrade() else {
            debug!(robot = %self.name, topic, "transport gone, dropping simulated message");
            return Ok(());
        };
        transport.publish(topic, msg)?;
        Ok(())
    }
}

impl MessageCallback for SimulatedRobot {
    fn on_message(&self, msg: &BusMessage) {
        let Ok(goal) = PoseStamped::try_from(msg.clone()) else {
            warn!(robot = %self.name, kind = %msg.kind(), "simulator ignoring non-goal message");
            return;
        };
        if let Err(e) = self.on_goal(goal) {
            // 关闭过程中发布失败是正常的
            debug!(robot = %self.name, "simulator stopped: {e:#}");
        }
    }
}

/// 为编队中每台机器人挂上模拟器
///
/// 模拟器的回调运行在总线的投递线程上，随总线关闭而停止。
pub fn attach(fleet: &FleetManager, result_delay: Duration) -> Result<()> {
    let transport = fleet.transport();

    for handle in fleet.handles() {
        let sim = SimulatedRobot {
            name: handle.name().to_string(),
            topics: handle.topics().clone(),
            transport: Arc::downgrade(transport),
            result_delay,
        };
        let topic = sim.topics.goal_pub.clone();
        transport
            .subscribe(&topic, MessageKind::PoseStamped, Arc::new(sim))
            .with_context(|| format!("attach simulator to {}", handle.name()))?;
    }

    info!(count = fleet.len(), delay_ms = result_delay.as_millis() as u64, "simulator attached");
    Ok(())
}
