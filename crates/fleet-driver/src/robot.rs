//! Robot API 模块
//!
//! 提供对外的 `RobotHandle`：封装单台机器人的四个通道（两入两出）
//! 以及回调线程写入的状态缓存。

use crate::config::{ResolvedTopics, TopicConfig};
use crate::error::FleetError;
use crate::metrics::RobotMetricsSnapshot;
use crate::state::{RobotContext, RobotSnapshot};
use fleet_bus::{MessageCallback, Publisher, Transport};
use fleet_msgs::{
    BusMessage, GoalResult, Header, Odometry, Payload, Pose, PoseStamped, ResultCode, Time, Twist,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

/// 构造订阅回调：把总线消息转换为载荷类型后交给 `apply`
///
/// 类型不符的消息被丢弃并计数，不会修改状态。
fn route<T, F>(robot: &str, topic: &str, ctx: &Arc<RobotContext>, apply: F) -> Arc<dyn MessageCallback>
where
    T: Payload + 'static,
    F: Fn(&RobotContext, T) + Send + Sync + 'static,
{
    let robot = robot.to_string();
    let topic = topic.to_string();
    let ctx = Arc::clone(ctx);

    Arc::new(move |msg: &BusMessage| match T::try_from(msg.clone()) {
        Ok(payload) => apply(&ctx, payload),
        Err(e) => {
            ctx.metrics.rejected_messages.fetch_add(1, Ordering::Relaxed);
            warn!(robot = %robot, topic = %topic, error = %e, "dropping inbound message");
        },
    })
}

/// 单台机器人的句柄
///
/// # 通道
///
/// | 方向 | 默认地址 | 载荷 |
/// |------|----------|------|
/// | 入 | `/<name>/odom` | [`Odometry`] |
/// | 入 | `/<name>/move_base/result` | [`GoalResult`] |
/// | 出 | `/<name>/cmd_vel` | [`Twist`] |
/// | 出 | `/<name>/move_base_simple/goal` | [`PoseStamped`] |
///
/// # 目标生命周期
///
/// ```text
/// IDLE --send_goal_command--> GOAL_IN_FLIGHT --on_goal_result--> IDLE
/// ```
///
/// 在途时再次下发目标是允许的：重新置位标志并重新发布，不会取消前一个目标。
///
/// # 示例
///
/// ```rust
/// use fleet_bus::{LocalBus, Transport};
/// use fleet_driver::{RobotHandle, TopicConfig};
/// use fleet_msgs::Pose;
/// use std::sync::Arc;
///
/// let bus: Arc<dyn Transport> = Arc::new(LocalBus::new());
/// let robot = RobotHandle::new(bus, "robot_0", &TopicConfig::default()).unwrap();
///
/// robot.send_goal(Pose::planar(3.0, 7.0, 0.0)).unwrap();
/// assert!(robot.is_goal_in_flight());
/// ```
pub struct RobotHandle {
    name: String,
    topics: ResolvedTopics,
    goal_frame_id: String,
    goal_seq: AtomicU32,
    ctx: Arc<RobotContext>,
    velocity_pub: Publisher<Twist>,
    goal_pub: Publisher<PoseStamped>,
}

impl RobotHandle {
    /// 创建句柄并在总线上注册四个通道
    ///
    /// # 错误
    /// - `FleetError::Configuration`: 名称或任一话题后缀为空/格式错误（此时不注册任何通道）
    /// - `FleetError::Transport`: 后端注册失败
    pub fn new(
        transport: Arc<dyn Transport>,
        name: impl Into<String>,
        topics: &TopicConfig,
    ) -> Result<Self, FleetError> {
        let name = name.into();
        let resolved = topics.resolve(&name)?;
        let ctx = Arc::new(RobotContext::new());

        debug!(robot = %name, topic = %resolved.movement, "setting up velocity publisher");
        let velocity_pub = Publisher::advertise(Arc::clone(&transport), resolved.movement.clone())?;

        debug!(robot = %name, topic = %resolved.odom, "setting up odom subscriber");
        let odom_sub = transport.subscribe(
            &resolved.odom,
            Odometry::KIND,
            route(&name, &resolved.odom, &ctx, RobotContext::apply_pose),
        )?;

        debug!(
            robot = %name,
            goal = %resolved.goal_pub,
            result = %resolved.goal_result,
            "setting up goal control"
        );
        let result_sub = transport.subscribe(
            &resolved.goal_result,
            GoalResult::KIND,
            route(&name, &resolved.goal_result, &ctx, RobotContext::apply_goal_result),
        )?;
        let goal_pub = Publisher::advertise(transport, resolved.goal_pub.clone())?;
        debug!(robot = %name, odom = %odom_sub, result = %result_sub, "robot channels ready");

        Ok(Self {
            name,
            topics: resolved,
            goal_frame_id: "map".to_string(),
            goal_seq: AtomicU32::new(0),
            ctx,
            velocity_pub,
            goal_pub,
        })
    }

    /// 设置 `send_goal` 使用的坐标系（内部方法，由 FleetManager 调用）
    pub(crate) fn with_goal_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.goal_frame_id = frame_id.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 解析后的完整通道地址
    pub fn topics(&self) -> &ResolvedTopics {
        &self.topics
    }

    /// 发送速度指令（fire-and-forget）
    ///
    /// 不修改任何缓存状态。
    pub fn send_velocity_command(&self, cmd: Twist) -> Result<(), FleetError> {
        self.velocity_pub.publish(cmd)?;
        self.ctx.metrics.velocity_commands_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// 下发导航目标
    ///
    /// 先同步置位在途标志，再发布。发布失败时标志保持为 `true`，
    /// 调用方据此可知"已在途但可能未送达"。
    pub fn send_goal_command(&self, goal: PoseStamped) -> Result<(), FleetError> {
        if self.ctx.arm_goal() {
            warn!(robot = %self.name, "goal re-armed while previous goal still in flight");
        }

        info!(
            robot = %self.name,
            x = goal.pose.position.x,
            y = goal.pose.position.y,
            frame = %goal.header.frame_id,
            "dispatching goal"
        );
        self.goal_pub.publish(goal)?;
        self.ctx.metrics.goals_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// 以配置的坐标系和当前时间打上时间戳后下发目标
    pub fn send_goal(&self, pose: Pose) -> Result<(), FleetError> {
        let header = Header {
            seq: self.goal_seq.fetch_add(1, Ordering::Relaxed),
            stamp: Time::now(),
            frame_id: self.goal_frame_id.clone(),
        };
        self.send_goal_command(PoseStamped::new(header, pose))
    }

    /// 位姿回调：无条件覆盖缓存
    pub fn on_pose_update(&self, odom: Odometry) {
        self.ctx.apply_pose(odom);
    }

    /// 结果回调：写入结果码并清除在途标志
    pub fn on_goal_result(&self, result: GoalResult) {
        self.ctx.apply_goal_result(result);
    }

    /// 最近一次收到的里程计（可能过期；首次更新前为默认值）
    pub fn current_pose(&self) -> Odometry {
        self.ctx.current_pose()
    }

    /// 是否至少收到过一次位姿
    pub fn has_pose(&self) -> bool {
        self.ctx.has_pose()
    }

    /// 最近一次收到的结果码，未收到时为 [`ResultCode::NO_RESULT`]
    pub fn current_goal_status(&self) -> ResultCode {
        self.ctx.goal_status()
    }

    pub fn is_goal_in_flight(&self) -> bool {
        self.ctx.is_goal_in_flight()
    }

    /// 最近一次收到的完整结果消息
    pub fn last_goal_result(&self) -> Option<GoalResult> {
        self.ctx.goal_state().last_result
    }

    pub fn metrics(&self) -> RobotMetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    pub fn snapshot(&self) -> RobotSnapshot {
        let goal = self.ctx.goal_state();
        RobotSnapshot {
            name: self.name.clone(),
            has_pose: self.ctx.has_pose(),
            pose: self.ctx.current_pose().pose,
            goal_status: goal.status,
            goal_in_flight: goal.in_flight,
            metrics: self.metrics(),
        }
    }
}

impl std::fmt::Debug for RobotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotHandle")
            .field("name", &self.name)
            .field("topics", &self.topics)
            .field("goal_in_flight", &self.is_goal_in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_bus::{BusError, LocalBus, SubscriptionId};
    use fleet_msgs::{GoalStatusCode, MessageKind, Quaternion};
    use parking_lot::Mutex;
    use std::time::{Duration, Instant};

    /// 记录所有发布、不做投递的 Mock 传输
    #[derive(Default)]
    struct RecordingTransport {
        published: Mutex<Vec<(String, BusMessage)>>,
        subscribed: Mutex<Vec<(String, MessageKind, Arc<dyn MessageCallback>)>>,
        fail_publish: std::sync::atomic::AtomicBool,
    }

    impl Transport for RecordingTransport {
        fn publish(&self, topic: &str, msg: BusMessage) -> Result<(), BusError> {
            if self.fail_publish.load(Ordering::Relaxed) {
                return Err(BusError::Backend("link down".to_string()));
            }
            self.published.lock().push((topic.to_string(), msg));
            Ok(())
        }

        fn subscribe(
            &self,
            topic: &str,
            kind: MessageKind,
            callback: Arc<dyn MessageCallback>,
        ) -> Result<SubscriptionId, BusError> {
            let mut subscribed = self.subscribed.lock();
            subscribed.push((topic.to_string(), kind, callback));
            Ok(SubscriptionId(subscribed.len() as u64 - 1))
        }

        fn shutdown(&self) {}

        fn is_shutdown(&self) -> bool {
            false
        }
    }

    impl RecordingTransport {
        fn deliver(&self, topic: &str, msg: BusMessage) {
            let callbacks: Vec<_> = self
                .subscribed
                .lock()
                .iter()
                .filter(|(t, _, _)| t == topic)
                .map(|(_, _, cb)| cb.clone())
                .collect();
            for cb in callbacks {
                cb.on_message(&msg);
            }
        }
    }

    fn recording_robot() -> (Arc<RecordingTransport>, RobotHandle) {
        let transport = Arc::new(RecordingTransport::default());
        let robot = RobotHandle::new(transport.clone(), "robot_1", &TopicConfig::default()).unwrap();
        (transport, robot)
    }

    fn goal_at(x: f64, y: f64) -> PoseStamped {
        PoseStamped::new(
            Header::default(),
            Pose {
                position: fleet_msgs::Point::new(x, y, 0.0),
                orientation: Quaternion::IDENTITY,
            },
        )
    }

    #[test]
    fn test_registers_two_subscriptions() {
        let (transport, robot) = recording_robot();
        let subscribed = transport.subscribed.lock();
        let topics: Vec<_> = subscribed.iter().map(|(t, k, _)| (t.as_str(), *k)).collect();
        assert_eq!(
            topics,
            vec![
                ("/robot_1/odom", MessageKind::Odometry),
                ("/robot_1/move_base/result", MessageKind::GoalResult),
            ]
        );
        assert_eq!(robot.name(), "robot_1");
        assert_eq!(robot.topics().movement, "/robot_1/cmd_vel");
    }

    #[test]
    fn test_initial_state() {
        let (_transport, robot) = recording_robot();
        assert!(!robot.is_goal_in_flight());
        assert_eq!(robot.current_goal_status(), ResultCode::NO_RESULT);
        assert_eq!(robot.current_goal_status().code(), -5);
        assert!(robot.last_goal_result().is_none());
        assert!(!robot.has_pose());
    }

    #[test]
    fn test_velocity_command_goes_to_movement_topic() {
        let (transport, robot) = recording_robot();
        robot.send_velocity_command(Twist::planar(0.4, 0.1)).unwrap();

        let published = transport.published.lock();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "/robot_1/cmd_vel");
        assert_eq!(published[0].1, BusMessage::from(Twist::planar(0.4, 0.1)));
        assert!(!robot.is_goal_in_flight());
        assert_eq!(robot.metrics().velocity_commands_sent, 1);
    }

    #[test]
    fn test_goal_command_arms_and_publishes() {
        let (transport, robot) = recording_robot();
        robot.send_goal_command(goal_at(3.0, 7.0)).unwrap();

        assert!(robot.is_goal_in_flight());
        let published = transport.published.lock();
        assert_eq!(published[0].0, "/robot_1/move_base_simple/goal");
        assert_eq!(published[0].1, BusMessage::from(goal_at(3.0, 7.0)));
    }

    #[test]
    fn test_failed_publish_leaves_goal_in_flight() {
        let (transport, robot) = recording_robot();
        transport.fail_publish.store(true, Ordering::Relaxed);

        let err = robot.send_goal_command(goal_at(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, FleetError::Transport(BusError::Backend(_))));
        assert!(robot.is_goal_in_flight());
        assert_eq!(robot.metrics().goals_sent, 0);
    }

    #[test]
    fn test_send_goal_stamps_header() {
        let (transport, robot) = recording_robot();
        let robot = robot.with_goal_frame_id("odom");
        robot.send_goal(Pose::planar(1.0, 2.0, 0.0)).unwrap();
        robot.send_goal(Pose::planar(1.0, 2.0, 0.0)).unwrap();

        let published = transport.published.lock();
        let first = PoseStamped::try_from(published[0].1.clone()).unwrap();
        let second = PoseStamped::try_from(published[1].1.clone()).unwrap();
        assert_eq!(first.header.frame_id, "odom");
        assert!(!first.header.stamp.is_zero());
        assert_eq!(second.header.seq, first.header.seq + 1);
    }

    #[test]
    fn test_callbacks_update_state() {
        let (transport, robot) = recording_robot();
        robot.send_goal_command(goal_at(3.0, 7.0)).unwrap();

        transport.deliver(
            "/robot_1/odom",
            Odometry::at(Pose::planar(3.0, 7.0, 0.0)).into(),
        );
        transport.deliver(
            "/robot_1/move_base/result",
            GoalResult::with_code(GoalStatusCode::Succeeded).into(),
        );

        assert_eq!(robot.current_pose().pose.position.x, 3.0);
        assert_eq!(robot.current_goal_status(), ResultCode(3));
        assert!(!robot.is_goal_in_flight());
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let (transport, robot) = recording_robot();
        robot.send_goal_command(goal_at(0.0, 0.0)).unwrap();

        transport.deliver("/robot_1/move_base/result", Twist::stop().into());
        transport.deliver("/robot_1/odom", GoalResult::with_code(3u8).into());

        assert!(robot.is_goal_in_flight());
        assert_eq!(robot.current_goal_status(), ResultCode::NO_RESULT);
        assert!(!robot.has_pose());
        assert_eq!(robot.metrics().rejected_messages, 2);
    }

    #[test]
    fn test_invalid_topic_registers_nothing() {
        let transport = Arc::new(RecordingTransport::default());
        let topics = TopicConfig {
            goal_result_topic: String::new(),
            ..TopicConfig::default()
        };

        let err = RobotHandle::new(transport.clone(), "robot_0", &topics).unwrap_err();
        assert!(matches!(
            err,
            FleetError::Configuration {
                field: "goal_result_topic",
                ..
            }
        ));
        assert!(transport.subscribed.lock().is_empty());
    }

    #[test]
    fn test_local_bus_round_trip() {
        let bus: Arc<dyn Transport> = Arc::new(LocalBus::new());
        let robot = RobotHandle::new(bus.clone(), "robot_0", &TopicConfig::default()).unwrap();

        robot.send_goal(Pose::planar(1.0, 0.0, 0.0)).unwrap();
        bus.publish(
            "/robot_0/move_base/result",
            GoalResult::with_code(GoalStatusCode::Succeeded).into(),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while robot.is_goal_in_flight() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!robot.is_goal_in_flight());
        assert_eq!(robot.current_goal_status(), ResultCode(3));
    }
}
