//! 单机器人状态缓存
//!
//! # 同步机制
//!
//! | 字段 | 写入方 | 机制 |
//! |------|--------|------|
//! | `pose` | 位姿回调线程 | `ArcSwap`（无锁，最后写入者胜出） |
//! | `goal` | 主线程（下发目标）/ 结果回调线程 | `parking_lot::Mutex`（状态码与在途标志成对更新） |
//! | `metrics` | 各线程 | `AtomicU64` |
//!
//! 位姿更新与结果更新写入互不相交的字段，因此两类回调的执行顺序可以任意交错。
//! 不做时间戳排序：回调按到达顺序覆盖，读到的是"最后到达"的值，而非"最新产生"的值。

use crate::metrics::{RobotMetrics, RobotMetricsSnapshot};
use arc_swap::ArcSwap;
use fleet_msgs::{GoalResult, Odometry, Pose, ResultCode};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// 导航目标状态
#[derive(Debug, Clone, PartialEq)]
pub struct GoalState {
    /// 最近一次收到的结果码，未收到时为 [`ResultCode::NO_RESULT`]
    pub status: ResultCode,
    /// 是否有目标在途（已下发、尚未收到结果）
    pub in_flight: bool,
    /// 最近一次收到的完整结果消息
    pub last_result: Option<GoalResult>,
}

impl Default for GoalState {
    fn default() -> Self {
        Self {
            status: ResultCode::NO_RESULT,
            in_flight: false,
            last_result: None,
        }
    }
}

/// 单机器人共享状态上下文
///
/// 由 `RobotHandle` 和它的两个订阅回调共同持有（`Arc`），
/// 不与其他机器人共享。
#[derive(Debug, Default)]
pub struct RobotContext {
    /// 最近一次收到的里程计（首次更新前为默认值）
    pub pose: ArcSwap<Odometry>,
    /// 导航目标状态
    pub goal: Mutex<GoalState>,
    /// 指标
    pub metrics: RobotMetrics,
}

impl RobotContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 覆盖位姿缓存（最后写入者胜出）
    pub fn apply_pose(&self, odom: Odometry) {
        self.pose.store(Arc::new(odom));
        self.metrics.poses_received.fetch_add(1, Ordering::Relaxed);
    }

    /// 写入导航结果并清除在途标志
    ///
    /// 这是在途标志回到 `false` 的唯一路径。重复应用同一结果是幂等的。
    pub fn apply_goal_result(&self, result: GoalResult) {
        {
            let mut goal = self.goal.lock();
            goal.status = result.code();
            goal.last_result = Some(result);
            goal.in_flight = false;
        }
        self.metrics.goal_results_received.fetch_add(1, Ordering::Relaxed);
    }

    /// 置位在途标志，返回置位前的值
    pub fn arm_goal(&self) -> bool {
        std::mem::replace(&mut self.goal.lock().in_flight, true)
    }

    pub fn current_pose(&self) -> Odometry {
        self.pose.load().as_ref().clone()
    }

    pub fn goal_status(&self) -> ResultCode {
        self.goal.lock().status
    }

    pub fn is_goal_in_flight(&self) -> bool {
        self.goal.lock().in_flight
    }

    /// 导航目标状态的一致快照（状态码与在途标志来自同一时刻）
    pub fn goal_state(&self) -> GoalState {
        self.goal.lock().clone()
    }

    /// 是否至少收到过一次位姿
    pub fn has_pose(&self) -> bool {
        self.metrics.poses_received.load(Ordering::Relaxed) > 0
    }
}

/// 单机器人状态快照（用于展示和序列化）
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RobotSnapshot {
    pub name: String,
    pub has_pose: bool,
    pub pose: Pose,
    pub goal_status: ResultCode,
    pub goal_in_flight: bool,
    pub metrics: RobotMetricsSnapshot,
}
