//! 单机器人指标
//!
//! 原子计数器，回调线程写、任意线程读，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 单机器人实时指标
#[derive(Debug, Default)]
pub struct RobotMetrics {
    /// 收到的位姿更新数
    pub poses_received: AtomicU64,
    /// 收到的导航结果数
    pub goal_results_received: AtomicU64,
    /// 成功发布的导航目标数
    pub goals_sent: AtomicU64,
    /// 成功发布的速度指令数
    pub velocity_commands_sent: AtomicU64,
    /// 类型不符被丢弃的入站消息数
    pub rejected_messages: AtomicU64,
}

impl RobotMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RobotMetricsSnapshot {
        RobotMetricsSnapshot {
            poses_received: self.poses_received.load(Ordering::Relaxed),
            goal_results_received: self.goal_results_received.load(Ordering::Relaxed),
            goals_sent: self.goals_sent.load(Ordering::Relaxed),
            velocity_commands_sent: self.velocity_commands_sent.load(Ordering::Relaxed),
            rejected_messages: self.rejected_messages.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（不可变，用于读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RobotMetricsSnapshot {
    pub poses_received: u64,
    pub goal_results_received: u64,
    pub goals_sent: u64,
    pub velocity_commands_sent: u64,
    pub rejected_messages: u64,
}
