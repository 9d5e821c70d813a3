//! 导航相关消息：带时间戳的位姿、里程计

use crate::geometry::{Pose, Twist};
use std::time::{SystemTime, UNIX_EPOCH};

/// 消息时间戳（秒 + 纳秒）
///
/// **注意**：这是发送方的墙上时间，核心层不依赖它做任何排序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    pub secs: u32,
    pub nsecs: u32,
}

impl Time {
    /// 当前系统时间
    ///
    /// 系统时钟早于 UNIX 纪元时返回零时间戳。
    pub fn now() -> Self {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Self {
            secs: elapsed.as_secs() as u32,
            nsecs: elapsed.subsec_nanos(),
        }
    }

    /// 是否为零时间戳（未填写）
    pub fn is_zero(&self) -> bool {
        self.secs == 0 && self.nsecs == 0
    }
}

/// 消息头：序号、时间戳、坐标系
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub seq: u32,
    pub stamp: Time,
    pub frame_id: String,
}

impl Header {
    /// 以当前时间创建指定坐标系的消息头
    pub fn stamped(frame_id: impl Into<String>) -> Self {
        Self {
            seq: 0,
            stamp: Time::now(),
            frame_id: frame_id.into(),
        }
    }
}

/// 带坐标系/时间上下文的位姿（导航目标指令）
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

impl PoseStamped {
    pub fn new(header: Header, pose: Pose) -> Self {
        Self { header, pose }
    }
}

/// 里程计反馈
///
/// 核心层只消费 `pose` 子结构；`twist` 等字段原样缓存，供调用方读取。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Odometry {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: Pose,
    pub twist: Twist,
}

impl Odometry {
    /// 以给定位姿构造里程计消息（速度为零）
    pub fn at(pose: Pose) -> Self {
        Self {
            pose,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_time_is_zero() {
        assert!(Time::default().is_zero());
        assert!(!Time::now().is_zero());
    }

    #[test]
    fn test_header_stamped() {
        let header = Header::stamped("map");
        assert_eq!(header.frame_id, "map");
        assert_eq!(header.seq, 0);
        assert!(!header.stamp.is_zero());
    }

    #[test]
    fn test_odometry_at() {
        let odom = Odometry::at(Pose::planar(1.0, 2.0, 0.0));
        assert_eq!(odom.pose.position.y, 2.0);
        assert_eq!(odom.twist, Twist::default());
        assert!(odom.header.frame_id.is_empty());
    }
}
