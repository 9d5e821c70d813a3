//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use fleet_sdk::prelude::*;
//! ```

// 驱动层（推荐入口）
pub use crate::driver::{CancelToken, FleetBuilder, FleetConfig, FleetManager, RobotHandle, TopicConfig};

// 传输层
pub use crate::bus::{LocalBus, Transport};

// 消息类型
pub use crate::msgs::{
    GoalResult, GoalStatusCode, Odometry, Point, Pose, PoseStamped, Quaternion, ResultCode, Twist,
};

// 错误类型
pub use crate::bus::BusError;
pub use crate::driver::FleetError;
