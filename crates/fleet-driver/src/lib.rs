//! 驱动层模块
//!
//! 本模块提供多机器人编队的状态跟踪功能，包括：
//! - 单机器人句柄（两入两出四个通道）
//! - 状态缓存（位姿 ArcSwap 无锁读取，目标状态成对加锁）
//! - 编队管理（按索引/名称查找，阻塞运行直到取消）
//! - 配置与指标
//!
//! # 使用场景
//!
//! 大多数用户应该通过 `fleet-sdk` 使用本模块。

mod builder;
pub mod cancel;
pub mod config;
mod error;
mod fleet;
pub mod metrics;
mod robot;
pub mod state;

pub use builder::FleetBuilder;
pub use cancel::CancelToken;
pub use config::{FleetConfig, ResolvedTopics, TopicConfig};
pub use error::FleetError;
pub use fleet::FleetManager;
pub use metrics::{RobotMetrics, RobotMetricsSnapshot};
pub use robot::RobotHandle;
pub use state::{GoalState, RobotContext, RobotSnapshot};
