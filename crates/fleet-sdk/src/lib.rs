//! Fleet SDK - 多机器人编队状态跟踪
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **消息层** (`msgs`): 载荷类型、状态码、话题命名规则
//! - **传输层** (`bus`): 发布/订阅抽象与进程内后端
//! - **驱动层** (`driver`): 单机器人句柄、编队管理、取消信号
//!
//! # 快速开始
//!
//! ```rust
//! use fleet_sdk::prelude::*;
//!
//! let fleet = FleetBuilder::new().count(5).build().unwrap();
//! let robot = fleet.handle_at(1).unwrap();
//! robot.send_goal(Pose::planar(3.0, 7.0, 0.0)).unwrap();
//! assert!(robot.is_goal_in_flight());
//! ```

pub use fleet_bus as bus;
pub use fleet_driver as driver;
pub use fleet_msgs as msgs;

pub mod prelude;

// --- 常用类型 ---
pub use fleet_bus::{BusError, LocalBus, Transport};
pub use fleet_driver::{CancelToken, FleetBuilder, FleetError, FleetManager, RobotHandle};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// 初始化日志输出
///
/// 默认级别为 `info`，可通过 `RUST_LOG` 覆盖。重复调用是安全的（只有第一次生效）。
pub fn init_logger() {
    // 没有额外指令时不会解析失败
    let _ = init_logger_with(&[]);
}

/// 初始化日志输出，并在环境过滤器之上追加指令（如 `"fleet_cli=info"`）
///
/// # 错误
/// 任一指令格式错误时返回 `ParseError`，此时不安装任何订阅器。
pub fn init_logger_with(directives: &[&str]) -> Result<(), ParseError> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    for directive in directives {
        filter = filter.add_directive(directive.parse()?);
    }
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!(?directives, "logger initialized");
    }
    Ok(())
}
