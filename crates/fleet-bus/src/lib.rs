//! # Fleet Bus Layer
//!
//! 消息总线抽象层，提供统一的发布/订阅接口。
//!
//! - [`Transport`]: 传输后端 trait（注入到上层，生命周期显式管理）
//! - [`MessageCallback`]: 订阅回调 trait（在后端的投递线程上执行）
//! - [`Publisher`]: 绑定话题与载荷类型的发布端
//! - [`LocalBus`]: 进程内后端，每个订阅一个投递线程

use fleet_msgs::{BusMessage, MessageKind, TopicError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod local;
pub mod metrics;
pub mod publisher;

pub use local::{BusConfig, LocalBus};
pub use metrics::{BusMetrics, BusMetricsSnapshot};
pub use publisher::Publisher;

/// 总线层统一错误类型
#[derive(Error, Debug)]
pub enum BusError {
    #[error("Transport is shut down")]
    Shutdown,
    #[error("Message kind mismatch on '{topic}': registered {expected}, got {actual}")]
    KindMismatch {
        topic: String,
        expected: MessageKind,
        actual: MessageKind,
    },
    #[error("Invalid topic: {0}")]
    InvalidTopic(#[from] TopicError),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Failed to spawn delivery thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 订阅 ID（由后端分配，单个后端内唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// 消息回调 Trait
///
/// 在传输后端的投递线程上调用，可能与主线程及其他回调并发执行。
/// 实现者负责自身状态的同步。
///
/// 闭包 `Fn(&BusMessage) + Send + Sync` 自动实现此 trait：
///
/// ```rust
/// use fleet_bus::MessageCallback;
/// use fleet_msgs::BusMessage;
/// use std::sync::Arc;
///
/// let callback: Arc<dyn MessageCallback> = Arc::new(|msg: &BusMessage| {
///     println!("received {}", msg.kind());
/// });
/// ```
pub trait MessageCallback: Send + Sync {
    fn on_message(&self, msg: &BusMessage);
}

impl<F> MessageCallback for F
where
    F: Fn(&BusMessage) + Send + Sync,
{
    fn on_message(&self, msg: &BusMessage) {
        self(msg)
    }
}

/// 传输后端
///
/// 话题地址为完整路径（如 `/robot_0/odom`）。同一话题只能承载一种 [`MessageKind`]。
pub trait Transport: Send + Sync {
    /// 注册发布通道
    ///
    /// 默认实现不做任何事（无需预注册的后端）。
    fn advertise(&self, _topic: &str, _kind: MessageKind) -> Result<(), BusError> {
        Ok(())
    }

    /// 发布消息（fire-and-forget，无确认）
    fn publish(&self, topic: &str, msg: BusMessage) -> Result<(), BusError>;

    /// 注册订阅，回调在后端的投递线程上执行
    fn subscribe(
        &self,
        topic: &str,
        kind: MessageKind,
        callback: Arc<dyn MessageCallback>,
    ) -> Result<SubscriptionId, BusError>;

    /// 停止投递并释放后端资源（幂等）
    fn shutdown(&self);

    /// 是否已关闭
    fn is_shutdown(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_display() {
        assert_eq!(BusError::Shutdown.to_string(), "Transport is shut down");

        let err = BusError::KindMismatch {
            topic: "/robot_0/odom".to_string(),
            expected: MessageKind::Odometry,
            actual: MessageKind::Twist,
        };
        let msg = err.to_string();
        assert!(msg.contains("/robot_0/odom") && msg.contains("Odometry") && msg.contains("Twist"));

        let err = BusError::from(TopicError::Empty);
        assert!(matches!(err, BusError::InvalidTopic(TopicError::Empty)));
    }

    #[test]
    fn test_closure_callback() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: Arc<dyn MessageCallback> = Arc::new(move |_: &BusMessage| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        });

        callback.on_message(&BusMessage::from(fleet_msgs::Twist::stop()));
        callback.on_message(&BusMessage::from(fleet_msgs::Twist::stop()));
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }
}
