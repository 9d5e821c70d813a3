//! # Fleet Messages
//!
//! 多机器人编队的消息定义（无传输层依赖）
//!
//! ## 模块
//!
//! - `geometry`: 几何类型（点、四元数、位姿、速度）
//! - `nav`: 消息头、带时间戳位姿、里程计
//! - `goal`: 导航目标结果与状态码
//! - `topic`: 话题命名规则与默认后缀

pub mod error;
pub mod geometry;
pub mod goal;
pub mod nav;
pub mod topic;

// 重新导出常用类型
pub use error::{MsgError, TopicError};
pub use geometry::*;
pub use goal::*;
pub use nav::*;

use std::fmt;

/// 消息类型标签
///
/// 传输层用它校验同一话题上的消息类型一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    Odometry,
    Twist,
    PoseStamped,
    GoalResult,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 总线消息的统一封装
///
/// # 设计目的
///
/// `BusMessage` 是消息层和传输层之间的中间抽象：
/// - 传输层（`fleet-bus`）只搬运 `BusMessage`，不关心具体载荷
/// - 上层通过 `TryFrom<BusMessage>` 取回具体类型，类型不符时返回 [`MsgError`]
///
/// ```rust
/// use fleet_msgs::{BusMessage, MessageKind, Twist};
///
/// let msg = BusMessage::from(Twist::planar(0.3, 0.0));
/// assert_eq!(msg.kind(), MessageKind::Twist);
///
/// let twist = Twist::try_from(msg).unwrap();
/// assert_eq!(twist.linear.x, 0.3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusMessage {
    Odometry(Odometry),
    Twist(Twist),
    PoseStamped(PoseStamped),
    GoalResult(GoalResult),
}

impl BusMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Odometry(_) => MessageKind::Odometry,
            Self::Twist(_) => MessageKind::Twist,
            Self::PoseStamped(_) => MessageKind::PoseStamped,
            Self::GoalResult(_) => MessageKind::GoalResult,
        }
    }
}

/// 载荷类型与 [`MessageKind`] 的静态绑定
pub trait Payload: Into<BusMessage> + TryFrom<BusMessage, Error = MsgError> {
    const KIND: MessageKind;
}

macro_rules! impl_payload {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for BusMessage {
                fn from(msg: $ty) -> Self {
                    BusMessage::$ty(msg)
                }
            }

            impl TryFrom<BusMessage> for $ty {
                type Error = MsgError;

                fn try_from(msg: BusMessage) -> Result<Self, Self::Error> {
                    match msg {
                        BusMessage::$ty(inner) => Ok(inner),
                        other => Err(MsgError::UnexpectedKind {
                            expected: MessageKind::$ty,
                            actual: other.kind(),
                        }),
                    }
                }
            }

            impl Payload for $ty {
                const KIND: MessageKind = MessageKind::$ty;
            }
        )*
    };
}

impl_payload!(Odometry, Twist, PoseStamped, GoalResult);
