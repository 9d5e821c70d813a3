//! 导航目标结果消息与状态码
//!
//! 状态码由机器人端的导航子系统定义，核心层只做透传：
//! 已知状态码映射到 [`GoalStatusCode`]，未知状态码原样保留在 [`ResultCode`] 中。

use crate::nav::Header;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 导航子系统的目标状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GoalStatusCode {
    /// 已接收，尚未处理
    Pending = 0,
    /// 正在执行
    Active = 1,
    /// 执行中被取消
    Preempted = 2,
    /// 成功到达
    Succeeded = 3,
    /// 执行失败
    Aborted = 4,
    /// 被拒绝（目标不可达等）
    Rejected = 5,
    /// 正在取消
    Preempting = 6,
    /// 执行前正在撤回
    Recalling = 7,
    /// 执行前已撤回
    Recalled = 8,
    /// 目标丢失
    Lost = 9,
}

impl GoalStatusCode {
    /// 是否为终态（目标已结束，不会再有状态变化）
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Preempted
                | Self::Succeeded
                | Self::Aborted
                | Self::Rejected
                | Self::Recalled
                | Self::Lost
        )
    }
}

/// 缓存的目标结果码
///
/// 使用 `i32` 存储，以便容纳哨兵值 [`ResultCode::NO_RESULT`]（-5）
/// 以及导航子系统可能返回的未知状态码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResultCode(pub i32);

impl ResultCode {
    /// 哨兵值：尚未收到任何结果
    pub const NO_RESULT: Self = Self(-5);

    /// 原始数值
    pub fn code(self) -> i32 {
        self.0
    }

    /// 是否为哨兵值
    pub fn is_no_result(self) -> bool {
        self == Self::NO_RESULT
    }

    /// 解析为已知状态码
    ///
    /// 哨兵值和未知值返回 `None`。
    pub fn status(self) -> Option<GoalStatusCode> {
        u8::try_from(self.0)
            .ok()
            .and_then(|raw| GoalStatusCode::try_from(raw).ok())
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        Self::NO_RESULT
    }
}

impl From<GoalStatusCode> for ResultCode {
    fn from(code: GoalStatusCode) -> Self {
        Self(u8::from(code) as i32)
    }
}

impl From<u8> for ResultCode {
    fn from(raw: u8) -> Self {
        Self(raw as i32)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{} ({:?})", self.0, status),
            None if self.is_no_result() => write!(f, "{} (NoResult)", self.0),
            None => write!(f, "{} (Unknown)", self.0),
        }
    }
}

/// 目标状态（目标 ID + 状态码 + 描述文本）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalStatus {
    pub goal_id: String,
    pub status: u8,
    pub text: String,
}

/// 导航目标结果消息
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalResult {
    pub header: Header,
    pub status: GoalStatus,
}

impl GoalResult {
    /// 以给定状态码构造结果（测试、仿真常用）
    ///
    /// ```rust
    /// use fleet_msgs::{GoalResult, GoalStatusCode, ResultCode};
    ///
    /// let result = GoalResult::with_code(GoalStatusCode::Succeeded);
    /// assert_eq!(result.code(), ResultCode(3));
    /// ```
    pub fn with_code(code: impl Into<u8>) -> Self {
        Self {
            header: Header::default(),
            status: GoalStatus {
                status: code.into(),
                ..GoalStatus::default()
            },
        }
    }

    /// 结果码
    pub fn code(&self) -> ResultCode {
        ResultCode::from(self.status.status)
    }
}
