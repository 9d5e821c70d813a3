//! 消息层错误类型定义

use crate::MessageKind;
use thiserror::Error;

/// 消息转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MsgError {
    /// 消息类型与期望不符
    #[error("Unexpected message kind: expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: MessageKind,
        actual: MessageKind,
    },
}

/// 话题命名错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
    /// 话题或名称为空
    #[error("Topic name is empty")]
    Empty,

    /// 存在空段（前导/末尾 `/` 或 `//`）
    #[error("Empty segment in topic '{0}'")]
    EmptySegment(String),

    /// 段以数字开头
    #[error("Segment starts with a digit in topic '{0}'")]
    LeadingDigit(String),

    /// 非法字符
    #[error("Invalid character {ch:?} in topic '{topic}'")]
    InvalidChar { topic: String, ch: char },

    /// 完整话题地址缺少前导 `/`
    #[error("Topic must be absolute: '{0}'")]
    NotAbsolute(String),

    /// 机器人名称包含多段
    #[error("Robot name must be a single segment: '{0}'")]
    NestedName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MsgError::UnexpectedKind {
            expected: MessageKind::Odometry,
            actual: MessageKind::Twist,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected message kind: expected Odometry, got Twist"
        );

        let err = TopicError::InvalidChar {
            topic: "cmd vel".to_string(),
            ch: ' ',
        };
        assert!(err.to_string().contains("cmd vel"));
        assert_eq!(TopicError::Empty.to_string(), "Topic name is empty");
    }
}
