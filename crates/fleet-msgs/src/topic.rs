//! 话题命名规则
//!
//! 每台机器人的通道地址为 `/<name>/<suffix>`：
//! - `name`：单段名称（如 `robot_0`）
//! - `suffix`：一段或多段，以 `/` 分隔（如 `move_base/result`）
//!
//! 每一段只能包含 ASCII 字母、数字、下划线，且不能以数字开头。

use crate::error::TopicError;

/// 默认里程计话题后缀
pub const DEFAULT_ODOM_TOPIC: &str = "odom";
/// 默认速度指令话题后缀
pub const DEFAULT_MOVEMENT_TOPIC: &str = "cmd_vel";
/// 默认导航结果话题后缀
pub const DEFAULT_GOAL_RESULT_TOPIC: &str = "move_base/result";
/// 默认导航目标话题后缀
pub const DEFAULT_GOAL_PUB_TOPIC: &str = "move_base_simple/goal";

fn validate_segment(full: &str, segment: &str) -> Result<(), TopicError> {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return Err(TopicError::EmptySegment(full.to_string()));
    };

    if first.is_ascii_digit() {
        return Err(TopicError::LeadingDigit(full.to_string()));
    }

    if let Some(bad) = segment.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(TopicError::InvalidChar {
            topic: full.to_string(),
            ch: bad,
        });
    }

    Ok(())
}

/// 校验话题后缀（允许多段）
///
/// ```rust
/// use fleet_msgs::topic::validate_suffix;
///
/// assert!(validate_suffix("move_base/result").is_ok());
/// assert!(validate_suffix("").is_err());
/// assert!(validate_suffix("/odom").is_err());
/// ```
pub fn validate_suffix(suffix: &str) -> Result<(), TopicError> {
    if suffix.is_empty() {
        return Err(TopicError::Empty);
    }

    suffix.split('/').try_for_each(|segment| validate_segment(suffix, segment))
}

/// 校验机器人名称（命名空间，仅允许单段）
pub fn validate_name(name: &str) -> Result<(), TopicError> {
    if name.is_empty() {
        return Err(TopicError::Empty);
    }

    validate_segment(name, name).map_err(|e| match e {
        TopicError::InvalidChar { ch: '/', .. } => TopicError::NestedName(name.to_string()),
        other => other,
    })
}

/// 校验完整话题地址（必须以 `/` 开头）
pub fn validate_topic(topic: &str) -> Result<(), TopicError> {
    match topic.strip_prefix('/') {
        Some(rest) => validate_suffix(rest),
        None => Err(TopicError::NotAbsolute(topic.to_string())),
    }
}

/// 解析完整话题地址：`/<name>/<suffix>`
pub fn resolve(name: &str, suffix: &str) -> Result<String, TopicError> {
    validate_name(name)?;
    validate_suffix(suffix)?;
    Ok(format!("/{name}/{suffix}"))
}
