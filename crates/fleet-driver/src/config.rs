//! 编队与通道命名配置

use crate::error::FleetError;
use fleet_msgs::topic::{self, DEFAULT_GOAL_PUB_TOPIC, DEFAULT_GOAL_RESULT_TOPIC};
use fleet_msgs::topic::{DEFAULT_MOVEMENT_TOPIC, DEFAULT_ODOM_TOPIC};

/// 每台机器人的话题后缀配置
///
/// 完整地址为 `/<robot_name>/<suffix>`。
///
/// ```
/// use fleet_driver::TopicConfig;
///
/// let topics = TopicConfig::default();
/// assert_eq!(topics.odom_topic, "odom");
/// assert_eq!(topics.goal_result_topic, "move_base/result");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TopicConfig {
    /// 里程计（位姿）订阅后缀
    pub odom_topic: String,
    /// 速度指令发布后缀
    pub movement_topic: String,
    /// 导航结果订阅后缀
    pub goal_result_topic: String,
    /// 导航目标发布后缀
    pub goal_pub_topic: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            odom_topic: DEFAULT_ODOM_TOPIC.to_string(),
            movement_topic: DEFAULT_MOVEMENT_TOPIC.to_string(),
            goal_result_topic: DEFAULT_GOAL_RESULT_TOPIC.to_string(),
            goal_pub_topic: DEFAULT_GOAL_PUB_TOPIC.to_string(),
        }
    }
}

impl TopicConfig {
    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("odom_topic", self.odom_topic.as_str()),
            ("movement_topic", self.movement_topic.as_str()),
            ("goal_result_topic", self.goal_result_topic.as_str()),
            ("goal_pub_topic", self.goal_pub_topic.as_str()),
        ]
    }

    /// 校验全部后缀
    pub fn validate(&self) -> Result<(), FleetError> {
        for (field, suffix) in self.fields() {
            topic::validate_suffix(suffix).map_err(|e| FleetError::configuration(field, e))?;
        }
        Ok(())
    }

    /// 以机器人名称为命名空间解析完整地址
    pub fn resolve(&self, name: &str) -> Result<ResolvedTopics, FleetError> {
        topic::validate_name(name).map_err(|e| FleetError::configuration("name", e))?;

        let [odom, movement, goal_result, goal_pub] = self.fields().map(|(field, suffix)| {
            topic::resolve(name, suffix).map_err(|e| FleetError::configuration(field, e))
        });
        Ok(ResolvedTopics {
            odom: odom?,
            movement: movement?,
            goal_result: goal_result?,
            goal_pub: goal_pub?,
        })
    }
}

/// 解析后的完整话题地址
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedTopics {
    pub odom: String,
    pub movement: String,
    pub goal_result: String,
    pub goal_pub: String,
}

/// 编队配置
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// 机器人数量（必须 > 0）
    pub count: usize,
    /// 名称前缀，机器人命名为 `<prefix>_<index>`
    pub name_prefix: String,
    /// `send_goal` 使用的目标坐标系
    pub goal_frame_id: String,
    /// 话题后缀
    pub topics: TopicConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            count: 5,
            name_prefix: "robot".to_string(),
            goal_frame_id: "map".to_string(),
            topics: TopicConfig::default(),
        }
    }
}

impl FleetConfig {
    /// 第 `index` 台机器人的名称
    pub fn robot_name(&self, index: usize) -> String {
        format!("{}_{}", self.name_prefix, index)
    }

    pub fn validate(&self) -> Result<(), FleetError> {
        if self.count == 0 {
            return Err(FleetError::InvalidConfiguration(
                "fleet size must be positive, got 0".to_string(),
            ));
        }
        if self.goal_frame_id.trim().is_empty() {
            return Err(FleetError::InvalidConfiguration(
                "goal_frame_id must not be empty".to_string(),
            ));
        }
        topic::validate_name(&self.name_prefix)
            .map_err(|e| FleetError::configuration("name_prefix", e))?;
        self.topics.validate()
    }
}
