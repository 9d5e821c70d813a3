//! 驱动层错误类型定义

use fleet_bus::BusError;
use fleet_msgs::TopicError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum FleetError {
    /// 通道命名配置无效（话题后缀或机器人名称为空/格式错误）
    #[error("Configuration error in `{field}`: {source}")]
    Configuration {
        field: &'static str,
        #[source]
        source: TopicError,
    },

    /// 编队配置无效（如机器人数量为 0）
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 按索引查找越界
    #[error("Index {index} out of range for fleet of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// 按名称查找失败
    #[error("Robot not found: {0}")]
    NotFound(String),

    /// 传输层错误（原样透传）
    #[error("Transport error: {0}")]
    Transport(#[from] BusError),
}

impl FleetError {
    pub(crate) fn configuration(field: &'static str, source: TopicError) -> Self {
        Self::Configuration { field, source }
    }
}
