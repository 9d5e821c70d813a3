//! Builder 模式实现
//!
//! 提供链式构造 `FleetManager` 实例的便捷方式。

use crate::config::{FleetConfig, TopicConfig};
use crate::error::FleetError;
use crate::fleet::FleetManager;
use fleet_bus::{BusConfig, LocalBus, Transport};
use std::sync::Arc;

/// FleetManager Builder（链式构造）
///
/// 未注入传输层时，使用 `bus_config` 新建一个 [`LocalBus`]。
///
/// # Example
///
/// ```rust
/// use fleet_driver::FleetBuilder;
///
/// let fleet = FleetBuilder::new()
///     .count(3)
///     .name_prefix("tb3")
///     .goal_frame_id("odom")
///     .build()
///     .unwrap();
///
/// assert_eq!(fleet.names(), vec!["tb3_0", "tb3_1", "tb3_2"]);
/// ```
#[derive(Default)]
pub struct FleetBuilder {
    config: FleetConfig,
    transport: Option<Arc<dyn Transport>>,
    bus_config: BusConfig,
}

impl FleetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换编队配置（之后的链式调用仍可覆盖单个字段）
    pub fn config(mut self, config: FleetConfig) -> Self {
        self.config = config;
        self
    }

    /// 机器人数量（默认 5）
    pub fn count(mut self, count: usize) -> Self {
        self.config.count = count;
        self
    }

    /// 名称前缀（默认 `robot`）
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.name_prefix = prefix.into();
        self
    }

    pub fn topics(mut self, topics: TopicConfig) -> Self {
        self.config.topics = topics;
        self
    }

    /// `send_goal` 使用的坐标系（默认 `map`）
    pub fn goal_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.config.goal_frame_id = frame_id.into();
        self
    }

    /// 注入已有的传输层（可选）
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 默认 `LocalBus` 的配置（注入传输层时忽略）
    pub fn bus_config(mut self, config: BusConfig) -> Self {
        self.bus_config = config;
        self
    }

    /// 构建 FleetManager
    ///
    /// # Errors
    /// - `FleetError::InvalidConfiguration` / `FleetError::Configuration`: 配置无效
    /// - `FleetError::Transport`: 通道注册失败
    pub fn build(self) -> Result<FleetManager, FleetError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(LocalBus::with_config(self.bus_config)),
        };
        FleetManager::with_config(transport, self.config)
    }
}

impl std::fmt::Debug for FleetBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetBuilder")
            .field("config", &self.config)
            .field("has_transport", &self.transport.is_some())
            .field("bus_config", &self.bus_config)
            .finish()
    }
}
