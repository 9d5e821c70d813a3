//! 编队管理
//!
//! `FleetManager` 独占所有 `RobotHandle`，调用方通过索引或名称借用。

use crate::cancel::CancelToken;
use crate::config::FleetConfig;
use crate::error::FleetError;
use crate::robot::RobotHandle;
use crate::state::RobotSnapshot;
use fleet_bus::{BusError, Transport};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// 编队管理器
///
/// 启动时按 `<prefix>_0 … <prefix>_{count-1}` 创建全部句柄，此后集合不再变化。
///
/// ```rust
/// use fleet_bus::{LocalBus, Transport};
/// use fleet_driver::FleetManager;
/// use std::sync::Arc;
///
/// let bus: Arc<dyn Transport> = Arc::new(LocalBus::new());
/// let fleet = FleetManager::new(bus, 3).unwrap();
///
/// assert_eq!(fleet.len(), 3);
/// assert_eq!(fleet.handle_at(2).unwrap().name(), "robot_2");
/// assert!(fleet.handle_at(3).is_err());
/// ```
pub struct FleetManager {
    transport: Arc<dyn Transport>,
    config: FleetConfig,
    handles: Vec<RobotHandle>,
    index: HashMap<String, usize>,
}

impl FleetManager {
    /// 以默认配置创建 `count` 台机器人
    ///
    /// # 错误
    /// - `FleetError::InvalidConfiguration`: `count == 0`
    pub fn new(transport: Arc<dyn Transport>, count: usize) -> Result<Self, FleetError> {
        Self::with_config(
            transport,
            FleetConfig {
                count,
                ..FleetConfig::default()
            },
        )
    }

    /// 以完整配置创建编队
    ///
    /// 先校验全部配置再注册通道：任何配置错误都不会在总线上留下半个编队。
    pub fn with_config(transport: Arc<dyn Transport>, config: FleetConfig) -> Result<Self, FleetError> {
        config.validate()?;
        if transport.is_shutdown() {
            return Err(BusError::Shutdown.into());
        }

        let mut handles = Vec::with_capacity(config.count);
        let mut index = HashMap::with_capacity(config.count);

        for i in 0..config.count {
            let name = config.robot_name(i);
            let handle = RobotHandle::new(Arc::clone(&transport), name.clone(), &config.topics)?
                .with_goal_frame_id(config.goal_frame_id.clone());
            debug!(robot = %name, index = i, "robot handle created");
            index.insert(name, i);
            handles.push(handle);
        }

        info!(
            count = config.count,
            prefix = %config.name_prefix,
            "fleet initialized"
        );

        Ok(Self {
            transport,
            config,
            handles,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 按索引借用句柄
    ///
    /// # 错误
    /// - `FleetError::IndexOutOfRange`: `index >= len()`
    pub fn handle_at(&self, index: usize) -> Result<&RobotHandle, FleetError> {
        self.handles.get(index).ok_or(FleetError::IndexOutOfRange {
            index,
            len: self.handles.len(),
        })
    }

    /// 按名称借用句柄
    ///
    /// # 错误
    /// - `FleetError::NotFound`: 名称不存在
    pub fn handle_by_name(&self, name: &str) -> Result<&RobotHandle, FleetError> {
        self.index
            .get(name)
            .map(|&i| &self.handles[i])
            .ok_or_else(|| FleetError::NotFound(name.to_string()))
    }

    /// 按索引顺序遍历全部句柄
    pub fn handles(&self) -> impl ExactSizeIterator<Item = &RobotHandle> {
        self.handles.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(RobotHandle::name).collect()
    }

    /// 全部句柄的快照（索引顺序）
    pub fn snapshot(&self) -> Vec<RobotSnapshot> {
        self.handles.iter().map(RobotHandle::snapshot).collect()
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// 阻塞直到 `cancel` 被触发，然后关闭传输层
    ///
    /// 返回后不再有回调被调用；缓存状态仍可读取。
    ///
    /// # 错误
    /// - `FleetError::Transport(BusError::Shutdown)`: 进入时传输层已关闭
    pub fn run(&self, cancel: &CancelToken) -> Result<(), FleetError> {
        if self.transport.is_shutdown() {
            return Err(BusError::Shutdown.into());
        }

        info!(count = self.handles.len(), "fleet running, waiting for cancellation");
        cancel.wait();
        info!("cancellation received, shutting down transport");
        self.shutdown();
        Ok(())
    }

    /// 关闭传输层（幂等）
    pub fn shutdown(&self) {
        self.transport.shutdown();
    }
}

impl std::fmt::Debug for FleetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetManager")
            .field("config", &self.config)
            .field("handles", &self.handles)
            .finish()
    }
}
