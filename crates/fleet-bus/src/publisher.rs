//! 类型化发布端

use crate::{BusError, Transport};
use fleet_msgs::Payload;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// 绑定话题和载荷类型的发布端
///
/// 创建时向后端注册（advertise）话题，之后只能发布类型 `T` 的消息。
///
/// ```rust
/// use fleet_bus::{LocalBus, Publisher, Transport};
/// use fleet_msgs::Twist;
/// use std::sync::Arc;
///
/// let bus: Arc<dyn Transport> = Arc::new(LocalBus::new());
/// let publisher = Publisher::<Twist>::advertise(bus, "/robot_0/cmd_vel").unwrap();
/// publisher.publish(Twist::planar(0.2, 0.0)).unwrap();
/// ```
pub struct Publisher<T> {
    topic: String,
    transport: Arc<dyn Transport>,
    _payload: PhantomData<fn(T)>,
}

impl<T: Payload> Publisher<T> {
    pub fn advertise(
        transport: Arc<dyn Transport>,
        topic: impl Into<String>,
    ) -> Result<Self, BusError> {
        let topic = topic.into();
        transport.advertise(&topic, T::KIND)?;
        debug!(topic = %topic, kind = %T::KIND, "advertised publisher");

        Ok(Self {
            topic,
            transport,
            _payload: PhantomData,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 发布消息，后端错误原样返回
    pub fn publish(&self, msg: T) -> Result<(), BusError> {
        debug!(topic = %self.topic, kind = %T::KIND, "publish");
        self.transport.publish(&self.topic, msg.into())
    }
}

impl<T> std::fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher").field("topic", &self.topic).finish()
    }
}
