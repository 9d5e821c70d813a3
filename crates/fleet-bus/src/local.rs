//! 进程内消息总线
//!
//! 每个订阅拥有一个有界队列和一个独立的投递线程：
//! - `publish` 把消息放进每个订阅者的队列（非阻塞）
//! - 投递线程从队列取出消息并调用回调
//! - 队列满时丢弃最旧的消息，保留最新的（newest-wins）
//!
//! 同一话题内的消息按发布顺序投递；不同话题、不同订阅之间没有顺序保证。

use crate::metrics::{BusMetrics, BusMetricsSnapshot};
use crate::{BusError, MessageCallback, SubscriptionId, Transport};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use fleet_msgs::topic::validate_topic;
use fleet_msgs::{BusMessage, MessageKind};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// LocalBus 配置
///
/// ```
/// use fleet_bus::BusConfig;
///
/// let config = BusConfig::default();
/// assert_eq!(config.queue_size, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// 每个订阅的队列容量（最小为 1）
    pub queue_size: usize,
    /// 关闭时等待每个投递线程退出的超时（毫秒）
    pub join_timeout_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_size: 16,
            join_timeout_ms: 2000,
        }
    }
}

/// Extension trait for timeout-capable thread joins
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        // Watchdog thread joins the target and reports back
        std::thread::spawn(move || {
            let _ = tx.send(self.join().map(|_| ()));
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result,
            Err(_) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Thread join timeout",
            ))),
        }
    }
}

struct SubscriberSlot {
    id: SubscriptionId,
    tx: Sender<BusMessage>,
    /// 队列接收端的克隆，仅用于队列满时弹出最旧消息
    overflow_rx: Receiver<BusMessage>,
}

struct TopicEntry {
    kind: MessageKind,
    subscribers: Vec<SubscriberSlot>,
}

/// 进程内消息总线（默认传输后端）
///
/// # 生命周期
///
/// - `new()` 即完成初始化
/// - `shutdown()` 断开所有订阅队列并等待投递线程退出
/// - `Drop` 时自动调用 `shutdown()`
///
/// # 示例
///
/// ```rust
/// use fleet_bus::{LocalBus, Transport};
/// use fleet_msgs::{BusMessage, MessageKind, Odometry};
/// use std::sync::Arc;
///
/// let bus = LocalBus::new();
/// let (tx, rx) = crossbeam_channel::unbounded();
/// bus.subscribe(
///     "/robot_0/odom",
///     MessageKind::Odometry,
///     Arc::new(move |msg: &BusMessage| {
///         let _ = tx.send(msg.clone());
///     }),
/// )
/// .unwrap();
///
/// bus.publish("/robot_0/odom", Odometry::default().into()).unwrap();
/// let received = rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap();
/// assert_eq!(received.kind(), MessageKind::Odometry);
/// ```
pub struct LocalBus {
    config: BusConfig,
    topics: RwLock<HashMap<String, TopicEntry>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    is_running: Arc<AtomicBool>,
    next_id: AtomicU64,
    metrics: Arc<BusMetrics>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        debug!(?config, "local bus initialized");
        Self {
            config,
            topics: RwLock::new(HashMap::new()),
            workers: Mutex::new(Vec::new()),
            is_running: Arc::new(AtomicBool::new(true)),
            next_id: AtomicU64::new(0),
            metrics: Arc::new(BusMetrics::new()),
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn metrics(&self) -> BusMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 已注册的话题（排序后）
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.topics.read().keys().cloned().collect();
        topics.sort();
        topics
    }

    /// 话题当前的订阅者数量
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map(|entry| entry.subscribers.len())
            .unwrap_or(0)
    }

    fn ensure_running(&self) -> Result<(), BusError> {
        if self.is_running.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(BusError::Shutdown)
        }
    }

    /// 查找或创建话题条目，并校验消息类型一致
    fn register<'a>(
        topics: &'a mut HashMap<String, TopicEntry>,
        topic: &str,
        kind: MessageKind,
    ) -> Result<&'a mut TopicEntry, BusError> {
        let entry = topics.entry(topic.to_string()).or_insert_with(|| TopicEntry {
            kind,
            subscribers: Vec::new(),
        });

        if entry.kind != kind {
            return Err(BusError::KindMismatch {
                topic: topic.to_string(),
                expected: entry.kind,
                actual: kind,
            });
        }

        Ok(entry)
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 投递循环：从订阅队列取消息并调用回调，直到队列断开或总线关闭
fn delivery_loop(
    topic: String,
    rx: Receiver<BusMessage>,
    callback: Arc<dyn MessageCallback>,
    is_running: Arc<AtomicBool>,
    metrics: Arc<BusMetrics>,
) {
    while let Ok(msg) = rx.recv() {
        if !is_running.load(Ordering::Acquire) {
            break;
        }
        callback.on_message(&msg);
        metrics.delivered.fetch_add(1, Ordering::Relaxed);
    }
    trace!(topic = %topic, "delivery thread exiting");
}

impl Transport for LocalBus {
    fn advertise(&self, topic: &str, kind: MessageKind) -> Result<(), BusError> {
        self.ensure_running()?;
        validate_topic(topic)?;

        let mut topics = self.topics.write();
        Self::register(&mut topics, topic, kind)?;
        Ok(())
    }

    fn publish(&self, topic: &str, msg: BusMessage) -> Result<(), BusError> {
        self.ensure_running()?;

        let topics = self.topics.read();
        let Some(entry) = topics.get(topic) else {
            self.metrics.unrouted.fetch_add(1, Ordering::Relaxed);
            trace!(topic, "publish on unknown topic, no subscribers");
            return Ok(());
        };

        if entry.kind != msg.kind() {
            return Err(BusError::KindMismatch {
                topic: topic.to_string(),
                expected: entry.kind,
                actual: msg.kind(),
            });
        }

        self.metrics.published.fetch_add(1, Ordering::Relaxed);
        if entry.subscribers.is_empty() {
            self.metrics.unrouted.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        for slot in &entry.subscribers {
            let mut pending = msg.clone();
            loop {
                match slot.tx.try_send(pending) {
                    Ok(()) => break,
                    Err(TrySendError::Full(back)) => {
                        // 丢弃最旧的一条，为最新消息腾出位置；投递线程可能已先取走
                        if slot.overflow_rx.try_recv().is_ok() {
                            self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                            warn!(topic, subscription = %slot.id, "subscriber queue full, dropped oldest message");
                        }
                        pending = back;
                    },
                    Err(TrySendError::Disconnected(_)) => {
                        trace!(topic, subscription = %slot.id, "subscriber gone");
                        break;
                    },
                }
            }
        }

        Ok(())
    }

    fn subscribe(
        &self,
        topic: &str,
        kind: MessageKind,
        callback: Arc<dyn MessageCallback>,
    ) -> Result<SubscriptionId, BusError> {
        self.ensure_running()?;
        validate_topic(topic)?;

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = crossbeam_channel::bounded(self.config.queue_size.max(1));

        let mut topics = self.topics.write();
        let entry = Self::register(&mut topics, topic, kind)?;

        let worker_rx = rx.clone();
        let worker_topic = topic.to_string();
        let is_running = self.is_running.clone();
        let metrics = self.metrics.clone();
        let handle = std::thread::Builder::new()
            .name(format!("bus{topic}"))
            .spawn(move || delivery_loop(worker_topic, worker_rx, callback, is_running, metrics))?;

        entry.subscribers.push(SubscriberSlot {
            id,
            tx,
            overflow_rx: rx,
        });
        drop(topics);

        self.workers.lock().push(handle);
        debug!(topic, subscription = %id, %kind, "subscribed");
        Ok(id)
    }

    fn shutdown(&self) {
        if !self.is_running.swap(false, Ordering::AcqRel) {
            return;
        }

        // 丢弃所有 Sender，投递线程的 recv() 随即返回 Disconnected
        let topic_count = {
            let mut topics = self.topics.write();
            let count = topics.len();
            topics.clear();
            count
        };

        let workers = std::mem::take(&mut *self.workers.lock());
        let join_timeout = Duration::from_millis(self.config.join_timeout_ms);
        let current = std::thread::current().id();
        let worker_count = workers.len();

        for handle in workers {
            // 在回调内部关闭总线时，不能 join 自己
            if handle.thread().id() == current {
                continue;
            }
            if let Err(_e) = handle.join_timeout(join_timeout) {
                error!(
                    "Delivery thread panicked or failed to shut down within {:?}",
                    join_timeout
                );
            }
        }

        info!(topics = topic_count, workers = worker_count, "local bus shut down");
    }

    fn is_shutdown(&self) -> bool {
        !self.is_running.load(Ordering::Acquire)
    }
}

impl Drop for LocalBus {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_msgs::{GoalResult, GoalStatusCode, Odometry, Pose, Twist};
    use std::sync::atomic::AtomicUsize;

    fn forwarding_callback() -> (Arc<dyn MessageCallback>, Receiver<BusMessage>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let callback: Arc<dyn MessageCallback> = Arc::new(move |msg: &BusMessage| {
            let _ = tx.send(msg.clone());
        });
        (callback, rx)
    }

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = LocalBus::new();
        let (cb1, rx1) = forwarding_callback();
        let (cb2, rx2) = forwarding_callback();
        bus.subscribe("/robot_0/odom", MessageKind::Odometry, cb1).unwrap();
        bus.subscribe("/robot_0/odom", MessageKind::Odometry, cb2).unwrap();
        assert_eq!(bus.subscriber_count("/robot_0/odom"), 2);

        let odom = Odometry::at(Pose::planar(1.0, 2.0, 0.0));
        bus.publish("/robot_0/odom", odom.clone().into()).unwrap();

        assert_eq!(rx1.recv_timeout(WAIT).unwrap(), BusMessage::from(odom.clone()));
        assert_eq!(rx2.recv_timeout(WAIT).unwrap(), BusMessage::from(odom));
    }

    #[test]
    fn test_messages_on_one_topic_keep_order() {
        let bus = LocalBus::new();
        let (cb, rx) = forwarding_callback();
        bus.subscribe("/robot_0/odom", MessageKind::Odometry, cb).unwrap();

        for i in 0..10 {
            let odom = Odometry::at(Pose::planar(i as f64, 0.0, 0.0));
            bus.publish("/robot_0/odom", odom.into()).unwrap();
        }

        for i in 0..10 {
            let msg = Odometry::try_from(rx.recv_timeout(WAIT).unwrap()).unwrap();
            assert_eq!(msg.pose.position.x, i as f64);
        }
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = LocalBus::new();
        let (cb0, rx0) = forwarding_callback();
        let (cb1, rx1) = forwarding_callback();
        bus.subscribe("/robot_0/move_base/result", MessageKind::GoalResult, cb0).unwrap();
        bus.subscribe("/robot_1/move_base/result", MessageKind::GoalResult, cb1).unwrap();

        let result = GoalResult::with_code(GoalStatusCode::Succeeded);
        bus.publish("/robot_1/move_base/result", result.into()).unwrap();

        assert!(rx1.recv_timeout(WAIT).is_ok());
        assert!(rx0.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let bus = LocalBus::new();
        bus.advertise("/robot_0/cmd_vel", MessageKind::Twist).unwrap();

        let err = bus
            .publish("/robot_0/cmd_vel", Odometry::default().into())
            .unwrap_err();
        assert!(matches!(err, BusError::KindMismatch { .. }));

        let (cb, _rx) = forwarding_callback();
        let err = bus.subscribe("/robot_0/cmd_vel", MessageKind::Odometry, cb).unwrap_err();
        assert!(matches!(
            err,
            BusError::KindMismatch {
                expected: MessageKind::Twist,
                actual: MessageKind::Odometry,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_topic_is_rejected() {
        let bus = LocalBus::new();
        assert!(matches!(
            bus.advertise("robot_0/odom", MessageKind::Odometry),
            Err(BusError::InvalidTopic(_))
        ));
        let (cb, _rx) = forwarding_callback();
        assert!(matches!(
            bus.subscribe("/robot_0//odom", MessageKind::Odometry, cb),
            Err(BusError::InvalidTopic(_))
        ));
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = LocalBus::new();
        bus.publish("/robot_9/cmd_vel", Twist::stop().into()).unwrap();
        bus.advertise("/robot_9/cmd_vel", MessageKind::Twist).unwrap();
        bus.publish("/robot_9/cmd_vel", Twist::stop().into()).unwrap();
        assert_eq!(bus.metrics().unrouted, 2);
    }

    #[test]
    fn test_full_queue_keeps_newest() {
        let bus = LocalBus::with_config(BusConfig {
            queue_size: 1,
            join_timeout_ms: 2000,
        });

        // 第一个回调阻塞，直到测试放行
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let (seen_tx, seen_rx) = crossbeam_channel::unbounded();
        let callback: Arc<dyn MessageCallback> = Arc::new(move |msg: &BusMessage| {
            let _ = gate_rx.recv();
            let _ = seen_tx.send(msg.clone());
        });
        bus.subscribe("/robot_0/odom", MessageKind::Odometry, callback).unwrap();

        let at = |x: f64| BusMessage::from(Odometry::at(Pose::planar(x, 0.0, 0.0)));
        bus.publish("/robot_0/odom", at(0.0)).unwrap();
        // 等待投递线程取走第一条并阻塞在回调里
        std::thread::sleep(Duration::from_millis(50));
        bus.publish("/robot_0/odom", at(1.0)).unwrap();
        bus.publish("/robot_0/odom", at(2.0)).unwrap();

        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();

        assert_eq!(seen_rx.recv_timeout(WAIT).unwrap(), at(0.0));
        assert_eq!(seen_rx.recv_timeout(WAIT).unwrap(), at(2.0));
        assert_eq!(bus.metrics().dropped, 1);
    }

    #[test]
    fn test_shutdown_stops_delivery() {
        let bus = LocalBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        bus.subscribe(
            "/robot_0/odom",
            MessageKind::Odometry,
            Arc::new(move |_: &BusMessage| {
                count_clone.fetch_add(1, Ordering::Relaxed);
            }),
        )
        .unwrap();

        bus.shutdown();
        assert!(bus.is_shutdown());
        assert!(bus.topics().is_empty());
        assert!(matches!(
            bus.publish("/robot_0/odom", Odometry::default().into()),
            Err(BusError::Shutdown)
        ));
        let (cb, _rx) = forwarding_callback();
        assert!(matches!(
            bus.subscribe("/robot_0/odom", MessageKind::Odometry, cb),
            Err(BusError::Shutdown)
        ));
        assert_eq!(count.load(Ordering::Relaxed), 0);

        // 幂等
        bus.shutdown();
    }

    /// 多个发布者同时压满队列：每条消息要么被投递，要么被计为丢弃
    #[test]
    fn test_overflow_accounting_under_concurrent_publishers() {
        let bus = Arc::new(LocalBus::with_config(BusConfig {
            queue_size: 1,
            join_timeout_ms: 2000,
        }));
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        bus.subscribe(
            "/robot_0/odom",
            MessageKind::Odometry,
            Arc::new(move |_: &BusMessage| {
                seen_clone.fetch_add(1, Ordering::Relaxed);
                std::thread::sleep(Duration::from_micros(50));
            }),
        )
        .unwrap();

        let publishers: Vec<_> = (0..4)
            .map(|p| {
                let bus = bus.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let pose = Pose::planar(p as f64, i as f64, 0.0);
                        bus.publish("/robot_0/odom", Odometry::at(pose).into()).unwrap();
                    }
                })
            })
            .collect();
        for publisher in publishers {
            publisher.join().unwrap();
        }

        // 等待队列中剩余的消息投递完
        let deadline = std::time::Instant::now() + WAIT;
        loop {
            let m = bus.metrics();
            if m.delivered + m.dropped == m.published || std::time::Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }

        let m = bus.metrics();
        assert_eq!(m.published, 2000);
        assert_eq!(m.delivered + m.dropped, m.published);
        assert_eq!(seen.load(Ordering::Relaxed) as u64, m.delivered);
    }
}
