//! 总线指标
//!
//! 原子计数器，任何线程都可以无锁读取。

use std::sync::atomic::{AtomicU64, Ordering};

/// 总线实时指标
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// 发布的消息总数（每次 `publish` 计一次）
    pub published: AtomicU64,

    /// 投递给回调的消息总数（每个订阅者各计一次）
    pub delivered: AtomicU64,

    /// 队列满时被丢弃的旧消息数
    ///
    /// 如果这个值快速增长，说明某个回调处理速度跟不上发布速度。
    pub dropped: AtomicU64,

    /// 发布时没有任何订阅者的次数
    pub unrouted: AtomicU64,
}

impl BusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusMetricsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub unrouted: u64,
}
