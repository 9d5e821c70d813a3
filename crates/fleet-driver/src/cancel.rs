//! 协作式取消信号
//!
//! 基于 crossbeam 通道的断开语义：取消 = 丢弃唯一的 `Sender`，
//! 所有阻塞在 `recv()` 上的等待者立即被唤醒。无轮询。

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

struct Inner {
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
    cancelled: AtomicBool,
}

/// 取消令牌（可克隆，所有克隆共享同一信号）
///
/// ```rust
/// use fleet_driver::CancelToken;
///
/// let token = CancelToken::new();
/// let waiter = token.clone();
/// let handle = std::thread::spawn(move || waiter.wait());
///
/// token.cancel();
/// handle.join().unwrap();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                trigger: Mutex::new(Some(tx)),
                signal: rx,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// 触发取消（幂等，可从任意线程或信号处理函数调用）
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.trigger.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// 阻塞直到取消
    pub fn wait(&self) {
        // 没有任何一方会真正发送消息，recv 只会因断开而返回
        let _ = self.inner.signal.recv();
    }

    /// 阻塞直到取消或超时，返回是否已取消
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.inner.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
