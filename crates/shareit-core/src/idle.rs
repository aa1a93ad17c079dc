//! 空闲自动退出
//!
//! 一个计时器任务：每次 `reset()` 都把截止时间推迟到 `now + timeout`，
//! 截止前没有新的 `reset()` 就调用一次 `on_fire` 回调（生产环境中回调会退出进程）。
//!
//! 计时使用 `tokio::time`，测试中可以用暂停的时钟驱动。

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// 默认空闲时长: 10 分钟
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
pub struct IdleSupervisor {
    inner: Arc<Inner>,
}

struct Inner {
    timeout: Duration,
    deadline_tx: watch::Sender<Instant>,
    task: JoinHandle<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl IdleSupervisor {
    /// 启动计时器（立即处于计时状态）
    pub fn spawn<F>(timeout: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (deadline_tx, deadline_rx) = watch::channel(Instant::now() + timeout);
        let task = tokio::spawn(run_timer(deadline_rx, on_fire));

        Self {
            inner: Arc::new(Inner {
                timeout,
                deadline_tx,
                task,
            }),
        }
    }

    /// 取消当前计时并从现在重新计时
    pub fn reset(&self) {
        let deadline = Instant::now() + self.inner.timeout;
        self.inner.deadline_tx.send_replace(deadline);
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// 计时器是否已经触发
    pub fn has_fired(&self) -> bool {
        self.inner.task.is_finished()
    }
}

async fn run_timer<F>(mut deadline_rx: watch::Receiver<Instant>, on_fire: F)
where
    F: FnOnce() + Send + 'static,
{
    loop {
        let deadline = *deadline_rx.borrow_and_update();
        tokio::select! {
            () = sleep_until(deadline) => {
                info!("Idle timeout reached");
                on_fire();
                return;
            }
            changed = deadline_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                debug!("Idle timer re-armed");
            }
        }
    }
}
