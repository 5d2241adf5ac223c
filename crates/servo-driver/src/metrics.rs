//! 驱动性能指标
//!
//! 原子计数器，任何线程都可以无锁读取。

use std::sync::atomic::{AtomicU64, Ordering};

/// 驱动实时指标
#[derive(Debug, Default)]
pub struct DriverMetrics {
    /// 成功发送的帧数
    pub frames_sent: AtomicU64,

    /// 发送失败次数
    pub send_failures: AtomicU64,

    /// 启动的运动次数
    pub runs_started: AtomicU64,

    /// 正常完成的运动次数
    pub runs_completed: AtomicU64,

    /// 中止的运动次数（发送失败或驱动关闭）
    pub runs_aborted: AtomicU64,

    /// 因 Busy 被拒绝的请求次数
    pub busy_rejections: AtomicU64,
}

impl DriverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_aborted: self.runs_aborted.load(Ordering::Relaxed),
            busy_rejections: self.busy_rejections.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub frames_sent: u64,
    pub send_failures: u64,
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_aborted: u64,
    pub busy_rejections: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_default() {
        let snapshot = DriverMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_metrics_concurrent_increment() {
        let metrics = Arc::new(DriverMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        DriverMetrics::incr(&m.frames_sent);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot().frames_sent, 1000);
    }

    #[test]
    fn test_snapshot_reads_each_counter() {
        let metrics = DriverMetrics::new();
        metrics.runs_started.store(4, Ordering::Relaxed);
        metrics.runs_completed.store(3, Ordering::Relaxed);
        DriverMetrics::incr(&metrics.busy_rejections);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.runs_started, 4);
        assert_eq!(snapshot.runs_completed, 3);
        assert_eq!(snapshot.busy_rejections, 1);
        assert_eq!(snapshot.frames_sent, 0);
    }
}
