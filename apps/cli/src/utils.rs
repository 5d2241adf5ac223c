//! Ctrl+C 处理与可中断等待

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Ctrl+C 中断标志
///
/// 多步模式在两条指令之间检查，不会打断正在发送的帧。
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// 未安装信号处理的标志（测试用）
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// 安装 Ctrl+C 处理（每个进程只能调用一次）
    pub fn install() -> Result<Self> {
        let interrupt = Self::default();
        let flag = interrupt.flag.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Stopping after the current command...");
            flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl+C handler")?;
        Ok(interrupt)
    }

    #[cfg(test)]
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 供 `play_sequence_until` 使用
    pub fn flag(&self) -> &AtomicBool {
        &self.flag
    }

    /// 等待 `duration`，被中断返回 false
    pub fn pause(&self, duration: Duration) -> bool {
        servo_client::sleep_unless_stopped(duration, &self.flag)
    }

    /// 打印中断提示并返回 true（若已中断）
    pub fn report_if_set(&self) -> bool {
        let set = self.is_set();
        if set {
            println!("\n⚠️  Stopped by user (Ctrl+C)");
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_pause_completes() {
        let interrupt = Interrupt::new();
        let start = Instant::now();
        assert!(interrupt.pause(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_pause_returns_early_when_triggered() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let start = Instant::now();
        assert!(!interrupt.pause(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(interrupt.flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_clones_share_flag() {
        let interrupt = Interrupt::new();
        let other = interrupt.clone();
        other.trigger();
        assert!(interrupt.is_set());
    }
}
