//! 位姿序列
//!
//! 依次以动画方式经过多个命名位姿，两个位姿之间停留固定时间。
//! 只是重复调用动画启动，不是独立的执行器状态。

use crate::arm::{AnimateOutcome, ServoArm};
use crate::error::{ClientError, Result};
use servo_driver::DriverError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 停留期间检查停止标志的间隔
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 序列执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceReport {
    /// 已完成的位姿（按执行顺序）
    pub played: Vec<String>,
    /// 因名称未知而跳过的位姿
    pub skipped: Vec<String>,
    /// 发送的总帧数
    pub frames_sent: usize,
    /// 是否被停止标志中断
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl ServoArm {
    /// 播放位姿序列，使用默认停留时间，不可中断
    pub fn play_sequence<S: AsRef<str>>(
        &self,
        names: &[S],
        step_delay: Option<Duration>,
    ) -> Result<SequenceReport> {
        let never = AtomicBool::new(false);
        self.play_sequence_until(names, step_delay, &never)
    }

    /// 播放位姿序列，`stop` 置位后在当前动画结束后停止
    ///
    /// 未知名称记录警告并跳过。任何动画失败立即终止整个序列。
    ///
    /// # 错误
    /// - `DriverError::Busy`: 已有动画在运行
    /// - 动画运行中的发送失败
    pub fn play_sequence_until<S: AsRef<str>>(
        &self,
        names: &[S],
        step_delay: Option<Duration>,
        stop: &AtomicBool,
    ) -> Result<SequenceReport> {
        let start = Instant::now();
        let mut report = SequenceReport::default();

        for (i, name) in names.iter().enumerate() {
            let name: &str = name.as_ref();
            if stop.load(Ordering::Relaxed) {
                report.interrupted = true;
                break;
            }

            let pose = match self.patterns().get(name) {
                Some(pose) => pose,
                None => {
                    warn!("Skipping unknown pattern '{}' in sequence", name);
                    report.skipped.push(name.to_string());
                    continue;
                },
            };

            info!("Sequence {}/{}: {}", i + 1, names.len(), name);
            let handle = match self.animate(pose, step_delay)? {
                AnimateOutcome::Started(handle) => handle,
                AnimateOutcome::Busy => return Err(ClientError::Driver(DriverError::Busy)),
            };
            let run = handle.wait()?;
            report.frames_sent += run.frames_sent;
            report.played.push(name.to_string());

            if i + 1 < names.len() && !self.hold_unless_stopped(stop) {
                report.interrupted = true;
                break;
            }
        }

        report.elapsed = start.elapsed();
        info!(
            "Sequence finished: {} played, {} skipped{}",
            report.played.len(),
            report.skipped.len(),
            if report.interrupted { " (interrupted)" } else { "" }
        );
        Ok(report)
    }

    /// 停留 `hold`，被停止返回 false
    fn hold_unless_stopped(&self, stop: &AtomicBool) -> bool {
        sleep_unless_stopped(self.hold(), stop)
    }
}

/// 等待 `duration`，每 20ms 检查一次 `stop`；被停止返回 false
pub fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        spin_sleep::sleep(STOP_POLL_INTERVAL.min(deadline - now));
    }
}
