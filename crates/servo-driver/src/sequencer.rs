//! 动画执行器
//!
//! 一个常驻后台线程，通过 channel 接收 [`RunRequest`]，逐步插值并发送。
//! 同一时刻最多一个运行：占用由调用方在提交前通过 [`AtomicSequencerState`] 完成，
//! 工作线程在结束（完成、失败或 panic）时释放占用，然后回复结果。

use crate::dispatch::Dispatcher;
use crate::error::DriverError;
use crate::metrics::DriverMetrics;
use crate::ramp::{LinearRamp, STEP_COUNT, step_frames};
use crate::run_state::{AtomicSequencerState, StateGuard};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use servo_protocol::Pose;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 默认步间延时
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(50);

type RunResult = Result<RunReport, DriverError>;

/// 提交给工作线程的运动请求
pub(crate) struct RunRequest {
    pub target: Pose,
    pub step_delay: Duration,
    pub reply: Sender<RunResult>,
    pub finished: Arc<AtomicBool>,
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// 完成的步数（正常完成时为 21）
    pub steps_completed: u32,
    /// 成功发送的帧数
    pub frames_sent: usize,
    /// 总耗时
    pub elapsed: Duration,
    /// 起点（运行开始时的状态表快照）
    pub source: Pose,
    /// 终点
    pub target: Pose,
}

/// 运行句柄
///
/// 丢弃句柄不会取消运行。
#[derive(Debug)]
pub struct RunHandle {
    rx: Receiver<RunResult>,
    finished: Arc<AtomicBool>,
    target: Pose,
}

impl RunHandle {
    pub(crate) fn new(rx: Receiver<RunResult>, finished: Arc<AtomicBool>, target: Pose) -> Self {
        Self {
            rx,
            finished,
            target,
        }
    }

    pub fn target(&self) -> &Pose {
        &self.target
    }

    /// 运行是否已结束（完成或中止）
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// 阻塞等待运行结束
    ///
    /// # 错误
    /// - 导致运行中止的错误（通常是 `DriverError::Link`）
    /// - `DriverError::Shutdown`: 驱动在运行中被关闭
    /// - `DriverError::ChannelClosed`: 工作线程异常退出
    pub fn wait(self) -> Result<RunReport, DriverError> {
        self.rx.recv().map_err(|_| DriverError::ChannelClosed)?
    }

    /// 带超时等待
    ///
    /// 超时返回 `None`，运行继续；结果只会被取出一次，之后再调用返回
    /// `Some(Err(DriverError::ChannelClosed))`。
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<RunReport, DriverError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(DriverError::ChannelClosed)),
        }
    }
}

/// 工作线程上下文
pub(crate) struct Worker {
    pub dispatcher: Arc<Dispatcher>,
    pub state: Arc<AtomicSequencerState>,
    pub metrics: Arc<DriverMetrics>,
    pub requests: Receiver<RunRequest>,
    /// 关闭信号：发送端被 drop 即表示关闭
    pub shutdown: Receiver<()>,
}

impl Worker {
    /// 工作线程主循环，请求通道关闭时退出
    pub fn run(self) {
        while let Ok(request) = self.requests.recv() {
            // 占用由提交方完成，守卫负责在任何退出路径上释放
            let guard = StateGuard::adopt(&self.state);
            let result = self.execute(&request);
            match &result {
                Ok(report) => {
                    DriverMetrics::incr(&self.metrics.runs_completed);
                    info!(
                        "Run to {} completed: {} frames in {:?}",
                        report.target, report.frames_sent, report.elapsed
                    );
                },
                Err(e) => {
                    DriverMetrics::incr(&self.metrics.runs_aborted);
                    warn!("Run to {} aborted: {}", request.target, e);
                },
            }
            drop(guard);
            request.finished.store(true, Ordering::Release);
            // 调用方可能已经丢弃句柄
            let _ = request.reply.send(result);
        }
        debug!("Sequencer worker exiting");
    }

    fn execute(&self, request: &RunRequest) -> RunResult {
        let start = Instant::now();
        let source = self.dispatcher.table().arm_pose();
        info!(
            "Run started: {} -> {} ({} steps, {:?}/step)",
            source, request.target, STEP_COUNT, request.step_delay
        );

        let mut frames_sent = 0;
        let mut steps_completed = 0;
        for (step, pose) in LinearRamp::new(source, request.target) {
            for frame in step_frames(&pose) {
                if self.shutdown_requested() {
                    return Err(DriverError::Shutdown);
                }
                self.dispatcher.send(frame)?;
                frames_sent += 1;
            }
            steps_completed += 1;
            debug!("Step {}/{}: {}", step, STEP_COUNT, pose);

            if step < STEP_COUNT && !self.pause(request.step_delay) {
                return Err(DriverError::Shutdown);
            }
        }

        Ok(RunReport {
            steps_completed,
            frames_sent,
            elapsed: start.elapsed(),
            source,
            target: request.target,
        })
    }

    fn shutdown_requested(&self) -> bool {
        matches!(self.shutdown.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// 步间暂停，可被关闭信号打断；被打断返回 false
    fn pause(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.shutdown_requested();
        }
        matches!(self.shutdown.recv_timeout(delay), Err(RecvTimeoutError::Timeout))
    }
}
