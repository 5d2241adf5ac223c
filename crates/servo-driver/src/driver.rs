//! 舵机驱动（对外 API）

use crate::dispatch::Dispatcher;
use crate::error::DriverError;
use crate::metrics::{DriverMetrics, MetricsSnapshot};
use crate::pacing::PacingProfile;
use crate::ramp::step_frames;
use crate::run_state::{AtomicSequencerState, SequencerState, StateGuard};
use crate::sequencer::{RunHandle, RunRequest, Worker};
use crate::table::{ServoAngles, ServoTable};
use crossbeam_channel::Sender;
use servo_link::SerialAdapter;
use servo_protocol::{Angle, Pose, ServoFrame, ServoId};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 带超时的线程 join
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        // 看门狗线程负责真正的 join，超时后由操作系统在进程退出时回收
        spawn(move || {
            let _ = tx.send(self.join());
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(_) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Thread join timeout",
            ))),
        }
    }
}

/// 舵机驱动
///
/// 持有串口适配器、状态表和一个常驻的动画工作线程。
///
/// # 并发模型
///
/// - 状态表：`ArcSwap`，任何线程无锁读取
/// - 串口：互斥锁保护，所有发送路径串行化
/// - 机械臂关节（通道 1-6）：原子状态，同一时刻只有一个写入方
///   （后台动画或前台直接指令）；通道 7-16 不受动画影响
///
/// # 示例
///
/// ```rust
/// use servo_driver::{ServoDriverBuilder, PacingProfile};
/// use servo_link::MockSerialAdapter;
/// use servo_protocol::Pose;
/// use std::time::Duration;
///
/// let driver = ServoDriverBuilder::new()
///     .adapter(MockSerialAdapter::new())
///     .pacing(PacingProfile::disabled())
///     .build()
///     .unwrap();
///
/// driver.apply_single(7, 120).unwrap();
///
/// let rest = Pose::from_degrees([90, 45, 45, 90, 90, 90]).unwrap();
/// let report = driver.animate(rest, Duration::ZERO).unwrap().wait().unwrap();
/// assert_eq!(report.steps_completed, 21);
/// assert_eq!(driver.arm_pose(), rest);
/// ```
pub struct ServoDriver {
    dispatcher: Arc<Dispatcher>,
    table: Arc<ServoTable>,
    metrics: Arc<DriverMetrics>,
    state: Arc<AtomicSequencerState>,
    /// 运动请求发送端，Drop 时先关闭再 join 工作线程
    run_tx: Option<Sender<RunRequest>>,
    /// 关闭信号，drop 即通知工作线程中止当前运行
    shutdown_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ServoDriver {
    /// 创建驱动并启动工作线程
    ///
    /// 适配器必须已经打开；驱动不负责打开或关闭串口，
    /// 适配器随驱动一起释放时由它自己的 `Drop` 关闭。
    ///
    /// # 错误
    /// - `DriverError::IoThread`: 工作线程创建失败
    pub fn new(
        adapter: impl SerialAdapter + Send + 'static,
        pacing: PacingProfile,
    ) -> Result<Self, DriverError> {
        Self::from_boxed(Box::new(adapter), pacing)
    }

    pub(crate) fn from_boxed(
        adapter: Box<dyn SerialAdapter + Send>,
        pacing: PacingProfile,
    ) -> Result<Self, DriverError> {
        let table = Arc::new(ServoTable::new());
        let metrics = Arc::new(DriverMetrics::new());
        let dispatcher = Arc::new(Dispatcher::new(adapter, pacing, table.clone(), metrics.clone()));
        let state = Arc::new(AtomicSequencerState::default());

        // 容量 1：占用检查保证同一时刻最多一个请求在途
        let (run_tx, run_rx) = crossbeam_channel::bounded(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);

        let worker = Worker {
            dispatcher: dispatcher.clone(),
            state: state.clone(),
            metrics: metrics.clone(),
            requests: run_rx,
            shutdown: shutdown_rx,
        };
        let handle = std::thread::Builder::new()
            .name("servo-sequencer".to_string())
            .spawn(move || worker.run())
            .map_err(|e| DriverError::IoThread(e.to_string()))?;

        info!("Servo driver started on {}", dispatcher.port_name());
        Ok(Self {
            dispatcher,
            table,
            metrics,
            state,
            run_tx: Some(run_tx),
            shutdown_tx: Some(shutdown_tx),
            worker: Some(handle),
        })
    }

    /// 单通道直接指令（无动画）
    ///
    /// 先编码校验（越界在任何 IO 之前拒绝），再发送，成功后写入状态表。
    ///
    /// # 错误
    /// - `DriverError::Protocol`: 通道号或角度越界
    /// - `DriverError::Busy`: 目标是机械臂关节且有动画在运行
    /// - `DriverError::Link`: 发送失败
    pub fn apply_single(&self, servo_id: i32, angle: i32) -> Result<(), DriverError> {
        let frame = ServoFrame::encode(servo_id, angle)?;
        self.send_frame(frame)
    }

    /// 单通道直接指令（已校验类型）
    pub fn apply(&self, servo: ServoId, angle: Angle) -> Result<(), DriverError> {
        self.send_frame(ServoFrame::new(servo, angle))
    }

    fn send_frame(&self, frame: ServoFrame) -> Result<(), DriverError> {
        if !frame.servo().is_arm_joint() {
            return self.dispatcher.send(frame);
        }
        let _guard = self.claim_arm()?;
        self.dispatcher.send(frame)
    }

    /// 直接位姿（无动画），按关节 1 → 6 顺序发送
    ///
    /// 中途失败时立即返回，已发送的关节保留新角度。
    pub fn apply_pose(&self, pose: &Pose) -> Result<(), DriverError> {
        let _guard = self.claim_arm()?;
        let sent = self.dispatcher.send_all(&step_frames(pose))?;
        debug!("Applied pose {} ({} frames)", pose, sent);
        Ok(())
    }

    /// 启动动画：从当前位姿平滑过渡到 `target`
    ///
    /// 立即返回；运行在后台线程执行。
    ///
    /// # 错误
    /// - `DriverError::Busy`: 已有运行（或前台直接指令）占用机械臂，请求被拒绝而不是排队
    /// - `DriverError::ChannelClosed`: 工作线程已退出
    pub fn animate(&self, target: Pose, step_delay: Duration) -> Result<RunHandle, DriverError> {
        if !self.state.try_acquire(SequencerState::Running) {
            DriverMetrics::incr(&self.metrics.busy_rejections);
            warn!("Rejected run to {}: sequencer busy", target);
            return Err(DriverError::Busy);
        }

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let finished = Arc::new(AtomicBool::new(false));
        let request = RunRequest {
            target,
            step_delay,
            reply: reply_tx,
            finished: finished.clone(),
        };

        let sent = self
            .run_tx
            .as_ref()
            .ok_or(DriverError::ChannelClosed)
            .and_then(|tx| tx.send(request).map_err(|_| DriverError::ChannelClosed));
        if let Err(e) = sent {
            self.state.release();
            return Err(e);
        }

        DriverMetrics::incr(&self.metrics.runs_started);
        Ok(RunHandle::new(reply_rx, finished, target))
    }

    fn claim_arm(&self) -> Result<StateGuard<'_>, DriverError> {
        StateGuard::acquire(&self.state, SequencerState::Direct).ok_or_else(|| {
            DriverMetrics::incr(&self.metrics.busy_rejections);
            DriverError::Busy
        })
    }

    /// 所有通道的当前角度（无锁）
    pub fn angles(&self) -> ServoAngles {
        self.table.snapshot()
    }

    pub fn angle(&self, servo: ServoId) -> Angle {
        self.table.get(servo)
    }

    /// 通道 1-6 的当前位姿
    pub fn arm_pose(&self) -> Pose {
        self.table.arm_pose()
    }

    /// 是否有动画在运行
    pub fn is_busy(&self) -> bool {
        self.state.get() == SequencerState::Running
    }

    pub fn state(&self) -> SequencerState {
        self.state.get()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn port_name(&self) -> &str {
        self.dispatcher.port_name()
    }
}

impl Drop for ServoDriver {
    fn drop(&mut self) {
        // 先中止当前运行，再关闭请求通道让工作线程退出循环
        self.shutdown_tx.take();
        self.run_tx.take();

        let join_timeout = Duration::from_secs(2);
        if let Some(handle) = self.worker.take()
            && let Err(_e) = handle.join_timeout(join_timeout)
        {
            error!(
                "Sequencer thread panicked or failed to shut down within {:?}",
                join_timeout
            );
        }

        debug!("Servo driver on {} dropped", self.dispatcher.port_name());
    }
}
