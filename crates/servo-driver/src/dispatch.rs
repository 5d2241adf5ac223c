//! 帧派发
//!
//! 所有路径（单条指令、直接位姿、动画）的唯一发送出口：
//! 节流等待 → 串口发送 → 成功后更新状态表与指标。发送失败不重试。

use crate::error::DriverError;
use crate::metrics::DriverMetrics;
use crate::pacing::{PacingProfile, PacingTracker};
use crate::table::ServoTable;
use servo_link::SerialAdapter;
use servo_protocol::ServoFrame;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, trace};

struct LinkState {
    adapter: Box<dyn SerialAdapter + Send>,
    pacing: PacingTracker,
}

pub(crate) struct Dispatcher {
    link: Mutex<LinkState>,
    port_name: String,
    table: Arc<ServoTable>,
    metrics: Arc<DriverMetrics>,
}

impl Dispatcher {
    pub fn new(
        adapter: Box<dyn SerialAdapter + Send>,
        pacing: PacingProfile,
        table: Arc<ServoTable>,
        metrics: Arc<DriverMetrics>,
    ) -> Self {
        let port_name = adapter.port_name().to_string();
        Self {
            link: Mutex::new(LinkState {
                adapter,
                pacing: PacingTracker::new(pacing),
            }),
            port_name,
            table,
            metrics,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn table(&self) -> &ServoTable {
        &self.table
    }

    pub fn metrics(&self) -> &DriverMetrics {
        &self.metrics
    }

    /// 发送一帧并在成功后写入状态表
    pub fn send(&self, frame: ServoFrame) -> Result<(), DriverError> {
        let mut link = self.link.lock().map_err(|_| DriverError::PoisonedLock)?;
        let servo = frame.servo();

        let waited = link.pacing.wait(servo);
        if !waited.is_zero() {
            trace!("Paced {} for {:?}", servo, waited);
        }

        match link.adapter.send(frame) {
            Ok(()) => {
                link.pacing.record(servo, Instant::now());
                // 持锁写表，保证表中顺序与线上顺序一致
                self.table.store(servo, frame.angle());
                DriverMetrics::incr(&self.metrics.frames_sent);
                Ok(())
            },
            Err(e) => {
                DriverMetrics::incr(&self.metrics.send_failures);
                error!("Failed to send {} to {} on {}: {}", frame, servo, self.port_name, e);
                Err(e.into())
            },
        }
    }

    /// 按顺序发送多帧，遇到第一个失败立即返回
    ///
    /// 返回成功发送的帧数；失败前已发送的帧保留在状态表中。
    pub fn send_all<'a>(
        &self,
        frames: impl IntoIterator<Item = &'a ServoFrame>,
    ) -> Result<usize, DriverError> {
        let mut sent = 0;
        for frame in frames {
            self.send(*frame)?;
            sent += 1;
        }
        Ok(sent)
    }
}
