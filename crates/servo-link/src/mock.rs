//! 无硬件适配器
//!
//! 接受任何帧并记录到共享的 [`FrameLog`]，不做真实传输。
//! 可选模拟线上传输时间（[`FRAME_WIRE_TIME`]），也可以在第 N 次发送时注入故障，
//! 用于测试动画中止路径。

use crate::{LinkError, SerialAdapter};
use servo_protocol::{FRAME_WIRE_TIME, ServoFrame, ServoId};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{info, trace};

/// Mock 适配器的端口名
pub const MOCK_PORT_NAME: &str = "mock";

/// 一条带时间戳的已发送帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedFrame {
    pub frame: ServoFrame,
    pub at: Instant,
}

/// 已发送帧日志（可克隆句柄，所有克隆共享同一份数据）
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    inner: Arc<Mutex<Vec<RecordedFrame>>>,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    // 记录日志只追加，锁中毒时数据仍然一致
    fn lock(&self) -> MutexGuard<'_, Vec<RecordedFrame>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, frame: ServoFrame) {
        self.lock().push(RecordedFrame {
            frame,
            at: Instant::now(),
        });
    }

    /// 按发送顺序返回所有帧
    pub fn frames(&self) -> Vec<ServoFrame> {
        self.lock().iter().map(|r| r.frame).collect()
    }

    /// 按发送顺序返回所有记录（含时间戳）
    pub fn records(&self) -> Vec<RecordedFrame> {
        self.lock().clone()
    }

    /// 发往指定通道的记录
    pub fn records_for(&self, servo: ServoId) -> Vec<RecordedFrame> {
        self.lock().iter().filter(|r| r.frame.servo() == servo).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 取出并清空所有帧
    pub fn take(&self) -> Vec<ServoFrame> {
        std::mem::take(&mut *self.lock()).into_iter().map(|r| r.frame).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// 记录帧的 Mock 适配器
#[derive(Debug)]
pub struct MockSerialAdapter {
    log: FrameLog,
    recording: bool,
    wire_timing: bool,
    echo: bool,
    fail_after: Option<usize>,
    should_fail: Arc<AtomicBool>,
    sent: usize,
    closed: bool,
}

impl Default for MockSerialAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSerialAdapter {
    pub fn new() -> Self {
        Self::with_log(FrameLog::new())
    }

    /// 使用外部提供的日志句柄
    pub fn with_log(log: FrameLog) -> Self {
        Self {
            log,
            recording: true,
            wire_timing: false,
            echo: false,
            fail_after: None,
            should_fail: Arc::new(AtomicBool::new(false)),
            sent: 0,
            closed: false,
        }
    }

    /// 演示模式适配器：模拟传输耗时并回显每帧，不保留任何记录
    pub fn demo() -> Self {
        Self::new().with_wire_timing().with_echo().without_recording()
    }

    /// 不记录帧（长时间运行时日志不增长）
    pub fn without_recording(mut self) -> Self {
        self.recording = false;
        self
    }

    /// 每帧休眠 `FRAME_WIRE_TIME`，与真实串口的传输耗时一致
    pub fn with_wire_timing(mut self) -> Self {
        self.wire_timing = true;
        self
    }

    /// 每帧以 info 级别输出（演示模式）
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// 成功发送 `n` 帧后，之后的发送全部失败
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// 日志句柄
    pub fn log(&self) -> FrameLog {
        self.log.clone()
    }

    /// 故障开关：置为 true 后所有发送失败
    pub fn failure_switch(&self) -> Arc<AtomicBool> {
        self.should_fail.clone()
    }

    fn injected_failure(&self) -> bool {
        self.should_fail.load(Ordering::Relaxed)
            || self.fail_after.is_some_and(|limit| self.sent >= limit)
    }
}

impl SerialAdapter for MockSerialAdapter {
    fn send(&mut self, frame: ServoFrame) -> Result<(), LinkError> {
        if self.closed {
            return Err(LinkError::Closed);
        }
        if self.injected_failure() {
            return Err(LinkError::Transmission(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock link failure",
            )));
        }

        if self.wire_timing {
            spin_sleep::sleep(FRAME_WIRE_TIME);
        }
        if self.recording {
            self.log.push(frame);
        }
        self.sent += 1;

        if self.echo {
            info!("[DEMO] {} -> {} ({})", frame.servo(), frame.angle(), frame);
        } else {
            trace!("MOCK TX {}", frame);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.closed = true;
        Ok(())
    }

    fn port_name(&self) -> &str {
        MOCK_PORT_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn frame(id: i32, angle: i32) -> ServoFrame {
        ServoFrame::encode(id, angle).unwrap()
    }

    #[test]
    fn test_records_in_order() {
        let mut adapter = MockSerialAdapter::new();
        let log = adapter.log();

        adapter.send(frame(1, 10)).unwrap();
        adapter.send(frame(2, 20)).unwrap();
        adapter.send(frame(1, 30)).unwrap();

        assert_eq!(log.frames(), vec![frame(1, 10), frame(2, 20), frame(1, 30)]);
        let s1 = log.records_for(ServoId::new(1).unwrap());
        assert_eq!(s1.len(), 2);
        assert!(s1[0].at <= s1[1].at);
    }

    #[test]
    fn test_fail_after() {
        let mut adapter = MockSerialAdapter::new().fail_after(2);
        assert!(adapter.send(frame(1, 0)).is_ok());
        assert!(adapter.send(frame(1, 1)).is_ok());
        let err = adapter.send(frame(1, 2)).unwrap_err();
        assert!(matches!(err, LinkError::Transmission(_)));
        assert_eq!(adapter.log().len(), 2);
    }

    #[test]
    fn test_failure_switch() {
        let mut adapter = MockSerialAdapter::new();
        let switch = adapter.failure_switch();
        assert!(adapter.send(frame(5, 5)).is_ok());
        switch.store(true, Ordering::Relaxed);
        assert!(adapter.send(frame(5, 6)).is_err());
    }

    #[test]
    fn test_closed_adapter_rejects_send() {
        let mut adapter = MockSerialAdapter::new();
        adapter.close().unwrap();
        assert!(matches!(adapter.send(frame(1, 90)), Err(LinkError::Closed)));
    }

    #[test]
    fn test_wire_timing() {
        let mut adapter = MockSerialAdapter::new().with_wire_timing();
        let start = Instant::now();
        for angle in 0..4 {
            adapter.send(frame(1, angle)).unwrap();
        }
        assert!(start.elapsed() >= FRAME_WIRE_TIME * 4);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_unrecorded_adapter_keeps_nothing() {
        let mut adapter = MockSerialAdapter::new().with_echo().without_recording();
        let log = adapter.log();
        for i in 0..10_000 {
            adapter.send(frame(7, i % 181)).unwrap();
        }
        assert!(log.is_empty());
    }

    #[test]
    fn test_demo_adapter_keeps_nothing() {
        let mut adapter = MockSerialAdapter::demo();
        let log = adapter.log();
        for angle in 0..20 {
            adapter.send(frame(7, angle)).unwrap();
        }
        assert!(log.is_empty());
    }

    #[test]
    fn test_unrecorded_adapter_still_fails_after() {
        let mut adapter = MockSerialAdapter::new().without_recording().fail_after(1);
        assert!(adapter.send(frame(2, 10)).is_ok());
        assert!(adapter.send(frame(2, 11)).is_err());
    }

    #[test]
    fn test_take_clears() {
        let mut adapter = MockSerialAdapter::new();
        let log = adapter.log();
        adapter.send(frame(3, 3)).unwrap();
        assert_eq!(log.take(), vec![frame(3, 3)]);
        assert!(log.is_empty());
    }
}
