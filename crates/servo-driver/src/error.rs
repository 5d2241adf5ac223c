//! 驱动层错误类型定义

use servo_link::LinkError;
use servo_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 输入校验失败（在任何 IO 之前拒绝）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 串口传输错误
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 机械臂关节正被另一个运动占用
    #[error("Sequencer busy: an arm motion is already in progress")]
    Busy,

    /// 运动请求通道已关闭（工作线程退出）
    #[error("Run channel closed")]
    ChannelClosed,

    /// 锁被毒化（线程 panic）
    #[error("Poisoned lock (thread panic)")]
    PoisonedLock,

    /// 驱动已关闭，运行被中止
    #[error("Driver shut down")]
    Shutdown,

    /// 工作线程错误
    #[error("Sequencer thread error: {0}")]
    IoThread(String),
}

impl DriverError {
    /// 是否为 `Busy`
    pub fn is_busy(&self) -> bool {
        matches!(self, DriverError::Busy)
    }

    /// 是否为输入越界
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, DriverError::Protocol(e) if e.is_out_of_range())
    }

    /// 是否为发送失败
    pub fn is_transmission(&self) -> bool {
        matches!(self, DriverError::Link(e) if e.is_transmission())
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use servo_link::LinkError;
    use servo_protocol::ProtocolError;
    use std::io;

    #[test]
    fn test_driver_error_display() {
        let msg = DriverError::Busy.to_string();
        assert!(msg.contains("busy"), "Busy message: {}", msg);

        let msg = DriverError::Protocol(ProtocolError::AngleOutOfRange { angle: 181 }).to_string();
        assert!(msg.contains("181"), "Protocol message: {}", msg);

        assert_eq!(DriverError::ChannelClosed.to_string(), "Run channel closed");
        assert_eq!(DriverError::Shutdown.to_string(), "Driver shut down");

        let msg = DriverError::IoThread("spawn failed".to_string()).to_string();
        assert!(msg.contains("spawn failed"));
    }

    #[test]
    fn test_classification() {
        let err: DriverError = ProtocolError::ServoIdOutOfRange { id: 0 }.into();
        assert!(err.is_out_of_range());
        assert!(!err.is_busy());

        let err: DriverError =
            LinkError::Transmission(io::Error::new(io::ErrorKind::TimedOut, "stalled")).into();
        assert!(err.is_transmission());
        assert!(!err.is_out_of_range());

        assert!(DriverError::Busy.is_busy());
    }
}
