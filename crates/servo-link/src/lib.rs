//! # Servo Link Layer
//!
//! 串口传输抽象层：只负责"发送一帧，成功或失败"，不理解协议内容。
//!
//! - [`SerialPortAdapter`]: 真实串口（固定 9600-8N1）
//! - [`MockSerialAdapter`]: 无硬件适配器，记录每一帧，用于测试与演示模式

use std::io;
use thiserror::Error;

pub use servo_protocol::{DEFAULT_PORT, ServoFrame};

pub mod mock;
pub mod serial;

pub use mock::{FrameLog, MockSerialAdapter, RecordedFrame};
pub use serial::{PortInfo, SerialPortAdapter, available_ports};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    /// 打开串口失败
    #[error("Serial port '{port}' unavailable: {source}")]
    PortUnavailable {
        port: String,
        #[source]
        source: serialport::Error,
    },
    /// 写入失败（发送中途）
    #[error("Transmission failed: {0}")]
    Transmission(#[from] io::Error),
    /// 枚举串口失败
    #[error("Port enumeration failed: {0}")]
    Enumeration(#[source] serialport::Error),
    /// 适配器已关闭
    #[error("Link closed")]
    Closed,
}

impl LinkError {
    /// 是否为发送失败（运行中的动画需要中止）
    pub fn is_transmission(&self) -> bool {
        matches!(self, LinkError::Transmission(_) | LinkError::Closed)
    }
}

/// 串口适配器 trait
///
/// 引擎只通过这个 trait 发送帧；失败不重试，直接向上传播。
pub trait SerialAdapter {
    /// 发送一帧（阻塞直到写入完成或失败）
    fn send(&mut self, frame: ServoFrame) -> Result<(), LinkError>;

    /// 关闭适配器，之后的 `send` 返回 `LinkError::Closed`
    fn close(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    /// 端口名（用于日志）
    fn port_name(&self) -> &str;
}

impl<A: SerialAdapter + ?Sized> SerialAdapter for Box<A> {
    fn send(&mut self, frame: ServoFrame) -> Result<(), LinkError> {
        (**self).send(frame)
    }

    fn close(&mut self) -> Result<(), LinkError> {
        (**self).close()
    }

    fn port_name(&self) -> &str {
        (**self).port_name()
    }
}
