//! Builder 模式实现
//!
//! 提供链式构造 `ServoDriver` 实例的便捷方式。

use crate::driver::ServoDriver;
use crate::error::DriverError;
use crate::pacing::PacingProfile;
use servo_link::{DEFAULT_PORT, MockSerialAdapter, SerialAdapter, SerialPortAdapter};

/// 适配器选择
enum AdapterChoice {
    /// 打开真实串口
    Port(String),
    /// 演示模式：Mock 适配器，模拟线上传输时间并输出每一帧
    Demo,
    /// 调用方提供的适配器
    Custom(Box<dyn SerialAdapter + Send>),
}

/// ServoDriver Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use servo_driver::ServoDriverBuilder;
///
/// // 真实串口，默认节流参数
/// let driver = ServoDriverBuilder::new()
///     .port("/dev/ttyUSB0")
///     .build()
///     .unwrap();
///
/// // 无硬件演示模式
/// let demo = ServoDriverBuilder::new().demo(true).build().unwrap();
/// ```
pub struct ServoDriverBuilder {
    adapter: AdapterChoice,
    pacing: PacingProfile,
}

impl Default for ServoDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriverBuilder {
    pub fn new() -> Self {
        Self {
            adapter: AdapterChoice::Port(DEFAULT_PORT.to_string()),
            pacing: PacingProfile::default(),
        }
    }

    /// 设置串口名（默认 `COM23`）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.adapter = AdapterChoice::Port(port.into());
        self
    }

    /// 演示模式（不需要硬件）
    pub fn demo(mut self, demo: bool) -> Self {
        if demo {
            self.adapter = AdapterChoice::Demo;
        } else if matches!(self.adapter, AdapterChoice::Demo) {
            self.adapter = AdapterChoice::Port(DEFAULT_PORT.to_string());
        }
        self
    }

    /// 使用自定义适配器（测试用 Mock 等）
    pub fn adapter(mut self, adapter: impl SerialAdapter + Send + 'static) -> Self {
        self.adapter = AdapterChoice::Custom(Box::new(adapter));
        self
    }

    /// 设置节流参数（默认每关节命名常量）
    pub fn pacing(mut self, pacing: PacingProfile) -> Self {
        self.pacing = pacing;
        self
    }

    /// 构建驱动并启动工作线程
    ///
    /// # Errors
    /// - `DriverError::Link`: 串口打开失败（`LinkError::PortUnavailable`）
    /// - `DriverError::IoThread`: 工作线程创建失败
    pub fn build(self) -> Result<ServoDriver, DriverError> {
        let adapter: Box<dyn SerialAdapter + Send> = match self.adapter {
            AdapterChoice::Port(port) => Box::new(SerialPortAdapter::open(&port)?),
            AdapterChoice::Demo => Box::new(MockSerialAdapter::demo()),
            AdapterChoice::Custom(adapter) => adapter,
        };
        ServoDriver::from_boxed(adapter, self.pacing)
    }
}
