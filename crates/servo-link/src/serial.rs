//! 真实串口适配器
//!
//! 链路参数固定为 9600-8N1，不可配置。

use crate::{LinkError, SerialAdapter};
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use servo_protocol::{BAUD_RATE, ServoFrame};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, trace};

/// 默认写超时
///
/// 9600 baud 下单帧只需约 6ms，超时远大于此值，只用于检测断线。
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// 基于 `serialport` 的舵机控制板适配器
pub struct SerialPortAdapter {
    port: Option<Box<dyn SerialPort>>,
    name: String,
}

impl SerialPortAdapter {
    /// 以固定参数 9600-8N1 打开串口
    ///
    /// # 错误
    /// - `LinkError::PortUnavailable`: 串口不存在、被占用或无权限
    pub fn open(port_name: &str) -> Result<Self, LinkError> {
        Self::open_with_timeout(port_name, DEFAULT_WRITE_TIMEOUT)
    }

    /// 指定写超时打开串口
    pub fn open_with_timeout(port_name: &str, timeout: Duration) -> Result<Self, LinkError> {
        let port = serialport::new(port_name, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|source| LinkError::PortUnavailable {
                port: port_name.to_string(),
                source,
            })?;

        info!("Opened serial port {} at {} baud (8N1)", port_name, BAUD_RATE);
        Ok(Self {
            port: Some(port),
            name: port_name.to_string(),
        })
    }
}

impl SerialAdapter for SerialPortAdapter {
    fn send(&mut self, frame: ServoFrame) -> Result<(), LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::Closed)?;
        port.write_all(frame.as_bytes())?;
        port.flush()?;
        trace!("TX {} [{}] on {}", frame, frame.to_hex(), self.name);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if self.port.take().is_some() {
            debug!("Closed serial port {}", self.name);
        }
        Ok(())
    }

    fn port_name(&self) -> &str {
        &self.name
    }
}

impl Drop for SerialPortAdapter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// 串口描述信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// 系统端口名（如 `COM23`、`/dev/ttyUSB0`）
    pub name: String,
    /// 人类可读描述
    pub description: String,
}

/// 枚举系统可用串口
pub fn available_ports() -> Result<Vec<PortInfo>, LinkError> {
    let ports = serialport::available_ports().map_err(LinkError::Enumeration)?;
    Ok(ports
        .into_iter()
        .map(|p| PortInfo {
            description: describe(&p.port_type),
            name: p.port_name,
        })
        .collect())
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("USB serial");
            format!("{} ({:04x}:{:04x})", product, usb.vid, usb.pid)
        },
        SerialPortType::PciPort => "PCI serial".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth serial".to_string(),
        SerialPortType::Unknown => "Serial port".to_string(),
    }
}
