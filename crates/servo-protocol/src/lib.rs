//! # Servo Protocol
//!
//! 16 通道串口舵机控制板的 ASCII 帧协议（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 帧格式与链路常量
//! - `ids`: 通道号与关节定义
//! - `angle`: 角度与位姿
//!
//! ## 帧格式
//!
//! ```text
//! byte:  0     1        2      3      4      5
//!       '$'  'A'..'P'  百位   十位   个位   '#'
//! hex:   24  41..50    3N     3N     3N     23
//! ```
//!
//! 例如：通道 1 转到 180° 为 `$A180#`。

pub mod angle;
pub mod constants;
pub mod ids;

// 重新导出常用类型
pub use angle::{Angle, Pose};
pub use constants::*;
pub use ids::{Joint, ServoId};

use std::fmt;
use thiserror::Error;

/// 单条舵机命令帧（固定 6 字节）
///
/// # 设计特性
///
/// - **Copy trait**：6 字节栈上数据，零成本复制
/// - **构造即合法**：只能通过 `new()`/`encode()`/`parse()` 得到，字节内容始终满足协议约束
/// - **不存储**：按需生成，发送后即丢弃
///
/// # 示例
///
/// ```rust
/// use servo_protocol::ServoFrame;
///
/// let frame = ServoFrame::encode(1, 180).unwrap();
/// assert_eq!(frame.as_bytes(), b"$A180#");
/// assert_eq!(frame.to_string(), "$A180#");
/// assert_eq!(frame.to_hex(), "244131383023");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServoFrame {
    bytes: [u8; FRAME_LEN],
    servo: ServoId,
    angle: Angle,
}

impl ServoFrame {
    /// 由已校验的通道号和角度构建帧（不会失败）
    pub const fn new(servo: ServoId, angle: Angle) -> Self {
        let [hundreds, tens, units] = angle.digits();
        Self {
            bytes: [FRAME_START, servo.address(), hundreds, tens, units, FRAME_END],
            servo,
            angle,
        }
    }

    /// 编码：(通道号, 角度) → 帧
    ///
    /// 纯函数，相同输入总是得到相同字节。
    ///
    /// # 错误
    /// - `ProtocolError::ServoIdOutOfRange`: `servo_id` 不在 1-16 内
    /// - `ProtocolError::AngleOutOfRange`: `angle` 不在 0-180 内
    pub fn encode(servo_id: i32, angle: i32) -> Result<Self, ProtocolError> {
        let servo = ServoId::new(servo_id)?;
        let angle = Angle::new(angle)?;
        Ok(Self::new(servo, angle))
    }

    /// 从原始字节解析并校验帧
    ///
    /// # 错误
    /// - `ProtocolError::InvalidLength`: 长度不是 6
    /// - `ProtocolError::InvalidByte`: 起止字节、地址或数字字节非法
    /// - `ProtocolError::AngleOutOfRange`: 角度超过 180
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != FRAME_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != FRAME_START {
            return Err(ProtocolError::InvalidByte {
                position: 0,
                value: bytes[0],
            });
        }
        if bytes[5] != FRAME_END {
            return Err(ProtocolError::InvalidByte {
                position: 5,
                value: bytes[5],
            });
        }
        let servo = ServoId::from_address(bytes[1])?;
        let angle = Angle::from_digits([bytes[2], bytes[3], bytes[4]])?;
        Ok(Self::new(servo, angle))
    }

    /// 解码：帧 → (通道号, 角度)
    pub fn decode(&self) -> (ServoId, Angle) {
        (self.servo(), self.angle())
    }

    /// 目标通道
    pub const fn servo(&self) -> ServoId {
        self.servo
    }

    /// 目标角度
    pub const fn angle(&self) -> Angle {
        self.angle
    }

    /// 获取帧字节
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// 小写十六进制表示（用于日志）
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl TryFrom<&[u8]> for ServoFrame {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::parse(bytes)
    }
}

impl From<ServoFrame> for [u8; FRAME_LEN] {
    fn from(frame: ServoFrame) -> Self {
        frame.bytes
    }
}

impl AsRef<[u8]> for ServoFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for ServoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 帧内所有字节均为可打印 ASCII
        for &b in &self.bytes {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// 编码：(通道号, 角度) → 帧，等价于 [`ServoFrame::encode`]
pub fn encode(servo_id: i32, angle: i32) -> Result<ServoFrame, ProtocolError> {
    ServoFrame::encode(servo_id, angle)
}

/// 解码：原始字节 → (通道号, 角度)
pub fn decode(bytes: &[u8]) -> Result<(ServoId, Angle), ProtocolError> {
    ServoFrame::parse(bytes).map(|frame| frame.decode())
}

/// 协议错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Servo id out of range: {id} (expected 1..=16)")]
    ServoIdOutOfRange { id: i64 },

    #[error("Angle out of range: {angle} (expected 0..=180)")]
    AngleOutOfRange { angle: i64 },

    #[error("Angle is not an integer degree value: {value}")]
    NonIntegerAngle { value: f64 },

    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid byte at position {position}: 0x{value:02X}")]
    InvalidByte { position: usize, value: u8 },

    #[error("Invalid pose length: expected {expected} angles, got {actual}")]
    InvalidPoseLength { expected: usize, actual: usize },
}

impl ProtocolError {
    /// 是否属于输入越界（在任何 IO 之前拒绝）
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            ProtocolError::ServoIdOutOfRange { .. }
                | ProtocolError::AngleOutOfRange { .. }
                | ProtocolError::NonIntegerAngle { .. }
        )
    }
}
