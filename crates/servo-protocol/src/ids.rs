//! 通道与关节标识
//!
//! - `ServoId`: 通道号 1-16，一一映射到地址字节 `A`-`P`
//! - `Joint`: 机械臂的 6 个关节（通道 1-6）

use crate::ProtocolError;
use crate::constants::{ADDRESS_BASE, CHANNEL_COUNT, JOINT_COUNT};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 舵机通道号（1-16）
///
/// 构造时即完成范围检查，之后的所有操作都不会再失败。
///
/// # 示例
///
/// ```rust
/// use servo_protocol::ServoId;
///
/// let id = ServoId::new(16).unwrap();
/// assert_eq!(id.address(), b'P');
/// assert!(ServoId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct ServoId(u8);

impl ServoId {
    /// 创建通道号
    ///
    /// # 错误
    /// - `ProtocolError::ServoIdOutOfRange`: `id` 不在 1-16 内
    pub fn new(id: i32) -> Result<Self, ProtocolError> {
        if (1..=CHANNEL_COUNT as i32).contains(&id) {
            Ok(Self(id as u8))
        } else {
            Err(ProtocolError::ServoIdOutOfRange { id: id as i64 })
        }
    }

    /// 通道号数值（1-16）
    pub const fn get(self) -> u8 {
        self.0
    }

    /// 从 0 开始的索引（0-15），用于状态表寻址
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// 从 0 开始的索引构造通道号
    pub fn from_index(index: usize) -> Option<Self> {
        (index < CHANNEL_COUNT).then(|| Self(index as u8 + 1))
    }

    /// 地址字节：`'A' + (id - 1)`
    pub const fn address(self) -> u8 {
        ADDRESS_BASE + self.0 - 1
    }

    /// 从地址字节还原通道号
    ///
    /// # 错误
    /// - `ProtocolError::InvalidByte`: 地址字节不在 `A`-`P` 内（position 固定为 1）
    pub fn from_address(address: u8) -> Result<Self, ProtocolError> {
        match address.checked_sub(ADDRESS_BASE) {
            Some(offset) if (offset as usize) < CHANNEL_COUNT => Ok(Self(offset + 1)),
            _ => Err(ProtocolError::InvalidByte {
                position: 1,
                value: address,
            }),
        }
    }

    /// 是否为机械臂关节通道（1-6）
    pub const fn is_arm_joint(self) -> bool {
        (self.0 as usize) <= JOINT_COUNT
    }

    /// 对应的机械臂关节（仅通道 1-6）
    pub fn joint(self) -> Option<Joint> {
        Joint::try_from(self.0).ok()
    }

    /// 按顺序遍历全部 16 个通道
    pub fn all() -> impl Iterator<Item = ServoId> {
        (1..=CHANNEL_COUNT as u8).map(ServoId)
    }
}

impl TryFrom<u8> for ServoId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as i32)
    }
}

impl From<ServoId> for u8 {
    fn from(id: ServoId) -> Self {
        id.0
    }
}

impl fmt::Display for ServoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// 机械臂关节
///
/// 判别值即通道号，关节 N 固定接在通道 N 上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Joint {
    /// 底座旋转（Yaw）
    Base = 1,
    /// 肩关节（重载）
    Shoulder = 2,
    /// 肘关节（重载）
    Elbow = 3,
    /// 腕部俯仰
    WristPitch = 4,
    /// 腕部翻滚
    WristRoll = 5,
    /// 夹爪开合
    Gripper = 6,
}

impl Joint {
    /// 按发送顺序排列的全部关节（1 → 6）
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Base,
        Joint::Shoulder,
        Joint::Elbow,
        Joint::WristPitch,
        Joint::WristRoll,
        Joint::Gripper,
    ];

    /// 所在通道
    pub const fn servo(self) -> ServoId {
        ServoId(self as u8)
    }

    /// 从 0 开始的关节索引（0-5）
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// 关节名称
    pub const fn name(self) -> &'static str {
        match self {
            Joint::Base => "Base",
            Joint::Shoulder => "Shoulder",
            Joint::Elbow => "Elbow",
            Joint::WristPitch => "Wrist Pitch",
            Joint::WristRoll => "Wrist Roll",
            Joint::Gripper => "Gripper",
        }
    }
}

impl From<Joint> for ServoId {
    fn from(joint: Joint) -> Self {
        joint.servo()
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.servo())
    }
}
