//! 角度与位姿
//!
//! - `Angle`: 0-180 的整数角度
//! - `Pose`: 6 个关节角度组成的机械臂位姿

use crate::ProtocolError;
use crate::constants::{ANGLE_CENTER, ANGLE_MAX, ANGLE_MIN, JOINT_COUNT};
use crate::ids::Joint;
use std::fmt;
use std::ops::Index;

/// 舵机角度（整数度，0-180）
///
/// # 示例
///
/// ```rust
/// use servo_protocol::Angle;
///
/// let angle = Angle::new(45).unwrap();
/// assert_eq!(angle.digits(), *b"045");
///
/// assert_eq!(Angle::clamped(200).degrees(), 180);
/// assert!(Angle::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct Angle(u8);

impl Angle {
    /// 0°
    pub const MIN: Angle = Angle(ANGLE_MIN);
    /// 180°
    pub const MAX: Angle = Angle(ANGLE_MAX);
    /// 90°（中位）
    pub const CENTER: Angle = Angle(ANGLE_CENTER);

    /// 创建角度
    ///
    /// # 错误
    /// - `ProtocolError::AngleOutOfRange`: 不在 0-180 内
    pub fn new(degrees: i32) -> Result<Self, ProtocolError> {
        if (ANGLE_MIN as i32..=ANGLE_MAX as i32).contains(&degrees) {
            Ok(Self(degrees as u8))
        } else {
            Err(ProtocolError::AngleOutOfRange {
                angle: degrees as i64,
            })
        }
    }

    /// 从浮点角度创建（必须是整数度）
    ///
    /// # 错误
    /// - `ProtocolError::NonIntegerAngle`: NaN、无穷大或带小数部分
    /// - `ProtocolError::AngleOutOfRange`: 不在 0-180 内
    pub fn from_degrees_f64(degrees: f64) -> Result<Self, ProtocolError> {
        if !degrees.is_finite() || degrees.fract() != 0.0 {
            return Err(ProtocolError::NonIntegerAngle { value: degrees });
        }
        if degrees < ANGLE_MIN as f64 || degrees > ANGLE_MAX as f64 {
            return Err(ProtocolError::AngleOutOfRange {
                angle: degrees as i64,
            });
        }
        Ok(Self(degrees as u8))
    }

    /// 限幅到 0-180 后创建（不会失败）
    pub fn clamped(degrees: i32) -> Self {
        Self(degrees.clamp(ANGLE_MIN as i32, ANGLE_MAX as i32) as u8)
    }

    /// 角度值（度）
    pub const fn degrees(self) -> u8 {
        self.0
    }

    /// 三位十进制 ASCII 数字（百位、十位、个位），不足三位补零
    ///
    /// 逐位计算而不是走通用格式化，与线路协议的定宽约定一一对应。
    pub const fn digits(self) -> [u8; 3] {
        let v = self.0;
        [b'0' + v / 100, b'0' + (v % 100) / 10, b'0' + v % 10]
    }

    /// 从三位 ASCII 数字还原角度
    ///
    /// # 错误
    /// - `ProtocolError::InvalidByte`: 含非数字字节（position 为帧内偏移 2-4）
    /// - `ProtocolError::AngleOutOfRange`: 数值超过 180
    pub fn from_digits(digits: [u8; 3]) -> Result<Self, ProtocolError> {
        let mut value: i32 = 0;
        for (i, &d) in digits.iter().enumerate() {
            if !d.is_ascii_digit() {
                return Err(ProtocolError::InvalidByte {
                    position: 2 + i,
                    value: d,
                });
            }
            value = value * 10 + (d - b'0') as i32;
        }
        Self::new(value)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::CENTER
    }
}

impl TryFrom<u8> for Angle {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as i32)
    }
}

impl From<Angle> for u8 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// 机械臂位姿：关节 1-6 的目标角度
///
/// 序列化为 6 元素整数数组（`[90, 45, 45, 90, 90, 90]`），与图案文件格式一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Pose([Angle; JOINT_COUNT]);

impl Pose {
    /// 全部关节居中（90°）
    pub const CENTER: Pose = Pose([Angle::CENTER; JOINT_COUNT]);

    pub const fn new(angles: [Angle; JOINT_COUNT]) -> Self {
        Self(angles)
    }

    /// 从 6 个整数角度创建
    ///
    /// # 错误
    /// - `ProtocolError::AngleOutOfRange`: 任一角度不在 0-180 内
    pub fn from_degrees(degrees: [i32; JOINT_COUNT]) -> Result<Self, ProtocolError> {
        let mut angles = [Angle::CENTER; JOINT_COUNT];
        for (slot, &deg) in angles.iter_mut().zip(degrees.iter()) {
            *slot = Angle::new(deg)?;
        }
        Ok(Self(angles))
    }

    /// 从任意长度的整数序列创建（用于解析外部输入）
    ///
    /// # 错误
    /// - `ProtocolError::InvalidPoseLength`: 长度不是 6
    /// - `ProtocolError::AngleOutOfRange`: 任一角度不在 0-180 内
    pub fn try_from_slice(values: &[i64]) -> Result<Self, ProtocolError> {
        if values.len() != JOINT_COUNT {
            return Err(ProtocolError::InvalidPoseLength {
                expected: JOINT_COUNT,
                actual: values.len(),
            });
        }
        let mut angles = [Angle::CENTER; JOINT_COUNT];
        for (slot, &v) in angles.iter_mut().zip(values.iter()) {
            let deg = i32::try_from(v).map_err(|_| ProtocolError::AngleOutOfRange { angle: v })?;
            *slot = Angle::new(deg)?;
        }
        Ok(Self(angles))
    }

    pub const fn angles(&self) -> &[Angle; JOINT_COUNT] {
        &self.0
    }

    /// 6 个关节的角度值（度）
    pub fn degrees(&self) -> [u8; JOINT_COUNT] {
        self.0.map(Angle::degrees)
    }

    pub fn get(&self, joint: Joint) -> Angle {
        self.0[joint.index()]
    }

    /// 替换单个关节角度
    pub fn with(mut self, joint: Joint, angle: Angle) -> Self {
        self.0[joint.index()] = angle;
        self
    }

    /// 按关节顺序（1 → 6）遍历
    pub fn iter(&self) -> impl Iterator<Item = (Joint, Angle)> + '_ {
        Joint::ALL.iter().map(move |&joint| (joint, self.0[joint.index()]))
    }
}

impl From<[Angle; JOINT_COUNT]> for Pose {
    fn from(angles: [Angle; JOINT_COUNT]) -> Self {
        Self(angles)
    }
}

impl Index<usize> for Pose {
    type Output = Angle;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Index<Joint> for Pose {
    type Output = Angle;

    fn index(&self, joint: Joint) -> &Self::Output {
        &self.0[joint.index()]
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.degrees();
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}]",
            d[0], d[1], d[2], d[3], d[4], d[5]
        )
    }
}
