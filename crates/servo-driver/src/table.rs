//! 舵机状态表
//!
//! 16 个通道最近一次成功下发的角度，是整个引擎唯一的共享可变状态。
//!
//! - 读取：`ArcSwap::load`，无锁，可在任何线程轮询
//! - 写入：`ArcSwap::rcu`，每次写入生成新快照并递增 `revision`

use arc_swap::ArcSwap;
use servo_protocol::{Angle, CHANNEL_COUNT, JOINT_COUNT, Joint, Pose, ServoId};

/// 全部 16 个通道角度的不可变快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoAngles {
    angles: [Angle; CHANNEL_COUNT],
    revision: u64,
}

impl Default for ServoAngles {
    fn default() -> Self {
        Self {
            angles: [Angle::CENTER; CHANNEL_COUNT],
            revision: 0,
        }
    }
}

impl ServoAngles {
    /// 指定通道的角度
    pub fn get(&self, servo: ServoId) -> Angle {
        self.angles[servo.index()]
    }

    /// 写入计数，每次成功写入加一
    ///
    /// 展示层比较前后两次的 `revision` 即可判断是否需要重绘。
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// 通道 1-6 组成的机械臂位姿
    pub fn arm_pose(&self) -> Pose {
        let mut angles = [Angle::CENTER; JOINT_COUNT];
        angles.copy_from_slice(&self.angles[..JOINT_COUNT]);
        Pose::new(angles)
    }

    /// 所有通道的角度值（度）
    pub fn degrees(&self) -> [u8; CHANNEL_COUNT] {
        self.angles.map(Angle::degrees)
    }

    /// 按通道号顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (ServoId, Angle)> + '_ {
        ServoId::all().map(|servo| (servo, self.angles[servo.index()]))
    }
}

/// 舵机状态表（线程安全）
#[derive(Debug)]
pub struct ServoTable {
    inner: ArcSwap<ServoAngles>,
}

impl Default for ServoTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoTable {
    /// 创建状态表，所有通道初始化为 90°
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(ServoAngles::default()),
        }
    }

    pub fn get(&self, servo: ServoId) -> Angle {
        self.inner.load().get(servo)
    }

    /// 写入角度，先钳位到 0-180，返回实际存储的值
    pub fn set(&self, servo: ServoId, degrees: i32) -> Angle {
        let angle = Angle::clamped(degrees);
        self.store(servo, angle);
        angle
    }

    /// 写入已校验的角度
    pub fn store(&self, servo: ServoId, angle: Angle) {
        self.inner.rcu(|current| {
            let mut next = **current;
            next.angles[servo.index()] = angle;
            next.revision += 1;
            next
        });
    }

    /// 当前快照
    pub fn snapshot(&self) -> ServoAngles {
        **self.inner.load()
    }

    pub fn arm_pose(&self) -> Pose {
        self.inner.load().arm_pose()
    }

    pub fn joint(&self, joint: Joint) -> Angle {
        self.get(joint.servo())
    }

    pub fn revision(&self) -> u64 {
        self.inner.load().revision
    }
}
