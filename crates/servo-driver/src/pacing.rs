//! 每通道发送节流
//!
//! 同一通道的两帧之间至少间隔一个最小时间，防止舵机被过快的连续指令损坏。
//! 节流在派发层统一执行，单条指令、直接位姿和动画三条路径行为一致，
//! 真实串口与 Mock 适配器的时序也因此一致。

use servo_protocol::{
    ARM_PACING_MS, BASE_PACING_MS, CHANNEL_COUNT, CHANNEL_PACING_MS, ELBOW_PACING_MS, JOINT_COUNT,
    Joint, SHOULDER_PACING_MS, ServoId, WRIST_PACING_MS,
};
use std::time::{Duration, Instant};

/// 底座（关节 1）最小间隔
pub const BASE_PACING: Duration = Duration::from_millis(BASE_PACING_MS);
/// 肩部（关节 2）最小间隔，负载最大
pub const SHOULDER_PACING: Duration = Duration::from_millis(SHOULDER_PACING_MS);
/// 肘部（关节 3）最小间隔
pub const ELBOW_PACING: Duration = Duration::from_millis(ELBOW_PACING_MS);
/// 腕部与夹爪（关节 4-6）最小间隔
pub const WRIST_PACING: Duration = Duration::from_millis(WRIST_PACING_MS);
/// 非机械臂通道（7-16）最小间隔
pub const CHANNEL_PACING: Duration = Duration::from_millis(CHANNEL_PACING_MS);

/// 节流参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingProfile {
    arm: [Duration; JOINT_COUNT],
    channel: Duration,
}

impl Default for PacingProfile {
    fn default() -> Self {
        Self::from_millis(ARM_PACING_MS, CHANNEL_PACING_MS)
    }
}

impl PacingProfile {
    pub const fn new(arm: [Duration; JOINT_COUNT], channel: Duration) -> Self {
        Self { arm, channel }
    }

    /// 从毫秒值构建（配置文件使用）
    pub fn from_millis(arm_ms: [u64; JOINT_COUNT], channel_ms: u64) -> Self {
        Self {
            arm: arm_ms.map(Duration::from_millis),
            channel: Duration::from_millis(channel_ms),
        }
    }

    /// 不节流（仅用于测试）
    pub const fn disabled() -> Self {
        Self {
            arm: [Duration::ZERO; JOINT_COUNT],
            channel: Duration::ZERO,
        }
    }

    /// 指定通道的最小间隔
    pub fn interval(&self, servo: ServoId) -> Duration {
        match servo.joint() {
            Some(joint) => self.arm[joint.index()],
            None => self.channel,
        }
    }

    pub fn joint(&self, joint: Joint) -> Duration {
        self.arm[joint.index()]
    }

    pub fn channel(&self) -> Duration {
        self.channel
    }
}

/// 记录每个通道最近一次发送时间
#[derive(Debug, Clone)]
pub struct PacingTracker {
    profile: PacingProfile,
    last_sent: [Option<Instant>; CHANNEL_COUNT],
}

impl PacingTracker {
    pub fn new(profile: PacingProfile) -> Self {
        Self {
            profile,
            last_sent: [None; CHANNEL_COUNT],
        }
    }

    pub fn profile(&self) -> &PacingProfile {
        &self.profile
    }

    /// 在 `now` 时刻向 `servo` 发送前还需要等待多久
    pub fn remaining(&self, servo: ServoId, now: Instant) -> Duration {
        match self.last_sent[servo.index()] {
            Some(last) => self
                .profile
                .interval(servo)
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// 阻塞到允许发送为止，返回实际等待的时长
    pub fn wait(&self, servo: ServoId) -> Duration {
        let remaining = self.remaining(servo, Instant::now());
        if !remaining.is_zero() {
            spin_sleep::sleep(remaining);
        }
        remaining
    }

    /// 记录一次成功发送
    pub fn record(&mut self, servo: ServoId, at: Instant) {
        self.last_sent[servo.index()] = Some(at);
    }
}
