//! 机械臂高级接口
//!
//! 展示层（UI 或 CLI）调用的协作接口：单通道指令、直接位姿、动画、
//! 位姿库管理以及当前角度读取。引擎不主动推送事件，展示层轮询
//! [`ServoArm::angles`] 的 `revision` 决定是否重绘。

use crate::error::{ClientError, Result};
use servo_driver::{
    DEFAULT_STEP_DELAY, DriverError, MetricsSnapshot, PacingProfile, RunHandle, ServoAngles,
    ServoDriver, ServoDriverBuilder,
};
use servo_protocol::Pose;
use servo_tools::{EngineConfig, PatternStore};
use std::time::Duration;
use tracing::{info, warn};

/// 序列中两个位姿之间的默认停留时间
pub const DEFAULT_HOLD: Duration = Duration::from_secs(1);

/// 动画启动结果
#[derive(Debug)]
pub enum AnimateOutcome {
    /// 已启动
    Started(RunHandle),
    /// 已有运动在进行，请求被拒绝（不排队）
    Busy,
}

impl AnimateOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, AnimateOutcome::Started(_))
    }

    /// 取出句柄
    pub fn into_handle(self) -> Option<RunHandle> {
        match self {
            AnimateOutcome::Started(handle) => Some(handle),
            AnimateOutcome::Busy => None,
        }
    }
}

/// 舵机机械臂
///
/// # 示例
///
/// ```rust
/// use servo_client::{AnimateOutcome, ServoArm};
/// use servo_tools::EngineConfig;
///
/// let mut config = EngineConfig::default();
/// config.link.demo = true;
/// config.pacing.arm_ms = [0; 6];
///
/// let arm = ServoArm::open(&config).unwrap();
/// arm.apply_single(1, 45).unwrap();
///
/// if let AnimateOutcome::Started(run) = arm.animate_pattern("Rest", None).unwrap() {
///     run.wait().unwrap();
/// }
/// assert_eq!(arm.arm_pose().degrees(), [90, 45, 45, 90, 90, 90]);
/// ```
pub struct ServoArm {
    driver: ServoDriver,
    patterns: PatternStore,
    step_delay: Duration,
    hold: Duration,
}

impl ServoArm {
    /// 按配置打开：真实串口或演示模式，并加载配置中的位姿库
    ///
    /// # 错误
    /// - `ClientError::Driver`: 串口不可用或工作线程启动失败
    /// - `ClientError::Pattern`: 位姿库文件存在但格式错误
    pub fn open(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let builder = ServoDriverBuilder::new().pacing(pacing_profile(config));
        let builder = if config.link.demo {
            builder.demo(true)
        } else {
            builder.port(config.link.port.as_str())
        };
        let driver = builder.build()?;

        let patterns = match &config.patterns.library {
            Some(path) => PatternStore::load(path)?,
            None => PatternStore::new(),
        };

        info!(
            "Servo arm ready on {} ({} custom patterns)",
            driver.port_name(),
            patterns.len()
        );
        Ok(Self::with_driver(driver)
            .with_patterns(patterns)
            .with_step_delay(config.step_delay())
            .with_hold(config.hold()))
    }

    /// 使用已创建的驱动（测试或自定义适配器）
    pub fn with_driver(driver: ServoDriver) -> Self {
        Self {
            driver,
            patterns: PatternStore::new(),
            step_delay: DEFAULT_STEP_DELAY,
            hold: DEFAULT_HOLD,
        }
    }

    pub fn with_patterns(mut self, patterns: PatternStore) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    // ==================== 直接指令 ====================

    /// 单通道指令（无动画）
    pub fn apply_single(&self, servo_id: i32, angle: i32) -> Result<()> {
        self.driver.apply_single(servo_id, angle)?;
        Ok(())
    }

    /// 直接位姿（无动画）
    pub fn apply_pose(&self, pose: &Pose) -> Result<()> {
        self.driver.apply_pose(pose)?;
        Ok(())
    }

    /// 直接跳到命名位姿（无动画）
    pub fn apply_pattern(&self, name: &str) -> Result<()> {
        let pose = self.resolve(name)?;
        self.apply_pose(&pose)
    }

    // ==================== 动画 ====================

    /// 启动动画
    ///
    /// `step_delay` 为 `None` 时使用默认步间延时。`Busy` 作为结果返回而不是错误。
    pub fn animate(&self, target: Pose, step_delay: Option<Duration>) -> Result<AnimateOutcome> {
        let delay = step_delay.unwrap_or(self.step_delay);
        match self.driver.animate(target, delay) {
            Ok(handle) => Ok(AnimateOutcome::Started(handle)),
            Err(DriverError::Busy) => Ok(AnimateOutcome::Busy),
            Err(e) => Err(e.into()),
        }
    }

    /// 以动画方式移动到命名位姿
    pub fn animate_pattern(&self, name: &str, step_delay: Option<Duration>) -> Result<AnimateOutcome> {
        let pose = self.resolve(name)?;
        self.animate(pose, step_delay)
    }

    // ==================== 位姿库 ====================

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut PatternStore {
        &mut self.patterns
    }

    /// 将当前关节 1-6 的角度保存为自定义位姿
    pub fn save_current(&mut self, name: &str) -> Result<Pose> {
        let pose = self.driver.arm_pose();
        self.patterns.save(name, pose)?;
        info!("Saved current pose as '{}': {}", name.trim(), pose);
        Ok(pose)
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<Pose> {
        self.patterns.get(name).ok_or_else(|| {
            warn!("Pattern '{}' not found", name);
            ClientError::UnknownPattern {
                name: name.to_string(),
            }
        })
    }

    // ==================== 状态读取 ====================

    /// 全部 16 个通道的当前角度
    pub fn angles(&self) -> ServoAngles {
        self.driver.angles()
    }

    pub fn arm_pose(&self) -> Pose {
        self.driver.arm_pose()
    }

    pub fn is_busy(&self) -> bool {
        self.driver.is_busy()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.driver.metrics()
    }

    pub fn port_name(&self) -> &str {
        self.driver.port_name()
    }

    pub fn driver(&self) -> &ServoDriver {
        &self.driver
    }
}

/// 配置中的节流参数
fn pacing_profile(config: &EngineConfig) -> PacingProfile {
    PacingProfile::from_millis(config.pacing.arm_ms, config.pacing.channel_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_pacing_matches_driver_default() {
        assert_eq!(
            pacing_profile(&EngineConfig::default()),
            PacingProfile::default()
        );
    }

    #[test]
    fn test_custom_config_pacing() {
        let mut config = EngineConfig::default();
        config.pacing.arm_ms = [1, 2, 3, 4, 5, 6];
        config.pacing.channel_ms = 7;
        assert_eq!(
            pacing_profile(&config),
            PacingProfile::from_millis([1, 2, 3, 4, 5, 6], 7)
        );
    }
}
