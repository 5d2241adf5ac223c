//! # Servo Client
//!
//! 面向展示层的高级接口：
//! - [`ServoArm`]: 单通道指令、直接位姿、动画、位姿库、状态读取
//! - 位姿序列（[`ServoArm::play_sequence`]）
//!
//! 如果需要直接控制适配器或节流参数，可以使用 `servo-driver`。

mod arm;
mod error;
mod sequence;

pub use arm::{AnimateOutcome, DEFAULT_HOLD, ServoArm};
pub use error::{ClientError, Result};
pub use sequence::{SequenceReport, sleep_unless_stopped};

// 重新导出常用类型
pub use servo_driver::{MetricsSnapshot, RunHandle, RunReport, ServoAngles};
pub use servo_protocol::{Angle, Joint, Pose, ServoId};
pub use servo_tools::{DEMO_SEQUENCE, EngineConfig, PatternStore};
