//! # Servo Driver
//!
//! 舵机驱动层，包括：
//! - 舵机状态表（ArcSwap 无锁读取）
//! - 每通道发送节流
//! - 帧派发（所有发送路径的唯一出口）
//! - 线性插值与动画工作线程
//!
//! 大多数用户应该使用 `servo-client` 提供的 `ServoArm` 高级接口。

mod builder;
mod dispatch;
mod driver;
mod error;
pub mod metrics;
pub mod pacing;
pub mod ramp;
pub mod run_state;
pub mod sequencer;
pub mod table;

pub use builder::ServoDriverBuilder;
pub use driver::ServoDriver;
pub use error::DriverError;
pub use metrics::{DriverMetrics, MetricsSnapshot};
pub use pacing::{
    BASE_PACING, CHANNEL_PACING, ELBOW_PACING, PacingProfile, SHOULDER_PACING, WRIST_PACING,
};
pub use ramp::{LinearRamp, STEP_COUNT, StepFrames};
pub use run_state::SequencerState;
pub use sequencer::{DEFAULT_STEP_DELAY, RunHandle, RunReport};
pub use table::{ServoAngles, ServoTable};
