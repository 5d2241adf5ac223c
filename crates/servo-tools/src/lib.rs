//! # Servo Tools - 位姿库与配置
//!
//! **依赖原则**: 只依赖 `servo-protocol`，不引入驱动与硬件依赖
//!
//! ## 包含模块
//!
//! - `patterns` - 命名位姿库（内置 + 自定义，JSON 文件导入导出）
//! - `config` - 引擎配置（TOML）

pub mod config;
pub mod patterns;

// 重新导出常用类型
pub use config::{
    CONFIG_KEYS, ConfigError, EngineConfig, LinkConfig, MotionConfig, PacingConfig, PatternsConfig,
};
pub use patterns::{DEMO_SEQUENCE, Pattern, PatternError, PatternKind, PatternStore};
