//! # 引擎配置
//!
//! TOML 文件，所有字段都有默认值，缺失的段和字段使用默认值：
//!
//! ```toml
//! [link]
//! port = "COM23"
//! demo = false
//!
//! [motion]
//! step_delay_ms = 50
//! hold_ms = 1000
//!
//! [pacing]
//! arm_ms = [50, 100, 100, 30, 30, 30]
//! channel_ms = 50
//!
//! [patterns]
//! library = "/home/me/patterns.json"
//! ```
//!
//! 链路参数（9600-8N1）是协议常量，不在配置中。

use serde::{Deserialize, Serialize};
use servo_protocol::{ARM_PACING_MS, CHANNEL_PACING_MS, DEFAULT_PORT, JOINT_COUNT};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 配置目录名
pub const CONFIG_DIR_NAME: &str = "servo-arm";
/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// 步间延时上限（毫秒）
pub const MAX_STEP_DELAY_MS: u64 = 1000;

/// `get`/`set` 支持的点分键名
pub const CONFIG_KEYS: [&str; 7] = [
    "link.port",
    "link.demo",
    "motion.step_delay_ms",
    "motion.hold_ms",
    "pacing.arm_ms",
    "pacing.channel_ms",
    "patterns.library",
];

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Unknown config key: {0}")]
    UnknownKey(String),
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub link: LinkConfig,
    pub motion: MotionConfig,
    pub pacing: PacingConfig,
    pub patterns: PatternsConfig,
}

/// 串口设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// 串口名
    pub port: String,
    /// 演示模式（无硬件）
    pub demo: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            demo: false,
        }
    }
}

/// 运动设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// 动画步间延时（毫秒）
    pub step_delay_ms: u64,
    /// 序列中两个位姿之间的停留时间（毫秒）
    pub hold_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 50,
            hold_ms: 1000,
        }
    }
}

/// 节流设置（毫秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// 关节 1-6 的最小发送间隔
    pub arm_ms: [u64; JOINT_COUNT],
    /// 通道 7-16 的最小发送间隔
    pub channel_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            arm_ms: ARM_PACING_MS,
            channel_ms: CHANNEL_PACING_MS,
        }
    }
}

/// 位姿库设置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// 启动时加载的位姿文件（不存在不报错）
    pub library: Option<PathBuf>,
}

impl EngineConfig {
    /// 默认配置文件路径
    ///
    /// - Linux: `~/.config/servo-arm/config.toml`
    /// - macOS: `~/Library/Application Support/servo-arm/config.toml`
    /// - Windows: `%APPDATA%\servo-arm\config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 从文件加载，文件不存在时返回默认配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            },
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            },
        };
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存到文件（自动创建父目录）
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.port.trim().is_empty() {
            return Err(ConfigError::Invalid("link.port must not be empty".to_string()));
        }
        if self.motion.step_delay_ms > MAX_STEP_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "motion.step_delay_ms must be at most {} (got {})",
                MAX_STEP_DELAY_MS, self.motion.step_delay_ms
            )));
        }
        Ok(())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.motion.step_delay_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.motion.hold_ms)
    }

    /// 按点分键名读取，如 `motion.step_delay_ms`
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "link.port" => self.link.port.clone(),
            "link.demo" => self.link.demo.to_string(),
            "motion.step_delay_ms" => self.motion.step_delay_ms.to_string(),
            "motion.hold_ms" => self.motion.hold_ms.to_string(),
            "pacing.arm_ms" => self
                .pacing
                .arm_ms
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
            "pacing.channel_ms" => self.pacing.channel_ms.to_string(),
            "patterns.library" => self
                .patterns
                .library
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// 按点分键名写入；校验失败时配置保持不变
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let mut next = self.clone();
        match key {
            "link.port" => next.link.port = value.to_string(),
            "link.demo" => next.link.demo = parse_value(key, value)?,
            "motion.step_delay_ms" => next.motion.step_delay_ms = parse_value(key, value)?,
            "motion.hold_ms" => next.motion.hold_ms = parse_value(key, value)?,
            "pacing.arm_ms" => {
                let values = value
                    .split(',')
                    .map(|v| parse_value::<u64>(key, v.trim()))
                    .collect::<Result<Vec<_>, _>>()?;
                next.pacing.arm_ms = values.try_into().map_err(|v: Vec<u64>| {
                    ConfigError::Invalid(format!(
                        "pacing.arm_ms needs {} values (got {})",
                        JOINT_COUNT,
                        v.len()
                    ))
                })?;
            },
            "pacing.channel_ms" => next.pacing.channel_ms = parse_value(key, value)?,
            "patterns.library" => {
                next.patterns.library = (!value.is_empty()).then(|| PathBuf::from(value));
            },
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{}: cannot parse '{}'", key, value)))
}
