//! 配置管理命令
//!
//! 读写 TOML 配置文件（串口、运动参数、节流、位姿库路径）

use anyhow::{Context, Result};
use clap::Subcommand;
use servo_tools::{CONFIG_KEYS, EngineConfig};
use std::path::Path;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 配置项名称（如 link.port, motion.step_delay_ms）
        key: String,

        /// 新值
        value: String,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(&self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Set { key, value } => Self::set_(path, key, value),

            ConfigCommand::Get { key } => Self::get_(path, key),

            ConfigCommand::Check => Self::check_(path),
        }
    }

    fn load(path: &Path) -> Result<EngineConfig> {
        EngineConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
    }

    fn set_(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut config = Self::load(path)?;
        config
            .set(key, value)
            .with_context(|| format!("Cannot set {}", key))?;
        config
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✅ {} = {}", key, config.get(key)?);
        Ok(())
    }

    fn get_(path: &Path, key: &str) -> Result<()> {
        let config = Self::load(path)?;
        if key == "all" {
            for key in CONFIG_KEYS {
                println!("{} = {}", key, display_value(&config.get(key)?));
            }
        } else {
            println!("{}", config.get(key)?);
        }
        Ok(())
    }

    fn check_(path: &Path) -> Result<()> {
        println!("Config file: {}", path.display());
        if !path.exists() {
            println!("  (not found, using defaults)");
        }
        let config = Self::load(path)?;
        config.validate()?;
        for key in CONFIG_KEYS {
            println!("  {} = {}", key, display_value(&config.get(key)?));
        }
        println!("✅ Config OK");
        Ok(())
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        ConfigCommand::Set {
            key: "link.port".to_string(),
            value: "/dev/ttyUSB0".to_string(),
        }
        .execute(&path)
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.link.port, "/dev/ttyUSB0");
    }

    #[test]
    fn test_invalid_value_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let result = ConfigCommand::Set {
            key: "motion.step_delay_ms".to_string(),
            value: "99999".to_string(),
        }
        .execute(&path);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_get_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let result = ConfigCommand::Get {
            key: "link.speed".to_string(),
        }
        .execute(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        ConfigCommand::Check
            .execute(&dir.path().join("config.toml"))
            .unwrap();
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(""), "(not set)");
        assert_eq!(display_value("COM23"), "COM23");
    }
}
