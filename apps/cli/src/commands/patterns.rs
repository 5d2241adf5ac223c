//! 位姿库命令
//!
//! 自定义位姿保存在配置项 `patterns.library` 指向的 JSON 文件中。

use anyhow::{Context, Result};
use clap::Subcommand;
use servo_tools::{EngineConfig, PatternStore};
use std::path::{Path, PathBuf};

/// 位姿库命令
#[derive(Subcommand, Debug)]
pub enum PatternsCommand {
    /// 列出内置与自定义位姿
    List,

    /// 导出自定义位姿到 JSON 文件
    Export {
        /// 目标文件
        file: PathBuf,
    },

    /// 从 JSON 文件导入（合并到位姿库）
    Import {
        /// 源文件
        file: PathBuf,
    },

    /// 删除自定义位姿
    Delete {
        /// 位姿名
        name: String,
    },
}

impl PatternsCommand {
    pub fn execute(&self, config: &EngineConfig) -> Result<()> {
        let library = config.patterns.library.as_deref();
        let mut store = load_library(library)?;

        match self {
            PatternsCommand::List => {
                for pattern in store.list() {
                    println!(
                        "{:<16} {:<8} {}",
                        pattern.name,
                        pattern.kind.to_string(),
                        pattern.pose
                    );
                }
            },

            PatternsCommand::Export { file } => {
                let count = store
                    .export(file)
                    .with_context(|| format!("Failed to export patterns to {}", file.display()))?;
                println!("✅ Exported {} patterns to {}", count, file.display());
            },

            PatternsCommand::Import { file } => {
                let library = require_library(library)?;
                let count = store
                    .import(file)
                    .with_context(|| format!("Failed to import patterns from {}", file.display()))?;
                save_library(&store, library)?;
                println!("✅ Imported {} patterns into {}", count, library.display());
            },

            PatternsCommand::Delete { name } => {
                let library = require_library(library)?;
                store.delete(name)?;
                save_library(&store, library)?;
                println!("✅ Deleted pattern '{}'", name.trim());
            },
        }
        Ok(())
    }
}

fn load_library(library: Option<&Path>) -> Result<PatternStore> {
    match library {
        Some(path) => PatternStore::load(path)
            .with_context(|| format!("Failed to load pattern library {}", path.display())),
        None => Ok(PatternStore::new()),
    }
}

fn require_library(library: Option<&Path>) -> Result<&Path> {
    library.context(
        "No pattern library configured (run: servo-cli config set patterns.library <file>)",
    )
}

fn save_library(store: &PatternStore, library: &Path) -> Result<()> {
    store
        .export(library)
        .with_context(|| format!("Failed to write pattern library {}", library.display()))?;
    Ok(())
}
