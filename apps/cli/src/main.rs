//! # Servo CLI
//!
//! 16 通道串口舵机控制板的命令行工具。
//!
//! ```bash
//! # 配置默认串口
//! servo-cli config set link.port /dev/ttyUSB0
//!
//! # 单通道指令
//! servo-cli send -s 1 -a 180
//!
//! # 无硬件演示
//! servo-cli --demo sequence
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use servo_client::ServoArm;
use servo_tools::EngineConfig;
use std::path::PathBuf;
use tracing::debug;

mod commands;
mod utils;

use commands::{
    AllAngleCommand, AnimateCommand, ConfigCommand, PatternsCommand, SendCommand,
    SequenceCommand, TestCommand,
};
use utils::Interrupt;

/// Servo CLI - 舵机控制命令行工具
#[derive(Parser, Debug)]
#[command(name = "servo-cli")]
#[command(about = "Command-line interface for the 16-channel serial servo controller", long_about = None)]
#[command(version)]
struct Cli {
    /// 串口名（默认取配置文件，否则 COM23）
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// 演示模式：不打开串口，打印每一帧
    #[arg(long, global = true)]
    demo: bool,

    /// 配置文件路径（默认 <config_dir>/servo-arm/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出引擎调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 发送单条舵机指令
    Send {
        #[command(flatten)]
        args: SendCommand,
    },

    /// 单舵机测试：0° → 180°
    Test {
        #[command(flatten)]
        args: TestCommand,
    },

    /// 全部通道依次回中
    TestAll,

    /// 全部通道扫描 0 → 90 → 180 → 90 → 0
    Sweep,

    /// 全部通道转到同一角度
    AllAngle {
        #[command(flatten)]
        args: AllAngleCommand,
    },

    /// 全部通道复位到 90°
    Reset,

    /// 以动画方式移动到命名位姿
    Animate {
        #[command(flatten)]
        args: AnimateCommand,
    },

    /// 播放位姿序列
    Sequence {
        #[command(flatten)]
        args: SequenceCommand,
    },

    /// 位姿库管理
    #[command(subcommand)]
    Patterns(PatternsCommand),

    /// 列出可用串口
    Ports,

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(EngineConfig::default_path)
    }

    /// 加载配置文件并应用命令行覆盖
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match self.config_path() {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                EngineConfig::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            },
            None => EngineConfig::default(),
        };
        if let Some(port) = &self.port {
            config.link.port = port.clone();
        }
        if self.demo {
            config.link.demo = true;
        }
        Ok(config)
    }

    fn open_arm(&self) -> Result<ServoArm> {
        let config = self.engine_config()?;
        let arm = ServoArm::open(&config)
            .with_context(|| format!("Failed to open servo controller on {}", config.link.port))?;
        if config.link.demo {
            println!("🧪 Demo mode: frames are printed instead of sent");
        } else {
            println!("✅ Connected to {}", arm.port_name());
        }
        Ok(arm)
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    // 演示模式的帧回显来自 servo_link
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("servo_cli=info".parse()?)
        .add_directive("servo_link=info".parse()?);
    if verbose {
        filter = filter
            .add_directive("servo_driver=debug".parse()?)
            .add_directive("servo_client=debug".parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match &cli.command {
        Commands::Config(cmd) => {
            let path = cli.config_path().context("Cannot determine config directory")?;
            cmd.execute(&path)
        },

        Commands::Ports => commands::ports::execute(),

        Commands::Patterns(cmd) => {
            let config = cli.engine_config()?;
            cmd.execute(&config)
        },

        Commands::Send { args } => {
            let arm = cli.open_arm()?;
            args.execute(&arm)
        },

        Commands::Test { args } => {
            let arm = cli.open_arm()?;
            args.execute(&arm, &Interrupt::install()?)
        },

        Commands::TestAll => {
            let arm = cli.open_arm()?;
            commands::manual::test_all(&arm, &Interrupt::install()?)
        },

        Commands::Sweep => {
            let arm = cli.open_arm()?;
            commands::manual::sweep(&arm, &Interrupt::install()?)
        },

        Commands::AllAngle { args } => {
            let arm = cli.open_arm()?;
            args.execute(&arm, &Interrupt::install()?)
        },

        Commands::Reset => {
            let arm = cli.open_arm()?;
            commands::manual::reset(&arm, &Interrupt::install()?)
        },

        Commands::Animate { args } => {
            let arm = cli.open_arm()?;
            args.execute(&arm)
        },

        Commands::Sequence { args } => {
            let arm = cli.open_arm()?;
            args.execute(&arm, &Interrupt::install()?)
        },
    }
}
