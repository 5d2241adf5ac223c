//! 动画与序列命令

use crate::utils::Interrupt;
use anyhow::{Context, Result, bail};
use clap::Args;
use servo_client::{AnimateOutcome, DEMO_SEQUENCE, ServoArm};
use std::time::Duration;

/// 以动画方式移动到命名位姿
#[derive(Args, Debug)]
pub struct AnimateCommand {
    /// 位姿名（内置或自定义）
    pub pattern: String,

    /// 步间延时（毫秒，默认取配置）
    #[arg(short, long)]
    pub delay: Option<u64>,
}

impl AnimateCommand {
    pub fn execute(&self, arm: &ServoArm) -> Result<()> {
        let delay = self.delay.map(Duration::from_millis);
        let outcome = arm
            .animate_pattern(&self.pattern, delay)
            .with_context(|| format!("Failed to animate to '{}'", self.pattern))?;

        let handle = match outcome {
            AnimateOutcome::Started(handle) => handle,
            AnimateOutcome::Busy => bail!("Another animation is already running"),
        };
        let report = handle
            .wait()
            .with_context(|| format!("Animation to '{}' aborted", self.pattern))?;

        println!(
            "✅ {} {} -> {} ({} frames, {} ms)",
            self.pattern,
            report.source,
            report.target,
            report.frames_sent,
            report.elapsed.as_millis()
        );
        Ok(())
    }
}

/// 播放位姿序列
#[derive(Args, Debug)]
pub struct SequenceCommand {
    /// 位姿名列表（默认演示序列）
    pub names: Vec<String>,

    /// 步间延时（毫秒，默认取配置）
    #[arg(short, long)]
    pub delay: Option<u64>,
}

impl SequenceCommand {
    /// 实际播放的名称列表
    pub fn names(&self) -> Vec<String> {
        if self.names.is_empty() {
            DEMO_SEQUENCE.iter().map(|name| name.to_string()).collect()
        } else {
            self.names.clone()
        }
    }

    pub fn execute(&self, arm: &ServoArm, interrupt: &Interrupt) -> Result<()> {
        let names = self.names();
        let delay = self.delay.map(Duration::from_millis);
        println!("=== Sequence: {} ===", names.join(" -> "));

        let report = arm
            .play_sequence_until(names.as_slice(), delay, interrupt.flag())
            .context("Sequence aborted")?;

        for name in &report.skipped {
            println!("⚠️  Skipped unknown pattern '{}'", name);
        }
        if report.interrupted {
            interrupt.report_if_set();
        }
        println!(
            "✅ Played {}/{} patterns ({} frames, {:.1} s)",
            report.played.len(),
            names.len(),
            report.frames_sent,
            report.elapsed.as_secs_f64()
        );
        Ok(())
    }
}
