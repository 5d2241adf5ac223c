//! 单条指令命令

use anyhow::{Context, Result};
use clap::Args;
use servo_client::ServoArm;

/// 单条舵机指令
#[derive(Args, Debug)]
pub struct SendCommand {
    /// 通道号（1-16）
    #[arg(short, long, allow_negative_numbers = true)]
    pub servo: i32,

    /// 角度（0-180）
    #[arg(short, long, allow_negative_numbers = true)]
    pub angle: i32,
}

impl SendCommand {
    pub fn execute(&self, arm: &ServoArm) -> Result<()> {
        arm.apply_single(self.servo, self.angle).with_context(|| {
            format!("Failed to move servo {} to {}°", self.servo, self.angle)
        })?;
        println!("✅ Servo {} -> {}°", self.servo, self.angle);
        Ok(())
    }
}
