//! 手动测试模式
//!
//! 逐通道发送单条指令，两条指令之间固定间隔；Ctrl+C 在指令之间生效。

use crate::utils::Interrupt;
use anyhow::{Context, Result};
use clap::Args;
use servo_client::{ServoArm, ServoId};
use std::time::Duration;

/// 单舵机测试中每个位置的停留时间
const TEST_HOLD: Duration = Duration::from_secs(2);
/// 全通道测试的通道间隔
const TEST_ALL_INTERVAL: Duration = Duration::from_millis(300);
/// 扫描时的通道间隔
const SWEEP_INTERVAL: Duration = Duration::from_millis(50);
/// 扫描时每个位置的停留时间
const SWEEP_HOLD: Duration = Duration::from_millis(1500);
/// 扫描经过的角度
const SWEEP_POSITIONS: [i32; 5] = [0, 90, 180, 90, 0];
/// 全通道设角与复位的通道间隔
const ALL_ANGLE_INTERVAL: Duration = Duration::from_millis(100);
const CENTER: i32 = 90;

/// 单舵机测试：0° → 180°
#[derive(Args, Debug)]
pub struct TestCommand {
    /// 通道号（1-16）
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub servo: i32,
}

impl TestCommand {
    pub fn execute(&self, arm: &ServoArm, interrupt: &Interrupt) -> Result<()> {
        let servo = ServoId::new(self.servo).context("Invalid servo")?;
        println!("=== Test servo {} ===", label(servo));

        for angle in [0, 180] {
            if interrupt.report_if_set() {
                return Ok(());
            }
            println!("Servo {} -> {}°", label(servo), angle);
            move_servo(arm, servo, angle)?;
            if !interrupt.pause(TEST_HOLD) {
                interrupt.report_if_set();
                return Ok(());
            }
        }

        println!("✅ Test finished");
        Ok(())
    }
}

/// 全部通道转到同一角度
#[derive(Args, Debug)]
pub struct AllAngleCommand {
    /// 目标角度（0-180）
    #[arg(allow_negative_numbers = true)]
    pub angle: i32,
}

impl AllAngleCommand {
    pub fn execute(&self, arm: &ServoArm, interrupt: &Interrupt) -> Result<()> {
        println!("=== Set all servos to {}° ===", self.angle);
        if sweep_channels(arm, self.angle, ALL_ANGLE_INTERVAL, interrupt, true)? {
            println!("✅ All servos at {}°", self.angle);
        }
        Ok(())
    }
}

/// 全部通道依次转到 90°，间隔 300ms
pub fn test_all(arm: &ServoArm, interrupt: &Interrupt) -> Result<()> {
    println!("=== Test all servos (1-16) ===");
    if sweep_channels(arm, CENTER, TEST_ALL_INTERVAL, interrupt, true)? {
        println!("✅ Test finished");
    }
    Ok(())
}

/// 全部通道经过 0 → 90 → 180 → 90 → 0
pub fn sweep(arm: &ServoArm, interrupt: &Interrupt) -> Result<()> {
    println!("=== Sweep all servos ===");
    for (i, &angle) in SWEEP_POSITIONS.iter().enumerate() {
        println!(">>> All servos -> {}°", angle);
        if !sweep_channels(arm, angle, SWEEP_INTERVAL, interrupt, false)? {
            return Ok(());
        }
        let last = i + 1 == SWEEP_POSITIONS.len();
        if !last && !interrupt.pause(SWEEP_HOLD) {
            interrupt.report_if_set();
            return Ok(());
        }
    }
    println!("✅ Sweep finished");
    Ok(())
}

/// 全部通道复位到 90°
pub fn reset(arm: &ServoArm, interrupt: &Interrupt) -> Result<()> {
    println!("=== Reset all servos to center ({}°) ===", CENTER);
    if sweep_channels(arm, CENTER, ALL_ANGLE_INTERVAL, interrupt, true)? {
        println!("✅ Reset finished");
    }
    Ok(())
}

/// 通道 1-16 依次发送同一角度
///
/// 返回 false 表示被中断。
fn sweep_channels(
    arm: &ServoArm,
    angle: i32,
    interval: Duration,
    interrupt: &Interrupt,
    verbose: bool,
) -> Result<bool> {
    for servo in ServoId::all() {
        if interrupt.report_if_set() {
            return Ok(false);
        }
        if verbose {
            println!("Servo {} -> {}°", label(servo), angle);
        }
        move_servo(arm, servo, angle)?;
        if !interrupt.pause(interval) {
            interrupt.report_if_set();
            return Ok(false);
        }
    }
    Ok(true)
}

/// `1 ('A')` 形式的通道标签
fn label(servo: ServoId) -> String {
    format!("{} ('{}')", servo.get(), char::from(servo.address()))
}

fn move_servo(arm: &ServoArm, servo: ServoId, angle: i32) -> Result<()> {
    arm.apply_single(i32::from(servo.get()), angle)
        .with_context(|| format!("Failed to move servo {} to {}°", servo.get(), angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::mock_arm;

    #[test]
    fn test_all_angle_visits_every_channel_in_order() {
        let (arm, log) = mock_arm();
        let cmd = AllAngleCommand { angle: 45 };
        cmd.execute(&arm, &Interrupt::new()).unwrap();

        let frames = log.frames();
        assert_eq!(frames.len(), 16);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(usize::from(frame.servo().get()), i + 1);
            assert_eq!(frame.angle().degrees(), 45);
        }
        assert!(arm.angles().iter().all(|(_, angle)| angle.degrees() == 45));
    }

    #[test]
    fn test_all_angle_out_of_range_sends_nothing() {
        let (arm, log) = mock_arm();
        let cmd = AllAngleCommand { angle: 181 };
        assert!(cmd.execute(&arm, &Interrupt::new()).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_interrupt_stops_between_commands() {
        let (arm, log) = mock_arm();
        let interrupt = Interrupt::new();
        interrupt.trigger();
        reset(&arm, &interrupt).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_label() {
        assert_eq!(label(ServoId::new(1).unwrap()), "1 ('A')");
        assert_eq!(label(ServoId::new(16).unwrap()), "16 ('P')");
    }

    #[test]
    fn test_invalid_test_servo_rejected() {
        let (arm, log) = mock_arm();
        let cmd = TestCommand { servo: 0 };
        assert!(cmd.execute(&arm, &Interrupt::new()).is_err());
        assert!(log.is_empty());
    }
}
