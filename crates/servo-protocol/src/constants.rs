//! 协议常量定义
//!
//! 帧格式：`$` + 地址字节（`A`-`P`）+ 三位十进制角度 + `#`，固定 6 字节。
//! 链路参数固定为 9600-8N1，不可配置。

use std::time::Duration;

/// 帧起始字节 `$`
pub const FRAME_START: u8 = b'$';

/// 帧结束字节 `#`
pub const FRAME_END: u8 = b'#';

/// 帧长度（字节）
pub const FRAME_LEN: usize = 6;

/// 舵机 1 对应的地址字节，舵机 N 的地址为 `ADDRESS_BASE + N - 1`
pub const ADDRESS_BASE: u8 = b'A';

/// 通道数量（1-16）
pub const CHANNEL_COUNT: usize = 16;

/// 机械臂关节数量（通道 1-6）
pub const JOINT_COUNT: usize = 6;

/// 角度下限（度）
pub const ANGLE_MIN: u8 = 0;

/// 角度上限（度）
pub const ANGLE_MAX: u8 = 180;

/// 上电/复位后的中位角度（度）
pub const ANGLE_CENTER: u8 = 90;

// === 链路参数（9600-8N1） ===

/// 波特率
pub const BAUD_RATE: u32 = 9600;

/// 默认串口名
pub const DEFAULT_PORT: &str = "COM23";

/// 数据位
pub const DATA_BITS: u8 = 8;

/// 停止位
pub const STOP_BITS: u8 = 1;

/// 每字节在线路上占用的位数（1 起始位 + 8 数据位 + 1 停止位，无校验）
pub const BITS_PER_BYTE_ON_WIRE: u32 = 1 + DATA_BITS as u32 + STOP_BITS as u32;

/// 一帧在 9600-8N1 线路上的传输时间（6 × 10 bit / 9600 = 6.25ms）
pub const FRAME_WIRE_TIME: Duration =
    Duration::from_micros(FRAME_LEN as u64 * BITS_PER_BYTE_ON_WIRE as u64 * 1_000_000 / BAUD_RATE as u64);

// === 默认节流（毫秒）：同一通道两帧之间的最小间隔，保护舵机 ===

/// 底座（关节 1）
pub const BASE_PACING_MS: u64 = 50;

/// 肩部（关节 2），负载最大
pub const SHOULDER_PACING_MS: u64 = 100;

/// 肘部（关节 3）
pub const ELBOW_PACING_MS: u64 = 100;

/// 腕部与夹爪（关节 4-6）
pub const WRIST_PACING_MS: u64 = 30;

/// 非机械臂通道（7-16）
pub const CHANNEL_PACING_MS: u64 = 50;

/// 关节 1-6 的默认节流，按关节顺序
pub const ARM_PACING_MS: [u64; JOINT_COUNT] = [
    BASE_PACING_MS,
    SHOULDER_PACING_MS,
    ELBOW_PACING_MS,
    WRIST_PACING_MS,
    WRIST_PACING_MS,
    WRIST_PACING_MS,
];
