//! 机械臂占用状态
//!
//! `Idle → Running → Idle`（动画）或 `Idle → Direct → Idle`（前台直接指令）。
//! 唯一的协调原语：启动时用 compare-and-swap 原子地检查并占用，
//! 两个请求不可能同时拿到机械臂关节。

use std::sync::atomic::{AtomicU8, Ordering};

/// 机械臂关节（通道 1-6）占用状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SequencerState {
    /// 空闲
    #[default]
    Idle = 0,

    /// 后台动画运行中
    Running = 1,

    /// 前台直接指令（单通道或直接位姿）发送中
    Direct = 2,
}

impl SequencerState {
    /// 从 u8 转换，无效值视为 Idle
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Direct,
            _ => Self::Idle,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

/// 原子版本，用于线程间共享
#[derive(Debug, Default)]
pub struct AtomicSequencerState {
    inner: AtomicU8,
}

impl AtomicSequencerState {
    pub fn new(state: SequencerState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    pub fn get(&self) -> SequencerState {
        SequencerState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 尝试从 Idle 进入 `state`，成功返回 true
    pub fn try_acquire(&self, state: SequencerState) -> bool {
        self.inner
            .compare_exchange(
                SequencerState::Idle.as_u8(),
                state.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// 回到 Idle
    pub fn release(&self) {
        self.inner.store(SequencerState::Idle.as_u8(), Ordering::Release);
    }
}

/// 占用守卫，drop 时释放（包括 panic 展开）
#[derive(Debug)]
pub struct StateGuard<'a> {
    state: &'a AtomicSequencerState,
}

impl<'a> StateGuard<'a> {
    /// 尝试占用，失败返回 None
    pub fn acquire(state: &'a AtomicSequencerState, as_state: SequencerState) -> Option<Self> {
        state.try_acquire(as_state).then_some(Self { state })
    }

    /// 接管一个已经由别处占用的状态
    pub fn adopt(state: &'a AtomicSequencerState) -> Self {
        Self { state }
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.state.release();
    }
}
