//! 线性插值
//!
//! 从源位姿到目标位姿固定 20 步（含两端共 21 个点），整数截断除法：
//!
//! ```text
//! angle = source + (target - source) * step / 20
//! ```
//!
//! 结果是确定的阶梯序列，两端点精确，中间点可能有舍入误差。

use servo_protocol::{Angle, JOINT_COUNT, Pose, ServoFrame};
use smallvec::SmallVec;

/// 插值步数（固定，不可配置）
pub const STEP_COUNT: u32 = 20;

/// 单步的帧集合（每个关节一帧，栈上分配）
pub type StepFrames = SmallVec<[ServoFrame; JOINT_COUNT]>;

/// 单关节插值
pub fn interpolate(source: Angle, target: Angle, step: u32) -> Angle {
    let step = step.min(STEP_COUNT) as i32;
    let s = source.degrees() as i32;
    let t = target.degrees() as i32;
    // 结果总在 [min(s, t), max(s, t)] 内，钳位不会改变值
    Angle::clamped(s + (t - s) * step / STEP_COUNT as i32)
}

/// 整个位姿的插值
pub fn interpolate_pose(source: &Pose, target: &Pose, step: u32) -> Pose {
    let mut angles = [Angle::CENTER; JOINT_COUNT];
    for (i, slot) in angles.iter_mut().enumerate() {
        *slot = interpolate(source[i], target[i], step);
    }
    Pose::new(angles)
}

/// 位姿 → 关节 1 到 6 顺序的帧
pub fn step_frames(pose: &Pose) -> StepFrames {
    pose.iter()
        .map(|(joint, angle)| ServoFrame::new(joint.servo(), angle))
        .collect()
}

/// 插值迭代器，产出 `(step, pose)`，step 从 0 到 20
#[derive(Debug, Clone)]
pub struct LinearRamp {
    source: Pose,
    target: Pose,
    next: u32,
}

impl LinearRamp {
    pub fn new(source: Pose, target: Pose) -> Self {
        Self {
            source,
            target,
            next: 0,
        }
    }

    pub fn source(&self) -> &Pose {
        &self.source
    }

    pub fn target(&self) -> &Pose {
        &self.target
    }
}

impl Iterator for LinearRamp {
    type Item = (u32, Pose);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > STEP_COUNT {
            return None;
        }
        let step = self.next;
        self.next += 1;
        Some((step, interpolate_pose(&self.source, &self.target, step)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (STEP_COUNT + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for LinearRamp {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pose(d: [i32; 6]) -> Pose {
        Pose::from_degrees(d).unwrap()
    }

    #[test]
    fn test_home_to_rest_endpoints() {
        let steps: Vec<_> = LinearRamp::new(pose([90; 6]), pose([90, 45, 45, 90, 90, 90])).collect();
        assert_eq!(steps.len(), 21);

        let (first_step, first) = steps[0];
        let (last_step, last) = steps[20];
        assert_eq!(first_step, 0);
        assert_eq!(last_step, 20);
        assert_eq!(first.degrees(), [90; 6]);
        assert_eq!(last.degrees(), [90, 45, 45, 90, 90, 90]);

        // 不动的关节全程保持 90
        for (_, p) in &steps {
            for i in [0, 3, 4, 5] {
                assert_eq!(p[i].degrees(), 90);
            }
        }
    }

    #[test]
    fn test_truncating_staircase() {
        let a = Angle::new(90).unwrap();
        let b = Angle::new(45).unwrap();
        // 90 + (-45 * 1) / 20 = 90 + (-2) = 88（向零截断）
        assert_eq!(interpolate(a, b, 1).degrees(), 88);
        assert_eq!(interpolate(a, b, 10).degrees(), 68);
        assert_eq!(interpolate(a, b, 19).degrees(), 48);

        // 0 → 180 每步恰好 9 度
        let lo = Angle::MIN;
        let hi = Angle::MAX;
        assert_eq!(interpolate(lo, hi, 7).degrees(), 63);
        // step 超过 20 视为 20
        assert_eq!(interpolate(lo, hi, 25), hi);
    }

    #[test]
    fn test_step_frames_order() {
        let frames = step_frames(&pose([10, 20, 30, 40, 50, 60]));
        let text: Vec<String> = frames.iter().map(|f| f.to_string()).collect();
        assert_eq!(text, ["$A010#", "$B020#", "$C030#", "$D040#", "$E050#", "$F060#"]);
        assert!(!frames.spilled());
    }

    #[test]
    fn test_size_hint() {
        let mut ramp = LinearRamp::new(Pose::CENTER, Pose::CENTER);
        assert_eq!(ramp.len(), 21);
        ramp.next();
        assert_eq!(ramp.len(), 20);
    }

    proptest! {
        #[test]
        fn ramp_is_monotonic_with_exact_endpoints(s in 0i32..=180, t in 0i32..=180) {
            let source = Angle::new(s).unwrap();
            let target = Angle::new(t).unwrap();
            prop_assert_eq!(interpolate(source, target, 0), source);
            prop_assert_eq!(interpolate(source, target, STEP_COUNT), target);

            let mut prev = source;
            for step in 1..=STEP_COUNT {
                let cur = interpolate(source, target, step);
                if t >= s {
                    prop_assert!(cur >= prev);
                } else {
                    prop_assert!(cur <= prev);
                }
                prev = cur;
            }
        }
    }
}
