//! ServoArm 集成测试（MockSerialAdapter，无硬件）

use servo_client::{
    AnimateOutcome, ClientError, DEMO_SEQUENCE, EngineConfig, Pose, ServoArm, sleep_unless_stopped,
};
use servo_driver::{PacingProfile, ServoDriverBuilder};
use servo_link::{FrameLog, MockSerialAdapter};
use servo_tools::PatternStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn mock_arm() -> (ServoArm, FrameLog) {
    mock_arm_with(MockSerialAdapter::new())
}

fn mock_arm_with(adapter: MockSerialAdapter) -> (ServoArm, FrameLog) {
    let log = adapter.log();
    let driver = ServoDriverBuilder::new()
        .adapter(adapter)
        .pacing(PacingProfile::disabled())
        .build()
        .unwrap();
    let arm = ServoArm::with_driver(driver)
        .with_step_delay(Duration::ZERO)
        .with_hold(Duration::from_millis(5));
    (arm, log)
}

#[test]
fn test_animate_reports_busy_instead_of_error() {
    let (arm, _log) = mock_arm();
    let rest = arm.patterns().get("Rest").unwrap();

    let first = arm.animate(rest, Some(Duration::from_millis(20))).unwrap();
    assert!(first.is_started());

    let second = arm.animate(Pose::CENTER, None).unwrap();
    assert!(matches!(second, AnimateOutcome::Busy));
    assert!(arm.is_busy());

    first.into_handle().unwrap().wait().unwrap();
    assert_eq!(arm.arm_pose(), rest);
    assert_eq!(arm.metrics().busy_rejections, 1);
}

#[test]
fn test_animate_pattern_unknown_name() {
    let (arm, log) = mock_arm();
    let err = arm.animate_pattern("Moonwalk", None).unwrap_err();
    assert!(matches!(err, ClientError::UnknownPattern { .. }));
    assert!(log.is_empty());
}

#[test]
fn test_apply_pattern_is_direct() {
    let (arm, log) = mock_arm();
    arm.apply_pattern("ReachUp").unwrap();
    assert_eq!(log.len(), 6);
    assert_eq!(arm.arm_pose().degrees(), [90, 135, 45, 90, 90, 45]);
}

#[test]
fn test_save_current_snapshots_arm_joints() {
    let (mut arm, _log) = mock_arm();
    arm.apply_single(1, 10).unwrap();
    arm.apply_single(6, 170).unwrap();
    arm.apply_single(9, 0).unwrap();

    let saved = arm.save_current(" Custom ").unwrap();
    assert_eq!(saved.degrees(), [10, 90, 90, 90, 90, 170]);
    assert_eq!(arm.patterns().get("Custom"), Some(saved));

    let err = arm.save_current("Home").unwrap_err();
    assert!(matches!(err, ClientError::Pattern(_)));
}

#[test]
fn test_out_of_range_rejected_before_io() {
    let (arm, log) = mock_arm();
    for (id, angle) in [(0, 90), (17, 90), (1, -1), (1, 181)] {
        assert!(arm.apply_single(id, angle).unwrap_err().is_out_of_range());
    }
    assert!(log.is_empty());
}

#[test]
fn test_demo_sequence_plays_in_order() {
    let (arm, _log) = mock_arm();
    let report = arm.play_sequence(&DEMO_SEQUENCE, None).unwrap();

    assert_eq!(report.played, DEMO_SEQUENCE);
    assert!(report.skipped.is_empty());
    assert!(!report.interrupted);
    assert_eq!(report.frames_sent, 6 * 126);
    assert_eq!(arm.arm_pose(), Pose::CENTER);
    assert_eq!(arm.metrics().runs_completed, 6);
}

#[test]
fn test_sequence_holds_between_patterns() {
    let (arm, _log) = mock_arm();
    let arm = arm.with_hold(Duration::from_millis(50));

    let start = Instant::now();
    arm.play_sequence(&["Rest", "Home", "Pick"], None).unwrap();
    // 三个位姿之间两次停留
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[test]
fn test_sequence_skips_unknown_names() {
    let (arm, _log) = mock_arm();
    let report = arm
        .play_sequence(&["Rest", "Nope", "Home"], None)
        .unwrap();
    assert_eq!(report.played, ["Rest", "Home"]);
    assert_eq!(report.skipped, ["Nope"]);
}

#[test]
fn test_sequence_stops_on_flag() {
    let (arm, _log) = mock_arm();
    let arm = arm.with_hold(Duration::from_secs(5));
    let stop = Arc::new(AtomicBool::new(false));

    let stopper = {
        let stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            stop.store(true, Ordering::Relaxed);
        })
    };

    let start = Instant::now();
    let report = arm
        .play_sequence_until(&["Rest", "Home", "Pick"], None, &stop)
        .unwrap();
    stopper.join().unwrap();

    assert!(report.interrupted);
    assert_eq!(report.played, ["Rest"]);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_sequence_aborts_on_transmission_failure() {
    let (arm, _log) = mock_arm_with(MockSerialAdapter::new().fail_after(130));
    let err = arm.play_sequence(&["Rest", "Home"], None).unwrap_err();
    assert!(err.is_link_failure(), "{:?}", err);
}

#[test]
fn test_open_demo_config_loads_library() {
    let dir = TempDir::new().unwrap();
    let library = dir.path().join("library.json");

    let mut store = PatternStore::new();
    store
        .save("Wave", Pose::from_degrees([90, 120, 60, 90, 90, 45]).unwrap())
        .unwrap();
    store.export(&library).unwrap();

    let mut config = EngineConfig::default();
    config.link.demo = true;
    config.pacing.arm_ms = [0; 6];
    config.pacing.channel_ms = 0;
    config.motion.step_delay_ms = 0;
    config.patterns.library = Some(library);

    let arm = ServoArm::open(&config).unwrap();
    assert_eq!(arm.port_name(), "mock");
    assert_eq!(arm.patterns().len(), 1);

    let run = arm.animate_pattern("Wave", None).unwrap().into_handle().unwrap();
    run.wait().unwrap();
    assert_eq!(arm.arm_pose().degrees(), [90, 120, 60, 90, 90, 45]);
}

#[test]
fn test_open_missing_port_is_port_unavailable() {
    let mut config = EngineConfig::default();
    config.link.port = "/dev/servo-client-no-such-port".to_string();
    let err = ServoArm::open(&config).err().unwrap();
    assert!(err.is_port_unavailable(), "{:?}", err);
}

#[test]
fn test_angles_revision_changes_on_write() {
    let (arm, _log) = mock_arm();
    let before = arm.angles().revision();
    arm.apply_single(12, 33).unwrap();
    let after = arm.angles();
    assert_eq!(after.revision(), before + 1);
    assert_eq!(after.degrees()[11], 33);
}

#[test]
fn test_sleep_unless_stopped_waits_full_duration() {
    let stop = AtomicBool::new(false);
    let start = Instant::now();
    assert!(sleep_unless_stopped(Duration::from_millis(30), &stop));
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_sleep_unless_stopped_returns_when_flag_set() {
    let stop = Arc::new(AtomicBool::new(false));
    let setter = {
        let stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop.store(true, Ordering::SeqCst);
        })
    };
    let start = Instant::now();
    assert!(!sleep_unless_stopped(Duration::from_secs(5), &stop));
    assert!(start.elapsed() < Duration::from_secs(2));
    setter.join().unwrap();
}
