//! 帧编解码属性测试
//!
//! 使用 proptest 覆盖整个合法输入空间与越界输入。

use proptest::prelude::*;
use servo_protocol::{Angle, FRAME_END, FRAME_START, ServoFrame, ServoId, decode, encode};

proptest! {
    #[test]
    fn roundtrip_all_valid_inputs(id in 1i32..=16, angle in 0i32..=180) {
        let frame = encode(id, angle).unwrap();
        let (servo, decoded) = decode(frame.as_bytes()).unwrap();
        prop_assert_eq!(servo.get() as i32, id);
        prop_assert_eq!(decoded.degrees() as i32, angle);
    }

    #[test]
    fn frame_bytes_satisfy_wire_contract(id in 1i32..=16, angle in 0i32..=180) {
        let bytes = *encode(id, angle).unwrap().as_bytes();
        prop_assert_eq!(bytes[0], FRAME_START);
        prop_assert_eq!(bytes[5], FRAME_END);
        prop_assert!((b'A'..=b'P').contains(&bytes[1]));
        for digit in &bytes[2..5] {
            prop_assert!(digit.is_ascii_digit());
        }
        // 三位数字与标准十进制格式一致
        let text = std::str::from_utf8(&bytes[2..5]).unwrap();
        prop_assert_eq!(text, format!("{:03}", angle));
    }

    #[test]
    fn servo_id_outside_range_is_rejected(id in prop_oneof![i32::MIN..=0, 17..=i32::MAX], angle in 0i32..=180) {
        let err = encode(id, angle).unwrap_err();
        prop_assert!(err.is_out_of_range());
    }

    #[test]
    fn angle_outside_range_is_rejected(id in 1i32..=16, angle in prop_oneof![i32::MIN..=-1, 181..=i32::MAX]) {
        let err = encode(id, angle).unwrap_err();
        prop_assert!(err.is_out_of_range());
    }

    #[test]
    fn parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..10)) {
        let _ = ServoFrame::parse(&bytes);
    }
}

#[test]
fn exhaustive_roundtrip() {
    for servo in ServoId::all() {
        for deg in 0..=180 {
            let angle = Angle::new(deg).unwrap();
            let frame = ServoFrame::new(servo, angle);
            assert_eq!(ServoFrame::parse(frame.as_bytes()).unwrap(), frame);
            assert_eq!(frame.decode(), (servo, angle));
        }
    }
}
