//! MotorController 集成测试（Mock 总线）

use ak_can::{AkFrame, CanBus, MockCanAdapter, MockHandle};
use ak_driver::{ControllerConfig, DriverError, MotorController, MotorModel, MotorState};
use ak_protocol::{
    AxisDirection, DISABLE_MOTOR, ENABLE_MOTOR, MotorProfile, ProtocolError, RawStatus,
    ValueRange, ZERO_POSITION_PRIME, ZERO_POSITION_TRIGGER, encode_status,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const MID: RawStatus = RawStatus {
    position: 0x8000,
    velocity: 0x800,
    current: 0x800,
};

fn status_frame(device: u8, raw: RawStatus) -> AkFrame {
    AkFrame::new_standard(0x00, &encode_status(device, raw))
}

fn setup(model: MotorModel, id: u16) -> (MotorController<MockCanAdapter>, MockHandle) {
    let (adapter, handle) = MockCanAdapter::new();
    let bus = CanBus::shared(adapter);
    let config = ControllerConfig::default().with_receive_timeout(Duration::from_millis(10));
    let motor = MotorController::with_model(bus, id, model)
        .unwrap()
        .with_config(config);
    (motor, handle)
}

fn enabled(model: MotorModel, id: u16) -> (MotorController<MockCanAdapter>, MockHandle) {
    let (mut motor, handle) = setup(model, id);
    handle.push_reply(status_frame(id as u8, MID));
    motor.enable_motor().unwrap();
    handle.clear_sent();
    (motor, handle)
}

#[test]
fn enable_sends_sentinel_and_transitions() {
    let (mut motor, handle) = setup(MotorModel::AK80_9_V2, 0x01);
    handle.push_reply(status_frame(0x01, MID));

    let status = motor.enable_motor().unwrap();

    let sent = handle.sent_frames();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id, 0x01);
    assert_eq!(sent[0].data, ENABLE_MOTOR);
    assert_eq!(motor.state(), MotorState::Enabled);
    assert_eq!(motor.last_status(), Some(status));
    assert!(status.position_rad.abs() < 4e-4);
}

#[test]
fn disable_sends_sentinel_and_transitions() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x02);
    handle.push_reply(status_frame(0x02, MID));

    motor.disable_motor().unwrap();

    assert_eq!(handle.sent_frames()[0].data, DISABLE_MOTOR);
    assert_eq!(motor.state(), MotorState::Disabled);
}

#[test]
fn zero_position_two_sends_one_receive() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x03);
    let receives_before = handle.receive_calls();
    handle.push_reply(status_frame(0x03, MID));

    motor.set_zero_position().unwrap();

    let sent = handle.sent_frames();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].data, ZERO_POSITION_PRIME);
    assert_eq!(sent[1].data, ZERO_POSITION_TRIGGER);
    assert_eq!(handle.receive_calls() - receives_before, 1);

    let stamps = handle.send_instants();
    assert!(stamps[1].duration_since(stamps[0]) >= motor.config().inter_frame_delay);
}

#[test]
fn zero_command_encodes_midpoints() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x04);
    handle.push_reply(status_frame(0x04, MID));

    motor.send_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap();

    assert_eq!(
        handle.sent_frames()[0].data,
        [0x80, 0x00, 0x80, 0x00, 0x00, 0x00, 0x08, 0x00]
    );
}

#[test]
fn torque_above_limit_is_clamped_not_fatal() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x05);
    handle.push_reply(status_frame(0x05, MID));

    motor.send_command(0.0, 0.0, 0.0, 0.0, 100.0).unwrap();

    let data = handle.sent_frames()[0].data;
    let torque_raw = (u16::from(data[6] & 0x0F) << 8) | u16::from(data[7]);
    assert_eq!(torque_raw, 0xFFF);
}

#[test]
fn timeout_leaves_state_and_last_status_unchanged() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x06);
    let before = motor.last_status();

    let err = motor.send_command(1.0, 0.0, 10.0, 1.0, 0.0).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(motor.last_status(), before);
    assert_eq!(motor.state(), MotorState::Enabled);

    let err = motor.disable_motor().unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(motor.state(), MotorState::Enabled);
    assert_eq!(handle.sent_frames().len(), 2);
}

#[test]
fn zero_position_timeout_leaves_last_status_unchanged() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x12);
    let before = motor.last_status();

    assert!(motor.set_zero_position().unwrap_err().is_timeout());
    assert_eq!(motor.last_status(), before);
    assert_eq!(handle.sent_frames().len(), 2);
    assert_eq!(motor.state(), MotorState::Enabled);
}

#[test]
fn late_reply_is_not_given_to_next_command() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x11);
    assert!(
        motor
            .send_command(12.5, 0.0, 0.0, 0.0, 0.0)
            .unwrap_err()
            .is_timeout()
    );

    // 上一条指令的回复在超时之后才到达
    handle.push_received(status_frame(
        0x11,
        RawStatus {
            position: 0xFFFF,
            velocity: 0xFFF,
            current: 0xFFF,
        },
    ));
    handle.push_reply(status_frame(0x11, MID));

    let status = motor.send_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert!(status.position_rad.abs() < 4e-4);
    assert_eq!(motor.last_status(), Some(status));
    assert_eq!(handle.drained_frames(), 1);
}

#[test]
fn enable_timeout_stays_disabled() {
    let (mut motor, _handle) = setup(MotorModel::AK80_9_V2, 0x07);
    assert!(motor.enable_motor().unwrap_err().is_timeout());
    assert_eq!(motor.state(), MotorState::Disabled);
    assert!(motor.last_status().is_none());
}

#[test]
fn short_reply_is_protocol_error() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x08);
    let before = motor.last_status();
    handle.push_reply(AkFrame::new_standard(0x00, &[0x08, 0x80, 0x00, 0x80, 0x08]));

    let err = motor.send_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Protocol(ProtocolError::FrameTooShort {
            expected: 6,
            actual: 5
        })
    ));
    assert_eq!(motor.last_status(), before);
}

#[test]
fn stray_reply_from_other_device_is_discarded() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x09);
    handle.push_reply(status_frame(
        0x0A,
        RawStatus {
            position: 0xFFFF,
            velocity: 0xFFF,
            current: 0xFFF,
        },
    ));
    handle.push_reply(status_frame(0x09, MID));

    let status = motor.send_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert!(status.position_rad.abs() < 4e-4);
}

#[test]
fn commands_require_enabled_by_default() {
    let (mut motor, handle) = setup(MotorModel::AK80_9_V2, 0x0B);

    let err = motor.send_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap_err();
    assert!(matches!(
        err,
        DriverError::NotEnabled {
            device_id: 0x0B,
            operation: "send_command"
        }
    ));
    assert!(matches!(
        motor.set_zero_position(),
        Err(DriverError::NotEnabled { .. })
    ));
    assert!(handle.sent_frames().is_empty());
}

#[test]
fn relaxed_config_allows_commands_while_disabled() {
    let (motor, handle) = setup(MotorModel::AK80_9_V2, 0x0C);
    let mut motor = motor.with_config(
        ControllerConfig::default()
            .with_receive_timeout(Duration::from_millis(10))
            .with_enforce_enabled(false),
    );
    handle.push_reply(status_frame(0x0C, MID));

    motor.send_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_eq!(motor.state(), MotorState::Disabled);
    assert_eq!(handle.sent_frames().len(), 1);
}

#[test]
fn reversed_axis_flips_command_and_reply() {
    let (mut motor, handle) = enabled(MotorModel::AK80_6_V1, 0x0D);
    handle.push_reply(status_frame(
        0x0D,
        RawStatus {
            position: 0xFFFF,
            velocity: 0x800,
            current: 0x800,
        },
    ));

    let status = motor.send_command(95.5, 0.0, 0.0, 0.0, 0.0).unwrap();

    // 世界坐标 +p_max 经轴向修正后下发为 p_min
    let data = handle.sent_frames()[0].data;
    assert_eq!(&data[..2], &[0x00, 0x00]);
    // 回复 p_max 还原为世界坐标 -p_max
    assert_eq!(status.position_rad, -95.5);
}

#[test]
fn set_profile_applies_to_next_command() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x0E);
    let custom = MotorProfile::new(
        ValueRange::symmetric(1.0),
        ValueRange::symmetric(1.0),
        ValueRange::symmetric(1.0),
        10.0,
        1.0,
        AxisDirection::Normal,
    )
    .unwrap();
    motor.set_profile(Arc::new(custom));
    handle.push_reply(status_frame(
        0x0E,
        RawStatus {
            position: 0xFFFF,
            velocity: 0,
            current: 0,
        },
    ));

    let status = motor.send_command(2.0, 0.0, 10.0, 0.0, 0.0).unwrap();

    let data = handle.sent_frames()[0].data;
    assert_eq!(&data[..2], &[0xFF, 0xFF]);
    // kp = kp_max → 0xFFF（byte 3 低半字节 + byte 4）
    assert_eq!(data[3], 0x0F);
    assert_eq!(data[4], 0xFF);
    assert_eq!(status.position_rad, 1.0);
    assert_eq!(status.velocity_rad_s, -1.0);
}

#[test]
fn deg_command_converts_units() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x0F);
    handle.push_reply(status_frame(0x0F, MID));

    let status = motor.send_deg_command(0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert!(status.position_deg.abs() < 0.03);
    assert_eq!(
        handle.sent_frames()[0].data,
        [0x80, 0x00, 0x80, 0x00, 0x00, 0x00, 0x08, 0x00]
    );
}

#[test]
fn nan_input_is_rejected_before_send() {
    let (mut motor, handle) = enabled(MotorModel::AK80_9_V2, 0x10);
    let err = motor.send_command(f64::NAN, 0.0, 0.0, 0.0, 0.0).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Protocol(ProtocolError::NonFiniteInput {
            field: "position",
            ..
        })
    ));
    assert!(handle.sent_frames().is_empty());
}

#[test]
fn controllers_share_one_bus() {
    let (adapter, handle) = MockCanAdapter::new();
    handle.set_responder(|frame| Some(status_frame(frame.id as u8, MID)));
    let bus = CanBus::shared(adapter);

    let workers: Vec<_> = [0x21u16, 0x22]
        .into_iter()
        .map(|id| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                let mut motor = MotorController::with_model(bus, id, MotorModel::AK80_64_V2)
                    .unwrap()
                    .with_config(
                        ControllerConfig::default().with_receive_timeout(Duration::from_millis(10)),
                    );
                motor.enable_motor().unwrap();
                for _ in 0..20 {
                    motor.send_command(0.1, 0.0, 5.0, 0.5, 0.0).unwrap();
                }
                motor.disable_motor().unwrap();
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let sent = handle.sent_frames();
    assert_eq!(sent.len(), 44);
    assert_eq!(sent.iter().filter(|f| f.id == 0x21).count(), 22);
    assert_eq!(handle.pending_replies(), 0);
}
