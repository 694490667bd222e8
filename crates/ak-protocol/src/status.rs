//! 状态回复帧
//!
//! 电机对每条指令回复一帧状态，有效内容为前 48 位：
//!
//! ```text
//! Byte 0: motor id 回显（解码时忽略，由总线层用于归属判断）
//! Byte 1: position[15:8]
//! Byte 2: position[7:0]
//! Byte 3: velocity[11:4]
//! Byte 4: velocity[3:0] | current[11:8]
//! Byte 5: current[7:0]
//! ```
//!
//! 传输层 DLC 可能是 6 或 8，尾部字节忽略。

use crate::profile::MotorProfile;
use crate::quantize::uint_to_float;
use crate::ProtocolError;
use crate::command::{POSITION_BITS, VELOCITY_BITS, field12};
use bilge::prelude::*;

/// 状态帧有效长度（字节），即 48 位
pub const STATUS_FRAME_LEN: usize = 6;

/// 电流字段位宽
pub const CURRENT_BITS: u32 = 12;

/// CAN 2.0 数据段最大长度
const MAX_CAN_PAYLOAD: usize = 8;

/// 状态帧位域（LSB first 声明，`motor_id` 占最高 8 位）
#[bitsize(48)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq)]
struct StatusBits {
    current: u12,
    velocity: u12,
    position: u16,
    motor_id: u8,
}

/// 原始状态字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatus {
    pub position: u16,
    pub velocity: u16,
    pub current: u16,
}

/// 解析状态帧
///
/// 只读取前 48 位；长度不足时返回 `FrameTooShort`，绝不补零。
///
/// # 错误
/// - `FrameTooShort`: 少于 6 字节
/// - `FrameMalformed`: 超过 CAN 2.0 的 8 字节
pub fn decode_status(data: &[u8]) -> Result<RawStatus, ProtocolError> {
    if data.len() < STATUS_FRAME_LEN {
        return Err(ProtocolError::FrameTooShort {
            expected: STATUS_FRAME_LEN,
            actual: data.len(),
        });
    }
    if data.len() > MAX_CAN_PAYLOAD {
        return Err(ProtocolError::FrameMalformed(format!(
            "status payload of {} bytes exceeds CAN 2.0 limit of {}",
            data.len(),
            MAX_CAN_PAYLOAD
        )));
    }

    let mut word = [0u8; 8];
    word[2..].copy_from_slice(&data[..STATUS_FRAME_LEN]);
    let bits = StatusBits::from(u48::new(u64::from_be_bytes(word)));

    Ok(RawStatus {
        position: bits.position(),
        velocity: bits.velocity().value(),
        current: bits.current().value(),
    })
}

/// 回复帧中的 motor id 回显字节（空帧返回 `None`）
#[inline]
pub fn id_echo(data: &[u8]) -> Option<u8> {
    data.first().copied()
}

/// 电机侧编码（用于仿真与测试，与 [`decode_status`] 互逆）
pub fn encode_status(motor_id: u8, raw: RawStatus) -> [u8; STATUS_FRAME_LEN] {
    let bits = StatusBits::new(
        field12(raw.current),
        field12(raw.velocity),
        raw.position,
        motor_id,
    );
    let word = u48::from(bits).value().to_be_bytes();
    let mut out = [0u8; STATUS_FRAME_LEN];
    out.copy_from_slice(&word[2..]);
    out
}

/// 电机状态（物理单位，世界坐标系）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorStatus {
    /// 位置（rad）
    pub position_rad: f64,
    /// 速度（rad/s）
    pub velocity_rad_s: f64,
    /// 电流（A）
    pub current_amp: f64,
}

impl MotorStatus {
    /// 位置（deg）
    pub fn position_deg(&self) -> f64 {
        self.position_rad.to_degrees()
    }

    /// 速度（deg/s）
    pub fn velocity_deg_s(&self) -> f64 {
        self.velocity_rad_s.to_degrees()
    }

    /// 转换为角度单位
    pub fn to_degrees(&self) -> MotorStatusDeg {
        MotorStatusDeg {
            position_deg: self.position_deg(),
            velocity_deg_s: self.velocity_deg_s(),
            current_amp: self.current_amp,
        }
    }
}

/// 电机状态（角度单位）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorStatusDeg {
    /// 位置（deg）
    pub position_deg: f64,
    /// 速度（deg/s）
    pub velocity_deg_s: f64,
    /// 电流（A）
    pub current_amp: f64,
}

impl MotorProfile {
    /// 原始状态 → 物理量，并还原轴向
    pub fn decode_status(&self, raw: &RawStatus) -> Result<MotorStatus, ProtocolError> {
        let p = self.position();
        let v = self.velocity();
        let t = self.torque();
        let axis = self.axis_direction();

        Ok(MotorStatus {
            position_rad: axis.apply(uint_to_float(raw.position, p.min, p.max, POSITION_BITS)?),
            velocity_rad_s: axis.apply(uint_to_float(raw.velocity, v.min, v.max, VELOCITY_BITS)?),
            current_amp: axis.apply(uint_to_float(raw.current, t.min, t.max, CURRENT_BITS)?),
        })
    }
}
