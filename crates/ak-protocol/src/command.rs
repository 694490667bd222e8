//! 控制帧
//!
//! MIT 模式控制帧为 8 字节（64 位），五个字段 MSB 在前依次排列：
//!
//! ```text
//! bit 63                                                         bit 0
//! ┌──────────────┬──────────┬──────────┬──────────┬──────────┐
//! │ position(16) │ vel (12) │ kp (12)  │ kd (12)  │ tau (12) │
//! └──────────────┴──────────┴──────────┴──────────┴──────────┘
//!
//! Byte 0: position[15:8]
//! Byte 1: position[7:0]
//! Byte 2: velocity[11:4]
//! Byte 3: velocity[3:0] | kp[11:8]
//! Byte 4: kp[7:0]
//! Byte 5: kd[11:4]
//! Byte 6: kd[3:0] | tau[11:8]
//! Byte 7: tau[7:0]
//! ```
//!
//! 16 + 12 × 4 = 64，打包方式唯一，无填充位。

use crate::profile::MotorProfile;
use crate::quantize::{float_to_uint, max_raw, scale_gain};
use crate::ProtocolError;
use bilge::prelude::*;

/// 控制帧长度（字节）
pub const COMMAND_FRAME_LEN: usize = 8;

/// 位置字段位宽
pub const POSITION_BITS: u32 = 16;
/// 速度字段位宽
pub const VELOCITY_BITS: u32 = 12;
/// 增益字段（Kp / Kd）位宽
pub const GAIN_BITS: u32 = 12;
/// 力矩字段位宽
pub const TORQUE_BITS: u32 = 12;

// ============================================================================
// 哨兵帧（厂商定义的固定字节序列，不编码物理量，原样重放）
// ============================================================================

/// 使能电机
pub const ENABLE_MOTOR: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFC];

/// 失能电机
pub const DISABLE_MOTOR: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFD];

/// 设零第一帧（预置）
pub const ZERO_POSITION_PRIME: [u8; 8] = [0x7F, 0xFF, 0x7F, 0xF0, 0x00, 0x00, 0x07, 0xFF];

/// 设零第二帧（触发，电机随后回复状态）
pub const ZERO_POSITION_TRIGGER: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE];

/// 控制帧位域
///
/// bilge 按 LSB first 分配字段，因此声明顺序与线上顺序相反：
/// 最后声明的 `position` 占据最高 16 位。
#[bitsize(64)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq)]
struct CommandBits {
    torque: u12,
    kd: u12,
    kp: u12,
    velocity: u12,
    position: u16,
}

/// 12 位字段构造，超出字段的值钳位到 0xFFF
#[inline]
pub(crate) fn field12(raw: u16) -> u12 {
    u12::new(raw.min(max_raw(12)))
}

/// 打包控制帧
///
/// 纯位拼接：position、velocity、kp、kd、torque 依次 MSB 在前，
/// 序列化为大端 8 字节。
///
/// ```rust
/// use ak_protocol::{encode_command, u12, ZERO_POSITION_PRIME};
///
/// let data = encode_command(0x7FFF, u12::new(0x7FF), u12::new(0), u12::new(0), u12::new(0x7FF));
/// assert_eq!(data, ZERO_POSITION_PRIME);
/// ```
pub fn encode_command(position: u16, velocity: u12, kp: u12, kd: u12, torque: u12) -> [u8; 8] {
    let bits = CommandBits::new(torque, kd, kp, velocity, position);
    u64::from(bits).to_be_bytes()
}

/// 已量化的原始控制字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCommand {
    pub position: u16,
    pub velocity: u16,
    pub kp: u16,
    pub kd: u16,
    pub torque: u16,
}

impl RawCommand {
    /// 打包为 8 字节（12 位字段超出部分钳位）
    pub fn to_bytes(self) -> [u8; 8] {
        encode_command(
            self.position,
            field12(self.velocity),
            field12(self.kp),
            field12(self.kd),
            field12(self.torque),
        )
    }
}

/// MIT 模式控制指令（物理单位，世界坐标系）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MitCommand {
    /// 目标位置（rad）
    pub position_rad: f64,
    /// 目标速度（rad/s）
    pub velocity_rad_s: f64,
    /// 位置增益
    pub kp: f64,
    /// 速度增益
    pub kd: f64,
    /// 前馈力矩（N·m）
    pub torque_ff: f64,
}

impl MitCommand {
    pub fn new(position_rad: f64, velocity_rad_s: f64, kp: f64, kd: f64, torque_ff: f64) -> Self {
        Self {
            position_rad,
            velocity_rad_s,
            kp,
            kd,
            torque_ff,
        }
    }

    /// 以角度为单位构造（deg, deg/s）
    pub fn from_degrees(
        position_deg: f64,
        velocity_deg_s: f64,
        kp: f64,
        kd: f64,
        torque_ff: f64,
    ) -> Self {
        Self::new(
            position_deg.to_radians(),
            velocity_deg_s.to_radians(),
            kp,
            kd,
            torque_ff,
        )
    }
}

/// 前馈力矩钳位记录（警告级别，不是错误）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueClamp {
    /// 请求值
    pub requested: f64,
    /// 实际下发值（`t_min` 或 `t_max`）
    pub applied: f64,
}

/// 编码结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedCommand {
    pub raw: RawCommand,
    pub data: [u8; 8],
    /// 前馈力矩被钳位时为 `Some`
    pub torque_clamp: Option<TorqueClamp>,
}

impl MotorProfile {
    /// 前馈力矩钳位到 `[t_min, t_max]`
    pub fn clamp_torque(&self, torque_ff: f64) -> (f64, Option<TorqueClamp>) {
        let range = self.torque();
        if torque_ff.is_nan() || range.contains(torque_ff) {
            return (torque_ff, None);
        }
        let applied = range.clamp(torque_ff);
        (
            applied,
            Some(TorqueClamp {
                requested: torque_ff,
                applied,
            }),
        )
    }

    /// 物理指令 → 原始字段 → 8 字节
    ///
    /// 1. 前馈力矩钳位到 `[t_min, t_max]`
    /// 2. 位置、速度、力矩施加轴向修正（增益不修正）
    /// 3. 位置/速度/力矩使用双边量化，Kp/Kd 使用单边比例缩放
    ///
    /// # 错误
    /// - `NonFiniteInput`: 任一输入为 NaN
    pub fn encode_command(&self, cmd: &MitCommand) -> Result<EncodedCommand, ProtocolError> {
        let (torque_ff, torque_clamp) = self.clamp_torque(cmd.torque_ff);

        let axis = self.axis_direction();
        let position = axis.apply(cmd.position_rad);
        let velocity = axis.apply(cmd.velocity_rad_s);
        let torque = axis.apply(torque_ff);

        let p = self.position();
        let v = self.velocity();
        let t = self.torque();

        let raw = RawCommand {
            position: float_to_uint(position, p.min, p.max, POSITION_BITS)
                .map_err(|e| name_field(e, "position"))?,
            velocity: float_to_uint(velocity, v.min, v.max, VELOCITY_BITS)
                .map_err(|e| name_field(e, "velocity"))?,
            kp: scale_gain(cmd.kp, self.kp_max(), GAIN_BITS).map_err(|e| name_field(e, "kp"))?,
            kd: scale_gain(cmd.kd, self.kd_max(), GAIN_BITS).map_err(|e| name_field(e, "kd"))?,
            torque: float_to_uint(torque, t.min, t.max, TORQUE_BITS)
                .map_err(|e| name_field(e, "torque"))?,
        };

        Ok(EncodedCommand {
            raw,
            data: raw.to_bytes(),
            torque_clamp,
        })
    }
}

fn name_field(err: ProtocolError, field: &'static str) -> ProtocolError {
    match err {
        ProtocolError::NonFiniteInput { value, .. } => ProtocolError::NonFiniteInput { field, value },
        other => other,
    }
}
