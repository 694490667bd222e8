//! 电机控制器
//!
//! 状态机：`Disabled → Enabled → Disabled`。每个操作发送一帧或两帧，
//! 然后恰好接收一帧状态回复；只有成功解码后才更新 `last_status` 与状态。

use crate::{ControllerConfig, DriverError};
use ak_can::{CanAdapter, CanBus};
use ak_protocol::{
    DISABLE_MOTOR, ENABLE_MOTOR, MitCommand, MotorModel, MotorProfile, MotorStatus,
    MotorStatusDeg, ZERO_POSITION_PRIME, ZERO_POSITION_TRIGGER, decode_status,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 标准帧 ID 上限（11 位）
const MAX_STANDARD_ID: u16 = 0x7FF;

/// 电机使能状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorState {
    #[default]
    Disabled,
    Enabled,
}

/// 单个电机的指令控制器
///
/// # 示例
///
/// ```no_run
/// use ak_can::{CanBus, SocketCanAdapter};
/// use ak_driver::{MotorController, MotorModel};
///
/// let bus = CanBus::shared(SocketCanAdapter::new("can0").unwrap());
/// let mut motor = MotorController::with_model(bus, 0x01, MotorModel::AK80_9_V2).unwrap();
///
/// motor.enable_motor().unwrap();
/// let status = motor.send_command(0.5, 0.0, 50.0, 1.0, 0.0).unwrap();
/// println!("position = {:.3} rad", status.position_rad);
/// motor.disable_motor().unwrap();
/// ```
pub struct MotorController<A> {
    device_id: u16,
    bus: Arc<CanBus<A>>,
    profile: Arc<MotorProfile>,
    config: ControllerConfig,
    state: MotorState,
    last_status: Option<MotorStatus>,
}

impl<A: CanAdapter> MotorController<A> {
    /// 绑定总线、设备号与标定参数
    ///
    /// # 错误
    /// - `InvalidDeviceId`: 设备号超过 0x7FF
    pub fn new(
        bus: Arc<CanBus<A>>,
        device_id: u16,
        profile: Arc<MotorProfile>,
    ) -> Result<Self, DriverError> {
        if device_id > MAX_STANDARD_ID {
            return Err(DriverError::InvalidDeviceId(device_id));
        }
        debug!("Motor 0x{:03X} bound to profile {}", device_id, profile);
        Ok(Self {
            device_id,
            bus,
            profile,
            config: ControllerConfig::default(),
            state: MotorState::Disabled,
            last_status: None,
        })
    }

    /// 使用内置型号的标定参数
    pub fn with_model(
        bus: Arc<CanBus<A>>,
        device_id: u16,
        model: MotorModel,
    ) -> Result<Self, DriverError> {
        Self::new(bus, device_id, Arc::new(*model.profile()))
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn device_id(&self) -> u16 {
        self.device_id
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn profile(&self) -> &Arc<MotorProfile> {
        &self.profile
    }

    /// 最近一次成功解码的状态
    pub fn last_status(&self) -> Option<MotorStatus> {
        self.last_status
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// 更换标定参数（下一条指令起生效）
    pub fn set_profile(&mut self, profile: Arc<MotorProfile>) {
        info!("Motor 0x{:03X} profile changed to {}", self.device_id, profile);
        self.profile = profile;
    }

    /// 进入 MIT 模式
    pub fn enable_motor(&mut self) -> Result<MotorStatus, DriverError> {
        let status = self.exchange(&[ENABLE_MOTOR])?;
        self.transition(MotorState::Enabled);
        info!("Motor 0x{:03X} enabled", self.device_id);
        Ok(status)
    }

    /// 退出 MIT 模式
    pub fn disable_motor(&mut self) -> Result<MotorStatus, DriverError> {
        let status = self.exchange(&[DISABLE_MOTOR])?;
        self.transition(MotorState::Disabled);
        info!("Motor 0x{:03X} disabled", self.device_id);
        Ok(status)
    }

    /// 将当前位置设为零点
    ///
    /// 两帧序列（预备帧 + 触发帧），中间至少等待 `inter_frame_delay`，然后接收一帧回复。
    pub fn set_zero_position(&mut self) -> Result<MotorStatus, DriverError> {
        self.require_enabled("set_zero_position")?;
        let status = self.exchange(&[ZERO_POSITION_PRIME, ZERO_POSITION_TRIGGER])?;
        info!("Motor 0x{:03X} zero position set", self.device_id);
        Ok(status)
    }

    /// 发送 MIT 指令（rad, rad/s, Kp, Kd, N·m）
    ///
    /// 前馈力矩超出 `[t_min, t_max]` 时钳位并记录警告，不返回错误。
    pub fn send_command(
        &mut self,
        position_rad: f64,
        velocity_rad_s: f64,
        kp: f64,
        kd: f64,
        torque_ff: f64,
    ) -> Result<MotorStatus, DriverError> {
        self.send_mit_command(&MitCommand::new(position_rad, velocity_rad_s, kp, kd, torque_ff))
    }

    /// 以角度为单位发送指令（deg, deg/s），返回角度单位的状态
    pub fn send_deg_command(
        &mut self,
        position_deg: f64,
        velocity_deg_s: f64,
        kp: f64,
        kd: f64,
        torque_ff: f64,
    ) -> Result<MotorStatusDeg, DriverError> {
        let cmd = MitCommand::from_degrees(position_deg, velocity_deg_s, kp, kd, torque_ff);
        Ok(self.send_mit_command(&cmd)?.to_degrees())
    }

    pub fn send_mit_command(&mut self, cmd: &MitCommand) -> Result<MotorStatus, DriverError> {
        self.require_enabled("send_command")?;

        let encoded = self.profile.encode_command(cmd)?;
        if let Some(clamp) = encoded.torque_clamp {
            warn!(
                "Motor 0x{:03X}: feed-forward torque {:.3} N·m out of range, clamped to {:.3}",
                self.device_id, clamp.requested, clamp.applied
            );
        }

        self.exchange(&[encoded.data])
    }

    fn require_enabled(&self, operation: &'static str) -> Result<(), DriverError> {
        if self.config.enforce_enabled && self.state != MotorState::Enabled {
            return Err(DriverError::NotEnabled {
                device_id: self.device_id,
                operation,
            });
        }
        Ok(())
    }

    /// 发送并等待回复；只有解码成功才写入 `last_status`
    fn exchange(&mut self, frames: &[[u8; 8]]) -> Result<MotorStatus, DriverError> {
        let reply = self.bus.request(
            self.device_id,
            frames,
            self.config.inter_frame_delay,
            self.config.receive_timeout,
        )?;
        let raw = decode_status(reply.data_slice())?;
        let status = self.profile.decode_status(&raw)?;
        self.last_status = Some(status);
        Ok(status)
    }

    fn transition(&mut self, next: MotorState) {
        if self.state != next {
            debug!(
                "Motor 0x{:03X} state {:?} -> {:?}",
                self.device_id, self.state, next
            );
            self.state = next;
        }
    }
}
