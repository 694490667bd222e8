//! 驱动层错误类型定义

use ak_can::CanError;
use ak_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 传输错误（含接收超时）
    #[error("CAN driver error: {0}")]
    Can(#[from] CanError),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 电机未使能时尝试运动/标零
    #[error("Motor 0x{device_id:03X} is not enabled; call enable_motor() before {operation}")]
    NotEnabled {
        device_id: u16,
        operation: &'static str,
    },

    /// 设备号超出 11 位标准帧 ID 范围
    #[error("Invalid device id 0x{0:X} (standard CAN id must be <= 0x7FF)")]
    InvalidDeviceId(u16),
}

impl DriverError {
    /// 是否为接收超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Can(e) if e.is_timeout())
    }
}
