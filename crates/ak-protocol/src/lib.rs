//! # AK Protocol
//!
//! AK 系列关节电机 MIT 模式 CAN 协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `profile`: 电机型号标定参数（位置/速度/力矩范围、增益上限、轴向）
//! - `quantize`: 物理量与定宽无符号整数之间的线性量化
//! - `command`: 8 字节控制帧打包、哨兵帧常量
//! - `status`: 状态回复帧解析
//!
//! ## 位序
//!
//! 所有字段均为 MSB 在前（大端），帧内无填充位。

pub mod command;
pub mod profile;
pub mod quantize;
pub mod status;

pub use command::*;
pub use profile::*;
pub use quantize::*;
pub use status::*;

// 12 位字段类型（编解码接口使用）
pub use bilge::prelude::u12;

use thiserror::Error;

/// CAN 2.0 标准帧的统一抽象
///
/// 协议层和 CAN 层之间的中间类型：协议层只产生/消费数据字节，
/// 由 `ak-can` 的适配器负责与具体后端（SocketCAN、Mock）互转。
///
/// ```rust
/// use ak_protocol::AkFrame;
///
/// let frame = AkFrame::new_standard(0x09, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFC]);
/// assert_eq!(frame.id(), 0x09);
/// assert_eq!(frame.data_slice().len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AkFrame {
    /// CAN ID（标准帧或扩展帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,
}

impl AkFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(id as u32, data, false)
    }

    /// 创建扩展帧
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id, data, true)
    }

    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 标定范围或字段位宽非法（编程错误，合法的 `MotorProfile` 不会触发）
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// 输入值为 NaN，无法量化
    #[error("Non-finite input for {field}: {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    /// 状态帧长度不足
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    /// 状态帧结构错误
    #[error("Malformed frame: {0}")]
    FrameMalformed(String),

    /// 未知电机型号标签
    #[error("Unknown motor model: {0}")]
    UnknownModel(String),
}
