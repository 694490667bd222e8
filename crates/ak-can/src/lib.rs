//! # AK CAN Adapter Layer
//!
//! CAN 硬件抽象层：
//!
//! - [`CanAdapter`]: 收发一帧的最小接口（SocketCAN、Mock 均实现）
//! - [`CanBus`]: 多个电机共享同一适配器时的串行化请求/应答句柄
//!
//! 本层不配置总线（波特率、接口启停由系统工具完成）。

use std::time::Duration;
use thiserror::Error;

pub use ak_protocol::AkFrame;

mod bus;
pub use bus::CanBus;

#[cfg(target_os = "linux")]
pub mod socketcan;

#[cfg(target_os = "linux")]
pub use socketcan::SocketCanAdapter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCanAdapter, MockHandle};

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(String),
    #[error("Read timeout")]
    Timeout,
    #[error("Bus off")]
    BusOff,
    #[error("Device not started")]
    NotStarted,
}

impl CanError {
    /// 是否为接收超时（可由调用方决定是否重试）
    pub fn is_timeout(&self) -> bool {
        matches!(self, CanError::Timeout)
    }
}

/// CAN 传输接口
///
/// 适配器只负责单帧收发；请求/应答配对、归属判断由 [`CanBus`] 完成。
pub trait CanAdapter {
    /// 发送一帧
    fn send(&mut self, frame: AkFrame) -> Result<(), CanError>;

    /// 接收一帧，`timeout` 内没有数据返回 `CanError::Timeout`
    fn receive_timeout(&mut self, timeout: Duration) -> Result<AkFrame, CanError>;

    /// 非阻塞接收，接收队列为空返回 `Ok(None)`
    fn try_receive(&mut self) -> Result<Option<AkFrame>, CanError> {
        match self.receive_timeout(Duration::ZERO) {
            Ok(frame) => Ok(Some(frame)),
            Err(CanError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<A: CanAdapter + ?Sized> CanAdapter for Box<A> {
    fn send(&mut self, frame: AkFrame) -> Result<(), CanError> {
        (**self).send(frame)
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<AkFrame, CanError> {
        (**self).receive_timeout(timeout)
    }

    fn try_receive(&mut self) -> Result<Option<AkFrame>, CanError> {
        (**self).try_receive()
    }
}
