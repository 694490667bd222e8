//! 驱动层模块
//!
//! 每个电机一个 [`MotorController`]，负责：
//! - 使能/失能状态机
//! - 物理量指令的编码、发送与状态回复解码
//! - 零点标定序列
//!
//! 多个控制器通过同一个 `Arc<CanBus<A>>` 共享总线，每条指令严格“先发后收”。

mod config;
mod controller;
mod error;

pub use config::ControllerConfig;
pub use controller::{MotorController, MotorState};
pub use error::DriverError;

pub use ak_protocol::{MitCommand, MotorModel, MotorProfile, MotorStatus};
