//! 连接会话
//!
//! 每个命令独立执行：解析参数 → 打开接口 → 执行操作 → 退出。

use crate::settings::Settings;
use ak_can::{CanAdapter, CanBus};
use ak_driver::{ControllerConfig, MotorController};
use anyhow::{Context, Result};
use tracing::debug;

pub type BoxedAdapter = Box<dyn CanAdapter + Send>;

/// 打开接口并绑定电机
pub fn connect(settings: &Settings) -> Result<MotorController<BoxedAdapter>> {
    let adapter = open_adapter(&settings.interface)?;
    let bus = CanBus::shared(adapter);

    let config = ControllerConfig::default()
        .with_receive_timeout(settings.timeout)
        .with_enforce_enabled(!settings.relaxed);

    debug!(
        "Connecting motor 0x{:03X} on {} ({})",
        settings.device_id, settings.interface, settings.profile_name
    );
    let motor = MotorController::new(bus, settings.device_id, settings.profile.into())?
        .with_config(config);
    Ok(motor)
}

#[cfg(target_os = "linux")]
fn open_adapter(interface: &str) -> Result<BoxedAdapter> {
    let adapter = ak_can::SocketCanAdapter::new(interface)
        .with_context(|| format!("无法打开 CAN 接口 '{}'", interface))?;
    Ok(Box::new(adapter))
}

#[cfg(not(target_os = "linux"))]
fn open_adapter(interface: &str) -> Result<BoxedAdapter> {
    anyhow::bail!(
        "无法打开 CAN 接口 '{}': SocketCAN 仅支持 Linux",
        interface
    )
}
