//! 使能 / 失能 / 标零

use super::print_status;
use crate::session;
use crate::settings::Settings;
use ak_driver::MotorController;
use anyhow::{Context, Result};

pub fn enable(settings: &Settings) -> Result<()> {
    let mut motor = session::connect(settings)?;
    let status = motor.enable_motor().context("使能失败")?;
    println!("✅ 电机 0x{:03X} 已使能", motor.device_id());
    print_status(&status);
    Ok(())
}

pub fn disable(settings: &Settings) -> Result<()> {
    let mut motor = session::connect(settings)?;
    let status = motor.disable_motor().context("失能失败")?;
    println!("✅ 电机 0x{:03X} 已失能", motor.device_id());
    print_status(&status);
    Ok(())
}

pub fn zero(settings: &Settings) -> Result<()> {
    let mut motor = session::connect(settings)?;
    ensure_enabled(&mut motor, settings)?;
    let status = motor.set_zero_position().context("标零失败")?;
    println!("✅ 电机 0x{:03X} 零点已设置", motor.device_id());
    print_status(&status);
    Ok(())
}

/// 一次性命令中控制器总是从 `Disabled` 开始；放宽模式下假定电机已使能
pub(crate) fn ensure_enabled<A: ak_can::CanAdapter>(
    motor: &mut MotorController<A>,
    settings: &Settings,
) -> Result<()> {
    if !settings.relaxed {
        motor.enable_motor().context("使能失败")?;
    }
    Ok(())
}
