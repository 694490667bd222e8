//! 移动命令
//!
//! 发送一条 MIT 指令并打印回复状态。

use super::print_status;
use super::motor::ensure_enabled;
use crate::session;
use crate::settings::Settings;
use ak_driver::MitCommand;
use anyhow::{Context, Result};
use clap::Args;

/// MIT 指令参数
#[derive(Args, Debug, Clone)]
pub struct MoveCommand {
    /// 目标位置（rad，--degrees 时为 deg）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pos: f64,

    /// 目标速度（rad/s，--degrees 时为 deg/s）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub vel: f64,

    /// 位置增益
    #[arg(long, default_value_t = 0.0)]
    pub kp: f64,

    /// 速度增益
    #[arg(long, default_value_t = 0.0)]
    pub kd: f64,

    /// 前馈力矩（N·m）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub tau: f64,

    /// 位置与速度使用角度单位
    #[arg(long)]
    pub degrees: bool,
}

impl MoveCommand {
    pub fn to_mit_command(&self) -> MitCommand {
        if self.degrees {
            MitCommand::from_degrees(self.pos, self.vel, self.kp, self.kd, self.tau)
        } else {
            MitCommand::new(self.pos, self.vel, self.kp, self.kd, self.tau)
        }
    }

    pub fn execute(&self, settings: &Settings) -> Result<()> {
        let mut motor = session::connect(settings)?;
        ensure_enabled(&mut motor, settings)?;

        let status = motor
            .send_mit_command(&self.to_mit_command())
            .context("指令发送失败")?;
        print_status(&status);
        Ok(())
    }
}
