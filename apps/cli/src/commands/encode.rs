//! 离线编码：打印指令帧字节，不访问总线

use super::r#move::MoveCommand;
use crate::settings::Settings;
use ak_protocol::{GAIN_BITS, unscale_gain};
use anyhow::Result;
use clap::Args;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub command: MoveCommand,

    /// 同时打印各字段原始值
    #[arg(long)]
    pub raw: bool,
}

impl EncodeCommand {
    pub fn execute(&self, settings: &Settings) -> Result<()> {
        println!("{}", self.render(settings)?);
        Ok(())
    }

    fn render(&self, settings: &Settings) -> Result<String> {
        let encoded = settings
            .profile
            .encode_command(&self.command.to_mit_command())?;
        if let Some(clamp) = encoded.torque_clamp {
            warn!(
                "feed-forward torque {:.3} N·m out of range, clamped to {:.3}",
                clamp.requested, clamp.applied
            );
        }

        let mut out = hex::encode_upper(encoded.data);
        if self.raw {
            let raw = encoded.raw;
            let profile = &settings.profile;
            // 增益字段附带还原后的实际值（量化后）
            let kp = unscale_gain(raw.kp, profile.kp_max(), GAIN_BITS)?;
            let kd = unscale_gain(raw.kd, profile.kd_max(), GAIN_BITS)?;
            out.push_str(&format!(
                "\nposition=0x{:04X} velocity=0x{:03X} kp=0x{:03X} ({:.3}) kd=0x{:03X} ({:.3}) torque=0x{:03X}",
                raw.position, raw.velocity, raw.kp, kp, raw.kd, kd, raw.torque
            ));
        }
        Ok(out)
    }
}
