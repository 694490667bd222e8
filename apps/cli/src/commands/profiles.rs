//! 列出内置与自定义标定参数

use crate::config::CliConfig;
use ak_protocol::MotorModel;
use anyhow::Result;

pub fn list(config: &CliConfig) -> Result<()> {
    println!("Built-in models:");
    for model in MotorModel::ALL {
        let marker = if model == MotorModel::default() { " (default)" } else { "" };
        println!("  {:<12} {}{}", model.tag(), model.profile(), marker);
    }

    if !config.profiles.is_empty() {
        println!("Custom profiles:");
        for (name, table) in &config.profiles {
            match table.to_profile() {
                Ok(profile) => println!("  {:<12} {}", name, profile),
                Err(e) => println!("  {:<12} invalid: {}", name, e),
            }
        }
    }
    Ok(())
}
