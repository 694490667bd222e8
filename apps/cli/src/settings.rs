//! 运行参数解析
//!
//! 优先级：命令行参数 > 配置文件 `[default]` > 内置默认值。

use crate::config::{CliConfig, ProfileTable};
use ak_protocol::{MotorModel, MotorProfile};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_INTERFACE: &str = "can0";
const DEFAULT_DEVICE_ID: u16 = 0x01;
const DEFAULT_TIMEOUT_MS: u64 = 50;
const MAX_STANDARD_ID: u16 = 0x7FF;

/// 全局参数（所有子命令共用）
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// CAN 接口（如 can0）
    #[arg(short, long, global = true)]
    pub interface: Option<String>,

    /// 电机 CAN ID（十进制或 0x 前缀十六进制）
    #[arg(long, global = true, value_parser = parse_device_id)]
    pub id: Option<u16>,

    /// 电机型号或配置文件中的自定义标定名称
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// 单独的标定参数文件（TOML），优先于 --model
    #[arg(long, global = true)]
    pub profile_file: Option<PathBuf>,

    /// 状态回复超时（毫秒）
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 放宽使能检查（台架调试用）
    #[arg(long, global = true)]
    pub relaxed: bool,
}

/// 解析设备号：`7`、`0x07`、`0X7FF`
pub fn parse_device_id(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    }
    .map_err(|e| format!("invalid device id '{}': {}", s, e))?;

    if parsed > MAX_STANDARD_ID {
        return Err(format!(
            "device id 0x{:X} exceeds standard CAN id range (max 0x{:X})",
            parsed, MAX_STANDARD_ID
        ));
    }
    Ok(parsed)
}

/// 解析后的运行参数
#[derive(Debug, Clone)]
pub struct Settings {
    pub interface: String,
    pub device_id: u16,
    pub profile_name: String,
    pub profile: MotorProfile,
    pub timeout: Duration,
    pub relaxed: bool,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs, config: &CliConfig) -> Result<Self> {
        let defaults = &config.default;

        let interface = args
            .interface
            .clone()
            .or_else(|| defaults.interface.clone())
            .unwrap_or_else(|| DEFAULT_INTERFACE.to_string());

        let device_id = match args.id.or(defaults.device_id) {
            Some(id) if id > MAX_STANDARD_ID => {
                anyhow::bail!("配置中的设备号 0x{:X} 超出标准帧范围", id)
            },
            Some(id) => id,
            None => DEFAULT_DEVICE_ID,
        };

        let timeout = Duration::from_millis(
            args.timeout_ms
                .or(defaults.timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        );

        let (profile_name, profile) = match &args.profile_file {
            Some(path) => {
                let table = ProfileTable::load(path)?;
                let profile = table
                    .to_profile()
                    .with_context(|| format!("标定文件无效: {}", path.display()))?;
                (path.display().to_string(), profile)
            },
            None => {
                let name = args.model.as_deref().or(defaults.model.as_deref());
                resolve_model(name, config)?
            },
        };

        Ok(Self {
            interface,
            device_id,
            profile_name,
            profile,
            timeout,
            relaxed: args.relaxed,
        })
    }
}

/// 自定义标定优先于同名内置型号
fn resolve_model(name: Option<&str>, config: &CliConfig) -> Result<(String, MotorProfile)> {
    let Some(name) = name else {
        let model = MotorModel::default();
        return Ok((model.tag().to_string(), *model.profile()));
    };

    if let Some(table) = config.custom_profile(name) {
        let profile = table
            .to_profile()
            .with_context(|| format!("自定义标定 '{}' 无效", name))?;
        return Ok((name.to_string(), profile));
    }

    let model: MotorModel = name.parse()?;
    Ok((model.tag().to_string(), *model.profile()))
}
