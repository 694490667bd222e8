//! 配置文件
//!
//! TOML 格式，默认位于 `<config_dir>/ak-cli/config.toml`：
//!
//! ```toml
//! [default]
//! interface = "can0"
//! device_id = 1
//! model = "AK80_9_V2"
//! timeout_ms = 50
//!
//! [profiles.knee]
//! p_min = -12.5
//! p_max = 12.5
//! v_min = -25.64
//! v_max = 25.64
//! t_min = -18.0
//! t_max = 18.0
//! kp_max = 500.0
//! kd_max = 5.0
//! axis_direction = -1
//! ```

use ak_protocol::{AxisDirection, MotorProfile, ValueRange};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("ak-cli");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub default: DefaultSection,
    pub profiles: BTreeMap<String, ProfileTable>,
}

/// `[default]` 段：命令行参数未指定时使用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultSection {
    pub interface: Option<String>,
    pub device_id: Option<u16>,
    pub model: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// 自定义标定参数表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileTable {
    pub p_min: f64,
    pub p_max: f64,
    pub v_min: f64,
    pub v_max: f64,
    pub t_min: f64,
    pub t_max: f64,
    pub kp_max: f64,
    pub kd_max: f64,
    #[serde(default = "default_axis_direction")]
    pub axis_direction: i8,
}

fn default_axis_direction() -> i8 {
    1
}

impl ProfileTable {
    /// 校验并转换为 [`MotorProfile`]
    pub fn to_profile(&self) -> Result<MotorProfile> {
        let axis = AxisDirection::try_from(self.axis_direction)?;
        let profile = MotorProfile::new(
            ValueRange::new(self.p_min, self.p_max),
            ValueRange::new(self.v_min, self.v_max),
            ValueRange::new(self.t_min, self.t_max),
            self.kp_max,
            self.kd_max,
            axis,
        )?;
        Ok(profile)
    }

    /// 从单独的标定文件读取（`--profile-file`）
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取标定文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析标定文件失败: {}", path.display()))
    }
}

impl CliConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("解析配置文件失败")
    }

    /// 加载配置
    ///
    /// 显式指定的路径必须存在；默认路径不存在时返回空配置。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_file()?, false),
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("配置文件: {}", path.display()))
    }

    /// 按名称查找自定义标定参数
    pub fn custom_profile(&self, name: &str) -> Option<&ProfileTable> {
        self.profiles.get(name)
    }
}
