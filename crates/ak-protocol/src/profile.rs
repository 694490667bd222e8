//! 电机型号标定参数
//!
//! 每个型号/固件版本的量化范围不同，同一帧字节在不同型号上代表不同的物理量，
//! 因此所有编解码都以 [`MotorProfile`] 为参数。

use crate::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// 闭区间 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 对称区间 `[-limit, limit]`
    pub const fn symmetric(limit: f64) -> Self {
        Self {
            min: -limit,
            max: limit,
        }
    }

    /// 钳位到区间内
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &str) -> Result<(), ProtocolError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(ProtocolError::InvalidRange(format!(
                "{} range [{}, {}] must be finite with min < max",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// 轴向（安装方向修正）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisDirection {
    /// 正装（+1）
    #[default]
    Normal,
    /// 反装（-1）
    Reversed,
}

impl AxisDirection {
    /// 符号 `+1.0` / `-1.0`
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            AxisDirection::Normal => 1.0,
            AxisDirection::Reversed => -1.0,
        }
    }

    /// 施加轴向修正（自逆：两次调用还原）
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        value * self.sign()
    }
}

impl TryFrom<i8> for AxisDirection {
    type Error = ProtocolError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AxisDirection::Normal),
            -1 => Ok(AxisDirection::Reversed),
            _ => Err(ProtocolError::InvalidRange(format!(
                "axis direction must be +1 or -1, got {}",
                value
            ))),
        }
    }
}

/// 电机标定参数（不可变）
///
/// 通过 [`MotorProfile::new`] 构造时校验：所有区间有限且 `min < max`，
/// 增益上限有限且为正。内置型号见 [`MotorModel::profile`]。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorProfile {
    position: ValueRange,
    velocity: ValueRange,
    torque: ValueRange,
    kp_max: f64,
    kd_max: f64,
    axis_direction: AxisDirection,
}

impl MotorProfile {
    /// 创建并校验标定参数
    ///
    /// # 错误
    /// - `InvalidRange`: 任一区间为空/反向/非有限，或增益上限非正
    /// - `InvalidRange`: 反向轴的区间不关于零对称（取反后会越出 `[min, max]`）
    pub fn new(
        position: ValueRange,
        velocity: ValueRange,
        torque: ValueRange,
        kp_max: f64,
        kd_max: f64,
        axis_direction: AxisDirection,
    ) -> Result<Self, ProtocolError> {
        let profile = Self {
            position,
            velocity,
            torque,
            kp_max,
            kd_max,
            axis_direction,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// 内置表使用，跳过校验（由单元测试覆盖）
    const fn from_table(
        p_limit: f64,
        v_limit: f64,
        t_limit: f64,
        kp_max: f64,
        kd_max: f64,
        axis_direction: AxisDirection,
    ) -> Self {
        Self {
            position: ValueRange::symmetric(p_limit),
            velocity: ValueRange::symmetric(v_limit),
            torque: ValueRange::symmetric(t_limit),
            kp_max,
            kd_max,
            axis_direction,
        }
    }

    /// 校验不变量
    pub fn validate(&self) -> Result<(), ProtocolError> {
        self.position.validate("position")?;
        self.velocity.validate("velocity")?;
        self.torque.validate("torque")?;
        if self.axis_direction == AxisDirection::Reversed {
            for (name, range) in [
                ("position", self.position),
                ("velocity", self.velocity),
                ("torque", self.torque),
            ] {
                if range.min != -range.max {
                    return Err(ProtocolError::InvalidRange(format!(
                        "reversed axis requires symmetric {} range, got [{}, {}]",
                        name, range.min, range.max
                    )));
                }
            }
        }
        for (name, limit) in [("kp", self.kp_max), ("kd", self.kd_max)] {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ProtocolError::InvalidRange(format!(
                    "{}_max {} must be finite and positive",
                    name, limit
                )));
            }
        }
        Ok(())
    }

    /// 位置范围（rad）
    pub fn position(&self) -> ValueRange {
        self.position
    }

    /// 速度范围（rad/s）
    pub fn velocity(&self) -> ValueRange {
        self.velocity
    }

    /// 力矩范围（N·m），状态帧中的电流字段也使用此范围
    pub fn torque(&self) -> ValueRange {
        self.torque
    }

    pub fn kp_max(&self) -> f64 {
        self.kp_max
    }

    pub fn kd_max(&self) -> f64 {
        self.kd_max
    }

    pub fn axis_direction(&self) -> AxisDirection {
        self.axis_direction
    }
}

impl fmt::Display for MotorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P[{}, {}] V[{}, {}] T[{}, {}] KP<= {} KD<= {} axis {:+}",
            self.position.min,
            self.position.max,
            self.velocity.min,
            self.velocity.max,
            self.torque.min,
            self.torque.max,
            self.kp_max,
            self.kd_max,
            self.axis_direction.sign()
        )
    }
}

/// 已知电机型号（含固件版本）
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotorModel {
    AK80_6_V1,
    AK80_6_V1p1,
    AK80_6_V2,
    AK80_9_V1p1,
    AK80_9_V2,
    #[default]
    AK80_64_V2,
}

static PROFILES: [(MotorModel, MotorProfile); 6] = [
    (
        MotorModel::AK80_6_V1,
        MotorProfile::from_table(95.5, 45.0, 18.0, 500.0, 5.0, AxisDirection::Reversed),
    ),
    (
        MotorModel::AK80_6_V1p1,
        MotorProfile::from_table(12.5, 22.5, 12.0, 500.0, 100.0, AxisDirection::Reversed),
    ),
    (
        MotorModel::AK80_6_V2,
        MotorProfile::from_table(12.5, 38.2, 12.0, 500.0, 5.0, AxisDirection::Normal),
    ),
    (
        MotorModel::AK80_9_V1p1,
        MotorProfile::from_table(12.5, 22.5, 18.0, 500.0, 100.0, AxisDirection::Normal),
    ),
    (
        MotorModel::AK80_9_V2,
        MotorProfile::from_table(12.5, 25.64, 18.0, 500.0, 5.0, AxisDirection::Normal),
    ),
    (
        MotorModel::AK80_64_V2,
        MotorProfile::from_table(12.5, 8.0, 144.0, 500.0, 5.0, AxisDirection::Normal),
    ),
];

impl MotorModel {
    /// 全部内置型号
    pub const ALL: [MotorModel; 6] = [
        MotorModel::AK80_6_V1,
        MotorModel::AK80_6_V1p1,
        MotorModel::AK80_6_V2,
        MotorModel::AK80_9_V1p1,
        MotorModel::AK80_9_V2,
        MotorModel::AK80_64_V2,
    ];

    /// 型号标签（如 `"AK80_9_V2"`）
    pub fn tag(self) -> &'static str {
        match self {
            MotorModel::AK80_6_V1 => "AK80_6_V1",
            MotorModel::AK80_6_V1p1 => "AK80_6_V1p1",
            MotorModel::AK80_6_V2 => "AK80_6_V2",
            MotorModel::AK80_9_V1p1 => "AK80_9_V1p1",
            MotorModel::AK80_9_V2 => "AK80_9_V2",
            MotorModel::AK80_64_V2 => "AK80_64_V2",
        }
    }

    /// 查表获取标定参数
    pub fn profile(self) -> &'static MotorProfile {
        // 表与枚举一一对应，顺序一致
        &PROFILES[self as usize].1
    }
}

impl fmt::Display for MotorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MotorModel {
    type Err = ProtocolError;

    /// 大小写不敏感，`-` 与 `_` 等价（`ak80-9-v2` == `AK80_9_V2`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        MotorModel::ALL
            .into_iter()
            .find(|model| model.tag().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ProtocolError::UnknownModel(s.to_string()))
    }
}
