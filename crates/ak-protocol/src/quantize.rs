//! 线性量化
//!
//! 物理量（有界浮点数）与 N 位无符号整数之间的双向线性映射，
//! 以及增益字段使用的单边比例缩放。
//!
//! 这两组函数是该映射的唯一实现，编码/解码两端都必须经过这里，
//! 确保舍入策略一致（编码时四舍五入，远离零）。

use crate::ProtocolError;

/// 协议中最宽的量化字段（位置，16 位）
pub const MAX_FIELD_BITS: u32 = 16;

/// N 位字段的最大原始值 `2^bits - 1`
///
/// `bits` 必须在 `1..=16` 内，调用方负责保证。
#[inline]
pub const fn max_raw(bits: u32) -> u16 {
    ((1u32 << bits) - 1) as u16
}

fn check_field(min: f64, max: f64, bits: u32) -> Result<(), ProtocolError> {
    if bits == 0 || bits > MAX_FIELD_BITS {
        return Err(ProtocolError::InvalidRange(format!(
            "field width {} bits is outside 1..={}",
            bits, MAX_FIELD_BITS
        )));
    }
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(ProtocolError::InvalidRange(format!(
            "[{}, {}] is not a finite, non-empty interval",
            min, max
        )));
    }
    Ok(())
}

/// 将浮点数映射为无符号整数
///
/// 公式：`round((clamp(x) - min) / (max - min) * (2^bits - 1))`
///
/// 超出 `[min, max]` 的输入先钳位到边界，不会回绕或溢出字段。
///
/// # 错误
/// - `InvalidRange`: `bits` 不在 `1..=16`，或 `min >= max`，或边界非有限值
/// - `NonFiniteInput`: `x` 为 NaN
///
/// ```rust
/// use ak_protocol::float_to_uint;
///
/// assert_eq!(float_to_uint(0.0, -12.5, 12.5, 16).unwrap(), 32768);
/// assert_eq!(float_to_uint(-112.5, -12.5, 12.5, 16).unwrap(), 0);
/// ```
pub fn float_to_uint(x: f64, min: f64, max: f64, bits: u32) -> Result<u16, ProtocolError> {
    check_field(min, max, bits)?;
    if x.is_nan() {
        return Err(ProtocolError::NonFiniteInput {
            field: "quantized value",
            value: x,
        });
    }

    let top = f64::from(max_raw(bits));
    let clamped = x.clamp(min, max);
    let raw = ((clamped - min) / (max - min) * top).round();
    Ok(raw.clamp(0.0, top) as u16)
}

/// 将无符号整数映射回浮点数
///
/// 公式：`raw / (2^bits - 1) * (max - min) + min`
///
/// 超过字段最大值的 `raw` 按最大值处理，保证结果始终落在 `[min, max]`。
pub fn uint_to_float(raw: u16, min: f64, max: f64, bits: u32) -> Result<f64, ProtocolError> {
    check_field(min, max, bits)?;
    let top = max_raw(bits);
    let raw = raw.min(top);
    Ok(f64::from(raw) / f64::from(top) * (max - min) + min)
}

/// 一个量化步长 `(max - min) / (2^bits - 1)`
pub fn step(min: f64, max: f64, bits: u32) -> Result<f64, ProtocolError> {
    check_field(min, max, bits)?;
    Ok((max - min) / f64::from(max_raw(bits)))
}

/// 增益缩放（Kp / Kd）
///
/// 公式：`round((2^bits - 1) * gain / gain_max)`
///
/// 单边比例缩放，与 [`float_to_uint`] 的双边映射不可互换。
/// 结果钳位到 `[0, 2^bits - 1]`。
///
/// ```rust
/// use ak_protocol::scale_gain;
///
/// assert_eq!(scale_gain(250.0, 500.0, 12).unwrap(), 2048);
/// ```
pub fn scale_gain(gain: f64, gain_max: f64, bits: u32) -> Result<u16, ProtocolError> {
    check_gain(gain_max, bits)?;
    if gain.is_nan() {
        return Err(ProtocolError::NonFiniteInput {
            field: "gain",
            value: gain,
        });
    }

    let top = f64::from(max_raw(bits));
    let raw = (top * gain / gain_max).round();
    Ok(raw.clamp(0.0, top) as u16)
}

/// 增益缩放的逆运算（用于诊断输出）
pub fn unscale_gain(raw: u16, gain_max: f64, bits: u32) -> Result<f64, ProtocolError> {
    check_gain(gain_max, bits)?;
    let top = max_raw(bits);
    Ok(f64::from(raw.min(top)) * gain_max / f64::from(top))
}

fn check_gain(gain_max: f64, bits: u32) -> Result<(), ProtocolError> {
    if bits == 0 || bits > MAX_FIELD_BITS {
        return Err(ProtocolError::InvalidRange(format!(
            "field width {} bits is outside 1..={}",
            bits, MAX_FIELD_BITS
        )));
    }
    if !gain_max.is_finite() || gain_max <= 0.0 {
        return Err(ProtocolError::InvalidRange(format!(
            "gain limit {} must be finite and positive",
            gain_max
        )));
    }
    Ok(())
}
