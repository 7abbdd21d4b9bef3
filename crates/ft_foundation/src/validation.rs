// crates/ft_foundation/src/validation.rs

//! 运行时数值验证工具
//!
//! 提供对输入数组的有限性与符号检查，用于网格与流场数据装载后的
//! 一致性验证。所有检查失败都返回 [`FtError`]，不会 panic。

use crate::error::{FtError, FtResult};

/// 检查切片中所有值是否有限（非 NaN、非无穷）
///
/// # 参数
///
/// - `name`: 数据名称，用于错误信息
/// - `data`: 待检查的数据
pub fn check_finite_slice(name: &'static str, data: &[f64]) -> FtResult<()> {
    for (i, v) in data.iter().enumerate() {
        if !v.is_finite() {
            return Err(FtError::validation(format!(
                "{name}[{i}] 非有限值: {v}"
            )));
        }
    }
    Ok(())
}

/// 检查值为正
pub fn check_positive(name: &'static str, value: f64) -> FtResult<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(FtError::validation(format!("{name} 必须为正数, 实际 {value}")));
    }
    Ok(())
}

/// 检查切片中所有值为正
pub fn check_positive_slice(name: &'static str, data: &[f64]) -> FtResult<()> {
    for (i, v) in data.iter().enumerate() {
        if !(*v > 0.0) || !v.is_finite() {
            return Err(FtError::validation(format!(
                "{name}[{i}] 必须为正数, 实际 {v}"
            )));
        }
    }
    Ok(())
}

// ========================================================================
// 测试
// ========================================================================
