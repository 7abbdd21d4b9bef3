// crates/ft_foundation/src/lib.rs

//! FracTrans Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`validation`]: 运行时数值验证工具
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror
//! 2. **无 panic**: 所有输入错误都通过 `FtResult` 传播
//! 3. **层次化**: 基础层只定义核心错误，追踪相关错误在上层扩展

#![warn(missing_docs)]
#![warn(clippy::all)]

/// 条件检查宏：条件不成立时返回给定错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Option 解包宏：为 None 时返回给定错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}

pub mod error;
pub mod validation;

pub use error::{FtError, FtResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{FtError, FtResult};
    pub use crate::validation::{check_finite_slice, check_positive};
    pub use crate::{ensure, require};
}
