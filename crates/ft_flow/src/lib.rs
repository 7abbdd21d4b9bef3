// crates/ft_flow/src/lib.rs

//! FracTrans 流场层
//!
//! 外部流动求解器（PFLOTRAN 风格控制体离散）输出的稳态解在
//! 这里装载为 [`FlowSolution`]，再由 [`reconstruction`] 模块
//! 重构出每个网格节点上的孔隙速度向量，供粒子追踪插值使用。
//!
//! # 模块
//!
//! - `solution`: 流场解数据（压力、连接通量、控制体体积、开度）
//! - `reconstruction`: 控制体通量 → 节点速度的加权最小二乘重构

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod reconstruction;
pub mod solution;

pub use reconstruction::{ReconstructionConfig, VelocityField};
pub use solution::{BoundaryFace, Connection, FlowSolution};

/// 预导入模块
pub mod prelude {
    pub use crate::reconstruction::{ReconstructionConfig, VelocityField};
    pub use crate::solution::{BoundaryFace, Connection, FlowSolution};
}
