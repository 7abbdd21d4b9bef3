// crates/ft_geo/src/lib.rs

//! FracTrans 几何模块
//!
//! 提供裂隙网络追踪所需的几何基础设施。
//!
//! # 模块
//!
//! - `point`: 几何类型 (Point3D)，带 serde 支持
//! - `plane`: 裂隙平面局部坐标系 (FracturePlane)
//! - `barycentric`: 三角形重心坐标与包含判断
//!
//! # 示例
//!
//! ```
//! use ft_geo::prelude::*;
//! use glam::DVec3;
//!
//! let plane = FracturePlane::from_normal(DVec3::Z).unwrap();
//! let local = plane.to_local(DVec3::new(1.0, 2.0, 0.0));
//! let back = plane.to_global(local);
//! assert!((back - DVec3::new(1.0, 2.0, 0.0)).length() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barycentric;
pub mod plane;
pub mod point;

pub use barycentric::{Barycentric, Triangle3};
pub use plane::FracturePlane;
pub use point::Point3D;

/// 几何判断默认容差
pub const EPS_GEO: f64 = 1e-10;

/// 预导入模块
pub mod prelude {
    pub use crate::barycentric::{Barycentric, Triangle3};
    pub use crate::plane::FracturePlane;
    pub use crate::point::Point3D;
    pub use crate::EPS_GEO;
}
