// crates/ft_mesh/src/lib.rs

//! FracTrans 网格层
//!
//! 裂隙网络 (DFN) 三角剖分的数据结构与拓扑算法。
//!
//! # 模块
//!
//! - `mesh`: 核心类型 (DfnMesh, Node, Cell, NodeKind)
//! - `topology`: 从原始节点/单元数组构建完整拓扑
//! - `control_volume`: 节点控制体（Voronoi 对偶）几何量
//! - `locator`: 单元行走定位器
//! - `samples`: 测试与示例用的微型网格
//!
//! # 网格约定
//!
//! - 每个节点属于且仅属于一条裂隙；交叉线上的节点按裂隙复制，
//!   复制品之间通过 twin 链接互相引用
//! - 每个单元是三角形，三个节点同属一条裂隙
//! - 裂隙编号与节点/单元编号均为 0 基（文件中的 1 基编号在
//!   读取层转换）

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control_volume;
pub mod locator;
pub mod mesh;
pub mod samples;
pub mod topology;

pub use control_volume::{CvFace, GeometricControlVolumes};
pub use locator::{CellLocator, LocateOutcome};
pub use mesh::{Cell, DfnMesh, MeshSource, Node, NodeKind};

/// 预导入模块
pub mod prelude {
    pub use crate::control_volume::{CvFace, GeometricControlVolumes};
    pub use crate::locator::{CellLocator, LocateOutcome};
    pub use crate::mesh::{Cell, DfnMesh, MeshSource, Node, NodeKind};
}
