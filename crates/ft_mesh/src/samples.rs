// crates/ft_mesh/src/samples.rs

//! 微型示例网格
//!
//! 供各层单元测试与集成测试共用的手工网格。所有网格的编号
//! 与坐标都是固定的，测试可以依赖其拓扑细节。
//!
//! - [`unit_square`]: 单裂隙单位正方形，2 个三角形
//! - [`strip`]: 单裂隙条带 [0, nx] × [0, 1]，2·nx 个三角形
//! - [`cross`]: 两条正交裂隙，交线为 (1, y, 0), y ∈ [0, 1]

use crate::mesh::{DfnMesh, MeshSource};
use ft_foundation::error::FtResult;
use ft_geo::Point3D;

/// 单位正方形原始数据（z = 0 平面，单裂隙）
///
/// 节点: (0,0) (1,0) (1,1) (0,1)；单元: [0,1,2] [0,2,3]
pub fn unit_square_source() -> MeshSource {
    MeshSource {
        node_coords: vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(1.0, 1.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
        ],
        node_fracture: vec![0; 4],
        cell_nodes: vec![[0, 1, 2], [0, 2, 3]],
        cell_fracture: vec![0, 0],
    }
}

/// 单位正方形网格
pub fn unit_square() -> FtResult<DfnMesh> {
    DfnMesh::build(unit_square_source())
}

/// 条带网格原始数据：[0, nx] × [0, 1]，列宽 1
///
/// 节点编号：x = i 处下排 2i、上排 2i+1。
pub fn strip_source(nx: usize) -> MeshSource {
    let mut node_coords = Vec::with_capacity(2 * (nx + 1));
    for i in 0..=nx {
        node_coords.push(Point3D::new(i as f64, 0.0, 0.0));
        node_coords.push(Point3D::new(i as f64, 1.0, 0.0));
    }

    let mut cell_nodes = Vec::with_capacity(2 * nx);
    for i in 0..nx {
        let (bl, tl) = (2 * i as u32, 2 * i as u32 + 1);
        let (br, tr) = (bl + 2, tl + 2);
        cell_nodes.push([bl, br, tr]);
        cell_nodes.push([bl, tr, tl]);
    }

    let n_nodes = node_coords.len();
    let n_cells = cell_nodes.len();
    MeshSource {
        node_coords,
        node_fracture: vec![0; n_nodes],
        cell_nodes,
        cell_fracture: vec![0; n_cells],
    }
}

/// 条带网格
pub fn strip(nx: usize) -> FtResult<DfnMesh> {
    DfnMesh::build(strip_source(nx))
}

/// 两条正交裂隙的原始数据
///
/// - 裂隙 0: z = 0 平面, x ∈ [0, 2], y ∈ [0, 1]（节点 0..=5）
/// - 裂隙 1: x = 1 平面, z ∈ [-1, 0], y ∈ [0, 1]（节点 6..=9）
/// - 交线: (1, y, 0)；节点对 (1, 6) 与 (4, 7) 互为 twin
pub fn cross_source() -> MeshSource {
    MeshSource {
        node_coords: vec![
            // 裂隙 0
            Point3D::new(0.0, 0.0, 0.0), // 0
            Point3D::new(1.0, 0.0, 0.0), // 1  交叉
            Point3D::new(2.0, 0.0, 0.0), // 2
            Point3D::new(0.0, 1.0, 0.0), // 3
            Point3D::new(1.0, 1.0, 0.0), // 4  交叉
            Point3D::new(2.0, 1.0, 0.0), // 5
            // 裂隙 1
            Point3D::new(1.0, 0.0, 0.0),  // 6  交叉 (twin 1)
            Point3D::new(1.0, 1.0, 0.0),  // 7  交叉 (twin 4)
            Point3D::new(1.0, 0.0, -1.0), // 8
            Point3D::new(1.0, 1.0, -1.0), // 9
        ],
        node_fracture: vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
        cell_nodes: vec![
            [0, 1, 4],
            [0, 4, 3],
            [1, 2, 5],
            [1, 5, 4],
            [6, 8, 9],
            [6, 9, 7],
        ],
        cell_fracture: vec![0, 0, 0, 0, 1, 1],
    }
}

/// 两条正交裂隙的网格
pub fn cross() -> FtResult<DfnMesh> {
    DfnMesh::build(cross_source())
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_counts() {
        let mesh = strip(3).unwrap();
        assert_eq!(mesh.n_nodes(), 8);
        assert_eq!(mesh.n_cells(), 6);
        let total: f64 = mesh.cell_area.iter().sum();
        assert!((total - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_builds() {
        let mesh = cross().unwrap();
        assert_eq!(mesh.n_cells(), 6);
        assert_eq!(mesh.n_fractures(), 2);
    }
}
