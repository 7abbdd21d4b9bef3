// crates/ft_mesh/src/control_volume.rs

//! 节点控制体几何量
//!
//! 流场解定义在以网格节点为中心的控制体（Voronoi 对偶）上。
//! 本模块从三角剖分计算控制体的几何近似量：
//!
//! - 节点控制体面积：相邻单元面积的 1/3 之和（质心对偶）
//! - 控制体面：节点 i 与相邻节点 j 之间的对偶面，长度为相邻
//!   单元内"边中点 → 单元质心"线段长度之和，法向取面内 i → j
//!   单位向量
//!
//! 当 `.uge` 文件提供了求解器自己的体积/面积时以文件为准，
//! 本模块的几何量用作回退与一致性校验。

use crate::mesh::DfnMesh;
use ft_foundation::error::{FtError, FtResult};
use glam::DVec3;
use smallvec::SmallVec;
use std::collections::HashMap;

/// 控制体面：节点与一个面内相邻节点之间的对偶面
#[derive(Debug, Clone, Copy)]
pub struct CvFace {
    /// 相邻节点编号（同一裂隙）
    pub neighbor: u32,
    /// 面长度（面内对偶线段长度）
    pub length: f64,
    /// 面内单位法向，由本节点指向相邻节点
    pub normal: DVec3,
}

/// 几何控制体
#[derive(Debug, Clone)]
pub struct GeometricControlVolumes {
    /// 每节点控制体面积
    pub node_area: Vec<f64>,
    /// 每节点的控制体面列表
    pub faces: Vec<SmallVec<[CvFace; 8]>>,
}

impl GeometricControlVolumes {
    /// 从网格构建几何控制体
    pub fn build(mesh: &DfnMesh) -> FtResult<Self> {
        let n_nodes = mesh.n_nodes();

        // 节点面积：质心对偶，每单元均分给三个顶点
        let mut node_area = vec![0.0_f64; n_nodes];
        for (ci, cell) in mesh.cells.iter().enumerate() {
            let third = mesh.cell_area[ci] / 3.0;
            for &n in &cell.nodes {
                node_area[n as usize] += third;
            }
        }

        // 对偶面长度：按无向边累加
        let mut edge_length: HashMap<(u32, u32), f64> = HashMap::new();
        for (ci, cell) in mesh.cells.iter().enumerate() {
            let centroid = mesh.triangle(ci as u32).centroid();
            for e in 0..3 {
                let (a, b) = cell.edge(e);
                let mid = (mesh.node_pos(a) + mesh.node_pos(b)) * 0.5;
                let seg = (centroid - mid).length();
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_length.entry(key).or_insert(0.0) += seg;
            }
        }

        let mut faces: Vec<SmallVec<[CvFace; 8]>> = vec![SmallVec::new(); n_nodes];
        for ((a, b), length) in edge_length {
            let pa = mesh.node_pos(a);
            let pb = mesh.node_pos(b);
            let plane = &mesh.fractures[mesh.nodes[a as usize].fracture as usize];
            let dir = plane.project_vector(pb - pa);
            let len = dir.length();
            if !(len > 1e-14) {
                return Err(FtError::invalid_mesh(format!(
                    "节点 {a} 与 {b} 面内间距退化"
                )));
            }
            let n_ab = dir / len;
            faces[a as usize].push(CvFace {
                neighbor: b,
                length,
                normal: n_ab,
            });
            faces[b as usize].push(CvFace {
                neighbor: a,
                length,
                normal: -n_ab,
            });
        }

        Ok(Self { node_area, faces })
    }

    /// 某条裂隙上控制体面积之和
    pub fn fracture_area(&self, mesh: &DfnMesh, fracture: u32) -> f64 {
        mesh.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.fracture == fracture)
            .map(|(i, _)| self.node_area[i])
            .sum()
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn test_area_partition() {
        let mesh = samples::strip(4).unwrap();
        let cv = GeometricControlVolumes::build(&mesh).unwrap();

        // 控制体面积之和等于三角剖分总面积
        let total: f64 = cv.node_area.iter().sum();
        let mesh_total: f64 = mesh.cell_area.iter().sum();
        assert!(
            (total - mesh_total).abs() < 1e-8 * mesh_total,
            "控制体面积和 {total} 应等于网格面积 {mesh_total}"
        );
    }

    #[test]
    fn test_faces_antisymmetric() {
        let mesh = samples::unit_square().unwrap();
        let cv = GeometricControlVolumes::build(&mesh).unwrap();

        for (i, faces) in cv.faces.iter().enumerate() {
            for f in faces {
                let back = cv.faces[f.neighbor as usize]
                    .iter()
                    .find(|g| g.neighbor == i as u32)
                    .expect("对偶面必须双向存在");
                assert!((back.length - f.length).abs() < 1e-12);
                assert!((back.normal + f.normal).length() < 1e-12, "法向应反对称");
            }
        }
    }

    #[test]
    fn test_cross_fracture_areas() {
        let mesh = samples::cross().unwrap();
        let cv = GeometricControlVolumes::build(&mesh).unwrap();

        // 裂隙 0: 2×1 矩形; 裂隙 1: 1×1 矩形
        assert!((cv.fracture_area(&mesh, 0) - 2.0).abs() < 1e-10);
        assert!((cv.fracture_area(&mesh, 1) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_normals_in_plane() {
        let mesh = samples::cross().unwrap();
        let cv = GeometricControlVolumes::build(&mesh).unwrap();

        for (i, faces) in cv.faces.iter().enumerate() {
            let plane = &mesh.fractures[mesh.nodes[i].fracture as usize];
            for f in faces {
                assert!(
                    f.normal.dot(plane.normal).abs() < 1e-10,
                    "控制体面法向必须位于裂隙平面内"
                );
            }
        }
    }
}
