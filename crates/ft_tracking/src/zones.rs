// crates/ft_tracking/src/zones.rs

//! 入流/出流边界区
//!
//! 流动求解器的边界区文件给出属于入流区与出流区的节点编号。
//! 追踪阶段用它们判断粒子穿出的边界边属于哪一类：
//!
//! - 两端点都在出流区的边界边：吸收（粒子离开网络）
//! - 两端点都在入流区的边界边：布种位置
//! - 其余边界边：不透水壁面（反射）

use ft_foundation::error::{FtError, FtResult};
use ft_mesh::DfnMesh;
use std::collections::HashSet;

/// 入流/出流边界区
#[derive(Debug, Clone, Default)]
pub struct BoundaryZones {
    inflow: HashSet<u32>,
    outflow: HashSet<u32>,
}

impl BoundaryZones {
    /// 由节点列表构建，并检查编号范围
    pub fn from_node_lists(
        mesh: &DfnMesh,
        inflow: impl IntoIterator<Item = u32>,
        outflow: impl IntoIterator<Item = u32>,
    ) -> FtResult<Self> {
        let mut zones = Self::default();
        for n in inflow {
            mesh.check_node(n as usize)?;
            zones.inflow.insert(n);
        }
        for n in outflow {
            mesh.check_node(n as usize)?;
            if zones.inflow.contains(&n) {
                return Err(FtError::invalid_input(format!(
                    "节点 {n} 同时位于入流区与出流区"
                )));
            }
            zones.outflow.insert(n);
        }
        if zones.inflow.is_empty() {
            return Err(FtError::invalid_input("入流区为空"));
        }
        if zones.outflow.is_empty() {
            return Err(FtError::invalid_input("出流区为空"));
        }
        Ok(zones)
    }

    /// 节点是否在入流区
    #[inline]
    pub fn is_inflow_node(&self, node: u32) -> bool {
        self.inflow.contains(&node)
    }

    /// 节点是否在出流区
    #[inline]
    pub fn is_outflow_node(&self, node: u32) -> bool {
        self.outflow.contains(&node)
    }

    /// 边界边 (a, b) 是否为出流边
    #[inline]
    pub fn is_outflow_edge(&self, a: u32, b: u32) -> bool {
        self.outflow.contains(&a) && self.outflow.contains(&b)
    }

    /// 边界边 (a, b) 是否为入流边
    #[inline]
    pub fn is_inflow_edge(&self, a: u32, b: u32) -> bool {
        self.inflow.contains(&a) && self.inflow.contains(&b)
    }

    /// 入流节点数
    pub fn n_inflow(&self) -> usize {
        self.inflow.len()
    }

    /// 出流节点数
    pub fn n_outflow(&self) -> usize {
        self.outflow.len()
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ft_mesh::samples;

    #[test]
    fn test_strip_zones() {
        let mesh = samples::strip(4).unwrap();
        // 左端 x=0 入流，右端 x=4 出流
        let zones = BoundaryZones::from_node_lists(&mesh, [0u32, 1], [8u32, 9]).unwrap();

        assert!(zones.is_inflow_edge(0, 1));
        assert!(zones.is_outflow_edge(8, 9));
        assert!(!zones.is_outflow_edge(0, 9));
        assert_eq!(zones.n_inflow(), 2);
    }

    #[test]
    fn test_overlapping_zones_rejected() {
        let mesh = samples::strip(2).unwrap();
        assert!(BoundaryZones::from_node_lists(&mesh, [0u32, 1], [1u32, 4]).is_err());
    }

    #[test]
    fn test_empty_zone_rejected() {
        let mesh = samples::strip(2).unwrap();
        assert!(BoundaryZones::from_node_lists(&mesh, [], [4u32]).is_err());
        assert!(BoundaryZones::from_node_lists(&mesh, [0u32], []).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mesh = samples::strip(2).unwrap();
        assert!(BoundaryZones::from_node_lists(&mesh, [99u32], [4u32]).is_err());
    }
}
