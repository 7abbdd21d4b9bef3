// crates/ft_flow/src/solution.rs

//! 流场解数据
//!
//! 来自外部求解器的稳态控制体解：
//!
//! - 节点（控制体中心）压力与控制体体积
//! - 节点间连接的面面积与体积通量 [m³/s]
//! - 边界面（入流/出流区）的面积、外法向与通量
//! - 每条裂隙的开度与统一孔隙度
//!
//! 通量符号约定：连接 (a, b) 的通量为正表示从 a 流向 b。

use ft_foundation::error::{FtError, FtResult};
use ft_foundation::validation::{check_finite_slice, check_positive};
use glam::DVec3;
use std::collections::HashMap;

/// 节点间连接（控制体面）
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    /// 节点 a
    pub a: u32,
    /// 节点 b
    pub b: u32,
    /// 面面积 [m²]（含开度）
    pub area: f64,
    /// 体积通量 [m³/s]，正值为 a → b
    pub flux: f64,
}

/// 边界面（入流/出流区中的节点外侧面）
#[derive(Debug, Clone, Copy)]
pub struct BoundaryFace {
    /// 所属节点
    pub node: u32,
    /// 面外法向（面内单位向量）
    pub normal: DVec3,
    /// 面面积 [m²]
    pub area: f64,
    /// 体积通量 [m³/s]，正值为流出
    pub flux: f64,
}

/// 稳态流场解
#[derive(Debug, Clone)]
pub struct FlowSolution {
    /// 每节点压力 [Pa]
    pub pressure: Vec<f64>,
    /// 每节点控制体体积 [m³]
    pub node_volume: Vec<f64>,
    /// 节点间连接
    pub connections: Vec<Connection>,
    /// 边界面
    pub boundary_faces: Vec<BoundaryFace>,
    /// 每条裂隙的开度 [m]
    pub aperture: Vec<f64>,
    /// 孔隙度（裂隙内，通常为 1）
    pub porosity: f64,

    /// 连接索引: (min, max) → connections 下标
    flux_index: HashMap<(u32, u32), usize>,
}

impl FlowSolution {
    /// 组装流场解并建立连接索引
    pub fn new(
        pressure: Vec<f64>,
        node_volume: Vec<f64>,
        connections: Vec<Connection>,
        boundary_faces: Vec<BoundaryFace>,
        aperture: Vec<f64>,
        porosity: f64,
    ) -> FtResult<Self> {
        FtError::check_size("node_volume", pressure.len(), node_volume.len())?;
        check_finite_slice("pressure", &pressure)?;
        check_positive("porosity", porosity)?;
        FtError::check_range("porosity", porosity, f64::MIN_POSITIVE, 1.0)?;
        for (f, b) in aperture.iter().enumerate() {
            if !(*b > 0.0) || !b.is_finite() {
                return Err(FtError::invalid_flow(format!(
                    "裂隙 {f} 开度无效: {b}"
                )));
            }
        }

        let n = pressure.len();
        let mut flux_index = HashMap::with_capacity(connections.len());
        for (i, c) in connections.iter().enumerate() {
            FtError::check_index("Node", c.a as usize, n)?;
            FtError::check_index("Node", c.b as usize, n)?;
            if !(c.area > 0.0) {
                return Err(FtError::invalid_flow(format!(
                    "连接 ({}, {}) 面积无效: {}",
                    c.a, c.b, c.area
                )));
            }
            let key = if c.a < c.b { (c.a, c.b) } else { (c.b, c.a) };
            if flux_index.insert(key, i).is_some() {
                return Err(FtError::invalid_flow(format!(
                    "连接 ({}, {}) 重复", c.a, c.b
                )));
            }
        }
        for bf in &boundary_faces {
            FtError::check_index("Node", bf.node as usize, n)?;
        }

        Ok(Self {
            pressure,
            node_volume,
            connections,
            boundary_faces,
            aperture,
            porosity,
            flux_index,
        })
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.pressure.len()
    }

    /// 有向通量：正值为 a → b；连接不存在时为 None
    pub fn flux(&self, a: u32, b: u32) -> Option<f64> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.flux_index.get(&key).map(|&i| {
            let c = &self.connections[i];
            if c.a == a {
                c.flux
            } else {
                -c.flux
            }
        })
    }

    /// 连接面面积；连接不存在时为 None
    pub fn face_area(&self, a: u32, b: u32) -> Option<f64> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.flux_index.get(&key).map(|&i| self.connections[i].area)
    }

    /// 节点的边界面
    pub fn node_boundary_faces(&self, node: u32) -> impl Iterator<Item = &BoundaryFace> {
        self.boundary_faces.iter().filter(move |f| f.node == node)
    }

    /// 总入流量（边界通量为负的面之和的绝对值）
    pub fn total_inflow(&self) -> f64 {
        self.boundary_faces
            .iter()
            .map(|f| f.flux.min(0.0))
            .sum::<f64>()
            .abs()
    }

    /// 总出流量
    pub fn total_outflow(&self) -> f64 {
        self.boundary_faces.iter().map(|f| f.flux.max(0.0)).sum()
    }

    /// 每节点的内部连接净流入 [m³/s]
    ///
    /// 正值表示节点从内部连接净得水。稳态下内部节点应近似为零，
    /// 入流边界节点为负（向内部净输出），出流边界节点为正。
    pub fn node_net_flux(&self) -> Vec<f64> {
        let mut net = vec![0.0_f64; self.n_nodes()];
        for c in &self.connections {
            net[c.a as usize] -= c.flux;
            net[c.b as usize] += c.flux;
        }
        net
    }

    /// 入流/出流平衡的相对误差
    pub fn flux_imbalance(&self) -> f64 {
        let qin = self.total_inflow();
        let qout = self.total_outflow();
        let scale = qin.max(qout).max(f64::MIN_POSITIVE);
        (qin - qout).abs() / scale
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_solution() -> FlowSolution {
        FlowSolution::new(
            vec![2.0, 1.0],
            vec![0.5, 0.5],
            vec![Connection {
                a: 0,
                b: 1,
                area: 1.0,
                flux: 0.3,
            }],
            vec![
                BoundaryFace {
                    node: 0,
                    normal: DVec3::new(-1.0, 0.0, 0.0),
                    area: 1.0,
                    flux: -0.3,
                },
                BoundaryFace {
                    node: 1,
                    normal: DVec3::new(1.0, 0.0, 0.0),
                    area: 1.0,
                    flux: 0.3,
                },
            ],
            vec![1e-3],
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_signed_flux() {
        let sol = tiny_solution();
        assert_eq!(sol.flux(0, 1), Some(0.3));
        assert_eq!(sol.flux(1, 0), Some(-0.3));
        assert_eq!(sol.flux(0, 5), None);
    }

    #[test]
    fn test_flux_balance() {
        let sol = tiny_solution();
        assert!((sol.total_inflow() - 0.3).abs() < 1e-14);
        assert!((sol.total_outflow() - 0.3).abs() < 1e-14);
        assert!(sol.flux_imbalance() < 1e-14);
    }

    #[test]
    fn test_node_net_flux() {
        let sol = tiny_solution();
        let net = sol.node_net_flux();
        assert!((net[0] + 0.3).abs() < 1e-14, "节点 0 向内部净输出");
        assert!((net[1] - 0.3).abs() < 1e-14, "节点 1 从内部净得水");
    }

    #[test]
    fn test_invalid_porosity_rejected() {
        let r = FlowSolution::new(vec![0.0], vec![1.0], vec![], vec![], vec![1e-3], 0.0);
        assert!(r.is_err());
        let r = FlowSolution::new(vec![0.0], vec![1.0], vec![], vec![], vec![1e-3], 1.5);
        assert!(r.is_err());
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let c = Connection {
            a: 0,
            b: 1,
            area: 1.0,
            flux: 0.1,
        };
        let r = FlowSolution::new(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![c, c],
            vec![],
            vec![1e-3],
            1.0,
        );
        assert!(r.is_err());
    }

    #[test]
    fn test_bad_aperture_rejected() {
        let r = FlowSolution::new(vec![0.0], vec![1.0], vec![], vec![], vec![0.0], 1.0);
        assert!(r.is_err());
    }
}
