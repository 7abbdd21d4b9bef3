// crates/ft_mesh/src/locator.rs

//! 单元行走定位器
//!
//! 粒子每步移动距离不超过单元尺寸的一小部分，因此定位采用
//! 邻接行走：从当前单元出发，沿重心坐标最负的方向跨边前进，
//! 直到包含目标点的单元。行走失败（走出边界）时由调用方决定
//! 边界处理；全局回退在单条裂隙的单元内线性扫描。

use crate::mesh::DfnMesh;
use ft_foundation::error::FtResult;
use ft_geo::{Barycentric, EPS_GEO};
use glam::DVec3;

/// 行走定位的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateOutcome {
    /// 找到包含单元
    Found(u32),
    /// 行走到达边界边（返回最后单元与穿出的局部边号）
    HitBoundary {
        /// 行走终止时所在单元
        cell: u32,
        /// 穿出的局部边号
        edge: usize,
    },
    /// 超过最大行走步数（网格异常或点过远）
    Lost,
}

/// 单元行走定位器
#[derive(Debug, Clone)]
pub struct CellLocator {
    /// 包含判断容差
    pub eps: f64,
    /// 最大行走步数（0 表示取单元数 × 2）
    pub max_walk: usize,
}

impl Default for CellLocator {
    fn default() -> Self {
        Self {
            eps: EPS_GEO,
            max_walk: 0,
        }
    }
}

impl CellLocator {
    /// 创建定位器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置包含容差
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// 某单元相对某点的重心坐标
    pub fn barycentric(&self, mesh: &DfnMesh, cell: u32, point: DVec3) -> FtResult<Barycentric> {
        let plane = mesh.cell_plane(cell);
        let tri = mesh.triangle(cell);
        Barycentric::in_plane(plane, &tri, point)
    }

    /// 从起始单元行走定位
    pub fn walk(&self, mesh: &DfnMesh, start: u32, point: DVec3) -> FtResult<LocateOutcome> {
        let max_walk = if self.max_walk == 0 {
            mesh.n_cells() * 2
        } else {
            self.max_walk
        };

        let mut cell = start;
        let mut prev: Option<u32> = None;

        for _ in 0..max_walk {
            let bc = self.barycentric(mesh, cell, point)?;
            if bc.is_inside(self.eps) {
                return Ok(LocateOutcome::Found(cell));
            }

            // 跨最负权重的边；该边被上一步走过时改走次负方向，避免往返
            let mut order = [0usize, 1, 2];
            order.sort_by(|a, b| {
                bc.weights[*a]
                    .partial_cmp(&bc.weights[*b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut advanced = false;
            for &e in &order {
                if bc.weights[e] >= -self.eps {
                    break;
                }
                match mesh.neighbor(cell, e) {
                    Some(next) if Some(next) != prev => {
                        prev = Some(cell);
                        cell = next;
                        advanced = true;
                        break;
                    }
                    Some(_) => continue,
                    None => {
                        return Ok(LocateOutcome::HitBoundary { cell, edge: e });
                    }
                }
            }

            if !advanced {
                // 唯一的负方向指向上一个单元：点位于公共边附近，取当前单元
                return Ok(LocateOutcome::Found(cell));
            }
        }

        Ok(LocateOutcome::Lost)
    }

    /// 在一条裂隙的所有单元中线性扫描（全局回退）
    pub fn scan_fracture(&self, mesh: &DfnMesh, fracture: u32, point: DVec3) -> Option<u32> {
        for cell in mesh.fracture_cells(fracture) {
            if let Ok(bc) = self.barycentric(mesh, cell, point) {
                if bc.is_inside(self.eps) {
                    return Some(cell);
                }
            }
        }
        None
    }
}

// ============================================================
// 测试
// ============================================================
