// crates/ft_tracking/src/routing.rs

//! 交叉线分流
//!
//! 粒子到达两条裂隙的交线后，必须在交线两侧的（至多 4 个）
//! 半平面分支中选择出口。两种规则：
//!
//! - **完全混合** (CompleteMixing): 随机选择，概率正比于各分支
//!   的出流通量（出流法向速度 × 开度）
//! - **流线分流** (StreamlineRouting): 确定性选择。把粒子在交线
//!   上的落点位置视作入流流管内的流函数份额，映射到按角度排序
//!   的出流分支的累计通量区间上（沿交线通量密度均匀的近似）
//!
//! 入流分支（出流通量非正）永远不会被选中。所有分支均无出流
//! 通量时返回 `RoutingFailed`，由上层把粒子标记为停滞。

use crate::particle::Particle;
use ft_flow::VelocityField;
use ft_foundation::error::{FtError, FtResult};
use ft_mesh::DfnMesh;
use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// 分流规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingRule {
    /// 完全混合：按出流通量随机
    #[default]
    CompleteMixing,
    /// 流线分流：按流函数份额确定性选择
    StreamlineRouting,
}

impl RoutingRule {
    /// 规则名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompleteMixing => "Complete Mixing",
            Self::StreamlineRouting => "Streamline Routing",
        }
    }
}

/// 候选分支
#[derive(Debug, Clone, Copy)]
struct Branch {
    cell: u32,
    fracture: u32,
    /// 出流权重（法向速度 × 开度，≤ 0 为入流）
    weight: f64,
    /// 绕交线方向的方位角（流线分流排序用）
    angle: f64,
}

/// 分流结果
#[derive(Debug, Clone, Copy)]
pub struct BranchChoice {
    /// 目标单元
    pub cell: u32,
    /// 目标裂隙
    pub fracture: u32,
}

/// 交叉线分流器
#[derive(Debug, Clone, Copy)]
pub struct IntersectionRouter {
    /// 分流规则
    pub rule: RoutingRule,
}

impl IntersectionRouter {
    /// 创建分流器
    pub fn new(rule: RoutingRule) -> Self {
        Self { rule }
    }

    /// 在交线落点处选择出流分支
    ///
    /// # 参数
    /// - `cell_in`: 粒子到达交线时所在单元
    /// - `edge`: 该单元上的交线局部边号
    /// - `xc`: 交线上的落点（全局坐标）
    pub fn route<R: Rng + ?Sized>(
        &self,
        mesh: &DfnMesh,
        field: &VelocityField,
        apertures: &[f64],
        particle: &Particle,
        cell_in: u32,
        edge: usize,
        xc: DVec3,
        rng: &mut R,
    ) -> FtResult<BranchChoice> {
        let (a, b) = mesh.cells[cell_in as usize].edge(edge);
        // 统一取向：交线参数 t 从小编号节点指向大编号节点
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        let pa = mesh.node_pos(a);
        let pb = mesh.node_pos(b);
        let trace = pb - pa;
        let trace_len2 = trace.length_squared();
        if trace_len2 < 1e-28 {
            return Err(FtError::routing_failed("交线边长度退化"));
        }
        let t = ((xc - pa).dot(trace) / trace_len2).clamp(0.0, 1.0);
        let e = trace / trace_len2.sqrt();

        // 候选单元：本裂隙交线边的两侧 + twin 边的两侧
        let mut candidates: SmallVec<[(u32, u32, u32); 6]> = SmallVec::new();
        let mut push_cells = |na: u32, nb: u32, out: &mut SmallVec<[(u32, u32, u32); 6]>| {
            for &c in &mesh.node_cells[na as usize] {
                if mesh.cells[c as usize].local_index(nb).is_some()
                    && !out.iter().any(|(cc, _, _)| *cc == c)
                {
                    out.push((c, na, nb));
                }
            }
        };
        push_cells(a, b, &mut candidates);
        for &a2 in &mesh.nodes[a as usize].twins {
            for &b2 in &mesh.nodes[b as usize].twins {
                if mesh.nodes[a2 as usize].fracture == mesh.nodes[b2 as usize].fracture {
                    push_cells(a2, b2, &mut candidates);
                }
            }
        }

        // 方位角参考系：垂直于交线的平面
        let mut branches: SmallVec<[Branch; 6]> = SmallVec::new();
        let mut ref_frame: Option<(DVec3, DVec3)> = None;

        for (cell, na, nb) in candidates {
            let frac = mesh.cells[cell as usize].fracture;
            FtError::check_index("Fracture", frac as usize, apertures.len())?;

            // 分支内法向：对顶点到交线的垂直方向
            let c_op = mesh.cells[cell as usize]
                .nodes
                .iter()
                .copied()
                .find(|n| *n != na && *n != nb)
                .ok_or_else(|| FtError::routing_failed("交线边两端点与单元不符"))?;
            let d = mesh.node_pos(c_op) - pa;
            let n_into = d - e * d.dot(e);
            let n_len = n_into.length();
            if n_len < 1e-14 {
                continue;
            }
            let n_into = n_into / n_len;

            let (r1, r2) = *ref_frame.get_or_insert_with(|| {
                let r1 = n_into;
                (r1, e.cross(r1))
            });
            let angle = n_into.dot(r2).atan2(n_into.dot(r1));

            // 落点处分支速度：沿分支自己那份交线边端点速度插值
            let va = field.node_velocity(na);
            let vb = field.node_velocity(nb);
            let v_edge = va * (1.0 - t) + vb * t;
            let weight = v_edge.dot(n_into) * apertures[frac as usize];

            branches.push(Branch {
                cell,
                fracture: frac,
                weight,
                angle,
            });
        }

        let total_out: f64 = branches.iter().map(|b| b.weight.max(0.0)).sum();
        if !(total_out > 0.0) {
            return Err(FtError::routing_failed(format!(
                "粒子 {} 在交线 ({a}, {b}) 处无出流分支",
                particle.id
            )));
        }

        let chosen = match self.rule {
            RoutingRule::CompleteMixing => {
                let mut u = rng.random::<f64>() * total_out;
                let mut pick = None;
                for br in &branches {
                    let w = br.weight.max(0.0);
                    if w <= 0.0 {
                        continue;
                    }
                    if u < w {
                        pick = Some(*br);
                        break;
                    }
                    u -= w;
                }
                // 浮点残余：取最后一个出流分支
                pick.or_else(|| {
                    branches
                        .iter()
                        .rev()
                        .find(|b| b.weight > 0.0)
                        .copied()
                })
                .ok_or_else(|| FtError::routing_failed("出流分支采样失败"))?
            }
            RoutingRule::StreamlineRouting => {
                // 出流分支按方位角排序，落点份额 t 映射到累计通量区间
                let mut out: SmallVec<[Branch; 6]> =
                    branches.iter().filter(|b| b.weight > 0.0).copied().collect();
                out.sort_by(|x, y| {
                    x.angle
                        .partial_cmp(&y.angle)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                let mut acc = 0.0;
                let target = t * total_out;
                let mut pick = out[out.len() - 1];
                for br in &out {
                    acc += br.weight;
                    if target <= acc {
                        pick = *br;
                        break;
                    }
                }
                pick
            }
        };

        Ok(BranchChoice {
            cell: chosen.cell,
            fracture: chosen.fracture,
        })
    }
}

// ============================================================
// 测试
// ============================================================
