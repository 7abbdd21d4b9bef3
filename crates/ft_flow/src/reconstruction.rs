// crates/ft_flow/src/reconstruction.rs

//! 节点速度重构
//!
//! 由控制体面通量重构节点处的孔隙速度（路径线追踪的速度场）。
//! 每个节点 i 的控制体面 f（法向 n_f、面积 A_f、通量 q_f）给出
//! 一条线性方程：
//!
//! n_f · v = q_f / (A_f φ)
//!
//! 在裂隙局部 2D 坐标系内按面积加权最小二乘求解法方程
//! （2×2 对称正定系统）：
//!
//! [a11 a12] [v_u]   [b1]
//! [a12 a22] [v_v] = [b2]
//!
//! 法方程奇异（行列式低于 `det_min`）时回退到通量加权平均。
//! 交叉线节点按裂隙复制，每份只使用本裂隙的面，两侧速度
//! 天然相互独立。

use crate::solution::FlowSolution;
use ft_foundation::error::{FtError, FtResult};
use ft_mesh::{DfnMesh, GeometricControlVolumes};
use glam::{DVec2, DVec3};
use rayon::prelude::*;
use tracing::{debug, warn};

// ============================================================
// 配置
// ============================================================

/// 速度重构配置
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// 行列式最小值（判断奇异性）
    pub det_min: f64,
    /// 是否纳入边界面方程
    pub use_boundary_faces: bool,
    /// 是否启用并行
    pub parallel: bool,
    /// 并行阈值（节点数）
    pub parallel_threshold: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            det_min: 1e-12,
            use_boundary_faces: true,
            parallel: true,
            parallel_threshold: 1000,
        }
    }
}

impl ReconstructionConfig {
    /// 设置行列式最小值
    pub fn with_det_min(mut self, det_min: f64) -> Self {
        self.det_min = det_min;
        self
    }

    /// 设置边界面方程开关
    pub fn with_boundary_faces(mut self, enable: bool) -> Self {
        self.use_boundary_faces = enable;
        self
    }

    /// 设置并行开关
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

// ============================================================
// 2×2 求解
// ============================================================

/// 求解 2×2 对称正定系统，奇异时返回 None
#[inline]
fn solve_2x2(a11: f64, a12: f64, a22: f64, b1: f64, b2: f64, det_min: f64) -> Option<(f64, f64)> {
    let det = a11 * a22 - a12 * a12;
    if det.abs() < det_min {
        return None;
    }
    let inv = 1.0 / det;
    let x1 = (a22 * b1 - a12 * b2) * inv;
    let x2 = (a11 * b2 - a12 * b1) * inv;
    if x1.is_finite() && x2.is_finite() {
        Some((x1, x2))
    } else {
        None
    }
}

/// 回退：通量加权平均速度
#[inline]
fn fallback_average(equations: &[(DVec2, f64, f64)]) -> DVec2 {
    let mut num = DVec2::ZERO;
    let mut den = 0.0;
    for (n, s, w) in equations {
        num += *n * (*s * *w);
        den += *w;
    }
    if den > 0.0 {
        num / den
    } else {
        DVec2::ZERO
    }
}

// ============================================================
// 速度场
// ============================================================

/// 重构后的节点速度场
///
/// 交叉线节点在每条裂隙上各有一份复制，因此 `node_velocity`
/// 直接按节点编号索引即得到"该裂隙一侧"的速度。
#[derive(Debug, Clone)]
pub struct VelocityField {
    /// 每节点孔隙速度 [m/s]
    pub node_velocity: Vec<DVec3>,
    /// 奇异回退的节点数（诊断用）
    pub n_fallback: usize,
}

impl VelocityField {
    /// 从流场解重构速度场
    pub fn reconstruct(
        mesh: &DfnMesh,
        cv: &GeometricControlVolumes,
        solution: &FlowSolution,
        config: &ReconstructionConfig,
    ) -> FtResult<Self> {
        FtError::check_size("flow_solution", mesh.n_nodes(), solution.n_nodes())?;
        if solution.aperture.len() < mesh.n_fractures() {
            return Err(FtError::size_mismatch(
                "aperture",
                mesh.n_fractures(),
                solution.aperture.len(),
            ));
        }

        let compute = |node: usize| -> (DVec3, bool) {
            reconstruct_node(mesh, cv, solution, config, node as u32)
        };

        let results: Vec<(DVec3, bool)> =
            if config.parallel && mesh.n_nodes() >= config.parallel_threshold {
                (0..mesh.n_nodes()).into_par_iter().map(compute).collect()
            } else {
                (0..mesh.n_nodes()).map(compute).collect()
            };

        let n_fallback = results.iter().filter(|(_, fb)| *fb).count();
        if n_fallback > 0 {
            warn!(n_fallback, "部分节点法方程奇异，使用通量加权平均回退");
        }
        let node_velocity: Vec<DVec3> = results.into_iter().map(|(v, _)| v).collect();

        debug!(
            n_nodes = node_velocity.len(),
            max_speed = Self::max_speed_of(&node_velocity),
            "节点速度重构完成"
        );

        Ok(Self {
            node_velocity,
            n_fallback,
        })
    }

    /// 节点速度
    #[inline]
    pub fn node_velocity(&self, node: u32) -> DVec3 {
        self.node_velocity[node as usize]
    }

    /// 单元三个顶点的速度
    #[inline]
    pub fn cell_velocities(&self, mesh: &DfnMesh, cell: u32) -> [DVec3; 3] {
        let nodes = mesh.cells[cell as usize].nodes;
        [
            self.node_velocity[nodes[0] as usize],
            self.node_velocity[nodes[1] as usize],
            self.node_velocity[nodes[2] as usize],
        ]
    }

    /// 最大速度模
    pub fn max_speed(&self) -> f64 {
        Self::max_speed_of(&self.node_velocity)
    }

    fn max_speed_of(velocities: &[DVec3]) -> f64 {
        velocities.iter().map(|v| v.length()).fold(0.0, f64::max)
    }
}

/// 单节点重构，返回 (速度, 是否回退)
fn reconstruct_node(
    mesh: &DfnMesh,
    cv: &GeometricControlVolumes,
    solution: &FlowSolution,
    config: &ReconstructionConfig,
    node: u32,
) -> (DVec3, bool) {
    let fracture = mesh.nodes[node as usize].fracture as usize;
    let plane = &mesh.fractures[fracture];
    let aperture = solution.aperture[fracture];
    let porosity = solution.porosity;

    // 方程集 (面内法向, 法向速度, 权重)
    let mut equations: Vec<(DVec2, f64, f64)> = Vec::with_capacity(8);

    for face in &cv.faces[node as usize] {
        let Some(q) = solution.flux(node, face.neighbor) else {
            continue;
        };
        let area = solution
            .face_area(node, face.neighbor)
            .unwrap_or(face.length * aperture);
        if !(area > 0.0) {
            continue;
        }
        let n2d = plane.vector_to_local(face.normal);
        equations.push((n2d, q / (area * porosity), area));
    }

    if config.use_boundary_faces {
        for bf in solution.node_boundary_faces(node) {
            if !(bf.area > 0.0) {
                continue;
            }
            let n_in_plane = plane.project_vector(bf.normal);
            let len = n_in_plane.length();
            if len < 1e-12 {
                continue;
            }
            let n2d = plane.vector_to_local(n_in_plane / len);
            equations.push((n2d, bf.flux / (bf.area * porosity), bf.area));
        }
    }

    if equations.is_empty() {
        return (DVec3::ZERO, false);
    }

    // 法方程
    let (mut a11, mut a12, mut a22, mut b1, mut b2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (n, s, w) in &equations {
        a11 += w * n.x * n.x;
        a12 += w * n.x * n.y;
        a22 += w * n.y * n.y;
        b1 += w * n.x * s;
        b2 += w * n.y * s;
    }

    match solve_2x2(a11, a12, a22, b1, b2, config.det_min) {
        Some((vu, vv)) => (plane.vector_to_global(DVec2::new(vu, vv)), false),
        None => {
            let v2d = fallback_average(&equations);
            (plane.vector_to_global(v2d), true)
        }
    }
}

// ============================================================
// 测试
// ============================================================
