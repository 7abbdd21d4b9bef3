// crates/ft_tracking/src/seeder.rs

//! 入流边界布种
//!
//! 粒子从入流边界边上释放。两种布种方式：
//!
//! - **通量加权** (FluxWeighted): 选边概率正比于边上的入流通量
//!   （入流法向速度 × 开度 × 边长），模拟随水流进入的示踪剂
//! - **均匀驻留** (Resident): 选边概率正比于边长，模拟初始均匀
//!   分布在入流断面上的示踪剂
//!
//! 边内的落点沿边均匀分布，并向单元内部微移以保证后续重心
//! 坐标判断稳定。

use crate::particle::Particle;
use crate::zones::BoundaryZones;
use ft_flow::VelocityField;
use ft_foundation::error::{FtError, FtResult};
use ft_mesh::DfnMesh;
use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 落点向单元内部的微移比例
const SEED_NUDGE: f64 = 1e-6;

/// 布种方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMode {
    /// 通量加权
    #[default]
    FluxWeighted,
    /// 沿入流断面均匀
    Resident,
}

impl SeedingMode {
    /// 方式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::FluxWeighted => "flux-weighted",
            Self::Resident => "resident",
        }
    }
}

/// 一条可布种的入流边界边
#[derive(Debug, Clone, Copy)]
struct SeedEdge {
    cell: u32,
    fracture: u32,
    /// 边端点
    a: u32,
    b: u32,
    /// 选边权重
    weight: f64,
}

/// 入流布种器
pub struct Seeder {
    edges: Vec<SeedEdge>,
    mode: SeedingMode,
    total_weight: f64,
}

impl Seeder {
    /// 枚举入流边界边并计算布种权重
    pub fn new(
        mesh: &DfnMesh,
        field: &VelocityField,
        zones: &BoundaryZones,
        apertures: &[f64],
        mode: SeedingMode,
    ) -> FtResult<Self> {
        if apertures.len() < mesh.n_fractures() {
            return Err(FtError::size_mismatch(
                "aperture",
                mesh.n_fractures(),
                apertures.len(),
            ));
        }

        let mut edges = Vec::new();
        for (ci, cell) in mesh.cells.iter().enumerate() {
            for e in 0..3 {
                if mesh.neighbor(ci as u32, e).is_some() {
                    continue;
                }
                let (a, b) = cell.edge(e);
                if !zones.is_inflow_edge(a, b) {
                    continue;
                }

                let pa = mesh.node_pos(a);
                let pb = mesh.node_pos(b);
                let length = (pb - pa).length();
                if !(length > 0.0) {
                    continue;
                }

                let weight = match mode {
                    SeedingMode::Resident => length,
                    SeedingMode::FluxWeighted => {
                        // 边中点入流法向速度（指向对顶点）
                        let opposite = mesh.node_pos(cell.nodes[e]);
                        let e_dir = (pb - pa) / length;
                        let d = opposite - pa;
                        let n_in = d - e_dir * d.dot(e_dir);
                        let n_len = n_in.length();
                        if n_len < 1e-14 {
                            continue;
                        }
                        let v_mid =
                            (field.node_velocity(a) + field.node_velocity(b)) * 0.5;
                        let q = v_mid.dot(n_in / n_len);
                        q.max(0.0) * apertures[cell.fracture as usize] * length
                    }
                };

                edges.push(SeedEdge {
                    cell: ci as u32,
                    fracture: cell.fracture,
                    a,
                    b,
                    weight,
                });
            }
        }

        if edges.is_empty() {
            return Err(FtError::invalid_input("入流区内没有边界边，无法布种"));
        }

        let mut total_weight: f64 = edges.iter().map(|e| e.weight).sum();
        if !(total_weight > 0.0) {
            // 入流断面无净入流通量：退化为按边长均匀
            warn!("入流边通量全为零，布种退化为沿断面均匀");
            for edge in edges.iter_mut() {
                let pa = mesh.node_pos(edge.a);
                let pb = mesh.node_pos(edge.b);
                edge.weight = (pb - pa).length();
            }
            total_weight = edges.iter().map(|e| e.weight).sum();
        }

        debug!(
            n_edges = edges.len(),
            mode = mode.name(),
            "入流布种边枚举完成"
        );

        Ok(Self {
            edges,
            mode,
            total_weight,
        })
    }

    /// 布种方式
    pub fn mode(&self) -> SeedingMode {
        self.mode
    }

    /// 可布种的入流边数
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// 释放 n 个粒子（编号 0..n）
    pub fn seed<R: Rng + ?Sized>(
        &self,
        mesh: &DfnMesh,
        n: usize,
        rng: &mut R,
    ) -> FtResult<Vec<Particle>> {
        if n == 0 {
            return Err(FtError::invalid_input("粒子数不能为 0"));
        }
        let mut particles = Vec::with_capacity(n);
        for id in 0..n {
            let edge = self.pick_edge(rng);
            let pa = mesh.node_pos(edge.a);
            let pb = mesh.node_pos(edge.b);
            let u = rng.random::<f64>();
            let on_edge = pa + (pb - pa) * u;
            // 向单元内部微移
            let centroid = mesh.triangle(edge.cell).centroid();
            let pos = on_edge + (centroid - on_edge) * SEED_NUDGE;
            particles.push(Particle::new(id, pos, edge.cell, edge.fracture));
        }
        Ok(particles)
    }

    /// 按权重抽取一条入流边
    fn pick_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> &SeedEdge {
        let mut u = rng.random::<f64>() * self.total_weight;
        for edge in &self.edges {
            if u < edge.weight {
                return edge;
            }
            u -= edge.weight;
        }
        // 浮点残余
        &self.edges[self.edges.len() - 1]
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ft_mesh::samples;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn strip_setup(v: DVec3) -> (DfnMesh, VelocityField, BoundaryZones) {
        let mesh = samples::strip(4).unwrap();
        let field = VelocityField {
            node_velocity: vec![v; mesh.n_nodes()],
            n_fallback: 0,
        };
        let zones = BoundaryZones::from_node_lists(&mesh, [0u32, 1], [8u32, 9]).unwrap();
        (mesh, field, zones)
    }

    #[test]
    fn test_seeds_on_inflow_edge() {
        let (mesh, field, zones) = strip_setup(DVec3::new(1.0, 0.0, 0.0));
        let seeder =
            Seeder::new(&mesh, &field, &zones, &[1e-3], SeedingMode::FluxWeighted).unwrap();
        assert_eq!(seeder.n_edges(), 1);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let particles = seeder.seed(&mesh, 20, &mut rng).unwrap();
        assert_eq!(particles.len(), 20);
        for (i, p) in particles.iter().enumerate() {
            assert_eq!(p.id, i);
            assert!(p.pos.x.abs() < 1e-4, "应落在 x = 0 入流边上: {}", p.pos.x);
            assert!(p.pos.y > -1e-6 && p.pos.y < 1.0 + 1e-6);
            // 落点必须在所标注的单元内
            let loc = ft_mesh::CellLocator::new();
            let bc = loc.barycentric(&mesh, p.cell, p.pos).unwrap();
            assert!(bc.is_inside(loc.eps), "粒子 {i} 落点不在其单元内");
        }
    }

    #[test]
    fn test_resident_mode() {
        let (mesh, field, zones) = strip_setup(DVec3::new(1.0, 0.0, 0.0));
        let seeder = Seeder::new(&mesh, &field, &zones, &[1e-3], SeedingMode::Resident).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let particles = seeder.seed(&mesh, 5, &mut rng).unwrap();
        assert_eq!(particles.len(), 5);
    }

    #[test]
    fn test_zero_flux_falls_back() {
        let (mesh, field, zones) = strip_setup(DVec3::ZERO);
        // 无入流通量：通量加权退化为均匀，仍能布种
        let seeder =
            Seeder::new(&mesh, &field, &zones, &[1e-3], SeedingMode::FluxWeighted).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(seeder.seed(&mesh, 3, &mut rng).unwrap().len(), 3);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let (mesh, field, zones) = strip_setup(DVec3::new(1.0, 0.0, 0.0));
        let seeder =
            Seeder::new(&mesh, &field, &zones, &[1e-3], SeedingMode::FluxWeighted).unwrap();
        let mut r1 = ChaCha8Rng::seed_from_u64(77);
        let mut r2 = ChaCha8Rng::seed_from_u64(77);
        let a = seeder.seed(&mesh, 10, &mut r1).unwrap();
        let b = seeder.seed(&mesh, 10, &mut r2).unwrap();
        for (p, q) in a.iter().zip(&b) {
            assert_eq!(p.pos, q.pos);
            assert_eq!(p.cell, q.cell);
        }
    }

    #[test]
    fn test_zero_particles_rejected() {
        let (mesh, field, zones) = strip_setup(DVec3::new(1.0, 0.0, 0.0));
        let seeder =
            Seeder::new(&mesh, &field, &zones, &[1e-3], SeedingMode::FluxWeighted).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(seeder.seed(&mesh, 0, &mut rng).is_err());
    }
}
