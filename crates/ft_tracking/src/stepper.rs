// crates/ft_tracking/src/stepper.rs

//! 预估-校正路径线步进
//!
//! 粒子沿节点速度场的路径线前进。单步流程：
//!
//! 1. 在当前位置用重心坐标插值速度 v1
//! 2. 自适应步长 dt = ε · l_cell / |v1|（l_cell 为单元特征尺寸，
//!    保证单步位移只有单元尺寸的一小部分）
//! 3. 预估点 x + v1·dt 处再取速度 v2，校正位移为 ½(v1+v2)·dt
//! 4. 沿校正位移逐边穿行三角形：内部边直接进入邻居；交叉线边
//!    触发分流并截断本步（时间按已走弧长折算）；出流边界边吸收
//!    粒子；其余边界边做面内反射
//!
//! 速度持续低于阈值或分流失败的粒子标记为停滞 (Stuck)。

use crate::particle::{Particle, ParticleStatus};
use crate::routing::IntersectionRouter;
use crate::tdrw::Tdrw;
use crate::zones::BoundaryZones;
use ft_flow::VelocityField;
use ft_foundation::error::{FtError, FtResult};
use ft_foundation::validation::check_positive;
use ft_mesh::{CellLocator, DfnMesh, LocateOutcome};
use glam::DVec3;
use rand::Rng;
use tracing::debug;

/// 单步最多处理的边穿越数（反射死循环保护）
const MAX_CROSSINGS: usize = 64;

/// 分流后向目标单元重心方向的推入比例
const ROUTE_NUDGE: f64 = 1e-6;

// ============================================================
// 配置
// ============================================================

/// 步进器配置
#[derive(Debug, Clone)]
pub struct StepperConfig {
    /// 步长因子 ε（单步位移 ≈ ε · 单元特征尺寸）
    pub eps_step: f64,
    /// 单粒子最大步数
    pub max_steps: usize,
    /// 停滞速度阈值 [m/s]
    pub v_stagnant: f64,
    /// 连续低速多少步后判停滞
    pub stuck_patience: usize,
    /// 轨迹采样间隔（步数，0 为不采样）
    pub record_stride: usize,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            eps_step: 0.1,
            max_steps: 200_000,
            v_stagnant: 1e-14,
            stuck_patience: 100,
            record_stride: 0,
        }
    }
}

impl StepperConfig {
    /// 设置步长因子
    pub fn with_eps_step(mut self, eps: f64) -> Self {
        self.eps_step = eps;
        self
    }

    /// 设置最大步数
    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// 设置轨迹采样间隔
    pub fn with_record_stride(mut self, stride: usize) -> Self {
        self.record_stride = stride;
        self
    }

    /// 参数检查
    pub fn validate(&self) -> FtResult<()> {
        check_positive("eps_step", self.eps_step)?;
        FtError::check_range("eps_step", self.eps_step, f64::MIN_POSITIVE, 1.0)?;
        if self.max_steps == 0 {
            return Err(FtError::invalid_input("max_steps 不能为 0"));
        }
        if self.stuck_patience == 0 {
            return Err(FtError::invalid_input("stuck_patience 不能为 0"));
        }
        Ok(())
    }
}

// ============================================================
// 步进事件
// ============================================================

/// 单步的结果事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// 在当前裂隙内正常前进
    Moved,
    /// 碰到不透水壁面并反射后前进
    Reflected,
    /// 经交叉线分流切换了单元（可能换裂隙）
    Routed {
        /// 分流前所在裂隙
        from_fracture: u32,
        /// 分流后所在裂隙
        to_fracture: u32,
    },
    /// 从出流边界离开网络
    Exited,
    /// 粒子处于终止状态（停滞 / 步数耗尽）
    Terminated(ParticleStatus),
}

// ============================================================
// 步进器
// ============================================================

/// 路径线步进器
///
/// 持有网格、速度场与边界区的引用，本身无粒子状态，可在
/// 线程间共享（并行系综中每线程独立调用）。
pub struct Stepper<'a> {
    mesh: &'a DfnMesh,
    field: &'a VelocityField,
    zones: &'a BoundaryZones,
    apertures: &'a [f64],
    router: IntersectionRouter,
    tdrw: Option<Tdrw>,
    locator: CellLocator,
    config: StepperConfig,
}

impl<'a> Stepper<'a> {
    /// 创建步进器并检查输入一致性
    pub fn new(
        mesh: &'a DfnMesh,
        field: &'a VelocityField,
        zones: &'a BoundaryZones,
        apertures: &'a [f64],
        router: IntersectionRouter,
        tdrw: Option<Tdrw>,
        config: StepperConfig,
    ) -> FtResult<Self> {
        config.validate()?;
        FtError::check_size("velocity_field", mesh.n_nodes(), field.node_velocity.len())?;
        if apertures.len() < mesh.n_fractures() {
            return Err(FtError::size_mismatch(
                "aperture",
                mesh.n_fractures(),
                apertures.len(),
            ));
        }
        Ok(Self {
            mesh,
            field,
            zones,
            apertures,
            router,
            tdrw,
            locator: CellLocator::new(),
            config,
        })
    }

    /// 配置引用
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// 推进一个粒子一步
    pub fn advance<R: Rng + ?Sized>(
        &self,
        p: &mut Particle,
        rng: &mut R,
    ) -> FtResult<StepEvent> {
        if p.status.is_terminal() {
            return Ok(StepEvent::Terminated(p.status));
        }
        if p.steps >= self.config.max_steps {
            p.status = ParticleStatus::MaxStepsReached;
            return Ok(StepEvent::Terminated(p.status));
        }
        p.steps += 1;

        let bc = self.locator.barycentric(self.mesh, p.cell, p.pos)?;
        let v1 = bc.interpolate(self.field.cell_velocities(self.mesh, p.cell));
        let speed = v1.length();
        if speed < self.config.v_stagnant {
            return Ok(self.mark_stagnant(p));
        }

        let dt = self.config.eps_step * self.mesh.cell_char_length(p.cell) / speed;

        // 预估-校正：预估点速度失败时退化为显式欧拉
        let v2 = self
            .velocity_at(p.cell, p.pos + v1 * dt)
            .unwrap_or(v1);
        let disp = (v1 + v2) * (0.5 * dt);
        let total_len = disp.length();
        if total_len < 1e-300 {
            return Ok(self.mark_stagnant(p));
        }

        // 沿位移段逐边穿行
        let mut x0 = p.pos;
        let mut target = p.pos + disp;
        let mut cell = p.cell;
        let mut covered = 0.0;
        let mut reflected = false;

        for _ in 0..MAX_CROSSINGS {
            let bc1 = self.locator.barycentric(self.mesh, cell, target)?;
            if bc1.is_inside(self.locator.eps) {
                covered += (target - x0).length();
                x0 = target;
                break;
            }

            // 段与单元边的最早交点
            let bc0 = self.locator.barycentric(self.mesh, cell, x0)?;
            let mut s_min = f64::INFINITY;
            let mut e_cross = usize::MAX;
            for i in 0..3 {
                let (w0, w1) = (bc0.weights[i], bc1.weights[i]);
                if w1 < -self.locator.eps && w0 > w1 {
                    let s = (w0 / (w0 - w1)).clamp(0.0, 1.0);
                    if s < s_min {
                        s_min = s;
                        e_cross = i;
                    }
                }
            }
            if e_cross == usize::MAX {
                // 权重数值不一致，就地接受目标点
                covered += (target - x0).length();
                x0 = target;
                break;
            }

            let xc = x0 + (target - x0) * s_min;
            covered += (xc - x0).length();

            if self.mesh.is_intersection_edge(cell, e_cross) {
                return self.route_at(p, cell, e_cross, xc, speed, dt, covered, total_len, rng);
            }

            match self.mesh.neighbor(cell, e_cross) {
                Some(next) => {
                    cell = next;
                    x0 = xc;
                }
                None => {
                    let (ea, eb) = self.mesh.cells[cell as usize].edge(e_cross);
                    if self.zones.is_outflow_edge(ea, eb) {
                        p.pos = xc;
                        p.cell = cell;
                        p.status = ParticleStatus::Exited;
                        self.settle(p, speed, dt * (covered / total_len).min(1.0), rng);
                        return Ok(StepEvent::Exited);
                    }
                    // 壁面：剩余位移做面内反射
                    let e_dir = (self.mesh.node_pos(eb) - self.mesh.node_pos(ea)).normalize();
                    let r = target - xc;
                    target = xc + e_dir * (2.0 * r.dot(e_dir)) - r;
                    x0 = xc;
                    reflected = true;
                }
            }
        }

        // 正常完成（或穿越数达到上限时就地截断）
        p.pos = x0;
        p.cell = cell;
        self.settle(p, speed, dt * (covered / total_len).min(1.0), rng);
        Ok(if reflected {
            StepEvent::Reflected
        } else {
            StepEvent::Moved
        })
    }

    /// 交叉线分流并结束本步
    #[allow(clippy::too_many_arguments)]
    fn route_at<R: Rng + ?Sized>(
        &self,
        p: &mut Particle,
        cell: u32,
        edge: usize,
        xc: DVec3,
        speed: f64,
        dt: f64,
        covered: f64,
        total_len: f64,
        rng: &mut R,
    ) -> FtResult<StepEvent> {
        let dt_used = dt * (covered / total_len).min(1.0);
        match self
            .router
            .route(self.mesh, self.field, self.apertures, p, cell, edge, xc, rng)
        {
            Ok(choice) => {
                let from = p.fracture;
                if choice.fracture != from {
                    p.n_fractures += 1;
                }
                let centroid = self.mesh.triangle(choice.cell).centroid();
                p.pos = xc + (centroid - xc) * ROUTE_NUDGE;
                p.cell = choice.cell;
                p.fracture = choice.fracture;
                self.settle(p, speed, dt_used, rng);
                Ok(StepEvent::Routed {
                    from_fracture: from,
                    to_fracture: choice.fracture,
                })
            }
            Err(err) => {
                debug!(particle = p.id, %err, "分流失败，粒子停滞");
                p.pos = xc;
                p.cell = cell;
                p.status = ParticleStatus::Stuck;
                self.settle(p, speed, dt_used, rng);
                Ok(StepEvent::Terminated(p.status))
            }
        }
    }

    /// 低速步计数，超过耐心阈值判停滞
    fn mark_stagnant(&self, p: &mut Particle) -> StepEvent {
        p.stagnant_steps += 1;
        if p.stagnant_steps >= self.config.stuck_patience {
            p.status = ParticleStatus::Stuck;
            StepEvent::Terminated(p.status)
        } else {
            StepEvent::Moved
        }
    }

    /// 结算一步：累加对流时间、采样基质滞留、按间隔采轨迹点
    fn settle<R: Rng + ?Sized>(&self, p: &mut Particle, speed: f64, dt_used: f64, rng: &mut R) {
        p.t_adv += dt_used;
        p.stagnant_steps = 0;
        if let Some(tdrw) = &self.tdrw {
            p.t_ret += tdrw.sample_retention(dt_used, self.apertures[p.fracture as usize], rng);
        }
        if self.config.record_stride > 0 && p.steps % self.config.record_stride == 0 {
            p.record(speed);
        }
    }

    /// 任意点的速度（从提示单元行走定位后插值）
    fn velocity_at(&self, cell_hint: u32, point: DVec3) -> Option<DVec3> {
        match self.locator.walk(self.mesh, cell_hint, point).ok()? {
            LocateOutcome::Found(cell) => {
                let bc = self.locator.barycentric(self.mesh, cell, point).ok()?;
                Some(bc.interpolate(self.field.cell_velocities(self.mesh, cell)))
            }
            _ => None,
        }
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RoutingRule;
    use crate::tdrw::TdrwConfig;
    use ft_mesh::samples;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 匀速场
    fn uniform_field(mesh: &DfnMesh, v: DVec3) -> VelocityField {
        VelocityField {
            node_velocity: vec![v; mesh.n_nodes()],
            n_fallback: 0,
        }
    }

    fn strip_zones(mesh: &DfnMesh, nx: usize) -> BoundaryZones {
        let right = 2 * nx as u32;
        BoundaryZones::from_node_lists(mesh, [0u32, 1], [right, right + 1]).unwrap()
    }

    fn run_to_end(stepper: &Stepper, p: &mut Particle, rng: &mut ChaCha8Rng) {
        while !p.status.is_terminal() {
            stepper.advance(p, rng).unwrap();
        }
    }

    #[test]
    fn test_uniform_travel_time() {
        let mesh = samples::strip(4).unwrap();
        let field = uniform_field(&mesh, DVec3::new(1.0, 0.0, 0.0));
        let zones = strip_zones(&mesh, 4);
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-3],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            None,
            StepperConfig::default(),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.5, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        run_to_end(&stepper, &mut p, &mut rng);

        assert_eq!(p.status, ParticleStatus::Exited);
        // 匀速 1 m/s 走 3.5 m
        assert!(
            (p.t_adv - 3.5).abs() < 1e-6,
            "匀速运移时间应为 3.5, 实际 {}",
            p.t_adv
        );
        assert!((p.pos.x - 4.0).abs() < 1e-9);
        assert_eq!(p.t_ret, 0.0);
    }

    #[test]
    fn test_wall_reflection_keeps_particle_inside() {
        let mesh = samples::strip(4).unwrap();
        // 斜向速度：撞上壁反射后继续向右
        let field = uniform_field(&mesh, DVec3::new(1.0, 0.5, 0.0));
        let zones = strip_zones(&mesh, 4);
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-3],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            None,
            StepperConfig::default(),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.5, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        while !p.status.is_terminal() {
            stepper.advance(&mut p, &mut rng).unwrap();
            assert!(
                p.pos.y > -1e-6 && p.pos.y < 1.0 + 1e-6,
                "反射后粒子应保持在条带内: y = {}",
                p.pos.y
            );
        }
        assert_eq!(p.status, ParticleStatus::Exited);
        assert!((p.pos.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_stagnant_particle_stuck() {
        let mesh = samples::strip(2).unwrap();
        let field = uniform_field(&mesh, DVec3::ZERO);
        let zones = strip_zones(&mesh, 2);
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-3],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            None,
            StepperConfig::default(),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.5, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        run_to_end(&stepper, &mut p, &mut rng);

        assert_eq!(p.status, ParticleStatus::Stuck);
        assert_eq!(p.t_adv, 0.0);
    }

    #[test]
    fn test_max_steps_reached() {
        let mesh = samples::strip(4).unwrap();
        let field = uniform_field(&mesh, DVec3::new(1.0, 0.0, 0.0));
        let zones = strip_zones(&mesh, 4);
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-3],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            None,
            StepperConfig::default().with_max_steps(3),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.5, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        run_to_end(&stepper, &mut p, &mut rng);
        assert_eq!(p.status, ParticleStatus::MaxStepsReached);
    }

    #[test]
    fn test_routes_onto_second_fracture() {
        let mesh = samples::cross().unwrap();
        // 裂隙 0 向 +x，交线节点速度为零（全部通量转入裂隙 1），
        // 裂隙 1 向 -z
        let node_velocity = mesh
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                if i == 1 || i == 4 {
                    DVec3::ZERO
                } else if n.fracture == 0 {
                    DVec3::new(1.0, 0.0, 0.0)
                } else {
                    DVec3::new(0.0, 0.0, -1.0)
                }
            })
            .collect();
        let field = VelocityField {
            node_velocity,
            n_fallback: 0,
        };
        // 入流：裂隙 0 左缘；出流：裂隙 1 下缘
        let zones = BoundaryZones::from_node_lists(&mesh, [0u32, 3], [8u32, 9]).unwrap();
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-3, 1e-3],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            None,
            StepperConfig::default(),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.3, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut routed = false;
        while !p.status.is_terminal() {
            if let StepEvent::Routed { to_fracture, .. } =
                stepper.advance(&mut p, &mut rng).unwrap()
            {
                routed = true;
                assert_eq!(to_fracture, 1);
            }
        }

        assert!(routed, "粒子应经过交叉线分流");
        assert_eq!(p.status, ParticleStatus::Exited);
        assert_eq!(p.fracture, 1);
        assert_eq!(p.n_fractures, 2);
        assert!((p.pos.z + 1.0).abs() < 1e-9, "应从裂隙 1 下缘离开");
    }

    #[test]
    fn test_tdrw_adds_retention() {
        let mesh = samples::strip(4).unwrap();
        let field = uniform_field(&mesh, DVec3::new(1.0, 0.0, 0.0));
        let zones = strip_zones(&mesh, 4);
        let tdrw = Tdrw::new(TdrwConfig {
            enabled: true,
            matrix_porosity: 0.05,
            matrix_diffusivity: 1e-9,
        })
        .unwrap();
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-4],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            Some(tdrw),
            StepperConfig::default(),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.5, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        run_to_end(&stepper, &mut p, &mut rng);

        assert_eq!(p.status, ParticleStatus::Exited);
        assert!(p.t_ret > 0.0, "启用 TDRW 后应累计滞留时间");
        assert!(p.t_total() > p.t_adv);
    }

    #[test]
    fn test_trajectory_stride() {
        let mesh = samples::strip(4).unwrap();
        let field = uniform_field(&mesh, DVec3::new(1.0, 0.0, 0.0));
        let zones = strip_zones(&mesh, 4);
        let stepper = Stepper::new(
            &mesh,
            &field,
            &zones,
            &[1e-3],
            IntersectionRouter::new(RoutingRule::CompleteMixing),
            None,
            StepperConfig::default().with_record_stride(2),
        )
        .unwrap();

        let mut p = Particle::new(0, DVec3::new(0.5, 0.2, 0.0), 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        run_to_end(&stepper, &mut p, &mut rng);

        assert!(!p.trajectory.is_empty());
        assert!(p.trajectory.len() <= p.steps / 2 + 1);
        // 轨迹时间单调不减
        for w in p.trajectory.windows(2) {
            assert!(w[1].t >= w[0].t);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = StepperConfig::default().with_eps_step(0.0);
        assert!(cfg.validate().is_err());
        let cfg = StepperConfig::default().with_eps_step(2.0);
        assert!(cfg.validate().is_err());
        let cfg = StepperConfig::default().with_max_steps(0);
        assert!(cfg.validate().is_err());
    }
}
