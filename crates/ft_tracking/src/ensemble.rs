// crates/ft_tracking/src/ensemble.rs

//! 并行粒子系综
//!
//! 把布种、步进、分流、控制面监测组装成一次完整的运移模拟。
//! 粒子间相互独立，按粒子并行；每个粒子持有由全局种子与粒子
//! 编号派生的独立随机数流，结果与线程调度无关，同一种子必然
//! 复现同一结果。

use crate::control_plane::{ControlPlane, CrossingRecord};
use crate::particle::{Particle, ParticleStatus, TrajectoryPoint, TravelTimeRecord};
use crate::routing::{IntersectionRouter, RoutingRule};
use crate::seeder::{Seeder, SeedingMode};
use crate::stepper::{Stepper, StepperConfig};
use crate::tdrw::{Tdrw, TdrwConfig};
use crate::zones::BoundaryZones;
use ft_flow::VelocityField;
use ft_foundation::error::{FtError, FtResult};
use ft_mesh::DfnMesh;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// 粒子随机流的编号混合常数（SplitMix64 增量）
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================
// 设置
// ============================================================

/// 一次运移模拟的全部设置
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// 粒子数
    pub n_particles: usize,
    /// 全局随机种子
    pub seed: u64,
    /// 布种方式
    pub seeding: SeedingMode,
    /// 交叉线分流规则
    pub routing: RoutingRule,
    /// 步进器配置
    pub stepper: StepperConfig,
    /// TDRW 配置
    pub tdrw: TdrwConfig,
    /// 控制面
    pub control_planes: Vec<ControlPlane>,
    /// 是否按粒子并行
    pub parallel: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            n_particles: 1000,
            seed: 42,
            seeding: SeedingMode::default(),
            routing: RoutingRule::default(),
            stepper: StepperConfig::default(),
            tdrw: TdrwConfig::default(),
            control_planes: Vec::new(),
            parallel: true,
        }
    }
}

impl TransportSettings {
    /// 参数检查
    pub fn validate(&self) -> FtResult<()> {
        if self.n_particles == 0 {
            return Err(FtError::invalid_input("粒子数不能为 0"));
        }
        self.stepper.validate()
    }
}

// ============================================================
// 结果
// ============================================================

/// 运移模拟的全部输出
#[derive(Debug, Clone)]
pub struct TransportOutcome {
    /// 每个粒子的运移时间记录（按粒子编号排序）
    pub records: Vec<TravelTimeRecord>,
    /// 每个粒子的轨迹（采样间隔为 0 时为空）
    pub trajectories: Vec<Vec<TrajectoryPoint>>,
    /// 控制面穿越记录
    pub crossings: Vec<CrossingRecord>,
}

/// 系综统计摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleSummary {
    /// 粒子总数
    pub n_particles: usize,
    /// 正常离开的粒子数
    pub n_exited: usize,
    /// 停滞粒子数
    pub n_stuck: usize,
    /// 步数耗尽的粒子数
    pub n_max_steps: usize,
    /// 离开粒子的最短对流时间 [s]
    pub t_adv_min: f64,
    /// 离开粒子的平均对流时间 [s]
    pub t_adv_mean: f64,
    /// 离开粒子的最长对流时间 [s]
    pub t_adv_max: f64,
    /// 离开粒子的平均总时间（含滞留）[s]
    pub t_total_mean: f64,
}

impl EnsembleSummary {
    /// 由运移记录统计
    pub fn from_records(records: &[TravelTimeRecord]) -> Self {
        let mut summary = Self {
            n_particles: records.len(),
            n_exited: 0,
            n_stuck: 0,
            n_max_steps: 0,
            t_adv_min: f64::INFINITY,
            t_adv_mean: 0.0,
            t_adv_max: 0.0,
            t_total_mean: 0.0,
        };
        for r in records {
            match r.status {
                ParticleStatus::Exited => {
                    summary.n_exited += 1;
                    summary.t_adv_min = summary.t_adv_min.min(r.t_adv);
                    summary.t_adv_max = summary.t_adv_max.max(r.t_adv);
                    summary.t_adv_mean += r.t_adv;
                    summary.t_total_mean += r.t_total;
                }
                ParticleStatus::Stuck => summary.n_stuck += 1,
                ParticleStatus::MaxStepsReached => summary.n_max_steps += 1,
                ParticleStatus::Flowing => {}
            }
        }
        if summary.n_exited > 0 {
            summary.t_adv_mean /= summary.n_exited as f64;
            summary.t_total_mean /= summary.n_exited as f64;
        } else {
            summary.t_adv_min = 0.0;
        }
        summary
    }

    /// 离开比例
    pub fn recovery(&self) -> f64 {
        if self.n_particles == 0 {
            0.0
        } else {
            self.n_exited as f64 / self.n_particles as f64
        }
    }
}

// ============================================================
// 系综
// ============================================================

/// 粒子系综运行器
pub struct Ensemble<'a> {
    mesh: &'a DfnMesh,
    field: &'a VelocityField,
    zones: &'a BoundaryZones,
    apertures: &'a [f64],
    settings: TransportSettings,
}

impl<'a> Ensemble<'a> {
    /// 创建系综
    pub fn new(
        mesh: &'a DfnMesh,
        field: &'a VelocityField,
        zones: &'a BoundaryZones,
        apertures: &'a [f64],
        settings: TransportSettings,
    ) -> FtResult<Self> {
        settings.validate()?;
        Ok(Self {
            mesh,
            field,
            zones,
            apertures,
            settings,
        })
    }

    /// 设置引用
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// 运行全部粒子
    pub fn run(&self) -> FtResult<TransportOutcome> {
        let seeder = Seeder::new(
            self.mesh,
            self.field,
            self.zones,
            self.apertures,
            self.settings.seeding,
        )?;

        let mut seed_rng = ChaCha8Rng::seed_from_u64(self.settings.seed);
        let particles = seeder.seed(self.mesh, self.settings.n_particles, &mut seed_rng)?;

        let tdrw = if self.settings.tdrw.enabled {
            Some(Tdrw::new(self.settings.tdrw)?)
        } else {
            None
        };
        let stepper = Stepper::new(
            self.mesh,
            self.field,
            self.zones,
            self.apertures,
            IntersectionRouter::new(self.settings.routing),
            tdrw,
            self.settings.stepper.clone(),
        )?;

        info!(
            n_particles = self.settings.n_particles,
            seeding = self.settings.seeding.name(),
            routing = self.settings.routing.name(),
            tdrw = self.settings.tdrw.enabled,
            parallel = self.settings.parallel,
            "开始粒子运移模拟"
        );

        let track = |p: Particle| self.track_one(&stepper, p);
        let results: Vec<(TravelTimeRecord, Vec<TrajectoryPoint>, Vec<CrossingRecord>)> =
            if self.settings.parallel {
                particles
                    .into_par_iter()
                    .map(track)
                    .collect::<FtResult<Vec<_>>>()?
            } else {
                particles
                    .into_iter()
                    .map(track)
                    .collect::<FtResult<Vec<_>>>()?
            };

        let mut records = Vec::with_capacity(results.len());
        let mut trajectories = Vec::with_capacity(results.len());
        let mut crossings = Vec::new();
        for (record, trajectory, mut plane_hits) in results {
            records.push(record);
            trajectories.push(trajectory);
            crossings.append(&mut plane_hits);
        }

        let summary = EnsembleSummary::from_records(&records);
        info!(
            n_exited = summary.n_exited,
            n_stuck = summary.n_stuck,
            n_max_steps = summary.n_max_steps,
            recovery = summary.recovery(),
            "粒子运移模拟结束"
        );

        Ok(TransportOutcome {
            records,
            trajectories,
            crossings,
        })
    }

    /// 追踪单个粒子直至终止
    fn track_one(
        &self,
        stepper: &Stepper<'_>,
        mut p: Particle,
    ) -> FtResult<(TravelTimeRecord, Vec<TrajectoryPoint>, Vec<CrossingRecord>)> {
        // 每粒子独立随机流：与线程调度无关
        let mut rng =
            ChaCha8Rng::seed_from_u64(self.settings.seed ^ (p.id as u64).wrapping_mul(SEED_MIX));

        let planes = &self.settings.control_planes;
        let mut crossed = vec![false; planes.len()];
        let mut crossings = Vec::new();

        let stride = self.settings.stepper.record_stride;
        if stride > 0 {
            p.record(0.0);
        }

        while !p.status.is_terminal() {
            let prev_pos = p.pos;
            let prev_t_adv = p.t_adv;
            let prev_t_total = p.t_total();
            stepper.advance(&mut p, &mut rng)?;

            for (k, plane) in planes.iter().enumerate() {
                if crossed[k] {
                    continue;
                }
                if let Some((point, s)) = plane.crossing(prev_pos, p.pos) {
                    crossed[k] = true;
                    let t_adv = prev_t_adv + s * (p.t_adv - prev_t_adv);
                    let t_total = prev_t_total + s * (p.t_total() - prev_t_total);
                    crossings.push(CrossingRecord::new(p.id, k, t_adv, t_total, point));
                }
            }
        }

        if stride > 0 {
            p.record(0.0);
        }

        let record = TravelTimeRecord::from_particle(&p);
        let trajectory = std::mem::take(&mut p.trajectory);
        Ok((record, trajectory, crossings))
    }
}

// ============================================================
// 测试
// ============================================================
