// crates/ft_tracking/src/particle.rs

//! 粒子状态与运移记录

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 粒子状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleStatus {
    /// 仍在网络内运移
    Flowing,
    /// 已从出流边界离开
    Exited,
    /// 停滞（速度持续低于阈值或分流失败）
    Stuck,
    /// 达到最大步数
    MaxStepsReached,
}

impl ParticleStatus {
    /// 是否为终止状态
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Flowing)
    }

    /// 状态名称（输出文件用）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flowing => "flowing",
            Self::Exited => "exited",
            Self::Stuck => "stuck",
            Self::MaxStepsReached => "max_steps",
        }
    }
}

/// 轨迹采样点
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// 对流时间 [s]
    pub t: f64,
    /// 位置 x
    pub x: f64,
    /// 位置 y
    pub y: f64,
    /// 位置 z
    pub z: f64,
    /// 速度模 [m/s]
    pub speed: f64,
    /// 所在裂隙
    pub fracture: u32,
}

impl TrajectoryPoint {
    /// 由位置向量构造
    pub fn new(t: f64, pos: DVec3, speed: f64, fracture: u32) -> Self {
        Self {
            t,
            x: pos.x,
            y: pos.y,
            z: pos.z,
            speed,
            fracture,
        }
    }
}

/// 追踪中的粒子
#[derive(Debug, Clone)]
pub struct Particle {
    /// 粒子编号
    pub id: usize,
    /// 当前位置
    pub pos: DVec3,
    /// 当前单元
    pub cell: u32,
    /// 当前裂隙
    pub fracture: u32,
    /// 累计对流时间 [s]
    pub t_adv: f64,
    /// 累计基质滞留时间 [s]
    pub t_ret: f64,
    /// 状态
    pub status: ParticleStatus,
    /// 已执行步数
    pub steps: usize,
    /// 经过的裂隙数（含初始裂隙）
    pub n_fractures: usize,
    /// 连续低速步计数（停滞判断）
    pub stagnant_steps: usize,
    /// 轨迹缓冲
    pub trajectory: Vec<TrajectoryPoint>,
}

impl Particle {
    /// 在给定单元内创建粒子
    pub fn new(id: usize, pos: DVec3, cell: u32, fracture: u32) -> Self {
        Self {
            id,
            pos,
            cell,
            fracture,
            t_adv: 0.0,
            t_ret: 0.0,
            status: ParticleStatus::Flowing,
            steps: 0,
            n_fractures: 1,
            stagnant_steps: 0,
            trajectory: Vec::new(),
        }
    }

    /// 总运移时间（对流 + 滞留）
    #[inline]
    pub fn t_total(&self) -> f64 {
        self.t_adv + self.t_ret
    }

    /// 追加轨迹采样点
    pub fn record(&mut self, speed: f64) {
        self.trajectory
            .push(TrajectoryPoint::new(self.t_adv, self.pos, speed, self.fracture));
    }
}

/// 单个粒子的运移结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TravelTimeRecord {
    /// 粒子编号
    pub id: usize,
    /// 终止状态
    pub status: ParticleStatus,
    /// 对流时间 [s]
    pub t_adv: f64,
    /// 总时间（对流 + 滞留）[s]
    pub t_total: f64,
    /// 终止位置 x
    pub exit_x: f64,
    /// 终止位置 y
    pub exit_y: f64,
    /// 终止位置 z
    pub exit_z: f64,
    /// 经过的裂隙数
    pub n_fractures: usize,
    /// 总步数
    pub n_steps: usize,
}

impl TravelTimeRecord {
    /// 由终止粒子生成记录
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            id: p.id,
            status: p.status,
            t_adv: p.t_adv,
            t_total: p.t_total(),
            exit_x: p.pos.x,
            exit_y: p.pos.y,
            exit_z: p.pos.z,
            n_fractures: p.n_fractures,
            n_steps: p.steps,
        }
    }
}

// ============================================================
// 测试
// ============================================================
