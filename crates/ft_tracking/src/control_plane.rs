// crates/ft_tracking/src/control_plane.rs

//! 控制面穿越记录
//!
//! 控制面是垂直于某坐标轴的平面。粒子首次穿过控制面的时间
//! （对流时间与含滞留的总时间）用于沿程的到达时间分布统计。
//! 穿越时刻在步进前后两位置之间线性插值。

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// x 轴
    X,
    /// y 轴
    Y,
    /// z 轴
    Z,
}

impl Axis {
    /// 点在该轴上的坐标分量
    #[inline]
    pub fn coord(&self, p: DVec3) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
            Self::Z => p.z,
        }
    }

    /// 轴名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// 垂直于坐标轴的控制面
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPlane {
    /// 法向所沿的轴
    pub axis: Axis,
    /// 平面在该轴上的位置
    pub position: f64,
}

impl ControlPlane {
    /// 创建控制面
    pub fn new(axis: Axis, position: f64) -> Self {
        Self { axis, position }
    }

    /// 点到平面的有向距离（沿轴）
    #[inline]
    pub fn signed_offset(&self, p: DVec3) -> f64 {
        self.axis.coord(p) - self.position
    }

    /// 线段 (x0 → x1) 与平面的交点
    ///
    /// 返回交点位置与段内参数 s ∈ [0, 1]。起点恰在平面上而终点
    /// 离开平面也算穿越（s = 0）。无穿越返回 `None`。
    pub fn crossing(&self, x0: DVec3, x1: DVec3) -> Option<(DVec3, f64)> {
        let s0 = self.signed_offset(x0);
        let s1 = self.signed_offset(x1);
        let straddles = s0 * s1 < 0.0 || (s0 == 0.0 && s1 != 0.0);
        if !straddles {
            return None;
        }
        let s = s0 / (s0 - s1);
        Some((x0 + (x1 - x0) * s, s))
    }
}

/// 粒子首次穿越某控制面的记录
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossingRecord {
    /// 粒子编号
    pub particle: usize,
    /// 控制面编号（配置中的顺序）
    pub plane: usize,
    /// 穿越时的对流时间 [s]
    pub t_adv: f64,
    /// 穿越时的总时间（对流 + 滞留）[s]
    pub t_total: f64,
    /// 穿越点 x
    pub x: f64,
    /// 穿越点 y
    pub y: f64,
    /// 穿越点 z
    pub z: f64,
}

impl CrossingRecord {
    /// 由穿越点与插值时间构造
    pub fn new(particle: usize, plane: usize, t_adv: f64, t_total: f64, point: DVec3) -> Self {
        Self {
            particle,
            plane,
            t_adv,
            t_total,
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

// ============================================================
// 测试
// ============================================================
