// crates/ft_geo/src/barycentric.rs

//! 三角形重心坐标
//!
//! 粒子速度插值的核心：粒子位置相对当前三角形单元的重心坐标
//! `(w0, w1, w2)` 用于对三个顶点速度做线性插值。
//!
//! 三角形位于裂隙平面内，所有计算先投影到平面局部 2D 坐标，
//! 再用有向面积求权重：
//!
//! w_i = A_i / A,  A = A_0 + A_1 + A_2
//!
//! 退化三角形（面积接近零）在网格构建阶段被拒绝。

use crate::plane::FracturePlane;
use crate::EPS_GEO;
use ft_foundation::error::{FtError, FtResult};
use glam::{DVec2, DVec3};

// ============================================================
// 三角形辅助
// ============================================================

/// 3D 三角形辅助类型
#[derive(Debug, Clone, Copy)]
pub struct Triangle3 {
    /// 三个顶点
    pub vertices: [DVec3; 3],
}

impl Triangle3 {
    /// 创建三角形
    #[inline]
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// 面积
    #[inline]
    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        0.5 * (b - a).cross(c - a).length()
    }

    /// 重心（几何中心）
    #[inline]
    pub fn centroid(&self) -> DVec3 {
        let [a, b, c] = self.vertices;
        (a + b + c) / 3.0
    }

    /// 非归一化法向
    #[inline]
    pub fn normal(&self) -> DVec3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(c - a)
    }

    /// 特征尺寸：面积的平方根，用于自适应步长
    #[inline]
    pub fn char_length(&self) -> f64 {
        self.area().sqrt()
    }
}

// ============================================================
// 重心坐标
// ============================================================

/// 2D 有向面积（两倍）
#[inline]
fn cross2(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 重心坐标
#[derive(Debug, Clone, Copy)]
pub struct Barycentric {
    /// 三个权重，和为 1
    pub weights: [f64; 3],
}

impl Barycentric {
    /// 在裂隙平面内计算点相对三角形的重心坐标
    ///
    /// # 错误
    ///
    /// 三角形投影后退化（面积低于 `EPS_GEO` 量级）时返回 `InvalidInput`。
    pub fn in_plane(
        plane: &FracturePlane,
        triangle: &Triangle3,
        point: DVec3,
    ) -> FtResult<Self> {
        let a = plane.to_local(triangle.vertices[0]);
        let b = plane.to_local(triangle.vertices[1]);
        let c = plane.to_local(triangle.vertices[2]);
        let p = plane.to_local(point);

        Self::from_local(a, b, c, p)
    }

    /// 由局部 2D 坐标计算重心坐标
    pub fn from_local(a: DVec2, b: DVec2, c: DVec2, p: DVec2) -> FtResult<Self> {
        let total = cross2(b - a, c - a);
        if total.abs() < EPS_GEO * EPS_GEO {
            return Err(FtError::invalid_input(format!(
                "退化三角形: 两倍面积 = {total}"
            )));
        }

        let inv = 1.0 / total;
        let w0 = cross2(b - p, c - p) * inv;
        let w1 = cross2(c - p, a - p) * inv;
        let w2 = 1.0 - w0 - w1;

        Ok(Self {
            weights: [w0, w1, w2],
        })
    }

    /// 点是否在三角形内（闭包含，带容差：边与顶点计入内部）
    #[inline]
    pub fn is_inside(&self, eps: f64) -> bool {
        self.weights.iter().all(|w| *w >= -eps)
    }

    /// 最小权重对应的局部顶点编号
    ///
    /// 用于单元行走定位：权重最负的方向即穿出的边的对顶点。
    #[inline]
    pub fn most_negative(&self) -> usize {
        let mut idx = 0;
        for i in 1..3 {
            if self.weights[i] < self.weights[idx] {
                idx = i;
            }
        }
        idx
    }

    /// 按权重插值三个顶点上的向量
    #[inline]
    pub fn interpolate(&self, values: [DVec3; 3]) -> DVec3 {
        values[0] * self.weights[0] + values[1] * self.weights[1] + values[2] * self.weights[2]
    }

    /// 按权重插值三个顶点上的标量
    #[inline]
    pub fn interpolate_scalar(&self, values: [f64; 3]) -> f64 {
        values[0] * self.weights[0] + values[1] * self.weights[1] + values[2] * self.weights[2]
    }
}

// ============================================================
// 测试
// ============================================================
