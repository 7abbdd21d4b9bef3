// crates/ft_geo/src/point.rs

//! 几何类型定义
//!
//! 提供项目统一的 3D 点类型。网格文件中的节点坐标以 `Point3D` 存储，
//! 数值核心内部使用 `glam::DVec3`，两者可以零成本互转。

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// ============================================================================
// Point3D - 3D点（项目统一几何类型）
// ============================================================================

/// 3D点 - 项目统一几何类型
///
/// 用于存储节点位置、法向量等 3D 几何数据。
///
/// # 示例
///
/// ```
/// use ft_geo::point::Point3D;
///
/// let p1 = Point3D::new(1.0, 2.0, 3.0);
/// let p2 = Point3D::new(4.0, 6.0, 3.0);
/// assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    /// x 坐标
    pub x: f64,
    /// y 坐标
    pub y: f64,
    /// z 坐标
    pub z: f64,
}

impl Point3D {
    /// 原点
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// 创建新的 3D 点
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 点积
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// 叉积
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// 模长
    #[inline]
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// 欧几里得距离
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    /// 所有分量均为有限值
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// 转换为 glam 向量
    #[inline]
    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// 从 glam 向量创建
    #[inline]
    pub fn from_dvec3(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<DVec3> for Point3D {
    fn from(v: DVec3) -> Self {
        Self::from_dvec3(v)
    }
}

impl From<Point3D> for DVec3 {
    fn from(p: Point3D) -> Self {
        p.to_dvec3()
    }
}

impl Add for Point3D {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3D {
    type Output = Self;

    #[inline]
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Point3D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Point3D::new(1.0, 2.0, 3.0);
        let b = Point3D::new(4.0, 5.0, 6.0);

        let s = a + b;
        assert_eq!(s, Point3D::new(5.0, 7.0, 9.0));

        let d = b - a;
        assert_eq!(d, Point3D::new(3.0, 3.0, 3.0));

        assert_eq!(a * 2.0, Point3D::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Point3D::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_dot_cross() {
        let x = Point3D::new(1.0, 0.0, 0.0);
        let y = Point3D::new(0.0, 1.0, 0.0);

        assert_eq!(x.dot(&y), 0.0);
        assert_eq!(x.cross(&y), Point3D::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_distance() {
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-14);
    }

    #[test]
    fn test_glam_roundtrip() {
        let p = Point3D::new(1.5, -2.5, 3.5);
        let v: DVec3 = p.into();
        let q: Point3D = v.into();
        assert_eq!(p, q);
    }

    #[test]
    fn test_is_finite() {
        assert!(Point3D::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Point3D::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}
