// crates/ft_geo/src/plane.rs

//! 裂隙平面局部坐标系
//!
//! 每条裂隙是三维空间中的一个平面多边形。速度重构与重心坐标计算
//! 都在裂隙的局部 2D 坐标系中进行，本模块提供全局 ↔ 局部的转换。
//!
//! 局部坐标系由单位法向 `n` 和两条面内正交单位轴 `u`、`v` 组成，
//! 满足 `u × v = n`。切向轴的选择是确定性的：优先取 `n × e_z`，
//! 当法向接近竖直时退化为 `n × e_x`，保证数值稳定。

use ft_foundation::error::{FtError, FtResult};
use glam::{DVec2, DVec3};

/// 法向与竖直方向夹角判据：|n·e_z| 超过该值时改用 e_x 构造切向
const VERTICAL_DOT_LIMIT: f64 = 0.999;

/// 裂隙平面局部坐标系
///
/// # 示例
///
/// ```
/// use ft_geo::plane::FracturePlane;
/// use glam::DVec3;
///
/// let plane = FracturePlane::from_normal(DVec3::new(0.0, 0.0, 2.0)).unwrap();
/// let p = DVec3::new(3.0, 4.0, 0.0);
/// let local = plane.to_local(p);
/// assert!((plane.to_global(local) - p).length() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracturePlane {
    /// 单位法向
    pub normal: DVec3,
    /// 面内第一轴（单位向量）
    pub u_axis: DVec3,
    /// 面内第二轴（单位向量，u × v = n）
    pub v_axis: DVec3,
    /// 平面上的参考点（局部坐标原点）
    pub origin: DVec3,
}

impl FracturePlane {
    /// 由法向构造局部坐标系（原点取全局原点）
    ///
    /// # 错误
    ///
    /// 法向长度接近零时返回 `InvalidInput`。
    pub fn from_normal(normal: DVec3) -> FtResult<Self> {
        Self::from_normal_and_origin(normal, DVec3::ZERO)
    }

    /// 由法向与参考点构造局部坐标系
    pub fn from_normal_and_origin(normal: DVec3, origin: DVec3) -> FtResult<Self> {
        let len = normal.length();
        if !(len > 1e-14) || !len.is_finite() {
            return Err(FtError::invalid_input(format!(
                "裂隙法向长度无效: {len}"
            )));
        }
        let n = normal / len;

        // 稳定的切向选择
        let helper = if n.z.abs() > VERTICAL_DOT_LIMIT {
            DVec3::X
        } else {
            DVec3::Z
        };
        let u = n.cross(helper).normalize();
        let v = n.cross(u);

        Ok(Self {
            normal: n,
            u_axis: u,
            v_axis: v,
            origin,
        })
    }

    /// 全局坐标 → 面内局部 2D 坐标
    #[inline]
    pub fn to_local(&self, p: DVec3) -> DVec2 {
        let d = p - self.origin;
        DVec2::new(d.dot(self.u_axis), d.dot(self.v_axis))
    }

    /// 面内局部 2D 坐标 → 全局坐标
    #[inline]
    pub fn to_global(&self, p: DVec2) -> DVec3 {
        self.origin + self.u_axis * p.x + self.v_axis * p.y
    }

    /// 将全局向量投影到面内（保留面内分量）
    #[inline]
    pub fn project_vector(&self, v: DVec3) -> DVec3 {
        v - self.normal * v.dot(self.normal)
    }

    /// 全局向量 → 面内 2D 分量
    #[inline]
    pub fn vector_to_local(&self, v: DVec3) -> DVec2 {
        DVec2::new(v.dot(self.u_axis), v.dot(self.v_axis))
    }

    /// 面内 2D 向量 → 全局向量
    #[inline]
    pub fn vector_to_global(&self, v: DVec2) -> DVec3 {
        self.u_axis * v.x + self.v_axis * v.y
    }

    /// 点到平面的有向距离
    #[inline]
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        (p - self.origin).dot(self.normal)
    }
}

// ============================================================================
// 测试
// ============================================================================
