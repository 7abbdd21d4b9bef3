// crates/ft_tracking/src/tdrw.rs

//! 时域随机游走 (TDRW) 基质扩散滞留
//!
//! 粒子每走过一段对流时间 dt，都可能因向裂隙两侧基质的分子
//! 扩散而滞留。滞留时间从解析分布采样：
//!
//! a = φ_m √(D_m) · dt / b,   t_ret = (a / erfc⁻¹(u))²,  u ~ U(0, 1)
//!
//! 其中 φ_m 为基质孔隙度，D_m 为基质扩散系数，b 为裂隙开度。
//! `erfc⁻¹` 用有理近似加两步牛顿迭代求值。

use ft_foundation::error::{FtError, FtResult};
use ft_foundation::validation::check_positive;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 2 / √π
const TWO_OVER_SQRT_PI: f64 = 1.128_379_167_095_512_6;
/// √π
const SQRT_PI: f64 = 1.772_453_850_905_516;

// ============================================================
// 误差函数族
// ============================================================

/// 误差函数 erf(x)
///
/// |x| ≤ 3 用泰勒级数，|x| > 3 经由连分式 erfc。
pub fn erf(x: f64) -> f64 {
    if x < 0.0 {
        return -erf(-x);
    }
    if x > 3.0 {
        return 1.0 - erfc_large(x);
    }
    // 泰勒级数: erf(x) = 2/√π Σ (-1)ⁿ x^(2n+1) / (n! (2n+1))
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1..80 {
        term *= -x2 / n as f64;
        let add = term / (2.0 * n as f64 + 1.0);
        sum += add;
        if add.abs() < 1e-17 * sum.abs().max(1e-300) {
            break;
        }
    }
    TWO_OVER_SQRT_PI * sum
}

/// 互补误差函数 erfc(x)
pub fn erfc(x: f64) -> f64 {
    if x > 3.0 {
        erfc_large(x)
    } else {
        1.0 - erf(x)
    }
}

/// x > 3 时的连分式 erfc
fn erfc_large(x: f64) -> f64 {
    // erfc(x) = e^{-x²}/√π / (x + 1/2/(x + 1/(x + 3/2/(x + ...))))
    let mut f = 0.0;
    for n in (1..=60).rev() {
        f = (n as f64 / 2.0) / (x + f);
    }
    (-x * x).exp() / SQRT_PI / (x + f)
}

/// 逆误差函数 erf⁻¹(y), y ∈ (-1, 1)
///
/// Giles 型多项式给初值，再做两步牛顿迭代。
pub fn erf_inv(y: f64) -> f64 {
    debug_assert!(y > -1.0 && y < 1.0);
    if y == 0.0 {
        return 0.0;
    }

    let w = -((1.0 - y) * (1.0 + y)).ln();
    let mut x = if w < 5.0 {
        let w = w - 2.5;
        let mut p = 2.810_226_36e-08;
        p = 3.432_739_39e-07 + p * w;
        p = -3.523_387_7e-06 + p * w;
        p = -4.391_506_54e-06 + p * w;
        p = 2.185_808_7e-04 + p * w;
        p = -1.253_725_03e-03 + p * w;
        p = -4.177_681_64e-03 + p * w;
        p = 2.466_407_27e-01 + p * w;
        p = 1.501_409_41 + p * w;
        p * y
    } else {
        let w = w.sqrt() - 3.0;
        let mut p = -2.002_142_57e-04;
        p = 1.009_505_58e-04 + p * w;
        p = 1.349_343_22e-03 + p * w;
        p = -3.673_428_44e-03 + p * w;
        p = 5.739_507_73e-03 + p * w;
        p = -7.622_461_3e-03 + p * w;
        p = 9.438_870_47e-03 + p * w;
        p = 1.001_674_06 + p * w;
        p = 2.832_976_82 + p * w;
        p * y
    };

    // 牛顿迭代: x -= (erf(x) - y) / (2/√π e^{-x²})
    for _ in 0..2 {
        let err = erf(x) - y;
        x -= err / (TWO_OVER_SQRT_PI * (-x * x).exp());
    }
    x
}

/// 逆互补误差函数 erfc⁻¹(u), u ∈ (0, 2)
pub fn erfc_inv(u: f64) -> f64 {
    erf_inv(1.0 - u)
}

// ============================================================
// TDRW
// ============================================================

/// TDRW 配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TdrwConfig {
    /// 是否启用
    #[serde(default)]
    pub enabled: bool,
    /// 基质孔隙度 φ_m
    #[serde(default = "default_matrix_porosity")]
    pub matrix_porosity: f64,
    /// 基质扩散系数 D_m [m²/s]
    #[serde(default = "default_matrix_diffusivity")]
    pub matrix_diffusivity: f64,
}

fn default_matrix_porosity() -> f64 {
    0.01
}
fn default_matrix_diffusivity() -> f64 {
    1e-11
}

impl Default for TdrwConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            matrix_porosity: default_matrix_porosity(),
            matrix_diffusivity: default_matrix_diffusivity(),
        }
    }
}

/// TDRW 滞留时间采样器
#[derive(Debug, Clone, Copy)]
pub struct Tdrw {
    config: TdrwConfig,
}

impl Tdrw {
    /// 创建采样器并验证参数
    pub fn new(config: TdrwConfig) -> FtResult<Self> {
        check_positive("matrix_porosity", config.matrix_porosity)?;
        FtError::check_range(
            "matrix_porosity",
            config.matrix_porosity,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        check_positive("matrix_diffusivity", config.matrix_diffusivity)?;
        Ok(Self { config })
    }

    /// 配置引用
    pub fn config(&self) -> &TdrwConfig {
        &self.config
    }

    /// 按对流段采样滞留时间
    ///
    /// # 参数
    /// - `dt_adv`: 该段对流时间 [s]
    /// - `aperture`: 当前裂隙开度 [m]
    pub fn sample_retention<R: Rng + ?Sized>(
        &self,
        dt_adv: f64,
        aperture: f64,
        rng: &mut R,
    ) -> f64 {
        if !(dt_adv > 0.0) || !(aperture > 0.0) {
            return 0.0;
        }
        let a = self.config.matrix_porosity * self.config.matrix_diffusivity.sqrt() * dt_adv
            / aperture;

        // u → 1 时 erfc⁻¹ → 0，滞留发散；按机器精度截断
        let u = rng.random::<f64>().clamp(1e-12, 1.0 - 1e-12);
        let xi = erfc_inv(u);
        if xi <= 0.0 {
            return 0.0;
        }
        let r = a / xi;
        r * r
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_erf_known_values() {
        assert!(erf(0.0).abs() < 1e-15);
        // erf(1) = 0.8427007929497149
        assert!((erf(1.0) - 0.842_700_792_949_714_9).abs() < 1e-12);
        // erf(2) = 0.9953222650189527
        assert!((erf(2.0) - 0.995_322_265_018_952_7).abs() < 1e-12);
        assert!((erf(-1.0) + erf(1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_erfc_large_branch() {
        // erfc(4) = 1.541725790028002e-8
        assert!((erfc(4.0) - 1.541_725_790_028_002e-8).abs() < 1e-16);
        // 两分支衔接处连续
        let lo = erfc(3.0 - 1e-9);
        let hi = erfc(3.0 + 1e-9);
        assert!((lo - hi).abs() < 1e-10);
    }

    #[test]
    fn test_erf_inv_roundtrip() {
        for &y in &[-0.999, -0.5, -0.1, 0.0, 0.1, 0.5, 0.9, 0.999, 0.999_999] {
            let x = erf_inv(y);
            assert!(
                (erf(x) - y).abs() < 1e-12,
                "erf(erf_inv({y})) = {} 偏差过大",
                erf(x)
            );
        }
    }

    #[test]
    fn test_erf_inv_known_value() {
        // erf_inv(0.5) = 0.4769362762044699
        assert!((erf_inv(0.5) - 0.476_936_276_204_469_9).abs() < 1e-10);
    }

    #[test]
    fn test_erfc_inv() {
        assert!(erfc_inv(1.0).abs() < 1e-15);
        assert!((erfc_inv(0.5) - erf_inv(0.5)).abs() < 1e-14);
        // u < 1 为正，u > 1 为负
        assert!(erfc_inv(0.1) > 0.0);
        assert!(erfc_inv(1.9) < 0.0);
    }

    #[test]
    fn test_retention_positive_and_scales() {
        let tdrw = Tdrw::new(TdrwConfig {
            enabled: true,
            matrix_porosity: 0.02,
            matrix_diffusivity: 1e-11,
        })
        .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 2000;
        let mut sum_short = 0.0;
        let mut sum_long = 0.0;
        for _ in 0..n {
            sum_short += tdrw.sample_retention(1.0, 1e-4, &mut rng);
            sum_long += tdrw.sample_retention(10.0, 1e-4, &mut rng);
        }
        assert!(sum_short > 0.0);
        // a ∝ dt，滞留 ∝ a²：长段滞留应显著更大
        assert!(sum_long > sum_short);
    }

    #[test]
    fn test_retention_zero_for_degenerate_input() {
        let tdrw = Tdrw::new(TdrwConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(tdrw.sample_retention(0.0, 1e-4, &mut rng), 0.0);
        assert_eq!(tdrw.sample_retention(1.0, 0.0, &mut rng), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = TdrwConfig {
            enabled: true,
            matrix_porosity: 0.0,
            matrix_diffusivity: 1e-11,
        };
        assert!(Tdrw::new(bad).is_err());

        let bad = TdrwConfig {
            enabled: true,
            matrix_porosity: 0.01,
            matrix_diffusivity: -1.0,
        };
        assert!(Tdrw::new(bad).is_err());
    }

    #[test]
    fn test_reproducible_with_seed() {
        let tdrw = Tdrw::new(TdrwConfig::default()).unwrap();
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let x = tdrw.sample_retention(1.0, 1e-4, &mut a);
            let y = tdrw.sample_retention(1.0, 1e-4, &mut b);
            assert_eq!(x, y);
        }
    }
}
