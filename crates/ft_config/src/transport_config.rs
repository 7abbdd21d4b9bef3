// crates/ft_config/src/transport_config.rs

//! TransportConfig - 运移配置
//!
//! 一次粒子追踪运行的全部配置，JSON 序列化。按输入/粒子/步进/
//! 输出分节，所有字段带默认值。[`TransportConfig::settings`] 把
//! 配置装配为追踪层的 [`TransportSettings`]。

use ft_foundation::error::{FtError, FtResult};
use ft_tracking::{
    ControlPlane, RoutingRule, SeedingMode, StepperConfig, TdrwConfig, TransportSettings,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 运移配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    /// 网格与边界区文件
    #[serde(default)]
    pub mesh: MeshConfig,

    /// 流场解文件与孔隙度
    #[serde(default)]
    pub flow: FlowConfig,

    /// 粒子与随机种子
    #[serde(default)]
    pub particles: ParticlesConfig,

    /// 步进参数
    #[serde(default)]
    pub stepper: StepperSection,

    /// 交叉线分流规则
    #[serde(default)]
    pub routing: RoutingRule,

    /// 基质扩散 (TDRW)
    #[serde(default)]
    pub tdrw: TdrwConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
}

// ============================================================
// 分节
// ============================================================

/// 网格与边界区文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// AVS 网格文件
    #[serde(default = "default_mesh_file")]
    pub mesh_file: PathBuf,
    /// 入流边界区文件
    #[serde(default = "default_inflow_zone")]
    pub inflow_zone: PathBuf,
    /// 出流边界区文件
    #[serde(default = "default_outflow_zone")]
    pub outflow_zone: PathBuf,
}

fn default_mesh_file() -> PathBuf {
    PathBuf::from("full_mesh.inp")
}
fn default_inflow_zone() -> PathBuf {
    PathBuf::from("inflow.zone")
}
fn default_outflow_zone() -> PathBuf {
    PathBuf::from("outflow.zone")
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            mesh_file: default_mesh_file(),
            inflow_zone: default_inflow_zone(),
            outflow_zone: default_outflow_zone(),
        }
    }
}

/// 流场解文件与孔隙度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// `.uge` 控制体文件
    #[serde(default = "default_uge_file")]
    pub uge_file: PathBuf,
    /// 连接通量文件
    #[serde(default = "default_flux_file")]
    pub flux_file: PathBuf,
    /// 裂隙开度文件
    #[serde(default = "default_aperture_file")]
    pub aperture_file: PathBuf,
    /// 裂隙内孔隙度
    #[serde(default = "default_porosity")]
    pub porosity: f64,
}

fn default_uge_file() -> PathBuf {
    PathBuf::from("full_mesh.uge")
}
fn default_flux_file() -> PathBuf {
    PathBuf::from("darcyvel.dat")
}
fn default_aperture_file() -> PathBuf {
    PathBuf::from("aperture.dat")
}
fn default_porosity() -> f64 {
    1.0
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            uge_file: default_uge_file(),
            flux_file: default_flux_file(),
            aperture_file: default_aperture_file(),
            porosity: default_porosity(),
        }
    }
}

/// 粒子与随机种子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlesConfig {
    /// 粒子数
    #[serde(default = "default_count")]
    pub count: usize,
    /// 布种方式
    #[serde(default)]
    pub seeding: SeedingMode,
    /// 全局随机种子
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// 是否按粒子并行
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_count() -> usize {
    1000
}
fn default_seed() -> u64 {
    42
}
fn default_parallel() -> bool {
    true
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            seeding: SeedingMode::default(),
            seed: default_seed(),
            parallel: default_parallel(),
        }
    }
}

/// 步进参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepperSection {
    /// 步长因子 ε（单步位移 ≈ ε · 单元特征尺寸）
    #[serde(default = "default_eps_step")]
    pub eps_step: f64,
    /// 单粒子最大步数
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// 停滞速度阈值 [m/s]
    #[serde(default = "default_v_stagnant")]
    pub v_stagnant: f64,
    /// 连续低速多少步后判停滞
    #[serde(default = "default_stuck_patience")]
    pub stuck_patience: usize,
}

fn default_eps_step() -> f64 {
    0.1
}
fn default_max_steps() -> usize {
    200_000
}
fn default_v_stagnant() -> f64 {
    1e-14
}
fn default_stuck_patience() -> usize {
    100
}

impl Default for StepperSection {
    fn default() -> Self {
        Self {
            eps_step: default_eps_step(),
            max_steps: default_max_steps(),
            v_stagnant: default_v_stagnant(),
            stuck_patience: default_stuck_patience(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// 轨迹采样间隔（步数，0 为不采样）
    #[serde(default)]
    pub trajectory_stride: usize,
    /// 是否写出 VTK 轨迹
    #[serde(default = "default_write_vtk")]
    pub write_vtk: bool,
    /// 控制面
    #[serde(default)]
    pub control_planes: Vec<ControlPlane>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_write_vtk() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            trajectory_stride: 0,
            write_vtk: default_write_vtk(),
            control_planes: Vec::new(),
        }
    }
}

// ============================================================
// 加载与验证
// ============================================================

impl TransportConfig {
    /// 从 JSON 文件加载配置并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> FtResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FtError::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| FtError::io_with_source(format!("读取 {} 失败", path.display()), e))?;
        let config: TransportConfig = serde_json::from_str(&content)
            .map_err(|e| FtError::serialization(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> FtResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FtError::serialization(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            FtError::io_with_source(format!("写入 {} 失败", path.as_ref().display()), e)
        })?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> FtResult<()> {
        for (key, path) in [
            ("mesh.mesh_file", &self.mesh.mesh_file),
            ("mesh.inflow_zone", &self.mesh.inflow_zone),
            ("mesh.outflow_zone", &self.mesh.outflow_zone),
            ("flow.uge_file", &self.flow.uge_file),
            ("flow.flux_file", &self.flow.flux_file),
            ("flow.aperture_file", &self.flow.aperture_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(FtError::missing_config(key));
            }
        }

        if !(self.flow.porosity > 0.0) || self.flow.porosity > 1.0 {
            return Err(FtError::invalid_config(
                "flow.porosity",
                self.flow.porosity.to_string(),
                "孔隙度必须在 (0, 1] 内",
            ));
        }
        if self.particles.count == 0 {
            return Err(FtError::invalid_config(
                "particles.count",
                "0",
                "粒子数必须为正",
            ));
        }
        if !(self.stepper.eps_step > 0.0) || self.stepper.eps_step >= 1.0 {
            return Err(FtError::invalid_config(
                "stepper.eps_step",
                self.stepper.eps_step.to_string(),
                "步长因子必须在 (0, 1) 内",
            ));
        }
        if self.stepper.max_steps == 0 {
            return Err(FtError::invalid_config(
                "stepper.max_steps",
                "0",
                "最大步数必须为正",
            ));
        }
        if self.stepper.stuck_patience == 0 {
            return Err(FtError::invalid_config(
                "stepper.stuck_patience",
                "0",
                "停滞耐心必须为正",
            ));
        }
        if !(self.stepper.v_stagnant >= 0.0) {
            return Err(FtError::invalid_config(
                "stepper.v_stagnant",
                self.stepper.v_stagnant.to_string(),
                "停滞阈值不能为负",
            ));
        }
        if self.tdrw.enabled {
            if !(self.tdrw.matrix_porosity > 0.0) || self.tdrw.matrix_porosity > 1.0 {
                return Err(FtError::invalid_config(
                    "tdrw.matrix_porosity",
                    self.tdrw.matrix_porosity.to_string(),
                    "基质孔隙度必须在 (0, 1] 内",
                ));
            }
            if !(self.tdrw.matrix_diffusivity > 0.0) {
                return Err(FtError::invalid_config(
                    "tdrw.matrix_diffusivity",
                    self.tdrw.matrix_diffusivity.to_string(),
                    "基质扩散系数必须为正",
                ));
            }
        }
        if self.output.directory.as_os_str().is_empty() {
            return Err(FtError::missing_config("output.directory"));
        }
        Ok(())
    }

    /// 装配为追踪层设置
    pub fn settings(&self) -> TransportSettings {
        TransportSettings {
            n_particles: self.particles.count,
            seed: self.particles.seed,
            seeding: self.particles.seeding,
            routing: self.routing,
            stepper: StepperConfig {
                eps_step: self.stepper.eps_step,
                max_steps: self.stepper.max_steps,
                v_stagnant: self.stepper.v_stagnant,
                stuck_patience: self.stepper.stuck_patience,
                record_stride: self.output.trajectory_stride,
            },
            tdrw: self.tdrw,
            control_planes: self.output.control_planes.clone(),
            parallel: self.particles.parallel,
        }
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ft_tracking::Axis;

    #[test]
    fn test_default_valid() {
        let config = TransportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.count, 1000);
        assert_eq!(config.routing, RoutingRule::CompleteMixing);
        assert!(!config.tdrw.enabled);
    }

    #[test]
    fn test_minimal_json() {
        // 空对象：全部取默认值
        let config: TransportConfig = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mesh.mesh_file, PathBuf::from("full_mesh.inp"));
        assert!((config.stepper.eps_step - 0.1).abs() < 1e-14);
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "particles": { "count": 50, "seed": 7 },
            "routing": "streamline_routing",
            "tdrw": { "enabled": true, "matrix_porosity": 0.02 },
            "output": {
                "trajectory_stride": 10,
                "control_planes": [ { "axis": "x", "position": 2.0 } ]
            }
        }"#;
        let config: TransportConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.count, 50);
        assert_eq!(config.routing, RoutingRule::StreamlineRouting);
        assert!(config.tdrw.enabled);
        assert!((config.tdrw.matrix_diffusivity - 1e-11).abs() < 1e-24);
        assert_eq!(config.output.control_planes.len(), 1);
        assert_eq!(config.output.control_planes[0].axis, Axis::X);
    }

    #[test]
    fn test_settings_assembly() {
        let mut config = TransportConfig::default();
        config.particles.count = 10;
        config.output.trajectory_stride = 5;
        let settings = config.settings();
        assert_eq!(settings.n_particles, 10);
        assert_eq!(settings.stepper.record_stride, 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_porosity_rejected() {
        let mut config = TransportConfig::default();
        config.flow.porosity = 0.0;
        assert!(config.validate().is_err());
        config.flow.porosity = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_eps_step_rejected() {
        let mut config = TransportConfig::default();
        config.stepper.eps_step = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tdrw_params_checked_only_when_enabled() {
        let mut config = TransportConfig::default();
        config.tdrw.matrix_diffusivity = -1.0;
        assert!(config.validate().is_ok(), "未启用 TDRW 时不检查其参数");
        config.tdrw.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_file() {
        let dir = std::env::temp_dir().join("ft_config_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("transport.json");

        let mut config = TransportConfig::default();
        config.particles.seed = 99;
        config.save_to_file(&path).unwrap();

        let loaded = TransportConfig::from_file(&path).unwrap();
        assert_eq!(loaded.particles.seed, 99);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_rejected() {
        assert!(TransportConfig::from_file("/no/such/config.json").is_err());
    }
}
