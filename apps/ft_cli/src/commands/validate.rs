// apps/ft_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 检查配置文件本身与其引用的输入文件：路径存在、格式可解析、
//! 网格 / 控制体 / 开度 / 边界区之间尺寸一致。

use anyhow::{bail, Result};
use clap::Args;
use ft_config::TransportConfig;
use ft_io::{load_aperture, load_avs_mesh, load_flux, load_uge, load_zone};
use ft_mesh::DfnMesh;
use ft_tracking::BoundaryZones;
use std::path::PathBuf;
use tracing::{error, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,

    /// 只检查配置本身，不读取输入文件
    #[arg(long)]
    pub config_only: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("检查配置文件: {}", args.config.display());

    let mut result = ValidationResult::default();

    let config = match TransportConfig::from_file(&args.config) {
        Ok(c) => Some(c),
        Err(e) => {
            result.add_error(format!("配置无效: {e}"));
            None
        }
    };

    if let Some(config) = &config {
        println!("  ✓ 配置格式有效");
        if !args.config_only {
            validate_inputs(config, &mut result);
        }
    }

    print_validation_result(&result, args.strict)
}

/// 读取并交叉检查配置引用的输入文件
fn validate_inputs(config: &TransportConfig, result: &mut ValidationResult) {
    let mesh = match load_avs_mesh(&config.mesh.mesh_file).and_then(DfnMesh::build) {
        Ok(m) => {
            println!(
                "  ✓ 网格 {}: {} 节点, {} 单元, {} 条裂隙",
                config.mesh.mesh_file.display(),
                m.n_nodes(),
                m.n_cells(),
                m.n_fractures()
            );
            if m.n_intersection_nodes() == 0 && m.n_fractures() > 1 {
                result.add_warning("多条裂隙但没有交叉线节点，裂隙间不连通");
            }
            Some(m)
        }
        Err(e) => {
            result.add_error(format!("网格无效: {e}"));
            None
        }
    };

    let uge = match load_uge(&config.flow.uge_file) {
        Ok(u) => {
            println!(
                "  ✓ 控制体 {}: {} 控制体, {} 连接",
                config.flow.uge_file.display(),
                u.n_cells(),
                u.connections.len()
            );
            Some(u)
        }
        Err(e) => {
            result.add_error(format!(".uge 无效: {e}"));
            None
        }
    };

    if let (Some(mesh), Some(uge)) = (&mesh, &uge) {
        if uge.n_cells() != mesh.n_nodes() {
            result.add_error(format!(
                ".uge 控制体数 {} 与网格节点数 {} 不一致",
                uge.n_cells(),
                mesh.n_nodes()
            ));
        }
    }

    match load_flux(&config.flow.flux_file) {
        Ok(fluxes) => {
            println!(
                "  ✓ 通量 {}: {} 条记录",
                config.flow.flux_file.display(),
                fluxes.len()
            );
            if let Some(uge) = &uge {
                if fluxes.len() != uge.connections.len() {
                    result.add_warning(format!(
                        "通量记录数 {} 与 .uge 连接数 {} 不同",
                        fluxes.len(),
                        uge.connections.len()
                    ));
                }
            }
        }
        Err(e) => result.add_error(format!("通量文件无效: {e}")),
    }

    match load_aperture(&config.flow.aperture_file) {
        Ok(aperture) => {
            println!(
                "  ✓ 开度 {}: {} 条裂隙",
                config.flow.aperture_file.display(),
                aperture.len()
            );
            if let Some(mesh) = &mesh {
                if aperture.len() < mesh.n_fractures() {
                    result.add_error(format!(
                        "开度条数 {} 少于网格裂隙数 {}",
                        aperture.len(),
                        mesh.n_fractures()
                    ));
                }
            }
        }
        Err(e) => result.add_error(format!("开度文件无效: {e}")),
    }

    let inflow = load_zone(&config.mesh.inflow_zone);
    let outflow = load_zone(&config.mesh.outflow_zone);
    match (&inflow, &outflow) {
        (Ok(fin), Ok(fout)) => {
            println!("  ✓ 边界区: {} 入流节点, {} 出流节点", fin.len(), fout.len());
            if let Some(mesh) = &mesh {
                if let Err(e) =
                    BoundaryZones::from_node_lists(mesh, fin.iter().copied(), fout.iter().copied())
                {
                    result.add_error(format!("边界区无效: {e}"));
                }
            }
        }
        _ => {
            if let Err(e) = &inflow {
                result.add_error(format!("入流区无效: {e}"));
            }
            if let Err(e) = &outflow {
                result.add_error(format!("出流区无效: {e}"));
            }
        }
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    if result.is_ok(strict) {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
