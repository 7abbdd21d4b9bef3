// apps/ft_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示网格与流场统计，或打印默认配置。

use anyhow::{Context, Result};
use clap::Args;
use ft_config::TransportConfig;
use ft_io::{assemble_flow, load_aperture, load_avs_mesh, load_flux, load_uge, load_zone};
use ft_mesh::DfnMesh;
use ft_tracking::BoundaryZones;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径：显示其网格与流场统计
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 单独检查一个 AVS 网格文件
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// 打印默认配置 (JSON)
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== FracTrans 信息 ===");

    if args.defaults {
        print_default_config()?;
        return Ok(());
    }

    if let Some(mesh_path) = &args.mesh {
        print_mesh_info(mesh_path)?;
        return Ok(());
    }

    if let Some(config_path) = &args.config {
        print_case_info(config_path)?;
        return Ok(());
    }

    println!("用法: ft_cli info --config <配置文件>");
    println!("      ft_cli info --mesh <AVS 网格文件>");
    println!("      ft_cli info --defaults");
    Ok(())
}

fn print_default_config() -> Result<()> {
    let config = TransportConfig::default();
    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");
    Ok(())
}

fn print_mesh_info(path: &PathBuf) -> Result<()> {
    let source = load_avs_mesh(path).context("读取网格失败")?;
    let mesh = DfnMesh::build(source).context("构建网格拓扑失败")?;

    println!("=== 网格 {} ===", path.display());
    println!("裂隙数:       {}", mesh.n_fractures());
    println!("节点数:       {}", mesh.n_nodes());
    println!("单元数:       {}", mesh.n_cells());
    println!("交叉线节点数: {}", mesh.n_intersection_nodes());
    Ok(())
}

fn print_case_info(config_path: &PathBuf) -> Result<()> {
    let config = TransportConfig::from_file(config_path)
        .with_context(|| format!("加载配置 {} 失败", config_path.display()))?;

    let source = load_avs_mesh(&config.mesh.mesh_file).context("读取网格失败")?;
    let mesh = DfnMesh::build(source).context("构建网格拓扑失败")?;
    println!("=== 网格 {} ===", config.mesh.mesh_file.display());
    println!("裂隙数:       {}", mesh.n_fractures());
    println!("节点数:       {}", mesh.n_nodes());
    println!("单元数:       {}", mesh.n_cells());
    println!("交叉线节点数: {}", mesh.n_intersection_nodes());

    let uge = load_uge(&config.flow.uge_file).context("读取 .uge 失败")?;
    anyhow::ensure!(
        uge.n_cells() == mesh.n_nodes(),
        ".uge 控制体数 {} 与网格节点数 {} 不一致",
        uge.n_cells(),
        mesh.n_nodes()
    );
    let fluxes = load_flux(&config.flow.flux_file).context("读取通量失败")?;
    let aperture = load_aperture(&config.flow.aperture_file).context("读取开度失败")?;

    println!("\n=== 流场 ===");
    println!("控制体数: {}", uge.n_cells());
    println!("连接数:   {}", uge.connections.len());
    println!("裂隙开度: {} 条", aperture.len());

    let flow = assemble_flow(&uge, &fluxes, aperture, config.flow.porosity)
        .context("组装流场解失败")?;

    let inflow = load_zone(&config.mesh.inflow_zone).context("读取入流区失败")?;
    let outflow = load_zone(&config.mesh.outflow_zone).context("读取出流区失败")?;
    let zones =
        BoundaryZones::from_node_lists(&mesh, inflow, outflow).context("边界区无效")?;
    println!("入流区节点: {}", zones.n_inflow());
    println!("出流区节点: {}", zones.n_outflow());

    let net = flow.node_net_flux();
    let q_in: f64 = (0..net.len() as u32)
        .filter(|&n| zones.is_inflow_node(n))
        .map(|n| -net[n as usize])
        .sum();
    let q_out: f64 = (0..net.len() as u32)
        .filter(|&n| zones.is_outflow_node(n))
        .map(|n| net[n as usize])
        .sum();
    let residual = (0..net.len() as u32)
        .filter(|&n| !zones.is_inflow_node(n) && !zones.is_outflow_node(n))
        .map(|n| net[n as usize].abs())
        .fold(0.0_f64, f64::max);
    println!("入流区流量:     {:.6e} m³/s", q_in);
    println!("出流区流量:     {:.6e} m³/s", q_out);
    println!("内部最大净残量: {:.3e} m³/s", residual);
    Ok(())
}
