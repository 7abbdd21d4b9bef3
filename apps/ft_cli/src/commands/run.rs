// apps/ft_cli/src/commands/run.rs

//! 运行粒子追踪命令
//!
//! 完整管线：AVS 网格 + `.uge` 控制体 + 连接通量 + 开度
//! → 节点速度重建 → 粒子系综 → 运移时间 / 轨迹 / 控制面输出。

use anyhow::{Context, Result};
use clap::Args;
use ft_config::TransportConfig;
use ft_flow::{ReconstructionConfig, VelocityField};
use ft_io::{
    assemble_flow, load_aperture, load_avs_mesh, load_flux, load_uge, load_zone,
    write_control_plane_crossings, write_trajectories_vtk, write_trajectory_files,
    write_travel_times,
};
use ft_mesh::{DfnMesh, GeometricControlVolumes};
use ft_tracking::{BoundaryZones, Ensemble, EnsembleSummary};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// 覆盖配置中的粒子数
    #[arg(short = 'n', long)]
    pub particles: Option<usize>,

    /// 覆盖配置中的随机种子
    #[arg(long)]
    pub seed: Option<u64>,

    /// 覆盖配置中的输出目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== FracTrans 粒子追踪启动 ===");

    let mut config = TransportConfig::from_file(&args.config)
        .with_context(|| format!("加载配置 {} 失败", args.config.display()))?;
    if let Some(n) = args.particles {
        config.particles.count = n;
    }
    if let Some(seed) = args.seed {
        config.particles.seed = seed;
    }
    if let Some(output) = args.output {
        config.output.directory = output;
    }
    config.validate().context("配置无效")?;

    // 网格
    let source = load_avs_mesh(&config.mesh.mesh_file).context("读取网格失败")?;
    let mesh = DfnMesh::build(source).context("构建网格拓扑失败")?;
    info!(
        n_nodes = mesh.n_nodes(),
        n_cells = mesh.n_cells(),
        n_fractures = mesh.n_fractures(),
        n_intersection = mesh.n_intersection_nodes(),
        "网格就绪"
    );

    // 流场
    let uge = load_uge(&config.flow.uge_file).context("读取 .uge 失败")?;
    anyhow::ensure!(
        uge.n_cells() == mesh.n_nodes(),
        ".uge 控制体数 {} 与网格节点数 {} 不一致",
        uge.n_cells(),
        mesh.n_nodes()
    );
    let fluxes = load_flux(&config.flow.flux_file).context("读取通量失败")?;
    let aperture = load_aperture(&config.flow.aperture_file).context("读取开度失败")?;
    let flow = assemble_flow(&uge, &fluxes, aperture, config.flow.porosity)
        .context("组装流场解失败")?;

    // 边界区
    let inflow = load_zone(&config.mesh.inflow_zone).context("读取入流区失败")?;
    let outflow = load_zone(&config.mesh.outflow_zone).context("读取出流区失败")?;
    let zones =
        BoundaryZones::from_node_lists(&mesh, inflow, outflow).context("边界区无效")?;
    info!(
        n_inflow = zones.n_inflow(),
        n_outflow = zones.n_outflow(),
        "边界区就绪"
    );

    // 内部节点的连接净流入应近似为零
    let net = flow.node_net_flux();
    let throughput: f64 = (0..net.len() as u32)
        .filter(|&n| zones.is_inflow_node(n))
        .map(|n| -net[n as usize])
        .sum();
    let residual = (0..net.len() as u32)
        .filter(|&n| !zones.is_inflow_node(n) && !zones.is_outflow_node(n))
        .map(|n| net[n as usize].abs())
        .fold(0.0_f64, f64::max);
    if residual > 1e-8 * throughput.max(f64::MIN_POSITIVE) {
        warn!(residual, throughput, "内部节点质量不守恒，速度重建可能有偏差");
    }

    // 节点速度重建
    let cv = GeometricControlVolumes::build(&mesh).context("构建控制体失败")?;
    let field = VelocityField::reconstruct(&mesh, &cv, &flow, &ReconstructionConfig::default())
        .context("速度重建失败")?;
    info!(
        v_max = field.max_speed(),
        n_fallback = field.n_fallback,
        "节点速度场就绪"
    );

    // 粒子系综
    let start = Instant::now();
    let settings = config.settings();
    let ensemble = Ensemble::new(&mesh, &field, &zones, &flow.aperture, settings)
        .context("创建粒子系综失败")?;
    let outcome = ensemble.run().context("粒子追踪失败")?;
    let elapsed = start.elapsed();

    // 输出
    let out_dir = &config.output.directory;
    write_travel_times(&out_dir.join("travel_times.dat"), &outcome.records)
        .context("写出运移时间失败")?;
    if !config.output.control_planes.is_empty() {
        write_control_plane_crossings(
            &out_dir.join("control_planes.dat"),
            &config.output.control_planes,
            &outcome.crossings,
        )
        .context("写出控制面穿越失败")?;
    }
    if config.output.trajectory_stride > 0 {
        let n = write_trajectory_files(&out_dir.join("trajectories"), &outcome.trajectories)
            .context("写出轨迹失败")?;
        info!(n_trajectories = n, "轨迹文件写出完成");
        if config.output.write_vtk {
            write_trajectories_vtk(&out_dir.join("trajectories.vtk"), &outcome.trajectories)
                .context("写出 VTK 轨迹失败")?;
        }
    }

    let summary = EnsembleSummary::from_records(&outcome.records);
    info!("=== 追踪完成 ===");
    info!(
        "粒子: {} 总数, {} 离开, {} 停滞, {} 步数耗尽 (回收率 {:.1}%)",
        summary.n_particles,
        summary.n_exited,
        summary.n_stuck,
        summary.n_max_steps,
        summary.recovery() * 100.0
    );
    if summary.n_exited > 0 {
        info!(
            "对流时间: min={:.6e} s, mean={:.6e} s, max={:.6e} s",
            summary.t_adv_min, summary.t_adv_mean, summary.t_adv_max
        );
        if ensemble.settings().tdrw.enabled {
            info!("含滞留平均总时间: {:.6e} s", summary.t_total_mean);
        }
    }
    info!("计算时间: {:.2} s", elapsed.as_secs_f64());
    info!("输出目录: {}", out_dir.display());

    Ok(())
}
